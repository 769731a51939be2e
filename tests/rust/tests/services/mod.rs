//! Service tests: news fallback, admin submission, data status monitor

mod news;
