//! Catalog listing tests: filter/sort pipeline, pagination, browse state

mod browse_state;
