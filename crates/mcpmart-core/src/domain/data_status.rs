//! Backend data status (database health banner)

use serde::{Deserialize, Serialize};

/// Health of the backing catalog database as reported by `GET /data-status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    /// Live data from the database
    Connected,
    /// The backend is serving fallback data
    Fallback,
    /// Backend unreachable or reporting an error
    #[default]
    Unavailable,
}

impl DataStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Fallback => "fallback",
            Self::Unavailable => "unavailable",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "connected" | "ok" | "healthy" => Self::Connected,
            "fallback" | "degraded" => Self::Fallback,
            _ => Self::Unavailable,
        }
    }

    /// Whether the error banner should be shown
    pub fn needs_banner(&self) -> bool {
        !matches!(self, Self::Connected)
    }
}

/// Banner text shown whenever the live database is not in use
pub const DATA_STATUS_BANNER: &str =
    "AWS Database connection required. Showing limited data until the connection is restored.";

/// Wire format of `GET /data-status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStatusReport {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "usingFallbackData")]
    pub using_fallback_data: bool,
    #[serde(default, alias = "checkedAt")]
    pub checked_at: Option<String>,
}

impl DataStatusReport {
    /// Effective status; a report flagged as fallback is never `Connected`
    pub fn status(&self) -> DataStatus {
        match DataStatus::from_str(&self.status) {
            DataStatus::Connected if self.using_fallback_data => DataStatus::Fallback,
            other => other,
        }
    }
}
