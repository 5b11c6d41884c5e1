//! User-visible alerts raised by the garage

use serde::{Deserialize, Serialize};

/// How loudly an alert should be shown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// The change may not survive a reload
    Warning,
    /// Stored data was lost or reset
    Critical,
}

/// A short, actionable message meant for the user (never diagnostics)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
}

impl Alert {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: AlertSeverity::Warning,
            message: message.into(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            severity: AlertSeverity::Critical,
            message: message.into(),
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            AlertSeverity::Warning => write!(f, "Aviso: {}", self.message),
            AlertSeverity::Critical => write!(f, "ALERTA: {}", self.message),
        }
    }
}
