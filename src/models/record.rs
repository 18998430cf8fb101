//! Assertion result records
//!
//! Defines the already-classified outcome of a single assertion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome class of an assertion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Pass,
    Failure,
    Error,
    Skip,
}

impl ResultStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            ResultStatus::Pass => "✓",
            ResultStatus::Failure => "✗",
            ResultStatus::Error => "!",
            ResultStatus::Skip => "○",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Pass => write!(f, "PASS"),
            ResultStatus::Failure => write!(f, "FAIL"),
            ResultStatus::Error => write!(f, "ERROR"),
            ResultStatus::Skip => write!(f, "SKIP"),
        }
    }
}

/// Result of a single assertion as delivered by the upstream runner
///
/// A record may carry several upstream flags at once; `status` resolves them
/// with the precedence error, failure, skip, pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    skipped: bool,
}

impl ResultRecord {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn error(value: impl Into<serde_json::Value>) -> Self {
        Self {
            error: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn skip() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn with_error(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.error = Some(value.into());
        self
    }

    /// Failure message, if one was reported and is non-empty
    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref().filter(|m| !m.is_empty())
    }

    pub fn error_value(&self) -> Option<&serde_json::Value> {
        self.error.as_ref()
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub fn status(&self) -> ResultStatus {
        if self.error.is_some() {
            ResultStatus::Error
        } else if self.failure_message().is_some() {
            ResultStatus::Failure
        } else if self.skipped {
            ResultStatus::Skip
        } else {
            ResultStatus::Pass
        }
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status();
        write!(f, "{} {status}", status.symbol())?;
        match status {
            ResultStatus::Failure => {
                if let Some(msg) = self.failure_message() {
                    write!(f, " - {msg}")?;
                }
            }
            ResultStatus::Error => {
                if let Some(value) = &self.error {
                    write!(f, " - {value}")?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
