//! Uniform response envelope.

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// `{ success, data, message, count?, total? }`, the shape of every backend
/// response and of every gateway result.
///
/// Callers branch on [`Envelope::success`] only. A failed envelope always has
/// `data: None` and a human-readable `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Listing rows dropped because they failed decoding or validation.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub skipped: usize,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: String::new(),
            count: None,
            total: None,
            skipped: 0,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            count: None,
            total: None,
            skipped: 0,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_counts(mut self, count: Option<u64>, total: Option<u64>) -> Self {
        self.count = count;
        self.total = total;
        self
    }

    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The payload of a successful envelope.
    pub fn data(&self) -> Option<&T> {
        if self.success {
            self.data.as_ref()
        } else {
            None
        }
    }

    pub fn map<U, F>(self, f: F) -> Envelope<U>
    where
        F: FnOnce(T) -> U,
    {
        Envelope {
            success: self.success,
            data: self.data.map(f),
            message: self.message,
            count: self.count,
            total: self.total,
            skipped: self.skipped,
        }
    }

    /// Convert into a `Result`, treating a successful envelope without data
    /// as a decode failure.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("Invalid response: missing data".to_string()),
            (false, _) => Err(self.message),
        }
    }
}

impl<T> From<GatewayError> for Envelope<T> {
    fn from(err: GatewayError) -> Self {
        Envelope::failure(err.to_string())
    }
}
