//! Uniform response envelope for generation and lifecycle endpoints.
//!
//! Domain outcomes (blocked profile, pipeline failure) report through this
//! envelope with HTTP 200; infrastructure faults surface as `AppError`
//! status codes instead.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ApiEnvelope {
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            warning: None,
        }
    }

    /// Success with no payload, for mutations that only need an ack.
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            warning: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_error_and_warning() {
        let envelope = ApiEnvelope::success(serde_json::json!({"college_list": "output"}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["college_list"], "output");
        assert!(value.get("error").is_none());
        assert!(value.get("warning").is_none());
    }

    #[test]
    fn test_failure_envelope_carries_error_only() {
        let envelope = ApiEnvelope::failure("profile incomplete");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "profile incomplete");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_warning_rides_alongside_success() {
        let envelope = ApiEnvelope::success(serde_json::json!({"recommendations": "raw"}))
            .with_warning(Some("save failed".to_string()));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["warning"], "save failed");
    }
}
