//! Response envelope.
//!
//! Every endpoint answers with the same JSON shape, success or failure:
//! `{ status, statusCode, message, data?, errors? }` where `status` is
//! the boolean success flag. Internal failures surface a generic
//! message; storage detail never reaches the client.

use serde::Serialize;

/// One field-level validation problem in a 422 payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse<T> {
    /// Boolean success flag.
    pub status: bool,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldIssue>>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn success(status_code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            status_code,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    #[must_use]
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status: false,
            status_code,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    /// 422 envelope carrying per-field issues.
    #[must_use]
    pub fn validation(message: impl Into<String>, errors: Vec<FieldIssue>) -> Self {
        Self {
            status: false,
            status_code: 422,
            message: message.into(),
            data: None,
            errors: Some(errors),
        }
    }

    /// Catch-all for unexpected failures; the cause stays server-side.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::error(500, "internal server error")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn success_envelope_carries_a_true_flag_and_omits_errors() -> TestResult {
        let response = ApiResponse::success(201, "order item added", json!({"qty": 2}));

        let value = serde_json::to_value(&response)?;

        assert_eq!(
            value,
            json!({
                "status": true,
                "statusCode": 201,
                "message": "order item added",
                "data": {"qty": 2}
            })
        );

        Ok(())
    }

    #[test]
    fn error_envelope_carries_a_false_flag_and_omits_data() -> TestResult {
        let response: ApiResponse<()> = ApiResponse::error(404, "order item not found");

        let value = serde_json::to_value(&response)?;

        assert_eq!(
            value,
            json!({
                "status": false,
                "statusCode": 404,
                "message": "order item not found"
            })
        );

        Ok(())
    }

    #[test]
    fn validation_envelope_lists_field_issues() -> TestResult {
        let response: ApiResponse<()> = ApiResponse::validation(
            "validation failed",
            vec![FieldIssue {
                path: "qty".to_string(),
                code: "too_small".to_string(),
                message: "quantity must be at least 1".to_string(),
            }],
        );

        let value = serde_json::to_value(&response)?;

        assert_eq!(value["status"], false);
        assert_eq!(value["statusCode"], 422);
        assert_eq!(value["errors"][0]["path"], "qty");
        assert_eq!(value["errors"][0]["code"], "too_small");

        Ok(())
    }

    #[test]
    fn internal_errors_never_leak_detail() -> TestResult {
        let response: ApiResponse<()> = ApiResponse::internal_error();

        let value = serde_json::to_value(&response)?;

        assert_eq!(value["status"], false);
        assert_eq!(value["statusCode"], 500);
        assert_eq!(value["message"], "internal server error");

        Ok(())
    }
}
