//! Request body validation. Runs before the classifier is touched.

use serde_json::Value;

use super::error::GatewayError;

/// Validated single-text request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub text: String,
}

/// Validated claim/evidence request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub claim: String,
    pub evidence: String,
}

pub fn validate_text_request(body: &Value) -> Result<TextRequest, GatewayError> {
    let text = required_text(body, "text")?;
    Ok(TextRequest { text })
}

pub fn validate_claim_request(body: &Value) -> Result<ClaimRequest, GatewayError> {
    let claim = required_text(body, "claim")?;
    let evidence = required_text(body, "evidence")?;
    Ok(ClaimRequest { claim, evidence })
}

/// Extracts `field` as a non-blank string. The value is passed on untrimmed.
fn required_text(body: &Value, field: &str) -> Result<String, GatewayError> {
    let object = body.as_object().ok_or_else(|| {
        GatewayError::InvalidRequest("request body must be a JSON object".to_string())
    })?;

    match object.get(field) {
        None | Some(Value::Null) => Err(GatewayError::InvalidRequest(format!(
            "missing required field '{field}'"
        ))),
        Some(Value::String(s)) if s.trim().is_empty() => Err(GatewayError::InvalidRequest(
            format!("field '{field}' must not be empty"),
        )),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(GatewayError::InvalidRequest(format!(
            "field '{field}' must be a string"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reason(err: GatewayError) -> String {
        match err {
            GatewayError::InvalidRequest(msg) => msg,
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_text_request_ok() {
        let req = validate_text_request(&json!({"text": "  Markets rallied today. "})).unwrap();
        assert_eq!(req.text, "  Markets rallied today. ");
    }

    #[test]
    fn test_text_request_rejects_blank_and_missing() {
        for body in [json!({}), json!({"text": null}), json!({"text": ""}), json!({"text": " \n\t "})] {
            let msg = reason(validate_text_request(&body).unwrap_err());
            assert!(msg.contains("'text'"), "message should name the field: {msg}");
        }
    }

    #[test]
    fn test_text_request_rejects_non_string() {
        let msg = reason(validate_text_request(&json!({"text": 42})).unwrap_err());
        assert_eq!(msg, "field 'text' must be a string");
    }

    #[test]
    fn test_non_object_body() {
        let msg = reason(validate_text_request(&json!(["text"])).unwrap_err());
        assert_eq!(msg, "request body must be a JSON object");
    }

    #[test]
    fn test_claim_request_names_offending_field() {
        let msg = reason(
            validate_claim_request(&json!({"claim": "The moon is cheese", "evidence": "   "}))
                .unwrap_err(),
        );
        assert_eq!(msg, "field 'evidence' must not be empty");

        let msg = reason(validate_claim_request(&json!({"evidence": "NASA"})).unwrap_err());
        assert_eq!(msg, "missing required field 'claim'");
    }

    #[test]
    fn test_claim_request_ok() {
        let req =
            validate_claim_request(&json!({"claim": "c", "evidence": "e", "extra": true})).unwrap();
        assert_eq!(
            req,
            ClaimRequest {
                claim: "c".to_string(),
                evidence: "e".to_string()
            }
        );
    }
}
