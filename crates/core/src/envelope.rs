//! Wire-level response body shapes.
//!
//! Two deliberately distinct shapes exist: the contract envelope
//! (`{code, msg, data?}`) emitted by handlers through the responder, and the
//! fallback body (`{success, message, stack?}`) synthesized for failures
//! that occur before a response contract is attached. Existing clients
//! distinguish the two, so the split is preserved rather than unified.

use serde::Serialize;
use serde_json::Value;

/// Contract-path response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn success(msg: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code: 200,
            msg: msg.into(),
            data,
        }
    }

    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            code: 400,
            msg: msg.into(),
            data: None,
        }
    }

    pub fn auth_fail(msg: impl Into<String>) -> Self {
        Self {
            code: 401,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Fallback body for failures with no contract attached.
///
/// `stack` carries the error's debug rendering and is only populated in
/// development mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl FallbackBody {
    pub fn new(message: impl Into<String>, stack: Option<String>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = "internal server error".to_owned();
        }
        Self {
            success: false,
            message,
            stack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_shape() {
        let body = Envelope::success("ok", Some(json!({"n": 1})));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"code": 200, "msg": "ok", "data": {"n": 1}})
        );
    }

    #[test]
    fn fail_envelope_omits_data() {
        let body = Envelope::fail("bad");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"code": 400, "msg": "bad"})
        );
    }

    #[test]
    fn auth_fail_envelope_code() {
        assert_eq!(Envelope::auth_fail("expired").code, 401);
    }

    #[test]
    fn fallback_body_omits_stack_when_absent() {
        let body = FallbackBody::new("boom", None);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"success": false, "message": "boom"})
        );
    }

    #[test]
    fn fallback_body_substitutes_a_generic_message() {
        let body = FallbackBody::new("", None);
        assert_eq!(body.message, "internal server error");
    }
}
