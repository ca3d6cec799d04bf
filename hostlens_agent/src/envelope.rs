//! Uniform success/error wrapper returned by every tool.
//! Keep this module minimal and stable — it defines the wire format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One tool reply. On the wire it travels as a single-element array, and
/// exactly one of (`data` + `message`) or (`error`) is present, gated by
/// `success`. Absent fields are omitted from the JSON entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn ok(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Serialize as the wire form: `[{ ... }]`.
    pub fn to_wire(&self) -> serde_json::Result<String> {
        serde_json::to_string(&[self])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_carries_data_and_message_only() {
        let env = Envelope::ok(json!({"n": 1}), "done");
        let v: Value = serde_json::from_str(&serde_json::to_string(&env).unwrap()).unwrap();
        assert_eq!(v["success"], json!(true));
        assert_eq!(v["data"], json!({"n": 1}));
        assert_eq!(v["message"], json!("done"));
        assert!(v.get("error").is_none());
    }

    #[test]
    fn failure_carries_error_only() {
        let env = Envelope::err("boom");
        let v: Value = serde_json::from_str(&serde_json::to_string(&env).unwrap()).unwrap();
        assert_eq!(v["success"], json!(false));
        assert_eq!(v["error"], json!("boom"));
        assert!(v.get("data").is_none());
        assert!(v.get("message").is_none());
    }

    #[test]
    fn wire_form_is_a_single_element_array() {
        let wire = Envelope::ok(json!([]), "ok").to_wire().unwrap();
        let v: Value = serde_json::from_str(&wire).unwrap();
        let items = v.as_array().expect("array");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["success"], json!(true));
    }
}
