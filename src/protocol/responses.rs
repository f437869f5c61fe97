//! Method channel replies
//!
//! Every call gets exactly one reply line.

use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub enum MethodReply {
    Success(Value),
    NotImplemented,
    Error { code: String, message: String },
}

impl MethodReply {
    pub fn to_json(&self) -> Value {
        match self {
            MethodReply::Success(result) => json!({ "result": result }),
            MethodReply::NotImplemented => json!({ "notImplemented": true }),
            MethodReply::Error { code, message } => {
                json!({ "error": { "code": code, "message": message } })
            }
        }
    }

    /// Format a reply as a newline-terminated line
    pub fn to_line(&self) -> String {
        format!("{}\n", self.to_json())
    }
}
