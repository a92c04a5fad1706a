use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of every request a window sends to the controller.
///
/// Serialized flat: `{"success": true, ...payload}` or
/// `{"success": false, "error": "..."}`. Callers branch on `success` before
/// reading the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Reply {
    /// A successful reply with no payload.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            payload: Map::new(),
        }
    }

    /// A successful reply carrying `payload`.
    ///
    /// Object payloads are flattened into the reply; anything else lands
    /// under `data`.
    pub fn ok_with<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        let payload = match serde_json::to_value(payload)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".into(), other);
                map
            }
        };
        Ok(Self {
            success: true,
            error: None,
            payload,
        })
    }

    /// A failed reply.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            payload: Map::new(),
        }
    }

    /// Deserializes the payload into the given type.
    pub fn parse<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.payload.clone()))
    }

    /// Converts a failed reply into its error message.
    pub fn into_result(self) -> Result<Self, String> {
        if self.success {
            Ok(self)
        } else {
            Err(self.error.unwrap_or_else(|| "unknown error".into()))
        }
    }
}
