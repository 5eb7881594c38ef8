// src/models/realtime.rs

use serde::{Deserialize, Serialize};

/// Mensagens trocadas no `/ws`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WsMessage {
    Connected,
    Ping { timestamp: i64 },
    Pong { timestamp: i64 },
    DataChanged { resource: String },
}

impl WsMessage {
    pub fn data_changed(resource: &str) -> Self {
        WsMessage::DataChanged { resource: resource.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format() {
        assert_eq!(serde_json::to_value(WsMessage::Connected).unwrap(), json!({"type": "connected"}));
        assert_eq!(
            serde_json::to_value(WsMessage::data_changed("parts")).unwrap(),
            json!({"type": "data-changed", "resource": "parts"})
        );
        let ping: WsMessage = serde_json::from_value(json!({"type": "ping", "timestamp": 42})).unwrap();
        assert_eq!(ping, WsMessage::Ping { timestamp: 42 });
    }
}
