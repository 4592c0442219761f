//! Message entity definitions

use serde::{Deserialize, Serialize};

/// A chat message. Immutable after creation: room, author and text never
/// change, and there is no update path anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub room_id: i64,
    pub username: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub room_id: i64,
    pub username: String,
    pub text: String,
}

/// Wire-facing projection of a message. Stable key set: id, roomname,
/// text, username, time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: i64,
    pub roomname: String,
    pub text: String,
    pub username: String,
    pub time: String,
}

impl MessageView {
    pub fn from_message(message: &Message, room_name: &str) -> Self {
        Self {
            id: message.id,
            roomname: room_name.to_string(),
            text: message.text.clone(),
            username: message.username.clone(),
            time: message.created_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_projection_has_stable_keys() {
        let message = Message {
            id: 7,
            room_id: 3,
            username: "bob".to_string(),
            text: "hello".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let view = MessageView::from_message(&message, "general");
        let value = serde_json::to_value(&view).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["id", "roomname", "text", "time", "username"]);
        assert_eq!(value["roomname"], "general");
        assert_eq!(value["time"], "2024-01-01T00:00:00Z");
    }
}
