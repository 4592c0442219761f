//! Realtime event types emitted by the chat services.

use parley_database::MessageView;
use serde::{Deserialize, Serialize};

/// Events published on the broadcast channel after the corresponding
/// state change has been committed. Delivery is a collaborator concern;
/// the services only guarantee persist-then-notify ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    MessageCreated { message: MessageView },
    RoomDeleted { roomname: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_for_the_wire() {
        let event = ChatEvent::RoomDeleted {
            roomname: "general".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "room_deleted");
        assert_eq!(value["roomname"], "general");
    }
}
