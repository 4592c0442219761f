//! Room entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// Derived room classification. Never stored: always recomputed from the
/// current membership cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Dialog,
    Group,
}

impl RoomKind {
    /// More than two members is a group; everything else (including the
    /// degenerate under-two-member room) is a dialog.
    pub fn from_member_count(count: i64) -> Self {
        if count > 2 {
            RoomKind::Group
        } else {
            RoomKind::Dialog
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomKind::Dialog => "dialog",
            RoomKind::Group => "group",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_a_pure_function_of_cardinality() {
        assert_eq!(RoomKind::from_member_count(0), RoomKind::Dialog);
        assert_eq!(RoomKind::from_member_count(1), RoomKind::Dialog);
        assert_eq!(RoomKind::from_member_count(2), RoomKind::Dialog);
        assert_eq!(RoomKind::from_member_count(3), RoomKind::Group);
        assert_eq!(RoomKind::from_member_count(40), RoomKind::Group);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(RoomKind::Dialog.as_str(), "dialog");
        assert_eq!(
            serde_json::to_string(&RoomKind::Group).unwrap(),
            "\"group\""
        );
    }
}
