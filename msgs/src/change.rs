use crate::color::Color;

/// What a player wants to change about one program this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ChangeValue {
    /// Re-target the exception color.
    Exception(Color),
    /// Re-target the direction bias (`true` = right).
    Direction(bool),
}

/// A buffered per-player action, `[color, value]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(Color, ChangeValue)", into = "(Color, ChangeValue)")]
pub struct Change {
    pub color: Color,
    pub value: ChangeValue,
}

impl Change {
    pub fn direction(color: Color, is_right: bool) -> Change {
        Change { color, value: ChangeValue::Direction(is_right) }
    }

    pub fn exception(color: Color, exception: Color) -> Change {
        Change { color, value: ChangeValue::Exception(exception) }
    }

    /// Parses an action payload. Anything that is not exactly
    /// `[0..=2, 0..=2 | true | false]` is rejected.
    pub fn from_payload(payload: serde_json::Value) -> Option<Change> {
        serde_json::from_value(payload).ok()
    }
}

impl From<(Color, ChangeValue)> for Change {
    fn from((color, value): (Color, ChangeValue)) -> Change {
        Change { color, value }
    }
}

impl From<Change> for (Color, ChangeValue) {
    fn from(change: Change) -> (Color, ChangeValue) {
        (change.color, change.value)
    }
}
