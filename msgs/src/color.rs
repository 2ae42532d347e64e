use thiserror::Error;

/// Cell color. Also names the program that governs robots standing on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Color {
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown color index: {0}")]
pub struct UnknownColor(pub u8);

impl Color {
    pub const ALL: [Color; 3] = [Color::Red, Color::Green, Color::Blue];

    pub fn from_u8(index: u8) -> Option<Color> {
        match index {
            0 => Some(Color::Red),
            1 => Some(Color::Green),
            2 => Some(Color::Blue),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Color::Red => 0,
            Color::Green => 1,
            Color::Blue => 2,
        }
    }

    pub fn index(&self) -> usize {
        self.as_u8() as usize
    }
}

impl TryFrom<u8> for Color {
    type Error = UnknownColor;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Color::from_u8(index).ok_or(UnknownColor(index))
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> u8 {
        color.as_u8()
    }
}
