use std::collections::BTreeSet;

use msgs::{change::{Change, ChangeValue}, color::Color, server_client_msg::ProgramData};

/// The movement rule for robots standing on one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Program {
    color: Color,
    pub is_right: bool,
    /// Seeing this color one step ahead flips the bias for that step.
    pub exception: Color,
}

pub type Programs = [Program; 3];

impl Program {
    pub fn new(color: Color) -> Program {
        Program {
            color,
            is_right: true,
            exception: color,
        }
    }

    pub fn make3() -> Programs {
        Color::ALL.map(Program::new)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Applies this round's changes for this program's color. Each axis only
    /// changes when every submitted value for it agrees; conflicting or
    /// absent submissions leave it as it was.
    pub fn apply_consensus<'a>(&mut self, changes: impl IntoIterator<Item = &'a Change>) {
        let mut directions = BTreeSet::new();
        let mut exceptions = BTreeSet::new();

        for change in changes.into_iter().filter(|change| change.color == self.color) {
            match change.value {
                ChangeValue::Direction(is_right) => {
                    directions.insert(is_right);
                }
                ChangeValue::Exception(color) => {
                    exceptions.insert(color);
                }
            }
        }

        if let (1, Some(&is_right)) = (directions.len(), directions.first()) {
            self.is_right = is_right;
        }
        if let (1, Some(&exception)) = (exceptions.len(), exceptions.first()) {
            self.exception = exception;
        }
    }

    pub fn data(&self) -> ProgramData {
        ProgramData {
            color: self.color,
            is_right: self.is_right,
            exception: self.exception,
        }
    }
}
