use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{change::Change, color::Color, coord::{Coord, Facing, Pose}, join_error::JoinError, PlayerId};

/// Messages sent from the game server to a player's connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerClientMsg {
    Code (String),
    JoinError (JoinError),
    Name (PlayerName),
    YouAre (PlayerName),
    /// Renderable board blob; clients insert it verbatim.
    Board (String),
    Robots (Vec<RobotData>),
    Programs (Vec<ProgramData>),
    Goals (Vec<(PlayerId, Coord)>),
    Changes (Vec<(PlayerId, Option<Change>)>),
    Ready (PlayerId),
    Winners (Vec<PlayerId>),
    Remove (PlayerId),
    Host,
    Restart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerName {
    pub index: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotData {
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    #[serde(rename = "intermediatePos", skip_serializing_if = "Option::is_none", default)]
    pub intermediate_pos: Option<Pose>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramData {
    pub color: Color,
    #[serde(rename = "isRight")]
    pub is_right: bool,
    pub exception: Color,
}

impl ServerClientMsg {
    pub fn msg_type(&self) -> &'static str {
        match self {
            ServerClientMsg::Code (_) => "code",
            ServerClientMsg::JoinError (_) => "join error",
            ServerClientMsg::Name (_) => "name",
            ServerClientMsg::YouAre (_) => "you are",
            ServerClientMsg::Board (_) => "board",
            ServerClientMsg::Robots (_) => "robots",
            ServerClientMsg::Programs (_) => "programs",
            ServerClientMsg::Goals (_) => "goals",
            ServerClientMsg::Changes (_) => "changes",
            ServerClientMsg::Ready (_) => "ready",
            ServerClientMsg::Winners (_) => "winners",
            ServerClientMsg::Remove (_) => "remove",
            ServerClientMsg::Host => "host",
            ServerClientMsg::Restart => "restart",
        }
    }

    pub fn payload(&self) -> serde_json::Result<Value> {
        match self {
            ServerClientMsg::Code (code) => serde_json::to_value(code),
            ServerClientMsg::JoinError (reason) => serde_json::to_value(reason),
            ServerClientMsg::Name (name) | ServerClientMsg::YouAre (name) => serde_json::to_value(name),
            ServerClientMsg::Board (svg) => serde_json::to_value(svg),
            ServerClientMsg::Robots (robots) => serde_json::to_value(robots),
            ServerClientMsg::Programs (programs) => serde_json::to_value(programs),
            ServerClientMsg::Goals (goals) => serde_json::to_value(goals),
            ServerClientMsg::Changes (changes) => serde_json::to_value(changes),
            ServerClientMsg::Ready (index) | ServerClientMsg::Remove (index) => serde_json::to_value(index),
            ServerClientMsg::Winners (winners) => serde_json::to_value(winners),
            ServerClientMsg::Host | ServerClientMsg::Restart => Ok(Value::Null),
        }
    }

    /// Encodes the `[type, payload]` envelope as a JSON text frame.
    pub fn pack(&self) -> anyhow::Result<String> {
        let envelope = (self.msg_type(), self.payload()?);
        Ok(serde_json::to_string(&envelope)?)
    }
}
