//! Wire vocabulary shared by the game core and the websocket server.
//!
//! Every frame in either direction is a JSON array `[type, payload]`.

pub mod change;
pub mod client_server_msg;
pub mod color;
pub mod coord;
pub mod join_error;
pub mod server_client_msg;

/// Per-session player slot. Stable while the player stays in the game.
pub type PlayerId = u32;
