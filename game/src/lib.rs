pub mod board;
pub mod game;
pub mod game_db;
pub mod program;
pub mod render;
pub mod robot;
pub mod session;
