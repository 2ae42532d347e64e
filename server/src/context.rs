use std::sync::Arc;

use game::game_db::GameDb;

pub struct ServerContext {
    pub game_db: GameDb,
}

pub type ServerContextRef = Arc<ServerContext>;

impl ServerContext {
    pub fn new() -> ServerContext {
        ServerContext { game_db: GameDb::new() }
    }
}

impl Default for ServerContext {
    fn default() -> ServerContext {
        ServerContext::new()
    }
}
