use std::{collections::HashMap, sync::Arc};

use msgs::{change::Change, join_error::JoinError, server_client_msg::ServerClientMsg, PlayerId};
use tokio::sync::Mutex;
use tracing::debug;

use crate::game::{Game, Outbound, Recipient};

/// Outbound half of a player's connection.
pub trait PlayerProxy: Send + Sync {
    fn send_data(&self, msg: &ServerClientMsg);
}

/// A game together with the connections of the players in it.
pub struct Session {
    game: Game,
    proxies: HashMap<PlayerId, Arc<dyn PlayerProxy>>,
}

pub type SessionRef = Arc<Mutex<Session>>;

impl Session {
    pub fn create(code: String, proxy: Arc<dyn PlayerProxy>) -> (Session, PlayerId) {
        let (game, creator, outbound) = Game::create(code);
        let mut session = Session { game, proxies: HashMap::new() };
        session.proxies.insert(creator, proxy);
        session.dispatch(outbound);
        (session, creator)
    }

    pub fn join(&mut self, proxy: Arc<dyn PlayerProxy>) -> Result<PlayerId, JoinError> {
        let (id, outbound) = self.game.join()?;
        self.proxies.insert(id, proxy);
        self.dispatch(outbound);
        Ok(id)
    }

    pub fn begin(&mut self, id: PlayerId) {
        let outbound = self.game.begin(id);
        self.dispatch(outbound);
    }

    pub fn action(&mut self, id: PlayerId, change: Option<Change>) {
        let outbound = self.game.action(id, change);
        self.dispatch(outbound);
    }

    pub fn set_name(&mut self, id: PlayerId, name: String) {
        let outbound = self.game.set_name(id, name);
        self.dispatch(outbound);
    }

    pub fn restart(&mut self, id: PlayerId) {
        let outbound = self.game.restart(id);
        self.dispatch(outbound);
    }

    pub fn remove(&mut self, id: PlayerId) {
        if self.proxies.remove(&id).is_none() {
            return;
        }
        let outbound = self.game.remove(id);
        self.dispatch(outbound);
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Delivers notifications in order. Broadcasts go out in roster order.
    fn dispatch(&self, outbound: Vec<Outbound>) {
        for Outbound { to, msg } in outbound {
            debug!(code = %self.game.code(), ?to, msg_type = msg.msg_type(), "dispatch");
            match to {
                Recipient::Player(id) => self.send_to(id, &msg),
                Recipient::All => {
                    for player in self.game.players() {
                        self.send_to(player.id, &msg);
                    }
                }
                Recipient::AllExcept(except) => {
                    for player in self.game.players().iter().filter(|player| player.id != except) {
                        self.send_to(player.id, &msg);
                    }
                }
            }
        }
    }

    fn send_to(&self, id: PlayerId, msg: &ServerClientMsg) {
        if let Some(proxy) = self.proxies.get(&id) {
            proxy.send_data(msg);
        }
    }
}
