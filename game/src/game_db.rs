use std::sync::{Arc, Weak};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::{mapref::entry::Entry, DashMap};
use msgs::PlayerId;
use rand::{rngs::OsRng, RngCore};
use tokio::sync::Mutex;
use tracing::info;

use crate::session::{PlayerProxy, Session, SessionRef};

const CODE_BYTES: usize = 6;

/// Directory of live games by join code.
///
/// Only weak handles are kept here. The connections of the players in a game
/// own it, so a game is gone once its last player disconnects; `prune` then
/// clears the stale entry.
#[derive(Default)]
pub struct GameDb {
    games: DashMap<String, Weak<Mutex<Session>>>,
}

impl GameDb {
    pub fn new() -> GameDb {
        GameDb::default()
    }

    /// Creates a game under a fresh code with `proxy` as its host.
    pub fn create(&self, proxy: Arc<dyn PlayerProxy>) -> (String, SessionRef, PlayerId) {
        self.create_with(proxy, generate_code)
    }

    fn create_with(&self, proxy: Arc<dyn PlayerProxy>, mut next_code: impl FnMut() -> String) -> (String, SessionRef, PlayerId) {
        loop {
            let code = next_code();
            let slot = match self.games.entry(code.clone()) {
                Entry::Occupied(entry) if entry.get().strong_count() > 0 => continue,
                entry => entry,
            };
            let (session, creator) = Session::create(code.clone(), proxy);
            let session = Arc::new(Mutex::new(session));
            slot.insert(Arc::downgrade(&session));
            info!(%code, "game created");
            return (code, session, creator);
        }
    }

    pub fn find(&self, code: &str) -> Option<SessionRef> {
        self.games.get(code)?.upgrade()
    }

    /// Drops entries whose game has no players left. Returns how many went.
    pub fn prune(&self) -> usize {
        let mut pruned = 0;
        self.games.retain(|_, session| {
            let live = session.strong_count() > 0;
            if !live {
                pruned += 1;
            }
            live
        });
        pruned
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

/// Six random bytes, URL-safe base64 without padding.
pub fn generate_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
