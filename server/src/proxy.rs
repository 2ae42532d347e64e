use game::session::PlayerProxy;
use msgs::server_client_msg::ServerClientMsg;
use tokio::sync::mpsc;
use tracing::warn;
use warp::ws::Message;

pub type ToConnection = mpsc::UnboundedSender<std::result::Result<Message, warp::Error>>;

/// Hands game notifications to a connection's outbound queue.
pub struct ConnectionProxy {
    conn: String,
    to_connection: ToConnection,
}

impl ConnectionProxy {
    pub fn new(conn: String, to_connection: ToConnection) -> ConnectionProxy {
        ConnectionProxy { conn, to_connection }
    }
}

impl PlayerProxy for ConnectionProxy {
    fn send_data(&self, msg: &ServerClientMsg) {
        let text = match msg.pack() {
            Ok(text) => text,
            Err(e) => {
                warn!(conn = %self.conn, msg_type = msg.msg_type(), "error while packing msg: {e}");
                return;
            }
        };
        let _ = self.to_connection.send(Ok(Message::text(text)));
    }
}
