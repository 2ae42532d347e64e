use std::sync::Arc;

use anyhow::anyhow;
use futures::{FutureExt, StreamExt};
use game::session::{PlayerProxy, SessionRef};
use msgs::{client_server_msg::ClientServerMsg, join_error::JoinError, server_client_msg::ServerClientMsg, PlayerId};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};
use uuid::Uuid;
use warp::ws::{Message, WebSocket};

use crate::{context::ServerContextRef, proxy::ConnectionProxy};

/// The game a connection is playing in, and as whom.
struct Seat {
    session: SessionRef,
    player: PlayerId,
}

pub async fn player_connection_process(ws: WebSocket, context_ref: ServerContextRef) {
    let (player_ws_sender, mut player_ws_rcv) = ws.split();
    let (to_connection, connection_rcv) = mpsc::unbounded_channel();

    let conn = Uuid::new_v4().as_simple().to_string();

    let forward_conn = conn.clone();
    tokio::task::spawn(UnboundedReceiverStream::new(connection_rcv).forward(player_ws_sender).map(move |result| {
        if let Err(e) = result {
            warn!(conn = %forward_conn, "error sending websocket msg: {e}");
        }
    }));

    let proxy: Arc<dyn PlayerProxy> = Arc::new(ConnectionProxy::new(conn.clone(), to_connection));
    let mut seat = None;

    info!(%conn, "connected");

    while let Some(result) = player_ws_rcv.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                warn!(%conn, "error receiving ws message: {e}");
                break;
            }
        };
        if let Err(e) = client_msg(&conn, msg, &proxy, &mut seat, &context_ref).await {
            debug!(%conn, "dropped msg: {e}");
        }
    }

    if let Some(Seat { session, player }) = seat {
        let mut session = session.lock().await;
        info!(%conn, code = %session.game().code(), player, "leaving game");
        session.remove(player);
    }
    info!(%conn, "disconnected");
}

async fn client_msg(
    conn: &str,
    msg: Message,
    proxy: &Arc<dyn PlayerProxy>,
    seat: &mut Option<Seat>,
    context_ref: &ServerContextRef,
) -> anyhow::Result<()> {
    if msg.is_close() || msg.is_ping() || msg.is_pong() {
        return Ok(());
    }
    let text = msg.to_str().map_err(|_| anyhow!("not a text frame"))?;
    let client_msg = ClientServerMsg::decode(text)?;
    process_client_msg(conn, client_msg, proxy, seat, context_ref).await;
    Ok(())
}

async fn seated_client_msg(session: &SessionRef, player: PlayerId, client_msg: ClientServerMsg) {
    let mut session = session.lock().await;
    match client_msg {
        ClientServerMsg::NewGame | ClientServerMsg::Join (_) => {
            debug!(code = %session.game().code(), player, "already in a game");
        }
        ClientServerMsg::Begin => session.begin(player),
        ClientServerMsg::Action (change) => session.action(player, change),
        ClientServerMsg::DisplayName (name) => session.set_name(player, name),
        ClientServerMsg::Restart => session.restart(player),
    }
}

async fn process_client_msg(
    conn: &str,
    client_msg: ClientServerMsg,
    proxy: &Arc<dyn PlayerProxy>,
    seat: &mut Option<Seat>,
    context_ref: &ServerContextRef,
) {
    if let Some(Seat { session, player }) = seat.as_ref() {
        seated_client_msg(session, *player, client_msg).await;
        return;
    }

    match client_msg {
        ClientServerMsg::NewGame => {
            let (code, session, player) = context_ref.game_db.create(proxy.clone());
            info!(%conn, %code, player, "hosting game");
            *seat = Some(Seat { session, player });
        }
        ClientServerMsg::Join (code) => {
            let Some(session) = context_ref.game_db.find(&code) else {
                info!(%conn, %code, "join rejected: {}", JoinError::NotFound);
                proxy.send_data(&ServerClientMsg::JoinError(JoinError::NotFound));
                return;
            };
            let joined = session.lock().await.join(proxy.clone());
            match joined {
                Ok(player) => {
                    info!(%conn, %code, player, "joined game");
                    *seat = Some(Seat { session, player });
                }
                Err(e) => {
                    info!(%conn, %code, "join rejected: {e}");
                    proxy.send_data(&ServerClientMsg::JoinError(e));
                }
            }
        }
        client_msg => {
            debug!(%conn, msg = ?client_msg, "not in a game");
        }
    }
}
