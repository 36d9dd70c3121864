//! WebSocket endpoint bridging one socket to one game session.

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::{handle, Closed, Message, MessageStream, Session};
use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::game::session::{SessionHandle, SessionRegistry};
use crate::protocol::{ClientMsg, ServerMsg};

pub async fn ws_index(
    req: HttpRequest,
    body: web::Payload,
    path: web::Path<Uuid>,
    registry: web::Data<SessionRegistry>,
) -> Result<HttpResponse, Error> {
    let game_id = path.into_inner();

    // 1 · client_id query param
    let cid_str = req
        .query_string()
        .split('&')
        .find_map(|kv| kv.strip_prefix("client_id="))
        .ok_or_else(|| actix_web::error::ErrorBadRequest("client_id missing"))?;
    let client_id =
        Uuid::parse_str(cid_str).map_err(|_| actix_web::error::ErrorBadRequest("bad UUID"))?;

    // 2 · find or start the game
    let game = registry
        .get_or_spawn(game_id)
        .map_err(actix_web::error::ErrorServiceUnavailable)?;

    // 3 · handshake
    let (response, session, ws_stream) = handle(&req, body)?;

    actix::spawn(async move {
        let mut session = session;
        if let Err(e) = pump(&game, client_id, &mut session, ws_stream).await {
            log::debug!("WS for client {client_id} ended early: {e:?}");
        }
        // On disconnect …
        if let Err(e) = game.leave(client_id).await {
            log::debug!("leave after close failed: {e}");
        }
        let _ = session.close(None).await;
        log::info!("WS closed for client {client_id} in game {game_id}");
    });

    Ok(response)
}

/// Relays frames until either side goes away.
async fn pump(
    game: &SessionHandle,
    client_id: Uuid,
    session: &mut Session,
    mut ws_stream: MessageStream,
) -> Result<(), Closed> {
    // subscribe before joining so GameStart cannot slip past
    let mut events = game.subscribe();
    let seat = match game.join(client_id).await {
        Ok(seat) => seat,
        Err(e) => {
            log::warn!("join failed for {client_id}: {e}");
            return send(session, &ServerMsg::Error { message: e.to_string() }).await;
        }
    };
    send(session, &ServerMsg::Welcome {
        game_id: game.game_id(),
        seat,
    })
    .await?;
    send(session, &current_state(game)).await?;

    loop {
        tokio::select! {
            // client → server
            frame = ws_stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let replies = match serde_json::from_str::<ClientMsg>(&text) {
                        Ok(cmsg) => match game.submit(client_id, cmsg).await {
                            Ok(replies) => replies,
                            Err(e) => {
                                log::warn!("dispatch error: {e:?}");
                                return Ok(());
                            }
                        },
                        Err(e) => vec![ServerMsg::Error { message: format!("bad frame: {e}") }],
                    };
                    for reply in &replies {
                        send(session, reply).await?;
                    }
                }
                Some(Ok(Message::Ping(bytes))) => session.pong(&bytes).await?,
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    log::warn!("WS protocol error for {client_id}: {e}");
                    return Ok(());
                }
            },
            // session → client
            evt = events.recv() => match evt {
                Ok(msg) => send(session, &msg).await?,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("client {client_id} lagged {skipped} events, resyncing");
                    send(session, &current_state(game)).await?;
                }
                Err(RecvError::Closed) => return Ok(()),
            },
        }
    }
}

fn current_state(game: &SessionHandle) -> ServerMsg {
    ServerMsg::State {
        game_id: game.game_id(),
        snapshot: game.view().game.snapshot(),
    }
}

async fn send(session: &mut Session, msg: &ServerMsg) -> Result<(), Closed> {
    match serde_json::to_string(msg) {
        Ok(json) => session.text(json).await,
        Err(e) => {
            log::error!("could not encode {msg:?}: {e}");
            Ok(())
        }
    }
}
