// src/handlers/socket_handlers.rs - WebSocket subscribers of feed events
use std::time::{Duration, Instant};

use actix_web::{HttpRequest, HttpResponse, get, rt, web};
use actix_ws::{Message, MessageStream, Session};
use futures::StreamExt;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::AppState;
use crate::error::FeedError;
use crate::services::notifier::SocketEvent;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// GET /socket
#[get("/socket")]
pub async fn socket(
    req: HttpRequest,
    body: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let events = app_state.notifier.subscribe().map_err(FeedError::from)?;
    let (response, session, stream) = actix_ws::handle(&req, body)?;

    log::info!(
        "socket client connected from {}",
        req.peer_addr().map(|a| a.to_string()).unwrap_or_default()
    );
    rt::spawn(run_session(session, stream, events));
    Ok(response)
}

/// Forwards every feed event to one client until either side goes away.
async fn run_session(
    mut session: Session,
    mut stream: MessageStream,
    mut events: broadcast::Receiver<SocketEvent>,
) {
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    let mut last_seen = Instant::now();

    let reason = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(frame) => {
                    let text = match serde_json::to_string(&frame) {
                        Ok(text) => text,
                        Err(e) => {
                            log::error!("could not encode socket frame: {}", e);
                            continue;
                        }
                    };
                    if session.text(text).await.is_err() {
                        break None;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("socket client lagging, {} events dropped", skipped);
                }
                Err(RecvError::Closed) => break None,
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Ping(bytes))) => {
                    last_seen = Instant::now();
                    if session.pong(&bytes).await.is_err() {
                        break None;
                    }
                }
                Some(Ok(Message::Close(reason))) => break reason,
                Some(Ok(_)) => last_seen = Instant::now(),
                Some(Err(e)) => {
                    log::warn!("socket protocol error: {}", e);
                    break None;
                }
                None => break None,
            },
            _ = heartbeat.tick() => {
                if last_seen.elapsed() > CLIENT_TIMEOUT {
                    log::info!("socket heartbeat timed out");
                    break None;
                }
                if session.ping(b"").await.is_err() {
                    break None;
                }
            }
        }
    };

    let _ = session.close(reason).await;
    log::info!("socket client disconnected");
}
