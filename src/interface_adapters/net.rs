use crate::domain::{PlayerId, PlayerInput};
use crate::interface_adapters::protocol::{
    ClientMessage, DecodeError, ServerMessage, decode_client_bytes, decode_client_text,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::GameEvent;

use axum::{
    Error,
    extract::{
        State,
        ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, info, info_span, warn};

// Frames queued for one connection; a client this far behind misses snapshots.
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 64;

const LOG_THROTTLE: Duration = Duration::from_secs(2);

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    // The world task is gone.
    EventsClosed,
    // The world task dropped the join request without replying.
    JoinRejected,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let event_tx = state.event_tx.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, event_tx))
}

async fn handle_socket(mut socket: WebSocket, event_tx: mpsc::Sender<GameEvent>) {
    let span = info_span!("conn", player_id = tracing::field::Empty);

    async move {
        let mut ctx = match join_world(&mut socket, event_tx).await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(error = ?e, "failed to join world");
                let _ = socket.close().await;
                return;
            }
        };

        tracing::Span::current().record("player_id", ctx.player_id.as_str());
        info!("client connected");

        // Main Client Loop
        if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
            warn!(error = ?e, "client loop exited with error");
        }

        disconnect_cleanup(&ctx).await;
    }
    .instrument(span)
    .await
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub player_id: PlayerId,
    pub event_tx: mpsc::Sender<GameEvent>,
    // Snapshot frames queued by the world task for this connection.
    pub outbound_rx: mpsc::Receiver<Utf8Bytes>,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_messages: u32,

    pub last_input_full_log: Instant,
    pub last_invalid_input_log: Instant,
}

async fn join_world(
    socket: &mut WebSocket,
    event_tx: mpsc::Sender<GameEvent>,
) -> Result<ConnCtx, NetError> {
    // Register the outbound queue first; updates wait in it until `init` is on the wire.
    let (outbound_tx, outbound_rx) = mpsc::channel::<Utf8Bytes>(OUTBOUND_CHANNEL_CAPACITY);
    let (reply_tx, reply_rx) = oneshot::channel::<PlayerId>();

    event_tx
        .send(GameEvent::Join {
            outbound: outbound_tx,
            reply: reply_tx,
        })
        .await
        .map_err(|_| NetError::EventsClosed)?;
    let player_id = reply_rx.await.map_err(|_| NetError::JoinRejected)?;

    // Send Identity Packet
    // Tell the client "This is who you are".
    let init = ServerMessage::Init {
        id: player_id.clone(),
    };
    let bytes_out = match send_message(socket, &init).await {
        Ok(bytes) => bytes as u64,
        Err(err) => {
            // Compensate so the player does not linger without a socket.
            let _ = event_tx
                .send(GameEvent::Leave {
                    player_id: player_id.clone(),
                })
                .await;
            return Err(err);
        }
    };

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        event_tx,
        outbound_rx,

        msgs_in: 0,
        msgs_out: 1,
        bytes_in: 0,
        bytes_out,

        invalid_messages: 0,

        last_input_full_log: now,
        last_invalid_input_log: now,
    })
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    loop {
        let control = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => handle_incoming_ws(incoming, ctx)?,

            // Outgoing World Update
            frame = ctx.outbound_rx.recv() => match frame {
                Some(bytes) => forward_world_bytes(bytes, socket, ctx).await,
                None => {
                    // The registry dropped this connection.
                    debug!("outbound queue closed by world");
                    LoopControl::Disconnect
                }
            },
        };

        if let LoopControl::Disconnect = control {
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            return Ok(());
        }
    }
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let decoded = match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                ctx.bytes_in += text.len() as u64;
                decode_client_text(text.as_str())
            }
            // Browsers and `ws` clients may ship JSON as binary frames.
            Message::Binary(bytes) => {
                ctx.msgs_in += 1;
                ctx.bytes_in += bytes.len() as u64;
                decode_client_bytes(&bytes)
            }
            Message::Ping(_) | Message::Pong(_) => return Ok(LoopControl::Continue),
            Message::Close(_) => return Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            return Ok(LoopControl::Disconnect);
        }
        None => {
            info!("websocket closed");
            return Ok(LoopControl::Disconnect);
        }
    };

    match decoded {
        Ok(ClientMessage::Input { inputs }) => process_input_message(ctx, inputs.into()),
        Err(err) => {
            log_decode_error(ctx, &err);
            Ok(LoopControl::Continue)
        }
    }
}

fn log_decode_error(ctx: &mut ConnCtx, err: &DecodeError) {
    // Malformed frames are dropped; the connection stays open.
    ctx.invalid_messages += 1;
    if should_log(&mut ctx.last_invalid_input_log) {
        warn!(
            error = %err,
            invalid_messages = ctx.invalid_messages,
            "failed to parse client message"
        );
    }
}

fn process_input_message(ctx: &mut ConnCtx, input: PlayerInput) -> Result<LoopControl, NetError> {
    let event = GameEvent::Input {
        player_id: ctx.player_id.clone(),
        input,
    };

    match ctx.event_tx.try_send(event) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_evt)) => {
            // Dropped intent is superseded by the next one the client sends.
            if should_log(&mut ctx.last_input_full_log) {
                warn!("event channel full; dropping input");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::EventsClosed),
    }
}

async fn forward_world_bytes(
    world_msg: Utf8Bytes,
    socket: &mut WebSocket,
    ctx: &mut ConnCtx,
) -> LoopControl {
    let bytes_len = world_msg.len();
    match socket
        .send(Message::Text(world_msg))
        .await
        .map_err(NetError::Ws)
    {
        Ok(()) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send world update");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx) {
    // A closed event channel means the world is gone and already forgot this player.
    let _ = ctx
        .event_tx
        .send(GameEvent::Leave {
            player_id: ctx.player_id.clone(),
        })
        .await;

    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_messages = ctx.invalid_messages,
        "connection stats"
    );
    info!("client disconnected");
}
