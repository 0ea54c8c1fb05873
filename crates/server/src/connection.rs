//! Per-connection plumbing: read pump, write pump, reply channel.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;

use chunkd_protocol::MessageType;
use chunkd_protocol::envelope::Message;

use crate::handler::Handler;
use crate::{SEND_BUFFER_SIZE, ServerError, frame};

/// Channel for sending messages back to one client.
///
/// Cheap to clone; handlers keep a clone per in-flight request. Sending
/// never blocks — a full buffer surfaces as [`ServerError::ChannelClosed`]
/// and the client recovers by re-probing.
#[derive(Clone)]
pub struct Sender {
    tx: mpsc::Sender<WsMessage>,
    connected: Arc<AtomicBool>,
}

impl Sender {
    /// Serializes and queues an envelope for the write pump.
    pub fn send_msg(&self, msg: Message) -> Result<(), ServerError> {
        let json = serde_json::to_string(&msg)?;
        self.tx
            .try_send(WsMessage::Text(json.into()))
            .map_err(|_| ServerError::ChannelClosed)
    }

    /// Queues an error reply to the given request.
    pub fn send_error(
        &self,
        req: &Message,
        code: i32,
        message: impl Into<String>,
    ) -> Result<(), ServerError> {
        self.send_msg(req.reply_error(code, message))
    }

    /// Whether the client socket is still open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

/// Drives one client connection until it closes or the server shuts down.
///
/// Splits the socket into a write pump (drains the reply channel) and a
/// read pump (dispatches frames to the handler). Handler calls are awaited
/// in arrival order, which is what keeps one client's chunk stream
/// sequential on the server side.
pub(crate) async fn run_connection<H: Handler>(
    ws: WebSocketStream<TcpStream>,
    peer: SocketAddr,
    handler: Arc<H>,
    cancel: CancellationToken,
) {
    let (mut sink, mut stream) = ws.split();
    let (tx, mut rx) = mpsc::channel::<WsMessage>(SEND_BUFFER_SIZE);
    let connected = Arc::new(AtomicBool::new(true));
    let sender = Sender {
        tx,
        connected: Arc::clone(&connected),
    };

    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            next = stream.next() => match next {
                Some(Ok(WsMessage::Text(text))) => {
                    dispatch_text(handler.as_ref(), &sender, text.as_str()).await;
                }
                Some(Ok(WsMessage::Binary(data))) => {
                    dispatch_binary(handler.as_ref(), &sender, &data).await;
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!(%peer, "read error: {e}");
                    break;
                }
            }
        }
    }

    connected.store(false, Ordering::Relaxed);
    drop(sender);
    handler.on_client_disconnected().await;
    let _ = write_task.await;
}

async fn dispatch_text<H: Handler>(handler: &H, sender: &Sender, text: &str) {
    let msg: Message = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!("malformed envelope: {e}");
            let id = uuid::Uuid::new_v4().to_string();
            let _ = sender.send_msg(Message::error(id, 400, "malformed envelope"));
            return;
        }
    };

    match msg.msg_type {
        MessageType::Probe => handler.on_probe(sender.clone(), msg).await,
        MessageType::Ping => handler.on_ping(sender.clone(), msg).await,
        other => {
            tracing::warn!(msg_type = ?other, "unexpected message type from client");
            let _ = sender.send_error(&msg, 400, "unexpected message type");
        }
    }
}

async fn dispatch_binary<H: Handler>(handler: &H, sender: &Sender, data: &[u8]) {
    match frame::parse_chunk_frame(data) {
        Ok((header, payload)) => handler.on_chunk(sender.clone(), header, payload).await,
        Err(e) => {
            tracing::warn!("bad chunk frame: {e}");
            let id = uuid::Uuid::new_v4().to_string();
            let _ = sender.send_msg(Message::error(id, 400, format!("bad chunk frame: {e}")));
        }
    }
}
