//! Handler trait for processing client messages.
//!
//! Implementors provide the upload logic; the server framework owns
//! connection management, envelope routing, and chunk frame decoding.

use std::future::Future;
use std::pin::Pin;

use chunkd_protocol::MessageType;
use chunkd_protocol::envelope::Message;
use chunkd_protocol::messages::ChunkHeader;

use crate::connection::Sender;

/// A boxed future returned by handler methods.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Trait for handling messages from an upload client.
///
/// Each method receives a `sender` for replies/events and the decoded
/// request. `on_probe` and `on_chunk` are the two domain operations and
/// have no default; the rest default to sensible liveness behavior.
pub trait Handler: Send + Sync + 'static {
    /// Called for `probe` messages: register an upload or report progress.
    fn on_probe(&self, sender: Sender, msg: Message) -> HandlerFuture<'_>;

    /// Called for each binary chunk frame.
    fn on_chunk(&self, sender: Sender, header: ChunkHeader, payload: Vec<u8>)
    -> HandlerFuture<'_>;

    /// Called for `ping` messages.
    fn on_ping(&self, sender: Sender, msg: Message) -> HandlerFuture<'_> {
        Box::pin(async move {
            if let Ok(reply) = msg.reply::<()>(MessageType::Pong, None) {
                let _ = sender.send_msg(reply);
            }
        })
    }

    /// Called when a client disconnects (cleanup hook).
    fn on_client_disconnected(&self) -> HandlerFuture<'_> {
        Box::pin(async {})
    }
}
