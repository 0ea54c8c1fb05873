//! Production handler: wires the WebSocket surface to the upload coordinator.

use std::sync::Arc;

use chunkd_protocol::MessageType;
use chunkd_protocol::envelope::Message;
use chunkd_protocol::messages::{ChunkAck, ChunkHeader, ProbeRequest, ProbeResponse, UploadReport};
use chunkd_transfer::{AppendOutcome, Coordinator, ProbeOutcome, TransferError, VerifyReport};

use crate::connection::Sender;
use crate::handler::{Handler, HandlerFuture};

/// Upload service backed by a [`Coordinator`].
pub struct UploadService {
    coordinator: Arc<Coordinator>,
}

impl UploadService {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }
}

impl Handler for UploadService {
    fn on_probe(&self, sender: Sender, msg: Message) -> HandlerFuture<'_> {
        Box::pin(async move {
            let req: ProbeRequest = match msg.parse_payload() {
                Ok(Some(r)) => r,
                _ => {
                    let _ = sender.send_error(&msg, 400, "invalid payload");
                    return;
                }
            };

            tracing::debug!(signature = %req.signature, size = req.size, chunks = req.chunks, "probe");

            let reply = match self
                .coordinator
                .probe(&req.signature, req.size, req.chunks)
                .await
            {
                Ok(ProbeOutcome::New) => msg.reply(
                    MessageType::ProbeResponse,
                    Some(&ProbeResponse {
                        exists: false,
                        uploaded_chunks: 0,
                    }),
                ),
                Ok(ProbeOutcome::Partial { uploaded_chunks }) => msg.reply(
                    MessageType::ProbeResponse,
                    Some(&ProbeResponse {
                        exists: true,
                        uploaded_chunks,
                    }),
                ),
                Ok(ProbeOutcome::Report(report)) => {
                    msg.reply(MessageType::UploadReport, Some(&report_payload(&report)))
                }
                Err(e) => {
                    let _ = sender.send_error(&msg, error_code(&e), e.to_string());
                    return;
                }
            };

            if let Ok(reply) = reply {
                let _ = sender.send_msg(reply);
            }
        })
    }

    fn on_chunk(
        &self,
        sender: Sender,
        header: ChunkHeader,
        payload: Vec<u8>,
    ) -> HandlerFuture<'_> {
        Box::pin(async move {
            let outcome = self
                .coordinator
                .append_chunk(&header.signature, payload, header.size)
                .await;

            // A reply is ALWAYS sent — the client blocks on it before the
            // next chunk.
            let reply = match outcome {
                Ok(AppendOutcome::Accepted { uploaded_chunks }) => Message::new(
                    &header.id,
                    MessageType::ChunkAck,
                    Some(&ChunkAck {
                        complete: false,
                        uploaded_chunks,
                    }),
                ),
                Ok(AppendOutcome::Report(report)) => Message::new(
                    &header.id,
                    MessageType::UploadReport,
                    Some(&report_payload(&report)),
                ),
                Err(e) => {
                    tracing::warn!(signature = %header.signature, "chunk rejected: {e}");
                    let _ =
                        sender.send_msg(Message::error(&header.id, error_code(&e), e.to_string()));
                    return;
                }
            };

            if let Ok(reply) = reply {
                let _ = sender.send_msg(reply);
            }
        })
    }
}

fn report_payload(report: &VerifyReport) -> UploadReport {
    UploadReport {
        verified: report.verified,
        signature: report.actual_signature.clone(),
        expected_signature: report.expected_signature.clone(),
    }
}

fn error_code(e: &TransferError) -> i32 {
    match e {
        TransferError::SessionNotFound(_) => 404,
        TransferError::InvalidSignature(_) | TransferError::SizeMismatch { .. } => 400,
        TransferError::UploadComplete(_) => 409,
        TransferError::Io(_) | TransferError::Registry(_) => 500,
    }
}
