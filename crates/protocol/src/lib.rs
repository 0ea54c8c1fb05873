//! Wire protocol types for chunkd client-server communication.
//!
//! Everything a client and server need to agree on lives here: the JSON
//! message envelope, the typed payloads for each message, and the shared
//! size limits. This crate does no I/O.

pub mod constants;
pub mod envelope;
pub mod messages;

pub use constants::MessageType;
