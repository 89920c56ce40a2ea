//! Adapter module - session control via TCP socket with JSON protocol
//!
//! This crate lets an external client (a bot, a test harness, a remote UI) drive a
//! card-match session through a TCP socket connection.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Server sends an observation whenever the session changes
//! 5. **Commanding**: Controller sends commands to apply session actions
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: A list of actions (`flip`, `togglePause`, `reset`, `start`)
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with the assigned role
//! - **observation**: Session snapshot plus the events since the previous observation
//! - **ack**: Command applied
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `CARD_MATCH_HOST`: Bind address (default: "127.0.0.1")
//! - `CARD_MATCH_PORT`: Port number (default: 7878)
//! - `CARD_MATCH_MAX_PENDING`: Command queue capacity (default: 16)
//! - `CARD_MATCH_ADAPTER_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1,"client":{"name":"bot","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":2,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":2,"phase":"countdown",...}
//! Client -> Server: {"type":"command","seq":2,"ts":3,"actions":[{"action":"flip","index":0}]}
//! Server -> Client: {"type":"ack","seq":2,"ts":4,"status":"ok"}
//! ```

pub mod driver;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use card_match_core as core;
pub use card_match_types as types;

pub use driver::SessionDriver;
pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::*;
