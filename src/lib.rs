//! Decoder for the PostgreSQL logical replication protocol.
//!
//! [`envelope`] handles the replication-connection frames (XLogData,
//! keepalives, standby replies); [`pgoutput`] decodes the plugin event stream
//! carried inside XLogData under a fixed [`ProtocolOptions`] configuration.
//!
//! ```
//! use pgoutput_wire::pgoutput::{Event, PgOutputDecoder, ProtocolOptions};
//!
//! let decoder = PgOutputDecoder::new(ProtocolOptions::default());
//!
//! let mut begin = vec![b'B'];
//! begin.extend_from_slice(&0x16_B374_D848u64.to_be_bytes());
//! begin.extend_from_slice(&0i64.to_be_bytes());
//! begin.extend_from_slice(&42i32.to_be_bytes());
//!
//! match decoder.decode(&begin).unwrap() {
//!     Event::Begin(b) => assert_eq!(b.transaction_id, 42),
//!     other => panic!("unexpected event {:?}", other),
//! }
//! ```

pub mod capture;
pub mod config;
pub mod envelope;
pub mod error;
pub mod lsn;
pub mod pgoutput;
pub mod wire;

pub use crate::config::Config;
pub use error::{DecodeError, Error, Result};
pub use pgoutput::{Event, PgOutputDecoder, ProtocolOptions, ReplicationMessage, Streaming};
