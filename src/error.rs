//! Error types and result handling for pgoutput-wire.
//!
//! Decoding failures are reported as [`DecodeError`], a small `Clone`-able
//! value that every decode entry point returns unchanged from the nested step
//! that failed. The crate-level [`Error`] wraps it together with the failures
//! of the surrounding tooling (configuration, file I/O, serialization).
//!
//! # Example
//!
//! ```rust
//! use pgoutput_wire::envelope::decode_envelope;
//! use pgoutput_wire::DecodeError;
//!
//! match decode_envelope(b"w\x00\x01") {
//!     Err(DecodeError::TooShort { need, got }) => {
//!         assert_eq!(need, 25);
//!         assert_eq!(got, 3);
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use thiserror::Error;

use crate::pgoutput::ProtocolOptions;

/// Reasons a replication frame or pgoutput event could not be decoded.
///
/// Every variant means the byte stream is not what the configured session
/// expects. Callers should treat the connection as desynchronized; the
/// decoder never returns a partially filled event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer is shorter than the minimum this message requires.
    #[error("buffer too short: need at least {need} bytes, got {got}")]
    TooShort { need: usize, got: usize },

    /// A fixed-size message body does not have its exact size.
    #[error("wrong message size: expected {expected} bytes, got {got}")]
    WrongSize { expected: usize, got: usize },

    /// The leading discriminator byte is not a known message tag.
    #[error("unknown message tag 0x{0:02x} ('{}')", tag_char(.0))]
    UnknownTag(u8),

    /// The tag is a pgoutput event tag, but its feature is disabled for this session.
    #[error("message tag '{}' is not valid for configuration {options}", tag_char(.tag))]
    UnknownTagForConfiguration { tag: u8, options: ProtocolOptions },

    /// A tuple column tag is unknown or disagrees with the binary setting.
    #[error("unexpected tuple column tag 0x{0:02x} ('{}')", tag_char(.0))]
    UnexpectedColumnTag(u8),

    /// A tuple block marker ('N', 'K', 'O') is missing or wrong.
    #[error("expected tuple marker '{}', got 0x{got:02x}", tag_char(.expected))]
    UnexpectedTupleKind { expected: u8, got: u8 },

    /// A boolean field holds a byte other than its two accepted sentinels.
    #[error("invalid boolean byte 0x{0:02x}")]
    InvalidBoolean(u8),

    /// A length, count or string read from the wire runs past the buffer end.
    #[error("truncated message: needed {needed} more bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A signed count or length field carries a negative value.
    #[error("negative {field}: {value}")]
    NegativeLength { field: &'static str, value: i32 },

    /// A text field is not valid UTF-8.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },
}

fn tag_char(byte: &u8) -> char {
    char::from(*byte)
}

/// The main error type for pgoutput-wire tooling.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error, from an unreadable or invalid configuration source.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error, typically from reading capture files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error when rendering decoded events.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Protocol decoding error.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Input that is well-formed on the wire but unusable by the caller.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what was invalid
        message: String,
    },
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// A convenient Result type alias for pgoutput-wire operations.
///
/// This is equivalent to `std::result::Result<T, pgoutput_wire::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
