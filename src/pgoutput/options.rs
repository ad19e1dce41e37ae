//! The five protocol axes a replication session is started with.

use std::fmt;

use serde::{Deserialize, Serialize};

/// pgoutput protocol version requested by [`build_option_string`].
pub const PROTO_VERSION: u32 = 4;

/// In-progress transaction streaming mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Streaming {
    #[default]
    Off,
    On,
    /// Streaming with parallel apply; adds LSN and timestamp to STREAM ABORT.
    Parallel,
}

impl Streaming {
    pub fn is_enabled(self) -> bool {
        !matches!(self, Streaming::Off)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Streaming::Off => "off",
            Streaming::On => "on",
            Streaming::Parallel => "parallel",
        }
    }
}

impl fmt::Display for Streaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session configuration. Fixed by the caller for the lifetime of a slot
/// connection, never derived from wire data.
///
/// Defaults match the server defaults: everything off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolOptions {
    /// Tuple values arrive as raw bytes instead of UTF-8 text.
    pub binary: bool,
    /// Logical decoding messages (`pg_logical_emit_message`) are sent.
    pub messages: bool,
    pub streaming: Streaming,
    pub two_phase: bool,
    /// ORIGIN events are expected (`origin 'any'`).
    pub origin: bool,
}

impl ProtocolOptions {
    /// Events that may belong to a streamed transaction carry a leading xid.
    pub fn streaming_enabled(&self) -> bool {
        self.streaming.is_enabled()
    }

    pub fn parallel_streaming(&self) -> bool {
        self.streaming == Streaming::Parallel
    }
}

/// Formats the plugin options passed to `START_REPLICATION`.
///
/// ```
/// use pgoutput_wire::pgoutput::{build_option_string, ProtocolOptions, Streaming};
///
/// let options = ProtocolOptions {
///     streaming: Streaming::Parallel,
///     origin: true,
///     ..Default::default()
/// };
/// assert_eq!(
///     build_option_string(&options),
///     "proto_version '4', binary 'false', messages 'false', streaming 'parallel', \
///      two_phase 'false', origin 'any'"
/// );
/// ```
pub fn build_option_string(options: &ProtocolOptions) -> String {
    format!(
        "proto_version '{}', binary '{}', messages '{}', streaming '{}', two_phase '{}', origin '{}'",
        PROTO_VERSION,
        options.binary,
        options.messages,
        options.streaming,
        options.two_phase,
        if options.origin { "any" } else { "none" },
    )
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

impl fmt::Display for ProtocolOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "binary={}, messages={}, streaming={}, two_phase={}, origin={}",
            on_off(self.binary),
            on_off(self.messages),
            self.streaming,
            on_off(self.two_phase),
            on_off(self.origin),
        )
    }
}
