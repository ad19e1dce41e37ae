use std::fmt;

use serde::Serialize;

use super::tuple::serialize_base64;
use super::{read_transaction_id, require_min, xid_size};
use crate::lsn::format_lsn;
use crate::wire::Reader;
use crate::DecodeError;

/// A logical decoding message emitted with `pg_logical_emit_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub transaction_id: Option<i32>,
    /// Bit 0 set: the message is transactional.
    pub flags: i8,
    pub lsn: u64,
    pub prefix: String,
    /// Arbitrary bytes, never interpreted as text.
    #[serde(serialize_with = "serialize_base64")]
    pub content: Vec<u8>,
}

impl Message {
    pub fn decode(body: &[u8], streaming: bool) -> Result<Self, DecodeError> {
        require_min(body, xid_size(streaming) + 1 + 8 + 1 + 4)?;
        let mut reader = Reader::new(body);
        let transaction_id = read_transaction_id(&mut reader, streaming)?;
        let flags = reader.i8()?;
        let lsn = reader.u64()?;
        let prefix = reader.cstr("message prefix")?;
        let len = reader.length("message content length")?;
        let content = reader.bytes(len)?.to_vec();

        Ok(Self {
            transaction_id,
            flags,
            lsn,
            prefix,
            content,
        })
    }

    pub fn is_transactional(&self) -> bool {
        self.flags & 1 != 0
    }
}

/// Names the replication origin of the transaction that follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub commit_lsn: u64,
    pub origin: String,
}

impl Origin {
    pub const MIN_SIZE: usize = 9;

    /// The name runs to the end of the body; one trailing NUL is dropped.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        require_min(body, Self::MIN_SIZE)?;
        let mut reader = Reader::new(body);
        let commit_lsn = reader.u64()?;
        let raw = reader.rest();
        let raw = raw.strip_suffix(&[0]).unwrap_or(raw);
        let origin = std::str::from_utf8(raw)
            .map_err(|_| DecodeError::InvalidUtf8 { field: "origin name" })?
            .to_owned();

        Ok(Self { commit_lsn, origin })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MESSAGE lsn={} prefix={:?} {} bytes{}",
            format_lsn(self.lsn),
            self.prefix,
            self.content.len(),
            if self.is_transactional() { " transactional" } else { "" }
        )
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ORIGIN {} lsn={}", self.origin, format_lsn(self.commit_lsn))
    }
}
