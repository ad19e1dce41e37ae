//! Events of in-progress transaction streaming (`streaming 'on'` or `'parallel'`).

use std::fmt;

use serde::Serialize;

use super::require_exact;
use crate::lsn::format_lsn;
use crate::wire::Reader;
use crate::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamStart {
    pub transaction_id: i32,
    /// 1 if this is the first segment of the transaction.
    pub flags: i8,
}

impl StreamStart {
    pub const SIZE: usize = 5;

    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        require_exact(body, Self::SIZE)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            transaction_id: reader.i32()?,
            flags: reader.i8()?,
        })
    }

    pub fn is_first_segment(&self) -> bool {
        self.flags == 1
    }
}

/// STREAM STOP has no body; this only checks that none was sent.
pub fn decode_stream_stop(body: &[u8]) -> Result<(), DecodeError> {
    require_exact(body, 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamCommit {
    pub transaction_id: i32,
    pub flags: i8,
    pub lsn: u64,
    pub end_lsn: u64,
    pub timestamp: i64,
}

impl StreamCommit {
    pub const SIZE: usize = 29;

    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        require_exact(body, Self::SIZE)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            transaction_id: reader.i32()?,
            flags: reader.i8()?,
            lsn: reader.u64()?,
            end_lsn: reader.u64()?,
            timestamp: reader.i64()?,
        })
    }
}

/// Abort of a streamed (sub)transaction.
///
/// `lsn` and `timestamp` are sent only with parallel streaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamAbort {
    pub transaction_id: i32,
    pub sub_transaction_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lsn: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl StreamAbort {
    pub const SIZE: usize = 8;
    pub const PARALLEL_SIZE: usize = 24;

    pub fn decode(body: &[u8], parallel: bool) -> Result<Self, DecodeError> {
        require_exact(body, if parallel { Self::PARALLEL_SIZE } else { Self::SIZE })?;
        let mut reader = Reader::new(body);
        let transaction_id = reader.i32()?;
        let sub_transaction_id = reader.i32()?;
        let (lsn, timestamp) = if parallel {
            (Some(reader.u64()?), Some(reader.i64()?))
        } else {
            (None, None)
        };

        Ok(Self {
            transaction_id,
            sub_transaction_id,
            lsn,
            timestamp,
        })
    }

    /// The whole top-level transaction is aborted, not a subtransaction.
    pub fn is_top_level(&self) -> bool {
        self.transaction_id == self.sub_transaction_id
    }
}

impl fmt::Display for StreamStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "STREAM START xid={}", self.transaction_id)?;
        if self.is_first_segment() {
            f.write_str(" first")?;
        }
        Ok(())
    }
}

impl fmt::Display for StreamCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "STREAM COMMIT xid={} lsn={} end_lsn={} ts={}",
            self.transaction_id,
            format_lsn(self.lsn),
            format_lsn(self.end_lsn),
            self.timestamp
        )
    }
}

impl fmt::Display for StreamAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "STREAM ABORT xid={} subxid={}",
            self.transaction_id, self.sub_transaction_id
        )?;
        if let (Some(lsn), Some(timestamp)) = (self.lsn, self.timestamp) {
            write!(f, " lsn={} ts={}", format_lsn(lsn), timestamp)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_stream_start() {
        let body = [0, 0, 0, 7, 1];
        let start = StreamStart::decode(&body).unwrap();
        assert_eq!(start.transaction_id, 7);
        assert!(start.is_first_segment());
        assert!(StreamStart::decode(&body[..4]).is_err());
    }

    #[test]
    fn test_stream_stop_has_no_body() {
        assert_eq!(decode_stream_stop(&[]), Ok(()));
        assert_eq!(
            decode_stream_stop(&[0]),
            Err(DecodeError::WrongSize { expected: 0, got: 1 })
        );
    }

    #[test]
    fn test_stream_abort_shapes() {
        let mut buf = BytesMut::new();
        buf.put_i32(10);
        buf.put_i32(11);

        let plain = StreamAbort::decode(&buf, false).unwrap();
        assert_eq!(plain.lsn, None);
        assert!(!plain.is_top_level());
        assert_eq!(
            StreamAbort::decode(&buf, true),
            Err(DecodeError::WrongSize { expected: 24, got: 8 })
        );

        buf.put_u64(0xABCD);
        buf.put_i64(-2);
        let parallel = StreamAbort::decode(&buf, true).unwrap();
        assert_eq!(parallel.lsn, Some(0xABCD));
        assert_eq!(parallel.timestamp, Some(-2));
        assert_eq!(
            StreamAbort::decode(&buf, false),
            Err(DecodeError::WrongSize { expected: 8, got: 24 })
        );
    }
}
