//! Two-phase commit events (`two_phase 'true'`).
//!
//! All share one layout family: optional flags, two LSNs, one or two
//! timestamps, the xid and a NUL-terminated global transaction id.

use std::fmt;

use serde::Serialize;

use super::require_min;
use crate::lsn::format_lsn;
use crate::wire::Reader;
use crate::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeginPrepare {
    pub lsn: u64,
    pub end_lsn: u64,
    pub timestamp: i64,
    pub transaction_id: i32,
    pub gid: String,
}

impl BeginPrepare {
    pub const MIN_SIZE: usize = 8 + 8 + 8 + 4 + 1;

    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        require_min(body, Self::MIN_SIZE)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            lsn: reader.u64()?,
            end_lsn: reader.u64()?,
            timestamp: reader.i64()?,
            transaction_id: reader.i32()?,
            gid: reader.cstr("gid")?,
        })
    }
}

/// Body of PREPARE, COMMIT PREPARED and STREAM PREPARE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prepare {
    pub flags: i8,
    pub lsn: u64,
    pub end_lsn: u64,
    pub timestamp: i64,
    pub transaction_id: i32,
    pub gid: String,
}

impl Prepare {
    pub const MIN_SIZE: usize = 1 + BeginPrepare::MIN_SIZE;

    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        require_min(body, Self::MIN_SIZE)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            flags: reader.i8()?,
            lsn: reader.u64()?,
            end_lsn: reader.u64()?,
            timestamp: reader.i64()?,
            transaction_id: reader.i32()?,
            gid: reader.cstr("gid")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackPrepared {
    pub flags: i8,
    /// End LSN of the prepared transaction.
    pub lsn: u64,
    /// End LSN of the rollback.
    pub end_lsn: u64,
    pub prepare_timestamp: i64,
    pub rollback_timestamp: i64,
    pub transaction_id: i32,
    pub gid: String,
}

impl RollbackPrepared {
    pub const MIN_SIZE: usize = 1 + 8 + 8 + 8 + 8 + 4 + 1;

    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        require_min(body, Self::MIN_SIZE)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            flags: reader.i8()?,
            lsn: reader.u64()?,
            end_lsn: reader.u64()?,
            prepare_timestamp: reader.i64()?,
            rollback_timestamp: reader.i64()?,
            transaction_id: reader.i32()?,
            gid: reader.cstr("gid")?,
        })
    }
}

impl fmt::Display for BeginPrepare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BEGIN PREPARE xid={} gid={:?} lsn={}",
            self.transaction_id,
            self.gid,
            format_lsn(self.lsn)
        )
    }
}

impl fmt::Display for Prepare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "xid={} gid={:?} lsn={} end_lsn={}",
            self.transaction_id,
            self.gid,
            format_lsn(self.lsn),
            format_lsn(self.end_lsn)
        )
    }
}

impl fmt::Display for RollbackPrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ROLLBACK PREPARED xid={} gid={:?} lsn={} end_lsn={}",
            self.transaction_id,
            self.gid,
            format_lsn(self.lsn),
            format_lsn(self.end_lsn)
        )
    }
}
