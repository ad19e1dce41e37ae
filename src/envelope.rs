//! Codec for the replication-connection messages that wrap the pgoutput stream.
//!
//! Inside a `START_REPLICATION` copy stream, every CopyData payload starts
//! with a one-byte tag:
//!
//! | tag | direction         | message                       | body size |
//! |-----|-------------------|-------------------------------|-----------|
//! | `w` | primary → standby | [`XLogData`]                  | ≥ 24      |
//! | `k` | primary → standby | [`PrimaryKeepaliveMessage`]   | 17        |
//! | `r` | standby → primary | [`StandbyStatusUpdate`]       | 33        |
//! | `h` | standby → primary | [`HotStandbyFeedbackMessage`] | 24        |
//!
//! A client decodes the first two with [`decode_envelope`] and encodes the
//! last two. The reverse directions are provided for servers, fixtures and
//! capture tooling.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use tracing::trace;

use crate::lsn::format_lsn;
use crate::wire::{read_bool, write_bool, BoolEncoding, Reader};
use crate::DecodeError;

pub const XLOG_DATA_TAG: u8 = b'w';
pub const PRIMARY_KEEPALIVE_TAG: u8 = b'k';
pub const STANDBY_STATUS_UPDATE_TAG: u8 = b'r';
pub const HOT_STANDBY_FEEDBACK_TAG: u8 = b'h';

const ENVELOPE_BOOL: BoolEncoding = BoolEncoding::Numeric;

/// One chunk of logical decoding output.
///
/// `wal_data` borrows from the frame passed to [`decode_envelope`]; the frame
/// must outlive this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XLogData<'a> {
    pub message_wal_start: u64,
    pub server_wal_end: u64,
    /// Microseconds since the PostgreSQL epoch.
    pub sent_at_unix_timestamp: i64,
    #[serde(skip)]
    pub wal_data: &'a [u8],
}

impl<'a> XLogData<'a> {
    pub const HEADER_SIZE: usize = 24;

    fn decode(body: &'a [u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(body);
        Ok(Self {
            message_wal_start: reader.u64()?,
            server_wal_end: reader.u64()?,
            sent_at_unix_timestamp: reader.i64()?,
            wal_data: reader.rest(),
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64(self.message_wal_start);
        buf.put_u64(self.server_wal_end);
        buf.put_i64(self.sent_at_unix_timestamp);
        buf.put_slice(self.wal_data);
    }
}

/// Server heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrimaryKeepaliveMessage {
    pub server_wal_end: u64,
    pub sent_at_unix_timestamp: i64,
    /// The server wants a [`StandbyStatusUpdate`] as soon as possible.
    pub reply_requested: bool,
}

impl PrimaryKeepaliveMessage {
    pub const SIZE: usize = 17;

    fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        check_exact_size(body, Self::SIZE)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            server_wal_end: reader.u64()?,
            sent_at_unix_timestamp: reader.i64()?,
            reply_requested: read_bool(reader.u8()?, ENVELOPE_BOOL)?,
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64(self.server_wal_end);
        buf.put_i64(self.sent_at_unix_timestamp);
        buf.put_u8(bool_byte(self.reply_requested));
    }
}

/// Progress report sent by the client.
///
/// By convention `written >= flushed >= applied`; the codec does not enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StandbyStatusUpdate {
    pub written_wal_position: u64,
    pub flushed_wal_position: u64,
    pub applied_wal_position: u64,
    pub sent_at_unix_timestamp: i64,
    pub reply_requested: bool,
}

impl StandbyStatusUpdate {
    pub const SIZE: usize = 33;

    fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        check_exact_size(body, Self::SIZE)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            written_wal_position: reader.u64()?,
            flushed_wal_position: reader.u64()?,
            applied_wal_position: reader.u64()?,
            sent_at_unix_timestamp: reader.i64()?,
            reply_requested: read_bool(reader.u8()?, ENVELOPE_BOOL)?,
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64(self.written_wal_position);
        buf.put_u64(self.flushed_wal_position);
        buf.put_u64(self.applied_wal_position);
        buf.put_i64(self.sent_at_unix_timestamp);
        buf.put_u8(bool_byte(self.reply_requested));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HotStandbyFeedbackMessage {
    pub sent_at_unix_timestamp: i64,
    pub xmin: u32,
    pub xmin_epoch: u32,
    pub lowest_replication_slot_catalog_xmin: u32,
    pub catalog_xmin_epoch: u32,
}

impl HotStandbyFeedbackMessage {
    pub const SIZE: usize = 24;

    fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        check_exact_size(body, Self::SIZE)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            sent_at_unix_timestamp: reader.i64()?,
            xmin: reader.u32()?,
            xmin_epoch: reader.u32()?,
            lowest_replication_slot_catalog_xmin: reader.u32()?,
            catalog_xmin_epoch: reader.u32()?,
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i64(self.sent_at_unix_timestamp);
        buf.put_u32(self.xmin);
        buf.put_u32(self.xmin_epoch);
        buf.put_u32(self.lowest_replication_slot_catalog_xmin);
        buf.put_u32(self.catalog_xmin_epoch);
    }
}

/// A message the primary sends to a replication client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeMessage<'a> {
    XLogData(XLogData<'a>),
    PrimaryKeepalive(PrimaryKeepaliveMessage),
}

impl EnvelopeMessage<'_> {
    /// Returns true if this is a keepalive that asks for an immediate reply.
    pub fn requires_reply(&self) -> bool {
        matches!(
            self,
            EnvelopeMessage::PrimaryKeepalive(PrimaryKeepaliveMessage {
                reply_requested: true,
                ..
            })
        )
    }
}

/// A message a replication client sends to the primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandbyMessage {
    StatusUpdate(StandbyStatusUpdate),
    HotStandbyFeedback(HotStandbyFeedbackMessage),
}

/// Decodes one primary → standby frame.
///
/// An XLogData frame must hold the tag plus the 24-byte header (25 bytes, the
/// length reported in [`DecodeError::TooShort`] counts the tag). A keepalive
/// body must be exactly 17 bytes (the length reported in
/// [`DecodeError::WrongSize`] excludes the tag).
pub fn decode_envelope(buffer: &[u8]) -> Result<EnvelopeMessage<'_>, DecodeError> {
    let (&tag, body) = buffer
        .split_first()
        .ok_or(DecodeError::TooShort { need: 1, got: 0 })?;

    match tag {
        XLOG_DATA_TAG => {
            let need = 1 + XLogData::HEADER_SIZE;
            if buffer.len() < need {
                return Err(DecodeError::TooShort {
                    need,
                    got: buffer.len(),
                });
            }
            let data = XLogData::decode(body)?;
            trace!(
                "XLogData: start={}, end={}, {} bytes",
                format_lsn(data.message_wal_start),
                format_lsn(data.server_wal_end),
                data.wal_data.len()
            );
            Ok(EnvelopeMessage::XLogData(data))
        }
        PRIMARY_KEEPALIVE_TAG => {
            let keepalive = PrimaryKeepaliveMessage::decode(body)?;
            trace!(
                "Keepalive: end={}, reply={}",
                format_lsn(keepalive.server_wal_end),
                keepalive.reply_requested
            );
            Ok(EnvelopeMessage::PrimaryKeepalive(keepalive))
        }
        _ => Err(DecodeError::UnknownTag(tag)),
    }
}

/// Decodes one standby → primary frame.
pub fn decode_standby_message(buffer: &[u8]) -> Result<StandbyMessage, DecodeError> {
    let (&tag, body) = buffer
        .split_first()
        .ok_or(DecodeError::TooShort { need: 1, got: 0 })?;

    match tag {
        STANDBY_STATUS_UPDATE_TAG => StandbyStatusUpdate::decode(body).map(StandbyMessage::StatusUpdate),
        HOT_STANDBY_FEEDBACK_TAG => {
            HotStandbyFeedbackMessage::decode(body).map(StandbyMessage::HotStandbyFeedback)
        }
        _ => Err(DecodeError::UnknownTag(tag)),
    }
}

pub fn encode_standby_status_update(update: &StandbyStatusUpdate) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + StandbyStatusUpdate::SIZE);
    buf.put_u8(STANDBY_STATUS_UPDATE_TAG);
    update.encode(&mut buf);
    buf.freeze()
}

pub fn encode_hot_standby_feedback(feedback: &HotStandbyFeedbackMessage) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + HotStandbyFeedbackMessage::SIZE);
    buf.put_u8(HOT_STANDBY_FEEDBACK_TAG);
    feedback.encode(&mut buf);
    buf.freeze()
}

/// Encodes the status update a client answers a keepalive with.
///
/// `position` is reported as written, flushed and applied.
pub fn encode_keepalive_reply(position: u64, sent_at_unix_timestamp: i64) -> Bytes {
    encode_standby_status_update(&StandbyStatusUpdate {
        written_wal_position: position,
        flushed_wal_position: position,
        applied_wal_position: position,
        sent_at_unix_timestamp,
        reply_requested: false,
    })
}

pub fn encode_xlog_data(data: &XLogData<'_>) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + XLogData::HEADER_SIZE + data.wal_data.len());
    buf.put_u8(XLOG_DATA_TAG);
    data.encode(&mut buf);
    buf.freeze()
}

pub fn encode_primary_keepalive(keepalive: &PrimaryKeepaliveMessage) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + PrimaryKeepaliveMessage::SIZE);
    buf.put_u8(PRIMARY_KEEPALIVE_TAG);
    keepalive.encode(&mut buf);
    buf.freeze()
}

fn check_exact_size(body: &[u8], expected: usize) -> Result<(), DecodeError> {
    if body.len() != expected {
        return Err(DecodeError::WrongSize {
            expected,
            got: body.len(),
        });
    }
    Ok(())
}

fn bool_byte(value: bool) -> u8 {
    let mut byte = 0;
    write_bool(&mut byte, value, ENVELOPE_BOOL);
    byte
}

impl fmt::Display for XLogData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "XLogData(start: {}, end: {}, sent_at: {}, {} bytes)",
            format_lsn(self.message_wal_start),
            format_lsn(self.server_wal_end),
            self.sent_at_unix_timestamp,
            self.wal_data.len()
        )
    }
}

impl fmt::Display for PrimaryKeepaliveMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Keepalive(end: {}, sent_at: {}, reply_requested: {})",
            format_lsn(self.server_wal_end),
            self.sent_at_unix_timestamp,
            self.reply_requested
        )
    }
}
