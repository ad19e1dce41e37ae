use tracing::{debug, trace};

use super::base::{Begin, Commit, Delete, Insert, Relation, Truncate, Type, Update};
use super::message::{Message, Origin};
use super::stream::{decode_stream_stop, StreamAbort, StreamCommit, StreamStart};
use super::tag::{EventKind, TagAlphabet};
use super::two_phase::{BeginPrepare, Prepare, RollbackPrepared};
use super::{build_option_string, Event, ProtocolOptions};
use crate::envelope::{decode_envelope, EnvelopeMessage, PrimaryKeepaliveMessage, XLogData};
use crate::lsn::format_lsn;
use crate::DecodeError;

/// A replication frame with its pgoutput payload decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationMessage<'a> {
    Keepalive(PrimaryKeepaliveMessage),
    Event { header: XLogData<'a>, event: Event },
}

/// Decoder for one replication session.
///
/// The tag alphabet is computed once from the options; decoding itself keeps
/// no state, so one decoder can be shared across threads.
#[derive(Debug, Clone)]
pub struct PgOutputDecoder {
    options: ProtocolOptions,
    alphabet: TagAlphabet,
}

impl PgOutputDecoder {
    pub fn new(options: ProtocolOptions) -> Self {
        Self {
            alphabet: TagAlphabet::for_options(&options),
            options,
        }
    }

    pub fn options(&self) -> &ProtocolOptions {
        &self.options
    }

    pub fn alphabet(&self) -> &TagAlphabet {
        &self.alphabet
    }

    /// The `START_REPLICATION` plugin options for this session.
    pub fn option_string(&self) -> String {
        build_option_string(&self.options)
    }

    /// Decodes one pgoutput event (the `wal_data` of an XLogData frame).
    pub fn decode(&self, data: &[u8]) -> Result<Event, DecodeError> {
        let (&tag, body) = data
            .split_first()
            .ok_or(DecodeError::TooShort { need: 1, got: 0 })?;

        let kind = match self.alphabet.lookup(tag) {
            Some(kind) => kind,
            None if EventKind::from_tag(tag).is_some() => {
                debug!(
                    "pgoutput message type {} not enabled for {}",
                    char::from(tag),
                    self.options
                );
                return Err(DecodeError::UnknownTagForConfiguration {
                    tag,
                    options: self.options,
                });
            }
            None => {
                debug!("Unknown pgoutput message type: 0x{:02x}", tag);
                return Err(DecodeError::UnknownTag(tag));
            }
        };

        let streaming = self.options.streaming_enabled();
        let binary = self.options.binary;

        let event = match kind {
            EventKind::Begin => Event::Begin(Begin::decode(body)?),
            EventKind::Commit => Event::Commit(Commit::decode(body)?),
            EventKind::Relation => Event::Relation(Relation::decode(body, streaming)?),
            EventKind::Type => Event::Type(Type::decode(body, streaming)?),
            EventKind::Insert => Event::Insert(Insert::decode(body, streaming, binary)?),
            EventKind::Update => Event::Update(Update::decode(body, streaming, binary)?),
            EventKind::Delete => Event::Delete(Delete::decode(body, streaming, binary)?),
            EventKind::Truncate => Event::Truncate(Truncate::decode(body, streaming)?),
            EventKind::Message => Event::Message(Message::decode(body, streaming)?),
            EventKind::Origin => Event::Origin(Origin::decode(body)?),
            EventKind::StreamStart => Event::StreamStart(StreamStart::decode(body)?),
            EventKind::StreamStop => {
                decode_stream_stop(body)?;
                Event::StreamStop
            }
            EventKind::StreamCommit => Event::StreamCommit(StreamCommit::decode(body)?),
            EventKind::StreamAbort => {
                Event::StreamAbort(StreamAbort::decode(body, self.options.parallel_streaming())?)
            }
            EventKind::BeginPrepare => Event::BeginPrepare(BeginPrepare::decode(body)?),
            EventKind::Prepare => Event::Prepare(Prepare::decode(body)?),
            EventKind::CommitPrepared => Event::CommitPrepared(Prepare::decode(body)?),
            EventKind::RollbackPrepared => {
                Event::RollbackPrepared(RollbackPrepared::decode(body)?)
            }
            EventKind::StreamPrepare => Event::StreamPrepare(Prepare::decode(body)?),
        };

        trace!("{}: {} bytes", kind, body.len());
        Ok(event)
    }

    /// Decodes a raw replication frame, unwrapping XLogData.
    pub fn decode_frame<'a>(&self, frame: &'a [u8]) -> Result<ReplicationMessage<'a>, DecodeError> {
        match decode_envelope(frame)? {
            EnvelopeMessage::PrimaryKeepalive(keepalive) => {
                Ok(ReplicationMessage::Keepalive(keepalive))
            }
            EnvelopeMessage::XLogData(header) => {
                let event = self.decode(header.wal_data)?;
                trace!(
                    "{} at {}",
                    event.kind(),
                    format_lsn(header.message_wal_start)
                );
                Ok(ReplicationMessage::Event { header, event })
            }
        }
    }
}
