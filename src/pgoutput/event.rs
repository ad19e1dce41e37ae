use std::fmt;

use serde::Serialize;

use super::base::{Begin, Commit, Delete, Insert, Relation, Truncate, Type, Update};
use super::message::{Message, Origin};
use super::stream::{StreamAbort, StreamCommit, StreamStart};
use super::tag::EventKind;
use super::two_phase::{BeginPrepare, Prepare, RollbackPrepared};

/// One decoded pgoutput event.
///
/// The variant set covers every configuration; which variants can actually
/// appear is decided by the session's [`ProtocolOptions`](super::ProtocolOptions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Begin(Begin),
    Commit(Commit),
    Relation(Relation),
    Type(Type),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    Truncate(Truncate),
    Message(Message),
    Origin(Origin),
    StreamStart(StreamStart),
    StreamStop,
    StreamCommit(StreamCommit),
    StreamAbort(StreamAbort),
    BeginPrepare(BeginPrepare),
    Prepare(Prepare),
    CommitPrepared(Prepare),
    RollbackPrepared(RollbackPrepared),
    StreamPrepare(Prepare),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Begin(_) => EventKind::Begin,
            Event::Commit(_) => EventKind::Commit,
            Event::Relation(_) => EventKind::Relation,
            Event::Type(_) => EventKind::Type,
            Event::Insert(_) => EventKind::Insert,
            Event::Update(_) => EventKind::Update,
            Event::Delete(_) => EventKind::Delete,
            Event::Truncate(_) => EventKind::Truncate,
            Event::Message(_) => EventKind::Message,
            Event::Origin(_) => EventKind::Origin,
            Event::StreamStart(_) => EventKind::StreamStart,
            Event::StreamStop => EventKind::StreamStop,
            Event::StreamCommit(_) => EventKind::StreamCommit,
            Event::StreamAbort(_) => EventKind::StreamAbort,
            Event::BeginPrepare(_) => EventKind::BeginPrepare,
            Event::Prepare(_) => EventKind::Prepare,
            Event::CommitPrepared(_) => EventKind::CommitPrepared,
            Event::RollbackPrepared(_) => EventKind::RollbackPrepared,
            Event::StreamPrepare(_) => EventKind::StreamPrepare,
        }
    }

    /// The transaction id carried by the event, if its layout has one.
    ///
    /// For row and metadata events this is only set inside streamed
    /// transactions.
    pub fn transaction_id(&self) -> Option<i32> {
        match self {
            Event::Begin(e) => Some(e.transaction_id),
            Event::Relation(e) => e.transaction_id,
            Event::Type(e) => e.transaction_id,
            Event::Insert(e) => e.transaction_id,
            Event::Update(e) => e.transaction_id,
            Event::Delete(e) => e.transaction_id,
            Event::Truncate(e) => e.transaction_id,
            Event::Message(e) => e.transaction_id,
            Event::StreamStart(e) => Some(e.transaction_id),
            Event::StreamCommit(e) => Some(e.transaction_id),
            Event::StreamAbort(e) => Some(e.transaction_id),
            Event::BeginPrepare(e) => Some(e.transaction_id),
            Event::Prepare(e) | Event::CommitPrepared(e) | Event::StreamPrepare(e) => {
                Some(e.transaction_id)
            }
            Event::RollbackPrepared(e) => Some(e.transaction_id),
            Event::Commit(_) | Event::Origin(_) | Event::StreamStop => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Begin(e) => write!(f, "{}", e),
            Event::Commit(e) => write!(f, "{}", e),
            Event::Relation(e) => write!(f, "{}", e),
            Event::Type(e) => write!(f, "{}", e),
            Event::Insert(e) => write!(f, "{}", e),
            Event::Update(e) => write!(f, "{}", e),
            Event::Delete(e) => write!(f, "{}", e),
            Event::Truncate(e) => write!(f, "{}", e),
            Event::Message(e) => write!(f, "{}", e),
            Event::Origin(e) => write!(f, "{}", e),
            Event::StreamStart(e) => write!(f, "{}", e),
            Event::StreamStop => f.write_str("STREAM STOP"),
            Event::StreamCommit(e) => write!(f, "{}", e),
            Event::StreamAbort(e) => write!(f, "{}", e),
            Event::BeginPrepare(e) => write!(f, "{}", e),
            Event::Prepare(e) | Event::CommitPrepared(e) | Event::StreamPrepare(e) => {
                write!(f, "{} {}", self.kind(), e)
            }
            Event::RollbackPrepared(e) => write!(f, "{}", e),
        }
    }
}
