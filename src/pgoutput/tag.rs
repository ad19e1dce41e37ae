//! pgoutput event tags and the per-session tag alphabet.

use std::fmt;

use serde::Serialize;

use super::ProtocolOptions;

/// The kind of a pgoutput event, identified on the wire by its leading byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Begin,
    Commit,
    Relation,
    Type,
    Insert,
    Update,
    Delete,
    Truncate,
    Message,
    Origin,
    StreamStart,
    StreamStop,
    StreamCommit,
    StreamAbort,
    BeginPrepare,
    Prepare,
    CommitPrepared,
    RollbackPrepared,
    StreamPrepare,
}

/// The protocol feature an event kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagGroup {
    Base,
    Messages,
    Origin,
    Streaming,
    TwoPhase,
    /// Needs both streaming and two-phase.
    StreamingTwoPhase,
}

impl TagGroup {
    pub fn is_enabled(self, options: &ProtocolOptions) -> bool {
        match self {
            TagGroup::Base => true,
            TagGroup::Messages => options.messages,
            TagGroup::Origin => options.origin,
            TagGroup::Streaming => options.streaming_enabled(),
            TagGroup::TwoPhase => options.two_phase,
            TagGroup::StreamingTwoPhase => options.streaming_enabled() && options.two_phase,
        }
    }
}

impl EventKind {
    pub const ALL: [EventKind; 19] = [
        EventKind::Begin,
        EventKind::Commit,
        EventKind::Relation,
        EventKind::Type,
        EventKind::Insert,
        EventKind::Update,
        EventKind::Delete,
        EventKind::Truncate,
        EventKind::Message,
        EventKind::Origin,
        EventKind::StreamStart,
        EventKind::StreamStop,
        EventKind::StreamCommit,
        EventKind::StreamAbort,
        EventKind::BeginPrepare,
        EventKind::Prepare,
        EventKind::CommitPrepared,
        EventKind::RollbackPrepared,
        EventKind::StreamPrepare,
    ];

    pub fn tag(self) -> u8 {
        match self {
            EventKind::Begin => b'B',
            EventKind::Commit => b'C',
            EventKind::Relation => b'R',
            EventKind::Type => b'Y',
            EventKind::Insert => b'I',
            EventKind::Update => b'U',
            EventKind::Delete => b'D',
            EventKind::Truncate => b'T',
            EventKind::Message => b'M',
            EventKind::Origin => b'O',
            EventKind::StreamStart => b'S',
            EventKind::StreamStop => b'E',
            EventKind::StreamCommit => b'c',
            EventKind::StreamAbort => b'A',
            EventKind::BeginPrepare => b'b',
            EventKind::Prepare => b'P',
            EventKind::CommitPrepared => b'K',
            EventKind::RollbackPrepared => b'r',
            EventKind::StreamPrepare => b'p',
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        EventKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn group(self) -> TagGroup {
        match self {
            EventKind::Begin
            | EventKind::Commit
            | EventKind::Relation
            | EventKind::Type
            | EventKind::Insert
            | EventKind::Update
            | EventKind::Delete
            | EventKind::Truncate => TagGroup::Base,
            EventKind::Message => TagGroup::Messages,
            EventKind::Origin => TagGroup::Origin,
            EventKind::StreamStart
            | EventKind::StreamStop
            | EventKind::StreamCommit
            | EventKind::StreamAbort => TagGroup::Streaming,
            EventKind::BeginPrepare
            | EventKind::Prepare
            | EventKind::CommitPrepared
            | EventKind::RollbackPrepared => TagGroup::TwoPhase,
            EventKind::StreamPrepare => TagGroup::StreamingTwoPhase,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Begin => "BEGIN",
            EventKind::Commit => "COMMIT",
            EventKind::Relation => "RELATION",
            EventKind::Type => "TYPE",
            EventKind::Insert => "INSERT",
            EventKind::Update => "UPDATE",
            EventKind::Delete => "DELETE",
            EventKind::Truncate => "TRUNCATE",
            EventKind::Message => "MESSAGE",
            EventKind::Origin => "ORIGIN",
            EventKind::StreamStart => "STREAM START",
            EventKind::StreamStop => "STREAM STOP",
            EventKind::StreamCommit => "STREAM COMMIT",
            EventKind::StreamAbort => "STREAM ABORT",
            EventKind::BeginPrepare => "BEGIN PREPARE",
            EventKind::Prepare => "PREPARE",
            EventKind::CommitPrepared => "COMMIT PREPARED",
            EventKind::RollbackPrepared => "ROLLBACK PREPARED",
            EventKind::StreamPrepare => "STREAM PREPARE",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The event kinds legal under one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAlphabet {
    kinds: Vec<EventKind>,
}

impl TagAlphabet {
    pub fn for_options(options: &ProtocolOptions) -> Self {
        let kinds = EventKind::ALL
            .into_iter()
            .filter(|kind| kind.group().is_enabled(options))
            .collect();
        Self { kinds }
    }

    /// Looks up a tag byte, returning its kind only if it is legal here.
    pub fn lookup(&self, tag: u8) -> Option<EventKind> {
        self.kinds.iter().copied().find(|kind| kind.tag() == tag)
    }

    pub fn contains(&self, tag: u8) -> bool {
        self.lookup(tag).is_some()
    }

    pub fn kinds(&self) -> &[EventKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl fmt::Display for TagAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in &self.kinds {
            write!(f, "{}", char::from(kind.tag()))?;
        }
        Ok(())
    }
}
