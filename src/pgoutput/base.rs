//! The event set every pgoutput session carries.
//!
//! `transaction_id` is present on the wire only when streaming is enabled;
//! it is `None` otherwise.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use super::tuple::{decode_old_or_primary_key, decode_tuple_data, OldOrPrimaryKey, TupleData};
use super::{expect_marker, read_transaction_id, require_exact, require_min, xid_size};
use crate::lsn::format_lsn;
use crate::wire::Reader;
use crate::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Begin {
    pub final_transaction_lsn: u64,
    pub commit_timestamp: i64,
    pub transaction_id: i32,
}

impl Begin {
    pub const SIZE: usize = 20;

    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        require_exact(body, Self::SIZE)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            final_transaction_lsn: reader.u64()?,
            commit_timestamp: reader.i64()?,
            transaction_id: reader.i32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub flags: i8,
    pub lsn: u64,
    pub end_lsn: u64,
    pub timestamp: i64,
}

impl Commit {
    pub const SIZE: usize = 25;

    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        require_exact(body, Self::SIZE)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            flags: reader.i8()?,
            lsn: reader.u64()?,
            end_lsn: reader.u64()?,
            timestamp: reader.i64()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationColumn {
    pub flags: i8,
    pub name: String,
    /// Type OID.
    pub oid: u32,
    pub type_modifier: i32,
}

impl RelationColumn {
    /// flags, name terminator, oid, type modifier
    const MIN_SIZE: usize = 1 + 1 + 4 + 4;

    /// The column is part of the replica identity key.
    pub fn is_key(&self) -> bool {
        self.flags & 1 != 0
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            flags: reader.i8()?,
            name: reader.cstr("column name")?,
            oid: reader.u32()?,
            type_modifier: reader.i32()?,
        })
    }
}

/// Table metadata. Sent before the first change to a table in a session and
/// again whenever its definition changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub transaction_id: Option<i32>,
    pub oid: u32,
    pub namespace: String,
    pub name: String,
    pub replica_identity: i8,
    pub columns: Vec<RelationColumn>,
}

impl Relation {
    pub fn decode(body: &[u8], streaming: bool) -> Result<Self, DecodeError> {
        require_min(body, xid_size(streaming) + 4 + 1 + 1 + 1 + 2)?;
        let mut reader = Reader::new(body);
        let transaction_id = read_transaction_id(&mut reader, streaming)?;
        let oid = reader.u32()?;
        let namespace = reader.cstr("relation namespace")?;
        let name = reader.cstr("relation name")?;
        let replica_identity = reader.i8()?;

        let count = reader.i16()?;
        if count < 0 {
            return Err(DecodeError::NegativeLength {
                field: "relation column count",
                value: i32::from(count),
            });
        }
        let count = count as usize;
        let needed = count * RelationColumn::MIN_SIZE;
        if needed > reader.remaining() {
            return Err(DecodeError::Truncated {
                needed,
                remaining: reader.remaining(),
            });
        }

        let mut columns = Vec::with_capacity(count);
        for _ in 0..count {
            columns.push(RelationColumn::decode(&mut reader)?);
        }

        trace!(
            "RELATION: {}={}.{} ({} columns)",
            oid,
            namespace,
            name,
            columns.len()
        );
        Ok(Self {
            transaction_id,
            oid,
            namespace,
            name,
            replica_identity,
            columns,
        })
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Type {
    pub transaction_id: Option<i32>,
    pub oid: u32,
    pub namespace: String,
    pub name: String,
}

impl Type {
    pub fn decode(body: &[u8], streaming: bool) -> Result<Self, DecodeError> {
        require_min(body, xid_size(streaming) + 4 + 1 + 1)?;
        let mut reader = Reader::new(body);
        Ok(Self {
            transaction_id: read_transaction_id(&mut reader, streaming)?,
            oid: reader.u32()?,
            namespace: reader.cstr("type namespace")?,
            name: reader.cstr("type name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insert {
    pub transaction_id: Option<i32>,
    /// Relation OID.
    pub oid: u32,
    pub data: TupleData,
}

impl Insert {
    pub fn decode(body: &[u8], streaming: bool, binary: bool) -> Result<Self, DecodeError> {
        require_min(body, xid_size(streaming) + 4 + 1 + 2)?;
        let mut reader = Reader::new(body);
        let transaction_id = read_transaction_id(&mut reader, streaming)?;
        let oid = reader.u32()?;
        expect_marker(&mut reader, b'N')?;
        let (data, used) = decode_tuple_data(reader.rest(), binary)?;
        reader.advance(used)?;
        Ok(Self {
            transaction_id,
            oid,
            data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    pub transaction_id: Option<i32>,
    pub oid: u32,
    /// Present only when the replica identity changed or is `FULL`.
    pub old_data_or_primary_key: Option<OldOrPrimaryKey>,
    pub data: TupleData,
}

impl Update {
    pub fn decode(body: &[u8], streaming: bool, binary: bool) -> Result<Self, DecodeError> {
        require_min(body, xid_size(streaming) + 4 + 1 + 2)?;
        let mut reader = Reader::new(body);
        let transaction_id = read_transaction_id(&mut reader, streaming)?;
        let oid = reader.u32()?;

        let (old_data_or_primary_key, used) = decode_old_or_primary_key(reader.rest(), binary)?;
        reader.advance(used)?;

        expect_marker(&mut reader, b'N')?;
        let (data, used) = decode_tuple_data(reader.rest(), binary)?;
        reader.advance(used)?;

        Ok(Self {
            transaction_id,
            oid,
            old_data_or_primary_key,
            data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delete {
    pub transaction_id: Option<i32>,
    pub oid: u32,
    pub old_data_or_primary_key: Option<OldOrPrimaryKey>,
}

impl Delete {
    pub fn decode(body: &[u8], streaming: bool, binary: bool) -> Result<Self, DecodeError> {
        require_min(body, xid_size(streaming) + 4)?;
        let mut reader = Reader::new(body);
        let transaction_id = read_transaction_id(&mut reader, streaming)?;
        let oid = reader.u32()?;

        let (old_data_or_primary_key, used) = decode_old_or_primary_key(reader.rest(), binary)?;
        if old_data_or_primary_key.is_none() {
            if let Some(got) = reader.peek_u8() {
                return Err(DecodeError::UnexpectedTupleKind {
                    expected: b'K',
                    got,
                });
            }
        }
        reader.advance(used)?;

        Ok(Self {
            transaction_id,
            oid,
            old_data_or_primary_key,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Truncate {
    pub transaction_id: Option<i32>,
    /// Bit 0: CASCADE, bit 1: RESTART IDENTITY.
    pub flags: i8,
    pub oids: Vec<u32>,
}

impl Truncate {
    pub fn decode(body: &[u8], streaming: bool) -> Result<Self, DecodeError> {
        require_min(body, xid_size(streaming) + 4 + 1)?;
        let mut reader = Reader::new(body);
        let transaction_id = read_transaction_id(&mut reader, streaming)?;

        let count = reader.i32()?;
        if count < 0 {
            return Err(DecodeError::NegativeLength {
                field: "truncate relation count",
                value: count,
            });
        }
        let flags = reader.i8()?;

        let count = count as usize;
        let needed = count.saturating_mul(4);
        if needed > reader.remaining() {
            return Err(DecodeError::Truncated {
                needed,
                remaining: reader.remaining(),
            });
        }

        let mut oids = Vec::with_capacity(count);
        for _ in 0..count {
            oids.push(reader.u32()?);
        }

        Ok(Self {
            transaction_id,
            flags,
            oids,
        })
    }

    pub fn cascade(&self) -> bool {
        self.flags & 1 != 0
    }

    pub fn restart_identity(&self) -> bool {
        self.flags & 2 != 0
    }
}

impl fmt::Display for Begin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BEGIN xid={} final_lsn={} ts={}",
            self.transaction_id,
            format_lsn(self.final_transaction_lsn),
            self.commit_timestamp
        )
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "COMMIT lsn={} end_lsn={} ts={}",
            format_lsn(self.lsn),
            format_lsn(self.end_lsn),
            self.timestamp
        )
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RELATION {} {}.{} (", self.oid, self.namespace, self.name)?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", column.name, column.oid)?;
            if column.is_key() {
                f.write_str(" key")?;
            }
        }
        f.write_str(")")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TYPE {} {}.{}", self.oid, self.namespace, self.name)
    }
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT {} {}", self.oid, self.data)
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {}", self.oid)?;
        if let Some(old) = &self.old_data_or_primary_key {
            write!(f, " {}", old)?;
        }
        write!(f, " new {}", self.data)
    }
}

impl fmt::Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE {}", self.oid)?;
        if let Some(old) = &self.old_data_or_primary_key {
            write!(f, " {}", old)?;
        }
        Ok(())
    }
}

impl fmt::Display for Truncate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRUNCATE {:?}", self.oids)?;
        if self.cascade() {
            f.write_str(" CASCADE")?;
        }
        if self.restart_identity() {
            f.write_str(" RESTART IDENTITY")?;
        }
        Ok(())
    }
}
