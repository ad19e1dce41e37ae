//! Tuple data: the column block carried by INSERT, UPDATE and DELETE.
//!
//! Every function here returns the decoded value together with the number of
//! bytes it consumed, so callers can thread the offset through nested blocks.

use std::fmt;

use base64::prelude::*;
use serde::{Serialize, Serializer};

use crate::wire::Reader;
use crate::DecodeError;

/// A column value as sent by the server, without type interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    /// Binary send/recv representation (`binary` on).
    Binary(Vec<u8>),
    /// Text output representation (`binary` off).
    Text(String),
}

impl ColumnValue {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ColumnValue::Binary(bytes) => bytes,
            ColumnValue::Text(text) => text.as_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TupleColumn {
    Null,
    /// A TOASTed value that did not change and was not resent.
    UnchangedToast,
    Value(ColumnValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TupleData(pub Vec<TupleColumn>);

impl TupleData {
    pub fn columns(&self) -> &[TupleColumn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The replica-identity block preceding UPDATE new data or forming a DELETE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OldOrPrimaryKey {
    /// `'O'`: the full old row (`REPLICA IDENTITY FULL`).
    OldRow(TupleData),
    /// `'K'`: the old key columns only.
    PrimaryKey(TupleData),
}

impl OldOrPrimaryKey {
    pub fn data(&self) -> &TupleData {
        match self {
            OldOrPrimaryKey::OldRow(data) | OldOrPrimaryKey::PrimaryKey(data) => data,
        }
    }
}

pub fn decode_tuple_data(buffer: &[u8], binary: bool) -> Result<(TupleData, usize), DecodeError> {
    let mut reader = Reader::new(buffer);
    let count = reader.i16()?;
    if count < 0 {
        return Err(DecodeError::NegativeLength {
            field: "tuple column count",
            value: i32::from(count),
        });
    }

    // every column takes at least its tag byte
    let count = count as usize;
    if count > reader.remaining() {
        return Err(DecodeError::Truncated {
            needed: count,
            remaining: reader.remaining(),
        });
    }

    let mut columns = Vec::with_capacity(count);
    for _ in 0..count {
        let (column, used) = decode_tuple_column(reader.rest(), binary)?;
        reader.advance(used)?;
        columns.push(column);
    }

    Ok((TupleData(columns), reader.position()))
}

pub fn decode_tuple_column(buffer: &[u8], binary: bool) -> Result<(TupleColumn, usize), DecodeError> {
    let mut reader = Reader::new(buffer);
    let column = match reader.u8()? {
        b'n' => TupleColumn::Null,
        b'u' => TupleColumn::UnchangedToast,
        b'b' if binary => {
            let len = reader.length("column value length")?;
            TupleColumn::Value(ColumnValue::Binary(reader.bytes(len)?.to_vec()))
        }
        b't' if !binary => {
            let len = reader.length("column value length")?;
            let text = std::str::from_utf8(reader.bytes(len)?)
                .map_err(|_| DecodeError::InvalidUtf8 { field: "text column value" })?;
            TupleColumn::Value(ColumnValue::Text(text.to_owned()))
        }
        other => return Err(DecodeError::UnexpectedColumnTag(other)),
    };
    Ok((column, reader.position()))
}

/// Decodes an optional `'K'` or `'O'` block.
///
/// An empty buffer or any other leading byte yields `(None, 0)`; callers that
/// require the block (DELETE) or a following marker (UPDATE) detect the
/// mismatch themselves.
pub fn decode_old_or_primary_key(
    buffer: &[u8],
    binary: bool,
) -> Result<(Option<OldOrPrimaryKey>, usize), DecodeError> {
    let wrap: fn(TupleData) -> OldOrPrimaryKey = match buffer.first() {
        Some(b'K') => OldOrPrimaryKey::PrimaryKey,
        Some(b'O') => OldOrPrimaryKey::OldRow,
        _ => return Ok((None, 0)),
    };
    let (data, used) = decode_tuple_data(&buffer[1..], binary)?;
    Ok((Some(wrap(data)), used + 1))
}

impl Serialize for ColumnValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnValue::Text(text) => serializer.serialize_str(text),
            ColumnValue::Binary(bytes) => serialize_base64(bytes, serializer),
        }
    }
}

pub(crate) fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Text(text) => write!(f, "{:?}", text),
            ColumnValue::Binary(bytes) => {
                f.write_str("\\x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TupleColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleColumn::Null => f.write_str("NULL"),
            TupleColumn::UnchangedToast => f.write_str("<unchanged toast>"),
            TupleColumn::Value(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for TupleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, column) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", column)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for OldOrPrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OldOrPrimaryKey::OldRow(data) => write!(f, "old {}", data),
            OldOrPrimaryKey::PrimaryKey(data) => write!(f, "key {}", data),
        }
    }
}
