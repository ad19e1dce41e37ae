//! The `pgoutput` logical decoding plugin stream.

pub mod base;
pub mod decoder;
pub mod event;
pub mod message;
pub mod options;
pub mod stream;
pub mod tag;
pub mod tuple;
pub mod two_phase;


pub use decoder::{PgOutputDecoder, ReplicationMessage};
pub use event::Event;
pub use options::{build_option_string, ProtocolOptions, Streaming, PROTO_VERSION};
pub use tag::{EventKind, TagAlphabet, TagGroup};
pub use tuple::{ColumnValue, OldOrPrimaryKey, TupleColumn, TupleData};

use crate::wire::Reader;
use crate::DecodeError;

fn xid_size(streaming: bool) -> usize {
    if streaming {
        4
    } else {
        0
    }
}

fn read_transaction_id(reader: &mut Reader<'_>, streaming: bool) -> Result<Option<i32>, DecodeError> {
    if streaming {
        reader.i32().map(Some)
    } else {
        Ok(None)
    }
}

fn require_exact(body: &[u8], size: usize) -> Result<(), DecodeError> {
    if body.len() != size {
        return Err(DecodeError::WrongSize {
            expected: size,
            got: body.len(),
        });
    }
    Ok(())
}

fn require_min(body: &[u8], size: usize) -> Result<(), DecodeError> {
    if body.len() < size {
        return Err(DecodeError::TooShort {
            need: size,
            got: body.len(),
        });
    }
    Ok(())
}

fn expect_marker(reader: &mut Reader<'_>, expected: u8) -> Result<(), DecodeError> {
    let got = reader.u8()?;
    if got != expected {
        return Err(DecodeError::UnexpectedTupleKind { expected, got });
    }
    Ok(())
}
