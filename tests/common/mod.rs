#![allow(dead_code)]

use bytes::{BufMut, Bytes, BytesMut};
use std::collections::HashMap;

/// Test column value as written into a tuple block.
#[derive(Debug, Clone)]
pub enum MockValue<'a> {
    Null,
    Toast,
    Text(&'a str),
    Binary(&'a [u8]),
}

#[derive(Debug, Clone)]
pub struct MockRelation {
    pub id: u32,
    pub schema: String,
    pub table: String,
    pub columns: Vec<MockColumn>,
}

#[derive(Debug, Clone)]
pub struct MockColumn {
    pub name: String,
    pub type_id: u32,
    pub is_key: bool,
}

/// Builds replication frames (XLogData-wrapped pgoutput messages) for tests.
pub struct MessageBuilder {
    lsn: u64,
    timestamp: i64,
    streaming_xid: Option<i32>,
    relations: HashMap<u32, MockRelation>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            lsn: 1000,
            timestamp: 750_681_000_000_000, // 2023-10-15 10:30:00 UTC since 2000-01-01
            streaming_xid: None,
            relations: HashMap::new(),
        }
    }

    pub fn with_lsn(mut self, lsn: u64) -> Self {
        self.lsn = lsn;
        self
    }

    /// Prefix row and metadata messages with this xid, as a streaming session does.
    pub fn with_streaming_xid(mut self, xid: i32) -> Self {
        self.streaming_xid = Some(xid);
        self
    }

    pub fn add_relation(mut self, id: u32, schema: &str, table: &str, columns: Vec<(&str, u32, bool)>) -> Self {
        let columns = columns
            .into_iter()
            .map(|(name, type_id, is_key)| MockColumn {
                name: name.to_string(),
                type_id,
                is_key,
            })
            .collect();

        self.relations.insert(
            id,
            MockRelation {
                id,
                schema: schema.to_string(),
                table: table.to_string(),
                columns,
            },
        );
        self
    }

    pub fn lsn(&self) -> u64 {
        self.lsn
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Wraps a pgoutput message in an XLogData frame.
    pub fn xlogdata(&self, payload: &[u8]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'w');
        buf.put_u64(self.lsn);
        buf.put_u64(self.lsn + 100);
        buf.put_i64(self.timestamp);
        buf.put_slice(payload);
        buf.freeze()
    }

    pub fn keepalive(&self, reply_requested: bool) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'k');
        buf.put_u64(self.lsn + 100);
        buf.put_i64(self.timestamp);
        buf.put_u8(u8::from(reply_requested));
        buf.freeze()
    }

    fn put_xid(&self, buf: &mut BytesMut) {
        if let Some(xid) = self.streaming_xid {
            buf.put_i32(xid);
        }
    }

    pub fn begin_message(&self, xid: i32) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'B');
        buf.put_u64(self.lsn);
        buf.put_i64(self.timestamp);
        buf.put_i32(xid);
        buf.freeze()
    }

    pub fn commit_message(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'C');
        buf.put_u8(0);
        buf.put_u64(self.lsn);
        buf.put_u64(self.lsn + 100);
        buf.put_i64(self.timestamp);
        buf.freeze()
    }

    pub fn relation_message(&self, rel_id: u32) -> Bytes {
        let relation = self
            .relations
            .get(&rel_id)
            .expect("Relation not found. Use add_relation() first.");

        let mut buf = BytesMut::new();
        buf.put_u8(b'R');
        self.put_xid(&mut buf);
        buf.put_u32(rel_id);
        put_cstr(&mut buf, &relation.schema);
        put_cstr(&mut buf, &relation.table);
        buf.put_u8(b'd');
        buf.put_i16(relation.columns.len() as i16);

        for column in &relation.columns {
            buf.put_u8(u8::from(column.is_key));
            put_cstr(&mut buf, &column.name);
            buf.put_u32(column.type_id);
            buf.put_i32(-1);
        }
        buf.freeze()
    }

    pub fn type_message(&self, type_id: u32, schema: &str, name: &str) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'Y');
        self.put_xid(&mut buf);
        buf.put_u32(type_id);
        put_cstr(&mut buf, schema);
        put_cstr(&mut buf, name);
        buf.freeze()
    }

    pub fn insert_message(&self, rel_id: u32, values: &[MockValue<'_>]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'I');
        self.put_xid(&mut buf);
        buf.put_u32(rel_id);
        buf.put_u8(b'N');
        put_tuple(&mut buf, values);
        buf.freeze()
    }

    /// `old` is `(b'K' | b'O', values)`.
    pub fn update_message(&self, rel_id: u32, old: Option<(u8, &[MockValue<'_>])>, new: &[MockValue<'_>]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'U');
        self.put_xid(&mut buf);
        buf.put_u32(rel_id);
        if let Some((kind, values)) = old {
            buf.put_u8(kind);
            put_tuple(&mut buf, values);
        }
        buf.put_u8(b'N');
        put_tuple(&mut buf, new);
        buf.freeze()
    }

    pub fn delete_message(&self, rel_id: u32, kind: u8, values: &[MockValue<'_>]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'D');
        self.put_xid(&mut buf);
        buf.put_u32(rel_id);
        buf.put_u8(kind);
        put_tuple(&mut buf, values);
        buf.freeze()
    }

    pub fn truncate_message(&self, rel_ids: &[u32], flags: i8) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'T');
        self.put_xid(&mut buf);
        buf.put_i32(rel_ids.len() as i32);
        buf.put_i8(flags);
        for id in rel_ids {
            buf.put_u32(*id);
        }
        buf.freeze()
    }

    pub fn logical_message(&self, prefix: &str, content: &[u8]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'M');
        self.put_xid(&mut buf);
        buf.put_i8(1);
        buf.put_u64(self.lsn);
        put_cstr(&mut buf, prefix);
        buf.put_i32(content.len() as i32);
        buf.put_slice(content);
        buf.freeze()
    }

    pub fn stream_start(&self, xid: i32, first: bool) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'S');
        buf.put_i32(xid);
        buf.put_i8(i8::from(first));
        buf.freeze()
    }

    pub fn stream_stop(&self) -> Bytes {
        Bytes::from_static(b"E")
    }

    pub fn stream_commit(&self, xid: i32) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'c');
        buf.put_i32(xid);
        buf.put_i8(0);
        buf.put_u64(self.lsn);
        buf.put_u64(self.lsn + 100);
        buf.put_i64(self.timestamp);
        buf.freeze()
    }

    /// `tag` selects PREPARE (`P`), COMMIT PREPARED (`K`) or STREAM PREPARE (`p`).
    pub fn prepare_message(&self, tag: u8, xid: i32, gid: &str) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(tag);
        buf.put_i8(0);
        buf.put_u64(self.lsn);
        buf.put_u64(self.lsn + 100);
        buf.put_i64(self.timestamp);
        buf.put_i32(xid);
        put_cstr(&mut buf, gid);
        buf.freeze()
    }
}

fn put_cstr(buf: &mut BytesMut, value: &str) {
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
}

fn put_tuple(buf: &mut BytesMut, values: &[MockValue<'_>]) {
    buf.put_i16(values.len() as i16);
    for value in values {
        match value {
            MockValue::Null => buf.put_u8(b'n'),
            MockValue::Toast => buf.put_u8(b'u'),
            MockValue::Text(text) => {
                buf.put_u8(b't');
                buf.put_i32(text.len() as i32);
                buf.put_slice(text.as_bytes());
            }
            MockValue::Binary(bytes) => {
                buf.put_u8(b'b');
                buf.put_i32(bytes.len() as i32);
                buf.put_slice(bytes);
            }
        }
    }
}
