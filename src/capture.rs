//! Capture files: replication frames stored back to back, each preceded by
//! its length as a big-endian `u32`.

use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::wire::Reader;
use crate::{DecodeError, Error, Result};

/// Appends one length-prefixed frame.
pub fn write_frame(out: &mut BytesMut, frame: &[u8]) -> Result<()> {
    let len = frame_length(frame.len())?;
    out.reserve(4 + frame.len());
    out.put_u32(len);
    out.put_slice(frame);
    Ok(())
}

fn frame_length(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InvalidInput {
        message: format!("frame of {} bytes does not fit a u32 length prefix", len),
    })
}

/// Iterates the frames of a capture buffer.
///
/// A length prefix that runs past the end of the buffer yields one
/// [`DecodeError::Truncated`] and ends the iteration.
#[derive(Debug, Clone)]
pub struct CaptureReader<'a> {
    reader: Reader<'a>,
    failed: bool,
}

impl<'a> CaptureReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(buf),
            failed: false,
        }
    }

    /// Offset of the next frame's length prefix.
    pub fn position(&self) -> usize {
        self.reader.position()
    }
}

impl<'a> Iterator for CaptureReader<'a> {
    type Item = std::result::Result<&'a [u8], DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_empty() {
            return None;
        }

        let mut attempt = self.reader;
        let frame = attempt
            .u32()
            .and_then(|len| attempt.bytes(len as usize));
        match frame {
            Ok(frame) => {
                self.reader = attempt;
                Some(Ok(frame))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Reads a whole capture file into memory.
pub async fn read_capture_file(path: impl AsRef<Path>) -> Result<Bytes> {
    let path = path.as_ref();
    let data = fs::read(path).await?;
    debug!("Read {} bytes of capture data from {:?}", data.len(), path);
    Ok(Bytes::from(data))
}

/// Writes frames to a capture file atomically (temporary file, sync, rename).
pub async fn write_capture_file<F: AsRef<[u8]>>(path: impl AsRef<Path>, frames: &[F]) -> Result<()> {
    let path = path.as_ref();
    let mut buf = BytesMut::new();
    for frame in frames {
        write_frame(&mut buf, frame.as_ref())?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(&buf).await?;
    file.sync_all().await?;
    fs::rename(&temp_path, path).await?;

    debug!("Wrote {} frames to {:?}", frames.len(), path);
    Ok(())
}
