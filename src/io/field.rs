//! Fixed-offset field extraction from seekable byte sources

use crate::types::{LandsatError, LandsatResult};
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::str::FromStr;

/// Anything that can back a [`ByteSource`]
pub trait SeekRead: Read + Seek + Send {}

impl<T: Read + Seek + Send> SeekRead for T {}

/// A finite, seekable byte range with a known length
pub struct ByteSource {
    name: String,
    reader: Box<dyn SeekRead>,
    len: u64,
}

impl ByteSource {
    /// Open a plain file
    pub fn open<P: AsRef<Path>>(path: P) -> LandsatResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            name: path.display().to_string(),
            reader: Box::new(file),
            len,
        })
    }

    /// Wrap an in-memory buffer
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let len = bytes.len() as u64;
        Self {
            name: name.into(),
            reader: Box::new(Cursor::new(bytes)),
            len,
        }
    }

    /// Wrap any seekable reader; the length is taken from its end position
    pub fn from_reader<R: SeekRead + 'static>(name: impl Into<String>, mut reader: R) -> LandsatResult<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self {
            name: name.into(),
            reader: Box::new(reader),
            len,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read `len` bytes starting at 1-based `offset`
    pub fn read_window(&mut self, offset: u64, len: usize) -> LandsatResult<Vec<u8>> {
        if offset < 1 || len == 0 || offset - 1 + len as u64 > self.len {
            return Err(LandsatError::OutOfRange {
                offset,
                len,
                source_len: self.len,
            });
        }
        self.reader.seek(SeekFrom::Start(offset - 1))?;
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read the first `len` bytes, or the whole source when it is shorter
    pub fn read_prefix(&mut self, len: usize) -> LandsatResult<Vec<u8>> {
        let len = len.min(self.len as usize);
        if len == 0 {
            return Ok(Vec::new());
        }
        self.read_window(1, len)
    }
}

impl std::fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteSource")
            .field("name", &self.name)
            .field("len", &self.len)
            .finish()
    }
}

/// Reads text and numeric fields at 1-based offsets
pub struct FieldDecoder<'a> {
    source: &'a mut ByteSource,
}

impl<'a> FieldDecoder<'a> {
    pub fn new(source: &'a mut ByteSource) -> Self {
        Self { source }
    }

    /// The exact byte window as text, untrimmed
    pub fn read_string(&mut self, offset: u64, len: usize) -> LandsatResult<String> {
        let bytes = self.source.read_window(offset, len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn read_trimmed(&mut self, offset: u64, len: usize) -> LandsatResult<String> {
        Ok(self.read_string(offset, len)?.trim().to_string())
    }

    pub fn read_int(&mut self, offset: u64, len: usize) -> LandsatResult<i32> {
        self.read_number(offset, len)
    }

    pub fn read_long(&mut self, offset: u64, len: usize) -> LandsatResult<i64> {
        self.read_number(offset, len)
    }

    pub fn read_float(&mut self, offset: u64, len: usize) -> LandsatResult<f32> {
        self.read_number(offset, len)
    }

    pub fn read_double(&mut self, offset: u64, len: usize) -> LandsatResult<f64> {
        self.read_number(offset, len)
    }

    fn read_number<T: FromStr>(&mut self, offset: u64, len: usize) -> LandsatResult<T> {
        let text = self.read_trimmed(offset, len)?;
        parse_number(&text)
    }
}

/// Parse trimmed field text as a number
pub fn parse_number<T: FromStr>(text: &str) -> LandsatResult<T> {
    let trimmed = text.trim();
    trimmed.parse::<T>().map_err(|_| LandsatError::MalformedNumber {
        value: trimmed.to_string(),
    })
}
