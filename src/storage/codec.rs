//! Binary codec for stored records.
//!
//! Every record is written field by field, never as a memory image:
//! - integers, flags and status codes: one `u64` little-endian word
//! - strings: `u64` LE byte length, then the raw UTF-8 bytes
//! - id sequences: `u64` LE element count, then one word per element
//!
//! There is no framing around a record; a file is just records back to back
//! and end-of-file is the only terminator.

use thiserror::Error;

use crate::time::{Date, Time};

/// Width of every integer word in the format.
pub const WORD: usize = 8;

/// Why a record could not be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated record: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        needed: usize,
        remaining: usize,
    },

    #[error("field '{field}' is not valid UTF-8")]
    InvalidUtf8 {
        field: &'static str,
    },

    #[error("field '{field}' has invalid value {value}")]
    InvalidValue {
        field: &'static str,
        value: String,
    },
}

/// A record type with a fixed, documented field order on disk.
pub trait Record: Sized {
    /// Appends the encoding of `self` to `out`.
    fn encode(&self, out: &mut RecordWriter);

    /// Decodes exactly one record, advancing `input` past it.
    fn decode(input: &mut RecordReader<'_>) -> Result<Self, DecodeError>;

    /// Encodes a single record into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = RecordWriter::new();
        self.encode(&mut out);
        out.into_inner()
    }
}

/// Accumulates encoded fields.
#[derive(Debug, Default)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_bool(&mut self, value: bool) {
        self.put_u64(u64::from(value));
    }

    pub fn put_str(&mut self, value: &str) {
        self.put_u64(value.len() as u64);
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn put_seq(&mut self, values: impl ExactSizeIterator<Item = u64>) {
        self.put_u64(values.len() as u64);
        for v in values {
            self.put_u64(v);
        }
    }

    /// Year, month, day.
    pub fn put_date(&mut self, date: Date) {
        self.put_u64(date.year());
        self.put_u64(date.month());
        self.put_u64(date.day());
    }

    /// Hour, minute.
    pub fn put_time(&mut self, time: Time) {
        self.put_u64(time.hour());
        self.put_u64(time.minute());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over encoded bytes.
#[derive(Debug)]
pub struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[must_use]
    pub const fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(DecodeError::Truncated { needed, remaining });
        }
        let bytes = &self.buf[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(bytes)
    }

    pub fn take_u64(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.take(WORD)?;
        let mut word = [0u8; WORD];
        word.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(word))
    }

    pub fn take_bool(&mut self, field: &'static str) -> Result<bool, DecodeError> {
        match self.take_u64()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidValue { field, value: other.to_string() }),
        }
    }

    pub fn take_str(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let len = self.take_len(1)?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { field })
    }

    pub fn take_seq(&mut self) -> Result<Vec<u64>, DecodeError> {
        let count = self.take_len(WORD)?;
        (0..count).map(|_| self.take_u64()).collect()
    }

    pub fn take_date(&mut self, field: &'static str) -> Result<Date, DecodeError> {
        let year = self.take_u64()?;
        let month = self.take_u64()?;
        let day = self.take_u64()?;
        Date::new(year, month, day).map_err(|e| DecodeError::InvalidValue {
            field,
            value: e.to_string(),
        })
    }

    pub fn take_time(&mut self, field: &'static str) -> Result<Time, DecodeError> {
        let hour = self.take_u64()?;
        let minute = self.take_u64()?;
        Time::new(hour, minute).map_err(|e| DecodeError::InvalidValue {
            field,
            value: e.to_string(),
        })
    }

    /// Reads a length prefix and checks the payload can fit in what is left,
    /// so a corrupt prefix never triggers a huge allocation.
    fn take_len(&mut self, elem_size: usize) -> Result<usize, DecodeError> {
        let raw = self.take_u64()?;
        let remaining = self.remaining();
        let needed = usize::try_from(raw)
            .ok()
            .and_then(|n| n.checked_mul(elem_size))
            .unwrap_or(usize::MAX);
        if needed > remaining {
            return Err(DecodeError::Truncated { needed, remaining });
        }
        Ok(needed / elem_size)
    }
}

/// Decodes records from `bytes` until the end or the first bad record.
///
/// Returns the records decoded so far and the number of bytes they span;
/// anything past that offset is a partial or corrupt tail.
pub fn decode_all<T: Record>(bytes: &[u8]) -> (Vec<T>, usize) {
    let mut reader = RecordReader::new(bytes);
    let mut records = Vec::new();
    let mut consumed = 0;

    while !reader.is_at_end() {
        match T::decode(&mut reader) {
            Ok(record) => {
                records.push(record);
                consumed = reader.position();
            }
            Err(_) => break,
        }
    }

    (records, consumed)
}
