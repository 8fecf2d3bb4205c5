//! Checked decoding of packed, native-byte-order binary records.
//!
//! Every preprocessed file is a sequence of length prefixes and fixed-size
//! records.  [`RecordCursor`] walks an in-memory file image and validates each
//! declared length against the bytes that are actually left before anything
//! is allocated; [`read_record`] does the same for a streamed file, one
//! record at a time.

use std::io::{ErrorKind, Read};
use std::path::Path;

use bytemuck::Pod;

use crate::{DataError, DataResult};

/// A fixed-size on-disk record.
///
/// Implementors are `#[repr(C, packed)]` so `SIZE` equals the exact number
/// of bytes on disk.
pub trait Record: Pod {
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Decode from a slice of exactly `SIZE` bytes.
    #[inline]
    fn decode(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(bytes)
    }

    #[inline]
    fn encode(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Bounds-checked reader over a whole file image.
pub struct RecordCursor<'a> {
    data: &'a [u8],
    pos:  usize,
    path: &'a Path,
}

impl<'a> RecordCursor<'a> {
    pub fn new(data: &'a [u8], path: &'a Path) -> Self {
        Self { data, pos: 0, path }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn path(&self) -> &'a Path {
        self.path
    }

    /// Consume `count` records of `size` bytes each, or fail without moving
    /// if the file does not hold that many.
    pub fn take(&mut self, count: usize, size: usize, what: &str) -> DataResult<&'a [u8]> {
        let len = count.checked_mul(size).ok_or_else(|| {
            DataError::corrupt(self.path, format!("{what}: declared count {count} overflows"))
        })?;
        if len > self.remaining() {
            return Err(DataError::corrupt(
                self.path,
                format!(
                    "{what}: declared {count} records ({len} bytes) but only {} bytes remain",
                    self.remaining()
                ),
            ));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read<R: Record>(&mut self, what: &str) -> DataResult<R> {
        self.take(1, R::SIZE, what).map(R::decode)
    }

    pub fn read_u32(&mut self, what: &str) -> DataResult<u32> {
        let bytes = self.take(1, 4, what)?;
        Ok(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self, what: &str) -> DataResult<u64> {
        let bytes = self.take(1, 8, what)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_ne_bytes(buf))
    }

    /// Fail if any bytes are left over.
    pub fn finish(self) -> DataResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DataError::corrupt(self.path, format!("{n} trailing bytes after last record"))),
        }
    }
}

/// Read one record from a stream.
///
/// Returns `Ok(None)` on a clean end of input and `CorruptData` when the
/// input ends part-way through a record.
pub fn read_record<R: Record, S: Read>(stream: &mut S, path: &Path) -> DataResult<Option<R>> {
    let mut record = R::zeroed();
    let buf = bytemuck::bytes_of_mut(&mut record);
    let mut filled = 0;
    while filled < R::SIZE {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DataError::io(path, e)),
        }
    }
    match filled {
        0 => Ok(None),
        n if n == R::SIZE => Ok(Some(record)),
        n => Err(DataError::corrupt(
            path,
            format!("truncated record: {n} of {} bytes", R::SIZE),
        )),
    }
}
