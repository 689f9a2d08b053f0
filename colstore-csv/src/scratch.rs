use std::fs::File;

use bytes::{Buf, BufMut};
use colstore_error::{ColstoreResult, colstore_bail, colstore_err};
use memmap2::MmapMut;

use crate::RawRecord;

const LEN: usize = size_of::<u32>();
const NULL_FIELD: u32 = u32::MAX;

/// A fixed-capacity staging area for serialized records, backed by a memory-mapped temporary
/// file.
///
/// Entries are `[u32 length][payload]`. The payload is the field count followed by every field
/// as `[u32 length][utf-8 bytes]`, with a length of `u32::MAX` marking a null field.
pub struct ScratchBuffer {
    map: MmapMut,
    _file: File,
    write_offset: usize,
    read_offset: usize,
    stored: usize,
    read: usize,
}

impl ScratchBuffer {
    /// Map a temporary file of `capacity` bytes.
    pub fn new(capacity: usize) -> ColstoreResult<Self> {
        if capacity <= 2 * LEN {
            colstore_bail!("Scratch capacity of {} bytes is too small", capacity);
        }
        let file = tempfile::tempfile()?;
        file.set_len(capacity as u64)?;
        // SAFETY: the file is an unlinked temporary owned by this buffer, so nothing else can
        // resize or modify it while it is mapped.
        let map = unsafe { MmapMut::map_mut(&file)? };
        Ok(Self {
            map,
            _file: file,
            write_offset: 0,
            read_offset: 0,
            stored: 0,
            read: 0,
        })
    }

    /// The total size of the mapping.
    pub fn capacity(&self) -> usize {
        self.map.len()
    }

    /// Forget every stored entry.
    pub fn clear(&mut self) {
        self.write_offset = 0;
        self.read_offset = 0;
        self.stored = 0;
        self.read = 0;
    }

    /// The number of entries stored since the last [`ScratchBuffer::clear`].
    pub fn stored(&self) -> usize {
        self.stored
    }

    /// The number of bytes stored since the last [`ScratchBuffer::clear`].
    pub fn used(&self) -> usize {
        self.write_offset
    }

    /// Whether a stored entry has not been read yet.
    pub fn has_unread(&self) -> bool {
        self.read < self.stored
    }

    /// The size of the entry `record` serializes to, length prefix included.
    pub fn entry_len(record: &RawRecord) -> usize {
        LEN + LEN
            + record
                .iter()
                .map(|field| LEN + field.as_ref().map_or(0, String::len))
                .sum::<usize>()
    }

    /// Append `record`, returning the size of its entry.
    pub fn push(&mut self, record: &RawRecord) -> ColstoreResult<usize> {
        let size = Self::entry_len(record);
        if size > self.capacity() - self.write_offset {
            colstore_bail!(
                InvalidState: "Entry of {} bytes does not fit into {} remaining scratch bytes",
                size,
                self.capacity() - self.write_offset
            );
        }
        let mut out = &mut self.map[self.write_offset..self.write_offset + size];
        out.put_u32(encode_len(size - LEN)?);
        out.put_u32(encode_len(record.len())?);
        for field in record {
            match field {
                Some(text) => {
                    out.put_u32(encode_len(text.len())?);
                    out.put_slice(text.as_bytes());
                }
                None => out.put_u32(NULL_FIELD),
            }
        }
        self.write_offset += size;
        self.stored += 1;
        Ok(size)
    }

    /// Deserialize the next unread entry.
    pub fn pop(&mut self) -> ColstoreResult<Option<RawRecord>> {
        if !self.has_unread() {
            return Ok(None);
        }
        let mut entry = &self.map[self.read_offset..self.write_offset];
        let size = read_u32(&mut entry)? as usize;
        if entry.remaining() < size {
            colstore_bail!(InvalidSerde: "Scratch entry of {} bytes is truncated", size);
        }
        let mut payload = &entry[..size];
        let fields = read_u32(&mut payload)? as usize;
        let mut record = Vec::with_capacity(fields);
        for _ in 0..fields {
            let len = read_u32(&mut payload)?;
            if len == NULL_FIELD {
                record.push(None);
                continue;
            }
            let len = len as usize;
            if payload.remaining() < len {
                colstore_bail!(InvalidSerde: "Scratch field of {} bytes is truncated", len);
            }
            let text = std::str::from_utf8(&payload[..len])
                .map_err(|e| colstore_err!(InvalidSerde: "Invalid UTF-8 in scratch entry: {}", e))?;
            record.push(Some(text.to_string()));
            payload.advance(len);
        }
        self.read_offset += LEN + size;
        self.read += 1;
        Ok(Some(record))
    }
}

fn encode_len(len: usize) -> ColstoreResult<u32> {
    u32::try_from(len)
        .ok()
        .filter(|&len| len != NULL_FIELD)
        .ok_or_else(|| colstore_err!(InvalidState: "Length {} does not fit a scratch entry", len))
}

fn read_u32(buf: &mut &[u8]) -> ColstoreResult<u32> {
    if buf.remaining() < LEN {
        colstore_bail!(InvalidSerde: "Scratch entry ends inside a length prefix");
    }
    Ok(buf.get_u32())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[Option<&str>]) -> RawRecord {
        fields.iter().map(|f| f.map(str::to_string)).collect()
    }

    #[test]
    fn stores_and_reads_in_order() {
        let mut scratch = ScratchBuffer::new(1024).unwrap();
        let first = record(&[Some("1"), None, Some("")]);
        let second = record(&[Some("héllo"), Some("x")]);
        assert_eq!(scratch.push(&first).unwrap(), 4 + 4 + 5 + 4 + 4);
        scratch.push(&second).unwrap();
        assert_eq!(scratch.stored(), 2);

        assert_eq!(scratch.pop().unwrap(), Some(first));
        assert!(scratch.has_unread());
        assert_eq!(scratch.pop().unwrap(), Some(second));
        assert_eq!(scratch.pop().unwrap(), None);
    }

    #[test]
    fn clear_reuses_the_mapping() {
        let mut scratch = ScratchBuffer::new(64).unwrap();
        let entry = record(&[Some("0123456789")]);
        assert_eq!(scratch.push(&entry).unwrap(), 22);
        scratch.push(&entry).unwrap();
        let err = scratch.push(&entry).unwrap_err();
        assert!(matches!(err, colstore_error::ColstoreError::InvalidState(..)));
        assert_eq!(scratch.used(), 44);
        scratch.clear();
        assert!(!scratch.has_unread());
        scratch.push(&entry).unwrap();
        assert_eq!(scratch.pop().unwrap(), Some(entry));
    }

    #[test]
    fn rejects_tiny_capacity() {
        assert!(ScratchBuffer::new(8).is_err());
    }
}
