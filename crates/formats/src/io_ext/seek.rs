use std::io::{self, Seek, SeekFrom};

pub trait SeekExt: Seek {
    /// Total length of the stream in bytes. The current position is preserved.
    fn byte_len(&mut self) -> io::Result<u64>;

    /// Whether `count` records of `record_size` bytes starting at `offset` lie entirely within
    /// the stream. Sizes that overflow a 64-bit offset never fit.
    fn contains_records(&mut self, offset: u64, count: u64, record_size: u64) -> io::Result<bool>;
}

impl<T: Seek> SeekExt for T {
    fn byte_len(&mut self) -> io::Result<u64> {
        let current = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        if current != end {
            self.seek(SeekFrom::Start(current))?;
        }

        Ok(end)
    }

    fn contains_records(&mut self, offset: u64, count: u64, record_size: u64) -> io::Result<bool> {
        let len = self.byte_len()?;
        let end = count
            .checked_mul(record_size)
            .and_then(|size| size.checked_add(offset));

        Ok(end.is_some_and(|end| end <= len))
    }
}
