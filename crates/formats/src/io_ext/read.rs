use std::io::{self, ErrorKind, Read};

pub trait ReadFormatsExt {
    /// Reads exactly `LENGTH` bytes and decodes them as a NUL-terminated string. Bytes after the
    /// first NUL are discarded and invalid UTF-8 sequences become replacement characters.
    fn read_fixed_str<const LENGTH: usize>(&mut self) -> io::Result<String>;
}

impl<R: Read> ReadFormatsExt for R {
    #[inline]
    fn read_fixed_str<const LENGTH: usize>(&mut self) -> io::Result<String> {
        let mut buffer = [0u8; LENGTH];
        self.read_exact(&mut buffer)?;

        Ok(fixed_str(&buffer))
    }
}

/// Decodes a NUL-padded byte field.
pub fn fixed_str(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());

    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Whether `err` means the source ran out of bytes mid-record.
pub fn is_truncation(err: &io::Error) -> bool {
    err.kind() == ErrorKind::UnexpectedEof
}
