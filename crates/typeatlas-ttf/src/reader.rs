//! Cursor-based big-endian reader over a font byte buffer
//!
//! TTF/OpenType files are big-endian throughout. `FontReader` keeps an
//! explicit cursor so table parsers can interleave sequential reads with
//! absolute seeks; `run_at` brackets a seek so nested reads can never leak
//! cursor state back to their caller.

use typeatlas_core::{FontError, Result};

/// Big-endian reader with an explicit cursor.
pub struct FontReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> FontReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Total buffer length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor to an absolute offset. Seeking past the end is legal;
    /// the next read will fail instead.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Seek to `offset`, run `f`, and restore the cursor afterwards whether
    /// or not `f` succeeded.
    pub fn run_at<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = self.position;
        self.position = offset;
        let result = f(self);
        self.position = saved;
        result
    }

    /// Borrow `len` bytes starting at an absolute `offset` without touching
    /// the cursor. Used for table checksum verification.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).ok_or(FontError::TruncatedData {
            offset,
            wanted: len,
        })?;
        self.data.get(offset..end).ok_or(FontError::TruncatedData {
            offset: offset.min(self.data.len()),
            wanted: end - self.data.len().min(end),
        })
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.position.checked_add(n);
        match end.and_then(|end| self.data.get(self.position..end)) {
            Some(bytes) => {
                self.position += n;
                Ok(bytes)
            }
            None => Err(FontError::TruncatedData {
                offset: self.position.min(self.data.len()),
                wanted: self
                    .position
                    .saturating_add(n)
                    .saturating_sub(self.data.len()),
            }),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// 16.16 signed fixed-point value.
    pub fn read_fixed(&mut self) -> Result<f32> {
        Ok(self.read_u32()? as i32 as f32 / 65536.0)
    }

    /// Signed distance in font design units.
    pub fn read_fword(&mut self) -> Result<i16> {
        self.read_i16()
    }

    /// Four-byte table or feature tag.
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        let b = self.take(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    /// Seconds since 1904-01-01 00:00:00, the epoch `head` dates use.
    pub fn read_long_datetime(&mut self) -> Result<i64> {
        let b = self.take(8)?;
        Ok(i64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads_advance_cursor() {
        let data = [0x00, 0x2A, 0xFF, 0xFE, 0x00, 0x01, 0x00, 0x00];
        let mut r = FontReader::new(&data);
        assert_eq!(r.read_u16().unwrap(), 42);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert_eq!(r.read_fixed().unwrap(), 1.0);
        assert_eq!(r.position(), 8);
    }

    #[test]
    fn read_tag_bytes() {
        let mut r = FontReader::new(b"cmap");
        assert_eq!(r.read_tag().unwrap(), *b"cmap");
    }

    #[test]
    fn out_of_bounds_is_truncated_data() {
        let mut r = FontReader::new(&[0x01]);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(err, FontError::TruncatedData { .. }));
        // The cursor did not move on failure.
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn run_at_restores_cursor() {
        let data = [0, 1, 2, 3, 4, 5, 6, 7];
        let mut r = FontReader::new(&data);
        r.set_position(2);
        let value = r.run_at(6, |r| r.read_u16()).unwrap();
        assert_eq!(value, 0x0607);
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn run_at_restores_cursor_on_error() {
        let data = [0u8; 4];
        let mut r = FontReader::new(&data);
        r.set_position(1);
        let result = r.run_at(100, |r| r.read_u32());
        assert!(result.is_err());
        assert_eq!(r.position(), 1);
    }

    #[test]
    fn nested_run_at() {
        let data = [0, 1, 2, 3, 4, 5, 6, 7];
        let mut r = FontReader::new(&data);
        let value = r
            .run_at(0, |r| {
                let outer = r.read_u16()?;
                let inner = r.run_at(4, |r| r.read_u16())?;
                // The inner seek must not have moved the outer cursor.
                assert_eq!(r.position(), 2);
                Ok(outer as u32 + inner as u32)
            })
            .unwrap();
        assert_eq!(value, 0x0001 + 0x0405);
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn slice_checks_bounds() {
        let data = [0u8; 8];
        let r = FontReader::new(&data);
        assert!(r.slice(4, 4).is_ok());
        assert!(r.slice(4, 5).is_err());
        assert!(r.slice(usize::MAX, 2).is_err());
    }

    #[test]
    fn read_long_datetime_signed() {
        let data = (-1i64).to_be_bytes();
        let mut r = FontReader::new(&data);
        assert_eq!(r.read_long_datetime().unwrap(), -1);
    }
}
