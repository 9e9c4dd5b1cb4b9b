//! Sequential reader over a whole DNS message buffer.
//!
//! Kept deliberately separate from `bitstream_io` (used by [`super::header`]
//! for its sub-byte flag fields): name decompression needs random access back
//! into the buffer at an arbitrary byte offset, which doesn't mix cleanly
//! with a forward-only bit reader. The teacher's own `dns::util::decode_domain_name`
//! has the same problem and simply gives up on compressed names (it reads the
//! pointer's two bytes and returns the root label) — this reader follows the
//! pointer instead, which real upstream answers rely on.

use crate::error::DnsCachedError;

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn err(msg: impl Into<String>) -> DnsCachedError {
        DnsCachedError::Decode(msg.into())
    }

    pub fn u8(&mut self) -> Result<u8, DnsCachedError> {
        let b = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| Self::err("unexpected end of message"))?;
        self.pos += 1;
        Ok(b)
    }

    pub fn u16(&mut self) -> Result<u16, DnsCachedError> {
        let hi = self.u8()? as u16;
        let lo = self.u8()? as u16;
        Ok((hi << 8) | lo)
    }

    pub fn u32(&mut self) -> Result<u32, DnsCachedError> {
        let hi = self.u16()? as u32;
        let lo = self.u16()? as u32;
        Ok((hi << 16) | lo)
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], DnsCachedError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| Self::err("length overflow"))?;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or_else(|| Self::err("unexpected end of message"))?;
        self.pos = end;
        Ok(slice)
    }

    /// Reads a domain name starting at the current position, following at
    /// most 128 compression pointers (RFC 1035 §4.1.4). The cursor advances
    /// past the name (or past the two-byte pointer that redirected it) but
    /// never past a followed jump target.
    pub fn name(&mut self) -> Result<String, DnsCachedError> {
        let mut labels: Vec<String> = Vec::new();
        let mut cursor = self.pos;
        let mut jumped = false;
        let mut jumps = 0u32;

        loop {
            let len = *self
                .buf
                .get(cursor)
                .ok_or_else(|| Self::err("unexpected end of name"))?;

            if len == 0 {
                cursor += 1;
                break;
            }

            if len & 0xC0 == 0xC0 {
                let second = *self
                    .buf
                    .get(cursor + 1)
                    .ok_or_else(|| Self::err("truncated compression pointer"))?;
                let pointer = (((len & 0x3F) as usize) << 8) | second as usize;

                if !jumped {
                    self.pos = cursor + 2;
                    jumped = true;
                }

                jumps += 1;
                if jumps > 128 {
                    return Err(Self::err("too many compression pointer jumps"));
                }
                if pointer >= cursor {
                    return Err(Self::err("compression pointer does not point backwards"));
                }
                cursor = pointer;
                continue;
            }

            if len > 63 {
                return Err(Self::err("label exceeds 63 bytes"));
            }

            let start = cursor + 1;
            let end = start + len as usize;
            let label_bytes = self
                .buf
                .get(start..end)
                .ok_or_else(|| Self::err("unexpected end of label"))?;
            labels.push(String::from_utf8_lossy(label_bytes).into_owned());
            cursor = end;
        }

        if !jumped {
            self.pos = cursor;
        }

        if labels.is_empty() {
            Ok(".".to_string())
        } else {
            let mut name = labels.join(".");
            name.push('.');
            Ok(name)
        }
    }
}
