/// Validating UTF-8 decoder over a byte slice.
///
/// `next()` yields one code point at a time. On malformed input the
/// decoder marks itself invalid and stops producing code points; callers
/// check `is_valid()` to tell "end of input" from "bad input". Cloning the
/// decoder gives an independent lookahead cursor.
#[derive(Debug, Clone)]
pub struct Utf8Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    valid: bool,
}

impl<'a> Utf8Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            valid: true,
        }
    }

    /// Byte offset of the next code point to decode.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Decodes the next code point.
    ///
    /// Returns `None` at the end of input or once the input turned out to
    /// be malformed. NUL bytes decode to `'\0'`.
    pub fn next(&mut self) -> Option<char> {
        if !self.valid || self.is_end() {
            return None;
        }
        let lead = self.bytes[self.pos];
        self.pos += 1;
        if lead < 0x80 {
            return Some(lead as char);
        }

        let (extra, min, init) = match lead {
            0xC0..=0xDF => (1, 0x80, (lead & 0x1F) as u32),
            0xE0..=0xEF => (2, 0x800, (lead & 0x0F) as u32),
            0xF0..=0xF7 => (3, 0x1_0000, (lead & 0x07) as u32),
            // Stray continuation byte or a lead byte longer than 4.
            _ => return self.fail(),
        };

        let mut cp = init;
        for _ in 0..extra {
            let Some(&b) = self.bytes.get(self.pos) else {
                return self.fail();
            };
            if b & 0xC0 != 0x80 {
                return self.fail();
            }
            self.pos += 1;
            cp = (cp << 6) | (b & 0x3F) as u32;
        }

        // Overlong forms, surrogates and values above U+10FFFF.
        if cp < min {
            return self.fail();
        }
        match char::from_u32(cp) {
            Some(ch) => Some(ch),
            None => self.fail(),
        }
    }

    fn fail(&mut self) -> Option<char> {
        self.valid = false;
        None
    }
}

impl<'a> From<&'a str> for Utf8Decoder<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl Iterator for Utf8Decoder<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        Utf8Decoder::next(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mixed_width_code_points() {
        let text = "aé☺😀";
        let decoded: Vec<char> = Utf8Decoder::from(text).collect();
        assert_eq!(decoded, vec!['a', 'é', '☺', '😀']);
    }

    #[test]
    fn pos_tracks_byte_offsets() {
        let mut dec = Utf8Decoder::from("aé☺");
        assert_eq!(dec.pos(), 0);
        dec.next();
        assert_eq!(dec.pos(), 1);
        dec.next();
        assert_eq!(dec.pos(), 3);
        dec.next();
        assert_eq!(dec.pos(), 6);
        assert!(dec.is_end());
        assert_eq!(dec.next(), None);
        assert!(dec.is_valid());
    }

    #[test]
    fn nul_is_an_ordinary_code_point() {
        let decoded: Vec<char> = Utf8Decoder::new(b"a\0b").collect();
        assert_eq!(decoded, vec!['a', '\0', 'b']);
    }

    #[test]
    fn clone_is_an_independent_lookahead() {
        let mut dec = Utf8Decoder::from("xyz");
        dec.next();
        let mut ahead = dec.clone();
        assert_eq!(ahead.next(), Some('y'));
        assert_eq!(ahead.next(), Some('z'));
        assert_eq!(dec.pos(), 1);
        assert_eq!(dec.next(), Some('y'));
    }

    #[test]
    fn stray_continuation_byte_is_invalid() {
        let mut dec = Utf8Decoder::new(&[b'a', 0x80, b'b']);
        assert_eq!(dec.next(), Some('a'));
        assert_eq!(dec.next(), None);
        assert!(!dec.is_valid());
        assert_eq!(dec.next(), None);
    }

    #[test]
    fn truncated_sequence_is_invalid() {
        let mut dec = Utf8Decoder::new(&[0xE2, 0x98]);
        assert_eq!(dec.next(), None);
        assert!(!dec.is_valid());
    }

    #[test]
    fn overlong_and_surrogate_forms_are_invalid() {
        for bytes in [&[0xC0, 0xAF][..], &[0xE0, 0x80, 0xAF], &[0xED, 0xA0, 0x80]] {
            let mut dec = Utf8Decoder::new(bytes);
            assert_eq!(dec.next(), None, "{bytes:x?}");
            assert!(!dec.is_valid(), "{bytes:x?}");
        }
    }

    #[test]
    fn values_above_unicode_range_are_invalid() {
        let mut dec = Utf8Decoder::new(&[0xF4, 0x90, 0x80, 0x80]);
        assert_eq!(dec.next(), None);
        assert!(!dec.is_valid());
    }
}
