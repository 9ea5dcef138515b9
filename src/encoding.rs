//! Internal module for Unicode encoding detection, decoding and encoding

/// Maximum number of bytes needed to encode one Unicode `char` in any supported encoding
pub(crate) const MAX_BYTES_PER_CHAR: usize = 4;

/// Text encoding of JSON input or output data
///
/// JSON data exchanged between systems must be encoded in one of five Unicode
/// encodings (RFC 4627, section 3). The parser can detect the input encoding
/// automatically from the first bytes of the document; the encoding of produced
/// data (parser string events and writer output) is always chosen explicitly.
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum Encoding {
    /// UTF-8
    Utf8,
    /// UTF-16 little-endian
    Utf16Le,
    /// UTF-16 big-endian
    Utf16Be,
    /// UTF-32 little-endian
    Utf32Le,
    /// UTF-32 big-endian
    Utf32Be,
}

const _2BYTE_MASK: u8 = 0b1110_0000;
/// Bit mask which matches the value bits of the 2 byte start
const _2BYTE_MASK_VAL: u8 = !_2BYTE_MASK;

const _3BYTE_MASK: u8 = 0b1111_0000;
/// Bit mask which matches the value bits of the 3 byte start
const _3BYTE_MASK_VAL: u8 = !_3BYTE_MASK;

const _4BYTE_MASK: u8 = 0b1111_1000;
/// Bit mask which matches the value bits of the 4 byte start
const _4BYTE_MASK_VAL: u8 = !_4BYTE_MASK;

const CONT_MASK: u8 = 0b1100_0000;
/// Bit mask which matches the value bits of the continuation byte
const CONT_MASK_VAL: u8 = !CONT_MASK;

pub(crate) fn is_utf16_high_surrogate(unit: u16) -> bool {
    matches!(unit, 0xD800..=0xDBFF)
}

pub(crate) fn is_utf16_low_surrogate(unit: u16) -> bool {
    matches!(unit, 0xDC00..=0xDFFF)
}

pub(crate) fn combine_surrogate_pair(high: u16, low: u16) -> char {
    let c = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    // both halves were range checked, so the result is a valid scalar value
    char::from_u32(c).unwrap()
}

/// Result of feeding one input byte to a [`Decoder`]
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum Decoded {
    /// More bytes are needed before the next codepoint is complete
    Pending,
    /// A complete codepoint which was encoded as `len` bytes
    Codepoint { c: char, len: usize },
    /// A maximal invalid subpart (Unicode 5.2.0, section 3.9) of `len` bytes
    ///
    /// `requeue[..requeue_len]` holds bytes which the decoder had already
    /// consumed but which do not belong to the invalid subpart; the caller
    /// must feed them again, in order, after handling the subpart.
    Invalid {
        len: usize,
        requeue: [u8; MAX_BYTES_PER_CHAR],
        requeue_len: usize,
    },
}

fn invalid(len: usize) -> Decoded {
    Decoded::Invalid {
        len,
        requeue: [0; MAX_BYTES_PER_CHAR],
        requeue_len: 0,
    }
}

fn invalid_requeue(len: usize, bytes: &[u8]) -> Decoded {
    let mut requeue = [0; MAX_BYTES_PER_CHAR];
    requeue[..bytes.len()].copy_from_slice(bytes);
    Decoded::Invalid {
        len,
        requeue,
        requeue_len: bytes.len(),
    }
}

/// Incremental decoder for one of the five supported encodings
///
/// The decoder is fed one byte at a time and buffers incomplete sequences
/// internally, so input may be cut at arbitrary byte boundaries. Invalid
/// input is reported as maximal invalid subparts, which makes U+FFFD
/// substitution by the caller conform to the Unicode recommendation.
#[derive(Debug)]
pub(crate) struct Decoder {
    encoding: Encoding,
    /// Buffered bytes of the incomplete sequence, including the bytes of a
    /// pending UTF-16 high surrogate
    buf: [u8; MAX_BYTES_PER_CHAR],
    len: usize,
}

impl Decoder {
    pub(crate) fn new(encoding: Encoding) -> Self {
        Decoder {
            encoding,
            buf: [0; MAX_BYTES_PER_CHAR],
            len: 0,
        }
    }

    /// Number of buffered bytes belonging to the incomplete sequence
    pub(crate) fn pending(&self) -> usize {
        self.len
    }

    pub(crate) fn feed(&mut self, b: u8) -> Decoded {
        match self.encoding {
            Encoding::Utf8 => self.feed_utf8(b),
            Encoding::Utf16Le | Encoding::Utf16Be => self.feed_utf16(b),
            Encoding::Utf32Le | Encoding::Utf32Be => self.feed_utf32(b),
        }
    }

    /// Reports a trailing incomplete sequence at the end of input
    ///
    /// Returns the byte length of the pending data, which forms an invalid
    /// subpart because no continuation can arrive anymore.
    pub(crate) fn finish(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let len = self.len;
        self.len = 0;
        Some(len)
    }

    fn push(&mut self, b: u8) {
        self.buf[self.len] = b;
        self.len += 1;
    }

    fn feed_utf8(&mut self, b: u8) -> Decoded {
        if self.len == 0 {
            return match b {
                0x00..=0x7F => Decoded::Codepoint {
                    c: b as char,
                    len: 1,
                },
                0xC2..=0xDF | 0xE0..=0xEF | 0xF0..=0xF4 => {
                    self.push(b);
                    Decoded::Pending
                }
                // continuation byte, overlong 2-byte start (C0/C1) or byte
                // which can never appear in UTF-8 (F5..FF)
                _ => invalid(1),
            };
        }

        // Continuation ranges per Unicode Table 3-7. Constraining the second
        // byte here (instead of validating the complete sequence at the end)
        // makes the maximal-subpart boundaries exact: after `E0` the byte `80`
        // cannot continue any valid sequence, so `E0` alone is the subpart.
        let valid_continuation = match (self.buf[0], self.len) {
            (0xE0, 1) => matches!(b, 0xA0..=0xBF),
            (0xED, 1) => matches!(b, 0x80..=0x9F),
            (0xF0, 1) => matches!(b, 0x90..=0xBF),
            (0xF4, 1) => matches!(b, 0x80..=0x8F),
            _ => (b & CONT_MASK) == 0b1000_0000,
        };
        if !valid_continuation {
            let len = self.len;
            self.len = 0;
            return invalid_requeue(len, &[b]);
        }

        self.push(b);
        let needed = if self.buf[0] & _2BYTE_MASK == 0b1100_0000 {
            2
        } else if self.buf[0] & _3BYTE_MASK == 0b1110_0000 {
            3
        } else {
            4
        };
        if self.len < needed {
            return Decoded::Pending;
        }

        let c = match needed {
            2 => u32::from(self.buf[0] & _2BYTE_MASK_VAL) << 6 | u32::from(self.buf[1] & CONT_MASK_VAL),
            3 => {
                u32::from(self.buf[0] & _3BYTE_MASK_VAL) << 12
                    | u32::from(self.buf[1] & CONT_MASK_VAL) << 6
                    | u32::from(self.buf[2] & CONT_MASK_VAL)
            }
            _ => {
                u32::from(self.buf[0] & _4BYTE_MASK_VAL) << 18
                    | u32::from(self.buf[1] & CONT_MASK_VAL) << 12
                    | u32::from(self.buf[2] & CONT_MASK_VAL) << 6
                    | u32::from(self.buf[3] & CONT_MASK_VAL)
            }
        };
        self.len = 0;
        // overlong encodings, surrogates and out-of-range values were already
        // excluded by the leading-byte and second-byte range checks
        Decoded::Codepoint {
            c: char::from_u32(c).unwrap(),
            len: needed,
        }
    }

    fn feed_utf16(&mut self, b: u8) -> Decoded {
        self.push(b);
        // wait for a complete 2-byte unit (4 bytes buffered while a high
        // surrogate is pending)
        if self.len % 2 != 0 {
            return Decoded::Pending;
        }

        let unit_bytes = [self.buf[self.len - 2], self.buf[self.len - 1]];
        let unit = match self.encoding {
            Encoding::Utf16Le => u16::from_le_bytes(unit_bytes),
            _ => u16::from_be_bytes(unit_bytes),
        };

        if self.len == 2 {
            if is_utf16_high_surrogate(unit) {
                return Decoded::Pending;
            }
            self.len = 0;
            if is_utf16_low_surrogate(unit) {
                // low surrogate without preceding high surrogate
                return invalid(2);
            }
            return Decoded::Codepoint {
                c: char::from_u32(u32::from(unit)).unwrap(),
                len: 2,
            };
        }

        // a high surrogate is pending
        let high = match self.encoding {
            Encoding::Utf16Le => u16::from_le_bytes([self.buf[0], self.buf[1]]),
            _ => u16::from_be_bytes([self.buf[0], self.buf[1]]),
        };
        self.len = 0;
        if is_utf16_low_surrogate(unit) {
            Decoded::Codepoint {
                c: combine_surrogate_pair(high, unit),
                len: 4,
            }
        } else {
            // the high surrogate alone is the invalid subpart; the unit which
            // followed it starts a fresh sequence
            invalid_requeue(2, &unit_bytes)
        }
    }

    fn feed_utf32(&mut self, b: u8) -> Decoded {
        self.push(b);
        if self.len < 4 {
            return Decoded::Pending;
        }
        let c = match self.encoding {
            Encoding::Utf32Le => u32::from_le_bytes(self.buf),
            _ => u32::from_be_bytes(self.buf),
        };
        self.len = 0;
        match char::from_u32(c) {
            // from_u32 rejects surrogate values and values above U+10FFFF
            Some(c) => Decoded::Codepoint { c, len: 4 },
            None => invalid(4),
        }
    }
}

/// Appends the code units of `c` in `encoding` to `out`
pub(crate) fn encode(c: char, encoding: Encoding, out: &mut Vec<u8>) {
    match encoding {
        Encoding::Utf8 => {
            let mut buf = [0; MAX_BYTES_PER_CHAR];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        Encoding::Utf16Le => {
            let mut buf = [0; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.extend_from_slice(&unit.to_le_bytes());
            }
        }
        Encoding::Utf16Be => {
            let mut buf = [0; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.extend_from_slice(&unit.to_be_bytes());
            }
        }
        Encoding::Utf32Le => out.extend_from_slice(&(c as u32).to_le_bytes()),
        Encoding::Utf32Be => out.extend_from_slice(&(c as u32).to_be_bytes()),
    }
}

/// Byte length of `c` when encoded in `encoding`
pub(crate) fn encoded_len(c: char, encoding: Encoding) -> usize {
    match encoding {
        Encoding::Utf8 => c.len_utf8(),
        Encoding::Utf16Le | Encoding::Utf16Be => c.len_utf16() * 2,
        Encoding::Utf32Le | Encoding::Utf32Be => 4,
    }
}

/// Inspects the first up-to-four bytes of a document to determine its encoding
///
/// Detection first recognizes byte order marks and then falls back to the
/// zero-byte pattern of the prefix, exploiting that the first character of any
/// JSON document is ASCII. `None` means the prefix matches no supported
/// encoding.
pub(crate) fn detect_encoding(prefix: &[u8]) -> Option<Encoding> {
    if prefix.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        return Some(Encoding::Utf32Be);
    }
    if prefix.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        return Some(Encoding::Utf32Le);
    }
    if prefix.starts_with(&[0xFE, 0xFF]) {
        return Some(Encoding::Utf16Be);
    }
    if prefix.starts_with(&[0xFF, 0xFE]) {
        return Some(Encoding::Utf16Le);
    }
    if prefix.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some(Encoding::Utf8);
    }

    let zero: Vec<bool> = prefix.iter().map(|&b| b == 0).collect();
    match zero.as_slice() {
        [] => None,
        // a single byte can at most distinguish "starts with ASCII"
        [false] => Some(Encoding::Utf8),
        [true] => Some(Encoding::Utf16Be),
        [false, false, ..] => Some(Encoding::Utf8),
        [false, true] | [false, true, false, ..] => Some(Encoding::Utf16Le),
        [false, true, true] => Some(Encoding::Utf16Le),
        [false, true, true, true, ..] => Some(Encoding::Utf32Le),
        // nz 00 00 nz matches no encoding in which the first character is ASCII
        [false, true, true, false, ..] => None,
        [true, false, ..] => Some(Encoding::Utf16Be),
        [true, true, true, false, ..] => Some(Encoding::Utf32Be),
        [true, true, ..] => None,
    }
}
