//! Streaming implementation of the JSON writer

use std::io::Write;

use super::{WriterError, WriterSettings};
use crate::encoding::{self, Decoded, Decoder, Encoding};
use crate::json_number::{is_valid_decimal_number, is_valid_hex_number};
use crate::parser::SpecialNumber;

/// Wraps the underlying `Write` to ensure all writing calls use `write_all`
#[derive(Debug)]
struct Writer<W: Write>(W);
impl<W: Write> Writer<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), WriterError> {
        // write_all retries on `ErrorKind::Interrupted`, as desired
        self.0
            .write_all(bytes)
            .map_err(|e| WriterError::AbortedByHandler {
                kind: e.kind(),
                message: e.to_string(),
            })
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum StackValue {
    Array,
    Object,
}

/// What the JSON grammar allows to be written next
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum WriteState {
    /// At the top level, no value written yet
    BeforeDocument,
    /// The single top-level value is complete
    AfterDocument,
    /// After `{`: a member name or `}`
    BeforeFirstName,
    /// After a member name: `:`
    AfterName,
    /// After `:`: the member value
    BeforeMemberValue,
    /// After a member value: `,` or `}`
    AfterMemberValue,
    /// After a `,` in an object: the next member name
    BeforeName,
    /// After `[`: an item or `]`
    BeforeFirstItem,
    /// After an item: `,` or `]`
    AfterItem,
    /// After a `,` in an array: the next item
    BeforeItem,
}

/// A streaming JSON writer driven by parser-style events
///
/// Every write primitive is validated against the JSON grammar before any
/// bytes are produced, so the output is well-formed whenever all writes
/// succeed. Punctuation is explicit: the client writes commas and colons
/// itself, which together with [`write_space`](Self::write_space) and
/// [`write_new_line`](Self::write_new_line) gives it full control over the
/// output layout.
///
/// This JSON writer does not perform any internal buffering across
/// primitives. Depending on the type of the underlying `Write` it is
/// therefore recommended to use a [`std::io::BufWriter`], for example when
/// writing to a file or a network connection.
///
/// # Examples
/// ```
/// use eventson::writer::EventWriter;
///
/// let mut output = Vec::<u8>::new();
/// let mut writer = EventWriter::new(&mut output);
/// writer.write_start_array()?;
/// writer.write_number("1")?;
/// writer.write_comma()?;
/// writer.write_space(1)?;
/// writer.write_boolean(false)?;
/// writer.write_end_array()?;
/// assert_eq!(String::from_utf8(output)?, "[1, false]");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct EventWriter<W: Write> {
    writer: Writer<W>,
    settings: WriterSettings,
    stack: Vec<StackValue>,
    state: WriteState,
    /// The first error; returned again by every subsequent write
    error: Option<WriterError>,
    /// Per-primitive output buffer; a primitive emits either its complete
    /// bytes or nothing
    buf: Vec<u8>,
}

impl<W: Write> EventWriter<W> {
    /// Creates a writer with [default settings](WriterSettings::default)
    pub fn new(writer: W) -> Self {
        EventWriter::new_custom(writer, WriterSettings::default())
    }

    /// Creates a writer with custom settings
    pub fn new_custom(writer: W, settings: WriterSettings) -> Self {
        Self {
            writer: Writer(writer),
            settings,
            stack: Vec::with_capacity(16),
            state: WriteState::BeforeDocument,
            error: None,
            buf: Vec::with_capacity(128),
        }
    }

    /// The settings this writer was created with
    pub fn settings(&self) -> &WriterSettings {
        &self.settings
    }

    /// The error which poisoned this writer, if any
    pub fn error(&self) -> Option<&WriterError> {
        self.error.as_ref()
    }

    /// Returns the writer to its post-construction state, keeping the sink
    /// and the settings
    ///
    /// This allows writing another document, whether the previous one was
    /// completed, failed or abandoned halfway.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.state = WriteState::BeforeDocument;
        self.error = None;
    }

    /// Consumes the writer and returns the underlying sink
    pub fn into_inner(self) -> W {
        self.writer.0
    }

    fn guarded(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<(), WriterError>,
    ) -> Result<(), WriterError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        let result = f(self);
        if let Err(e) = &result {
            self.error = Some(e.clone());
        }
        result
    }

    fn in_value_position(&self) -> bool {
        matches!(
            self.state,
            WriteState::BeforeDocument
                | WriteState::BeforeMemberValue
                | WriteState::BeforeFirstItem
                | WriteState::BeforeItem
        )
    }

    fn in_name_position(&self) -> bool {
        matches!(self.state, WriteState::BeforeFirstName | WriteState::BeforeName)
    }

    fn require_value_position(&self) -> Result<(), WriterError> {
        if self.in_value_position() {
            Ok(())
        } else {
            Err(WriterError::UnexpectedWrite)
        }
    }

    /// State after a complete value at the current nesting
    fn after_value(&mut self) {
        self.state = match self.stack.last() {
            None => WriteState::AfterDocument,
            Some(StackValue::Object) => WriteState::AfterMemberValue,
            Some(StackValue::Array) => WriteState::AfterItem,
        };
    }

    /// Encodes the ASCII text in the output encoding and emits it
    fn emit_ascii(&mut self, text: &str) -> Result<(), WriterError> {
        self.buf.clear();
        for c in text.chars() {
            encoding::encode(c, self.settings.output_encoding, &mut self.buf);
        }
        self.writer.write(&self.buf)
    }

    /// Writes the `null` literal
    pub fn write_null(&mut self) -> Result<(), WriterError> {
        self.guarded(|w| {
            w.require_value_position()?;
            w.emit_ascii("null")?;
            w.after_value();
            Ok(())
        })
    }

    /// Writes `true` or `false`
    pub fn write_boolean(&mut self, value: bool) -> Result<(), WriterError> {
        self.guarded(|w| {
            w.require_value_position()?;
            w.emit_ascii(if value { "true" } else { "false" })?;
            w.after_value();
            Ok(())
        })
    }

    /// Writes a member name or string value from raw bytes in the given
    /// encoding
    ///
    /// In an object, a string written where a member name is expected *is*
    /// the member name; everywhere else it is a string value. The data is
    /// transcoded to the output encoding; `"`, `\`, control characters,
    /// U+2028/U+2029 and Unicode noncharacters are written as escape
    /// sequences.
    pub fn write_string(&mut self, bytes: &[u8], encoding: Encoding) -> Result<(), WriterError> {
        self.guarded(|w| {
            let name_position = w.in_name_position();
            if !name_position && !w.in_value_position() {
                return Err(WriterError::UnexpectedWrite);
            }
            w.buf.clear();
            w.transcode_string(bytes, encoding)?;
            w.writer.write(&w.buf)?;
            if name_position {
                w.state = WriteState::AfterName;
            } else {
                w.after_value();
            }
            Ok(())
        })
    }

    /// Writes a member name or string value from a `&str`
    ///
    /// Equivalent to [`write_string`](Self::write_string) with UTF-8 data.
    pub fn write_str(&mut self, value: &str) -> Result<(), WriterError> {
        self.write_string(value.as_bytes(), Encoding::Utf8)
    }

    /// Writes a number from its text representation
    ///
    /// `text` must be a valid JSON number, or a hexadecimal literal
    /// (`0x` or `0X` followed by hex digits, without sign, fraction or
    /// exponent); otherwise the write fails with
    /// [`WriterError::InvalidNumber`].
    pub fn write_number(&mut self, text: &str) -> Result<(), WriterError> {
        self.guarded(|w| {
            w.require_value_position()?;
            if !is_valid_decimal_number(text) && !is_valid_hex_number(text) {
                return Err(WriterError::InvalidNumber(text.to_owned()));
            }
            w.emit_ascii(text)?;
            w.after_value();
            Ok(())
        })
    }

    /// Writes `NaN`, `Infinity` or `-Infinity`
    ///
    /// These literals are not valid JSON; a parser only accepts them with
    /// the corresponding extension enabled.
    pub fn write_special_number(&mut self, value: SpecialNumber) -> Result<(), WriterError> {
        self.guarded(|w| {
            w.require_value_position()?;
            let text = match value {
                SpecialNumber::NaN => "NaN",
                SpecialNumber::Infinity => "Infinity",
                SpecialNumber::NegativeInfinity => "-Infinity",
            };
            w.emit_ascii(text)?;
            w.after_value();
            Ok(())
        })
    }

    /// Writes the `{` starting an object
    pub fn write_start_object(&mut self) -> Result<(), WriterError> {
        self.guarded(|w| {
            w.require_value_position()?;
            w.emit_ascii("{")?;
            w.stack.push(StackValue::Object);
            w.state = WriteState::BeforeFirstName;
            Ok(())
        })
    }

    /// Writes the `}` ending the current object
    pub fn write_end_object(&mut self) -> Result<(), WriterError> {
        self.guarded(|w| {
            if !matches!(
                w.state,
                WriteState::BeforeFirstName | WriteState::AfterMemberValue
            ) {
                return Err(WriterError::UnexpectedWrite);
            }
            w.emit_ascii("}")?;
            w.stack.pop();
            w.after_value();
            Ok(())
        })
    }

    /// Writes the `[` starting an array
    pub fn write_start_array(&mut self) -> Result<(), WriterError> {
        self.guarded(|w| {
            w.require_value_position()?;
            w.emit_ascii("[")?;
            w.stack.push(StackValue::Array);
            w.state = WriteState::BeforeFirstItem;
            Ok(())
        })
    }

    /// Writes the `]` ending the current array
    pub fn write_end_array(&mut self) -> Result<(), WriterError> {
        self.guarded(|w| {
            if !matches!(w.state, WriteState::BeforeFirstItem | WriteState::AfterItem) {
                return Err(WriterError::UnexpectedWrite);
            }
            w.emit_ascii("]")?;
            w.stack.pop();
            w.after_value();
            Ok(())
        })
    }

    /// Writes the `:` between a member name and its value
    pub fn write_colon(&mut self) -> Result<(), WriterError> {
        self.guarded(|w| {
            if w.state != WriteState::AfterName {
                return Err(WriterError::UnexpectedWrite);
            }
            w.emit_ascii(":")?;
            w.state = WriteState::BeforeMemberValue;
            Ok(())
        })
    }

    /// Writes the `,` between two members or items
    pub fn write_comma(&mut self) -> Result<(), WriterError> {
        self.guarded(|w| {
            let next = match w.state {
                WriteState::AfterMemberValue => WriteState::BeforeName,
                WriteState::AfterItem => WriteState::BeforeItem,
                _ => return Err(WriterError::UnexpectedWrite),
            };
            w.emit_ascii(",")?;
            w.state = next;
            Ok(())
        })
    }

    /// Writes `count` space characters; legal at any position
    pub fn write_space(&mut self, count: usize) -> Result<(), WriterError> {
        self.guarded(|w| {
            w.buf.clear();
            for _ in 0..count {
                encoding::encode(' ', w.settings.output_encoding, &mut w.buf);
            }
            w.writer.write(&w.buf)
        })
    }

    /// Writes a line break; legal at any position
    ///
    /// Emits `LF`, or `CR LF` when [`WriterSettings::use_crlf`] is set.
    pub fn write_new_line(&mut self) -> Result<(), WriterError> {
        self.guarded(|w| {
            let text = if w.settings.use_crlf { "\r\n" } else { "\n" };
            w.emit_ascii(text)
        })
    }

    // ------------------------------------------------------------------
    // String transcoding and escaping
    // ------------------------------------------------------------------

    /// Decodes `bytes` per `encoding` and appends the quoted, escaped and
    /// re-encoded string to the output buffer
    fn transcode_string(&mut self, bytes: &[u8], encoding: Encoding) -> Result<(), WriterError> {
        self.push_output_char('"');
        let mut decoder = Decoder::new(encoding);
        let mut queue: Vec<u8> = Vec::new();
        let mut i = 0;
        loop {
            let b = if let Some(&b) = queue.first() {
                queue.remove(0);
                b
            } else if i < bytes.len() {
                let b = bytes[i];
                i += 1;
                b
            } else {
                break;
            };

            match decoder.feed(b) {
                Decoded::Pending => {}
                Decoded::Codepoint { c, .. } => self.push_string_char(c),
                Decoded::Invalid {
                    requeue,
                    requeue_len,
                    ..
                } => {
                    self.push_replacement()?;
                    // the requeued bytes start a fresh sequence
                    for &b in requeue[..requeue_len].iter().rev() {
                        queue.insert(0, b);
                    }
                }
            }
        }
        if decoder.finish().is_some() {
            self.push_replacement()?;
        }
        self.push_output_char('"');
        Ok(())
    }

    /// Handles one maximal invalid subpart of the string data
    fn push_replacement(&mut self) -> Result<(), WriterError> {
        if !self.settings.replace_invalid_encoding_sequences {
            return Err(WriterError::InvalidEncodingSequence);
        }
        // replacements are written as escapes to make the substitution
        // visible even after the output is decoded
        self.push_unicode_escape(0xFFFD);
        Ok(())
    }

    fn push_output_char(&mut self, c: char) {
        encoding::encode(c, self.settings.output_encoding, &mut self.buf);
    }

    fn push_string_char(&mut self, c: char) {
        if !needs_escape(c) {
            self.push_output_char(c);
            return;
        }
        let short = match c {
            '"' => Some("\\\""),
            '\\' => Some("\\\\"),
            '\u{0008}' => Some("\\b"),
            '\u{000C}' => Some("\\f"),
            '\n' => Some("\\n"),
            '\r' => Some("\\r"),
            '\t' => Some("\\t"),
            _ => None,
        };
        match short {
            Some(escape) => {
                for e in escape.chars() {
                    self.push_output_char(e);
                }
            }
            None => {
                let c = c as u32;
                if c < 0x10000 {
                    self.push_unicode_escape(c as u16);
                } else {
                    // encode as a surrogate pair of escapes
                    let c = c - 0x10000;
                    self.push_unicode_escape((0xD800 + (c >> 10)) as u16);
                    self.push_unicode_escape((0xDC00 + (c & 0x3FF)) as u16);
                }
            }
        }
    }

    fn push_unicode_escape(&mut self, value: u16) {
        const HEX_DIGITS: [u8; 16] = *b"0123456789ABCDEF";
        self.push_output_char('\\');
        self.push_output_char('u');
        for shift in [12, 8, 4, 0] {
            self.push_output_char(HEX_DIGITS[(value >> shift) as usize & 0xF] as char);
        }
    }
}

/// Whether the character must be written as an escape sequence
///
/// Beyond the characters the JSON specification requires to be escaped this
/// covers DELETE, the Javascript line separators U+2028/U+2029 (so the output
/// can be embedded in Javascript source) and Unicode noncharacters, using the
/// conservative low-byte test which also catches the per-plane `..FFFE` and
/// `..FFFF` values.
fn needs_escape(c: char) -> bool {
    let c = c as u32;
    c < 0x20
        || c == u32::from(b'"')
        || c == u32::from(b'\\')
        || c == 0x7F
        || c == 0x2028
        || c == 0x2029
        || (0xFDD0..=0xFDEF).contains(&c)
        || (c & 0xFE) == 0xFE
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn utf8_writer() -> EventWriter<Vec<u8>> {
        EventWriter::new(Vec::new())
    }

    fn written(writer: EventWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn literals() -> TestResult {
        let mut writer = utf8_writer();
        writer.write_start_array()?;
        writer.write_boolean(true)?;
        writer.write_comma()?;
        writer.write_boolean(false)?;
        writer.write_comma()?;
        writer.write_null()?;
        writer.write_end_array()?;
        assert_eq!(written(writer), "[true,false,null]");
        Ok(())
    }

    #[test]
    fn objects() -> TestResult {
        let mut writer = utf8_writer();
        writer.write_start_object()?;
        writer.write_str("a")?;
        writer.write_colon()?;
        writer.write_start_object()?;
        writer.write_end_object()?;
        writer.write_comma()?;
        writer.write_str("b")?;
        writer.write_colon()?;
        writer.write_number("0")?;
        writer.write_end_object()?;
        assert_eq!(written(writer), "{\"a\":{},\"b\":0}");
        Ok(())
    }

    #[test]
    fn arrays() -> TestResult {
        let mut writer = utf8_writer();
        writer.write_start_array()?;
        writer.write_start_array()?;
        writer.write_end_array()?;
        writer.write_comma()?;
        writer.write_number("0")?;
        writer.write_comma()?;
        writer.write_str("a")?;
        writer.write_end_array()?;
        assert_eq!(written(writer), "[[],0,\"a\"]");
        Ok(())
    }

    #[test]
    fn layout_primitives() -> TestResult {
        let mut writer = utf8_writer();
        writer.write_start_object()?;
        writer.write_new_line()?;
        writer.write_space(2)?;
        writer.write_str("a")?;
        writer.write_colon()?;
        writer.write_space(1)?;
        writer.write_number("1")?;
        writer.write_new_line()?;
        writer.write_end_object()?;
        assert_eq!(written(writer), "{\n  \"a\": 1\n}");

        let mut writer = EventWriter::new_custom(
            Vec::new(),
            WriterSettings {
                use_crlf: true,
                ..Default::default()
            },
        );
        writer.write_new_line()?;
        assert_eq!(written(writer), "\r\n");
        Ok(())
    }

    #[test]
    fn string_escapes() -> TestResult {
        let mut writer = utf8_writer();
        writer.write_str("\\\"/\t\n\r\u{000C}\u{0008}")?;
        assert_eq!(written(writer), "\"\\\\\\\"/\\t\\n\\r\\f\\b\"");

        // control characters and DELETE as \u escapes
        let mut writer = utf8_writer();
        writer.write_str("\u{0000}\u{001F}\u{007F}")?;
        assert_eq!(written(writer), "\"\\u0000\\u001F\\u007F\"");

        // Javascript line separators
        let mut writer = utf8_writer();
        writer.write_str("\u{2028}\u{2029}")?;
        assert_eq!(written(writer), "\"\\u2028\\u2029\"");

        // noncharacters, including non-BMP ones as surrogate pair escapes
        let mut writer = utf8_writer();
        writer.write_str("\u{FDD0}\u{FFFE}\u{FFFF}\u{1D1FE}")?;
        assert_eq!(
            written(writer),
            "\"\\uFDD0\\uFFFE\\uFFFF\\uD834\\uDDFE\""
        );

        // a pre-existing replacement character passes through unescaped
        let mut writer = utf8_writer();
        writer.write_str("\u{FFFD}")?;
        assert_eq!(written(writer), "\"\u{FFFD}\"");
        Ok(())
    }

    #[test]
    fn string_transcoding() -> TestResult {
        // U+0061, U+00A9, U+4E01, U+1F004 from UTF-16BE data
        let utf16be = b"\x00\x61\x00\xA9\x4E\x01\xD8\x3C\xDC\x04";
        let mut writer = utf8_writer();
        writer.write_string(utf16be, Encoding::Utf16Be)?;
        assert_eq!(written(writer), "\"a\u{A9}\u{4E01}\u{1F004}\"");

        let mut writer = EventWriter::new_custom(
            Vec::new(),
            WriterSettings {
                output_encoding: Encoding::Utf16Le,
                ..Default::default()
            },
        );
        writer.write_string(utf16be, Encoding::Utf16Be)?;
        assert_eq!(
            writer.into_inner(),
            b"\x22\x00\x61\x00\xA9\x00\x01\x4E\x3C\xD8\x04\xDC\x22\x00"
        );
        Ok(())
    }

    #[test]
    fn invalid_string_data() {
        // truncated UTF-8 sequence
        let mut writer = utf8_writer();
        assert_eq!(
            writer.write_string(b"abc\xC2", Encoding::Utf8),
            Err(WriterError::InvalidEncodingSequence)
        );
        // nothing was emitted
        assert_eq!(writer.into_inner(), b"");
    }

    #[test]
    fn replaced_string_data() -> TestResult {
        let settings = || WriterSettings {
            replace_invalid_encoding_sequences: true,
            ..Default::default()
        };
        let mut writer = EventWriter::new_custom(Vec::new(), settings());
        writer.write_string(b"abc\xC2", Encoding::Utf8)?;
        assert_eq!(written(writer), "\"abc\\uFFFD\"");

        // maximal subpart followed by a surviving valid character
        let mut writer = EventWriter::new_custom(Vec::new(), settings());
        writer.write_string(b"abc\xC2\x7F", Encoding::Utf8)?;
        assert_eq!(written(writer), "\"abc\\uFFFD\\u007F\"");

        // the Unicode 5.2.0 replacement example
        let mut writer = EventWriter::new_custom(Vec::new(), settings());
        writer.write_string(b"\x61\xF1\x80\x80\xE1\x80\xC2\x62\x80\x63\x80\xBF\x64", Encoding::Utf8)?;
        assert_eq!(
            written(writer),
            "\"a\\uFFFD\\uFFFD\\uFFFDb\\uFFFDc\\uFFFD\\uFFFDd\""
        );

        // unpaired UTF-16 surrogates
        let mut writer = EventWriter::new_custom(Vec::new(), settings());
        writer.write_string(b"_\x00\x00\xD8_\x00", Encoding::Utf16Le)?;
        assert_eq!(written(writer), "\"_\\uFFFD_\"");
        Ok(())
    }

    #[test]
    fn numbers() -> TestResult {
        let mut writer = utf8_writer();
        writer.write_number("-0.1e+2")?;
        assert_eq!(written(writer), "-0.1e+2");

        for text in ["-", " ", " 1", "1 ", "01", "1x", "1.", "1e", "1e+", "1e-", "1ex"] {
            let mut writer = utf8_writer();
            assert_eq!(
                writer.write_number(text),
                Err(WriterError::InvalidNumber(text.to_owned())),
                "input: {text}"
            );
            assert_eq!(writer.into_inner(), b"", "input: {text}");
        }
        Ok(())
    }

    #[test]
    fn hex_numbers() -> TestResult {
        let mut writer = utf8_writer();
        writer.write_number("0x0123456789ABCDEF")?;
        assert_eq!(written(writer), "0x0123456789ABCDEF");

        for text in ["0x", "0X", "0x1.", "0x1.0", "0x1e+", "0x1e+1", "-0x1"] {
            let mut writer = utf8_writer();
            assert_eq!(
                writer.write_number(text),
                Err(WriterError::InvalidNumber(text.to_owned())),
                "input: {text}"
            );
        }
        Ok(())
    }

    #[test]
    fn special_numbers() -> TestResult {
        let mut writer = utf8_writer();
        writer.write_start_array()?;
        writer.write_special_number(SpecialNumber::NaN)?;
        writer.write_comma()?;
        writer.write_special_number(SpecialNumber::Infinity)?;
        writer.write_comma()?;
        writer.write_special_number(SpecialNumber::NegativeInfinity)?;
        writer.write_end_array()?;
        assert_eq!(written(writer), "[NaN,Infinity,-Infinity]");
        Ok(())
    }

    #[test]
    fn output_encodings() -> TestResult {
        let cases: [(Encoding, &[u8]); 5] = [
            (Encoding::Utf8, b"null"),
            (Encoding::Utf16Le, b"n\x00u\x00l\x00l\x00"),
            (Encoding::Utf16Be, b"\x00n\x00u\x00l\x00l"),
            (Encoding::Utf32Le, b"n\x00\x00\x00u\x00\x00\x00l\x00\x00\x00l\x00\x00\x00"),
            (Encoding::Utf32Be, b"\x00\x00\x00n\x00\x00\x00u\x00\x00\x00l\x00\x00\x00l"),
        ];
        for (encoding, expected) in cases {
            let mut writer = EventWriter::new_custom(
                Vec::new(),
                WriterSettings {
                    output_encoding: encoding,
                    ..Default::default()
                },
            );
            writer.write_null()?;
            assert_eq!(writer.into_inner(), expected, "encoding: {encoding}");
        }
        Ok(())
    }

    #[test]
    fn grammar_violations() {
        // colon outside an object
        let mut writer = utf8_writer();
        assert_eq!(writer.write_colon(), Err(WriterError::UnexpectedWrite));

        // comma before any value
        let mut writer = utf8_writer();
        writer.write_start_array().unwrap();
        assert_eq!(writer.write_comma(), Err(WriterError::UnexpectedWrite));

        // value in name position
        let mut writer = utf8_writer();
        writer.write_start_object().unwrap();
        assert_eq!(writer.write_number("1"), Err(WriterError::UnexpectedWrite));

        // member name without colon before the value
        let mut writer = utf8_writer();
        writer.write_start_object().unwrap();
        writer.write_str("a").unwrap();
        assert_eq!(writer.write_null(), Err(WriterError::UnexpectedWrite));

        // closer of the wrong kind
        let mut writer = utf8_writer();
        writer.write_start_array().unwrap();
        assert_eq!(writer.write_end_object(), Err(WriterError::UnexpectedWrite));

        // ending an object while a member value is still expected
        let mut writer = utf8_writer();
        writer.write_start_object().unwrap();
        writer.write_str("a").unwrap();
        writer.write_colon().unwrap();
        assert_eq!(writer.write_end_object(), Err(WriterError::UnexpectedWrite));

        // second top-level value
        let mut writer = utf8_writer();
        writer.write_null().unwrap();
        assert_eq!(writer.write_null(), Err(WriterError::UnexpectedWrite));
    }

    #[test]
    fn errors_are_sticky() {
        let mut writer = utf8_writer();
        let error = writer.write_colon().unwrap_err();
        assert_eq!(error, WriterError::UnexpectedWrite);
        // even an otherwise legal write now fails with the first error
        assert_eq!(writer.write_null(), Err(error.clone()));
        assert_eq!(writer.error(), Some(&error));
        // space and newline are no exception
        assert_eq!(writer.write_space(1), Err(error));
    }

    #[test]
    fn reset_allows_reuse() -> TestResult {
        let mut writer = utf8_writer();
        writer.write_null()?;
        assert_eq!(writer.write_null(), Err(WriterError::UnexpectedWrite));
        writer.reset();
        writer.write_boolean(true)?;
        assert_eq!(written(writer), "nulltrue");
        Ok(())
    }

    #[test]
    fn failing_sink() {
        /// Sink which refuses all data
        struct RefusingSink;
        impl Write for RefusingSink {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(
                    std::io::ErrorKind::WouldBlock,
                    "custom-error",
                ))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = EventWriter::new(RefusingSink);
        match writer.write_null() {
            Err(WriterError::AbortedByHandler { kind, .. }) => {
                assert_eq!(kind, std::io::ErrorKind::WouldBlock);
            }
            r => panic!("Unexpected result: {r:?}"),
        }
        // the grammar state was not advanced past the failed write, but the
        // writer is poisoned anyway
        assert!(writer.error().is_some());
    }
}
