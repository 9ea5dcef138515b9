//! Streaming push-based implementation of the JSON parser

use std::collections::BTreeSet;

use super::{
    Continuation, Location, MemberOutcome, NumberAttributes, ParseError, ParseErrorKind,
    ParseHandler, ParserSettings, SpecialNumber, StringAttributes, Token,
};
use crate::encoding::{self, Decoded, Decoder, Encoding};

/// Number of bytes inspected for automatic encoding detection
const DETECTION_BYTES: usize = 4;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum NumberState {
    /// Consumed the leading `-`
    Minus,
    /// Consumed a leading `0` (possibly after `-`)
    Zero,
    /// Inside the integer digits
    Integer,
    /// Consumed the decimal point
    Dot,
    /// Inside the fraction digits
    Fraction,
    /// Consumed `e` or `E`
    ExponentLetter,
    /// Consumed the exponent sign
    ExponentSign,
    /// Inside the exponent digits
    ExponentDigits,
    /// Consumed `0x` or `0X`
    HexPrefix,
    /// Inside the hex digits
    HexDigits,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum StringState {
    Plain,
    /// Consumed a backslash
    Escape,
    /// Inside the four hex digits of a Unicode escape
    UnicodeEscape { digits: u8, value: u16 },
    /// A high surrogate escape was read; the next character must start the
    /// escape of the matching low surrogate
    HighSurrogate { high: u16 },
    /// Between the backslash and the `u` of the low surrogate escape
    HighSurrogateEscape { high: u16 },
    /// Inside the four hex digits of the low surrogate escape
    LowUnicodeEscape { high: u16, digits: u8, value: u16 },
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum LiteralToken {
    Null,
    True,
    False,
    NaN,
    Infinity,
    NegativeInfinity,
}

impl LiteralToken {
    fn text(self) -> &'static [u8] {
        match self {
            LiteralToken::Null => b"null",
            LiteralToken::True => b"true",
            LiteralToken::False => b"false",
            LiteralToken::NaN => b"NaN",
            LiteralToken::Infinity => b"Infinity",
            LiteralToken::NegativeInfinity => b"-Infinity",
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum Lexer {
    /// Between tokens
    Ready,
    /// Inside a keyword; `pos` characters are already matched
    Literal { token: LiteralToken, pos: usize },
    /// A keyword was fully matched; the next character must be a token
    /// terminator for the keyword to be recognized
    LiteralEnd { token: LiteralToken },
    Number(NumberState),
    Str(StringState),
    /// Consumed a `/` which may start a comment
    CommentStart,
    LineComment,
    BlockComment,
    /// Inside a block comment, directly after a `*`
    BlockCommentStar,
}

/// Token classes handed from the lexer to the grammar
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum Tok {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Comma,
    Colon,
    Null,
    Boolean(bool),
    Special(SpecialNumber),
    /// Text and attributes are in the parser's number buffer
    Number,
    /// Re-encoded data and attributes are in the parser's string buffer
    Str,
}

impl Tok {
    fn is_value(self) -> bool {
        matches!(
            self,
            Tok::ObjectStart
                | Tok::ArrayStart
                | Tok::Null
                | Tok::Boolean(_)
                | Tok::Special(_)
                | Tok::Number
                | Tok::Str
        )
    }
}

/// Grammar sub-state of one open container
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum FrameState {
    /// After `{`: expecting the first member name or `}`
    ObjectEmpty,
    /// After a member name: expecting `:`
    ObjectAfterName,
    /// After `:`: expecting the member value
    ObjectBeforeValue,
    /// After a member value: expecting `,` or `}`
    ObjectAfterValue,
    /// After a `,` in an object: expecting the next member name
    ObjectAfterComma,
    /// After `[`: expecting the first item or `]`
    ArrayEmpty,
    /// After an item: expecting `,` or `]`
    ArrayAfterValue,
    /// After a `,` in an array: expecting the next item
    ArrayAfterComma,
}

#[derive(Debug)]
struct Frame {
    state: FrameState,
    /// Member names seen so far, in the string encoding; `Some` only when
    /// duplicate tracking is enabled and this is an object frame
    member_names: Option<BTreeSet<Vec<u8>>>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
enum Phase {
    Running,
    FinishedOk,
    Failed(ParseError),
}

/// A streaming, event-driven JSON parser
///
/// Input bytes are pushed with [`parse`](Self::parse) in chunks of arbitrary
/// size; the parser holds all state needed to resume at any byte boundary,
/// even in the middle of a multi-byte character or an escape sequence. Events
/// are dispatched to the [`ParseHandler`] passed to each `parse` call.
///
/// # Security
/// The parser bounds the length of individual strings and numbers through
/// [`ParserSettings::max_string_length`] and
/// [`ParserSettings::max_number_length`], but does **not** impose a limit on
/// the input length or the container nesting depth. The parser itself does
/// not use recursive calls, but clients processing untrusted input should
/// track the depth reported in event locations and abort when it exceeds
/// their limit.
///
/// # Examples
/// ```
/// use eventson::parser::*;
///
/// struct Counter(u32);
/// impl ParseHandler for Counter {
///     fn number(&mut self, _: &Token, _: &str, _: NumberAttributes) -> Continuation {
///         self.0 += 1;
///         Continuation::Continue
///     }
/// }
///
/// let mut handler = Counter(0);
/// let mut parser = PushParser::new();
/// parser.parse(&mut handler, b"[1, 2", false)?;
/// parser.parse(&mut handler, b", 3]", true)?;
/// assert_eq!(handler.0, 3);
/// # Ok::<(), ParseError>(())
/// ```
#[derive(Debug)]
pub struct PushParser {
    settings: ParserSettings,
    phase: Phase,
    started: bool,

    /// `None` until the input encoding is known
    decoder: Option<Decoder>,
    input_encoding: Option<Encoding>,
    detect_buf: [u8; DETECTION_BYTES],
    detect_len: usize,
    encoding_announced: bool,

    /// Byte offset of the first byte of the character currently being decoded
    seq_start: u64,
    line: u64,
    column: u64,
    /// A CR was just consumed; a directly following LF is the same line break
    pending_cr: bool,
    /// No character has been decoded yet (a BOM is only recognized here)
    at_doc_start: bool,

    lexer: Lexer,
    token_start: Location,
    /// Location of the backslash of the escape sequence currently being read
    escape_start: Location,

    /// String data re-encoded in the string encoding
    string_buf: Vec<u8>,
    string_attrs: StringAttributes,
    /// Raw number text (ASCII)
    number_buf: String,
    number_attrs: NumberAttributes,

    stack: Vec<Frame>,
    /// The single top-level value has been consumed completely
    root_consumed: bool,
}

impl Default for PushParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PushParser {
    /// Creates a parser with [default settings](ParserSettings::default)
    pub fn new() -> Self {
        PushParser::new_custom(ParserSettings::default())
    }

    /// Creates a parser with custom settings
    ///
    /// The settings are fixed for the lifetime of the parser; they survive
    /// [`reset`](Self::reset).
    pub fn new_custom(settings: ParserSettings) -> Self {
        let decoder = settings.input_encoding.map(Decoder::new);
        let input_encoding = settings.input_encoding;
        PushParser {
            settings,
            phase: Phase::Running,
            started: false,
            decoder,
            input_encoding,
            detect_buf: [0; DETECTION_BYTES],
            detect_len: 0,
            encoding_announced: false,
            seq_start: 0,
            line: 0,
            column: 0,
            pending_cr: false,
            at_doc_start: true,
            lexer: Lexer::Ready,
            token_start: Location::default(),
            escape_start: Location::default(),
            string_buf: Vec::new(),
            string_attrs: StringAttributes::NONE,
            number_buf: String::new(),
            number_attrs: NumberAttributes::NONE,
            stack: Vec::with_capacity(16),
            root_consumed: false,
        }
    }

    /// Returns the parser to its post-construction state, keeping the settings
    ///
    /// After a reset the parser can be used to parse a new document, whether
    /// the previous parse finished, failed or was abandoned halfway.
    pub fn reset(&mut self) {
        *self = PushParser::new_custom(self.settings.clone());
    }

    /// The settings this parser was created with
    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    /// The input encoding, once it is known
    ///
    /// For an explicitly configured encoding this is known from the start;
    /// with auto-detection it becomes `Some` as soon as the detection bytes
    /// have been inspected.
    pub fn input_encoding(&self) -> Option<Encoding> {
        self.input_encoding
    }

    /// Whether [`parse`](Self::parse) has been called since creation or the
    /// last [`reset`](Self::reset)
    pub fn started(&self) -> bool {
        self.started
    }

    /// Whether parsing has finished, either successfully by a final push or
    /// by an error
    pub fn finished(&self) -> bool {
        !matches!(self.phase, Phase::Running)
    }

    /// The error which ended the parse, if any
    pub fn error(&self) -> Option<&ParseError> {
        match &self.phase {
            Phase::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Pushes zero or more input bytes
    ///
    /// `is_final` indicates that no more input is forthcoming; it closes any
    /// token which end-of-input can complete (numbers, keywords) and then
    /// requires the document to be complete.
    ///
    /// Events are dispatched to `handler` while the bytes are processed. The
    /// first error moves the parser into a finished state; subsequent calls
    /// return the same error without consuming input.
    ///
    /// # Panics
    /// Panics when called after a parse already finished *successfully*;
    /// use [`reset`](Self::reset) to parse another document.
    pub fn parse<H: ParseHandler>(
        &mut self,
        handler: &mut H,
        bytes: &[u8],
        is_final: bool,
    ) -> Result<(), ParseError> {
        match &self.phase {
            Phase::Failed(e) => return Err(e.clone()),
            Phase::FinishedOk => {
                panic!("Incorrect parser usage: cannot push input after parsing finished")
            }
            Phase::Running => {}
        }
        self.started = true;

        let mut rest = bytes;
        if self.decoder.is_none() {
            while self.detect_len < DETECTION_BYTES && !rest.is_empty() {
                self.detect_buf[self.detect_len] = rest[0];
                self.detect_len += 1;
                rest = &rest[1..];
            }
            if self.detect_len < DETECTION_BYTES && !is_final {
                return Ok(());
            }
            if self.detect_len == 0 {
                // final push without any input at all
                return Err(self.fail(ParseErrorKind::ExpectedMoreTokens, Location::default()));
            }
            let detected = encoding::detect_encoding(&self.detect_buf[..self.detect_len]);
            let enc = match detected {
                Some(enc) => enc,
                None => {
                    return Err(
                        self.fail(ParseErrorKind::InvalidEncodingSequence, Location::default())
                    )
                }
            };
            self.decoder = Some(Decoder::new(enc));
            self.input_encoding = Some(enc);
            self.announce_encoding(handler)?;
            let buffered = self.detect_buf;
            let buffered_len = self.detect_len;
            for &b in &buffered[..buffered_len] {
                self.feed_byte(handler, b)?;
            }
        } else {
            self.announce_encoding(handler)?;
        }

        for &b in rest {
            self.feed_byte(handler, b)?;
        }
        if is_final {
            self.finish(handler)?;
        }
        Ok(())
    }

    fn fail(&mut self, kind: ParseErrorKind, location: Location) -> ParseError {
        let error = ParseError { kind, location };
        self.phase = Phase::Failed(error.clone());
        error
    }

    fn check(&mut self, continuation: Continuation, location: Location) -> Result<(), ParseError> {
        match continuation {
            Continuation::Continue => Ok(()),
            Continuation::Abort => Err(self.fail(ParseErrorKind::AbortedByHandler, location)),
        }
    }

    /// Location of the next not-yet-decoded character
    fn current_location(&self) -> Location {
        Location {
            byte: self.seq_start,
            line: self.line,
            column: self.column,
            depth: self.stack.len(),
        }
    }

    fn announce_encoding<H: ParseHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        if self.encoding_announced {
            return Ok(());
        }
        self.encoding_announced = true;
        let location = self.current_location();
        let continuation = handler.encoding_detected(self.input_encoding.unwrap());
        self.check(continuation, location)
    }

    fn feed_byte<H: ParseHandler>(&mut self, handler: &mut H, b: u8) -> Result<(), ParseError> {
        let decoded = self.decoder.as_mut().unwrap().feed(b);
        self.handle_decoded(handler, decoded)
    }

    fn handle_decoded<H: ParseHandler>(
        &mut self,
        handler: &mut H,
        decoded: Decoded,
    ) -> Result<(), ParseError> {
        match decoded {
            Decoded::Pending => Ok(()),
            Decoded::Codepoint { c, len } => {
                let char_byte = self.seq_start;
                self.seq_start += len as u64;
                self.consume_char(handler, c, char_byte, false)
            }
            Decoded::Invalid {
                len,
                requeue,
                requeue_len,
            } => {
                let at = self.current_location();
                self.seq_start += len as u64;
                if self.settings.replace_invalid_encoding_sequences
                    && matches!(self.lexer, Lexer::Str(_))
                {
                    self.consume_char(handler, '\u{FFFD}', at.byte, true)?;
                } else {
                    return Err(self.fail(ParseErrorKind::InvalidEncodingSequence, at));
                }
                for i in 0..requeue_len {
                    let decoded = self.decoder.as_mut().unwrap().feed(requeue[i]);
                    self.handle_decoded(handler, decoded)?;
                }
                Ok(())
            }
        }
    }

    fn consume_char<H: ParseHandler>(
        &mut self,
        handler: &mut H,
        c: char,
        char_byte: u64,
        replaced: bool,
    ) -> Result<(), ParseError> {
        if self.at_doc_start {
            self.at_doc_start = false;
            if c == '\u{FEFF}' {
                if !self.settings.allow_bom {
                    return Err(self.fail(ParseErrorKind::BomNotAllowed, Location::default()));
                }
                self.advance_position(c);
                return Ok(());
            }
        }
        let location = Location {
            byte: char_byte,
            line: self.line,
            column: self.column,
            depth: self.stack.len(),
        };
        self.lex_char(handler, c, location, replaced)?;
        self.advance_position(c);
        Ok(())
    }

    fn advance_position(&mut self, c: char) {
        match c {
            '\n' if self.pending_cr => self.pending_cr = false,
            '\n' => {
                self.line += 1;
                self.column = 0;
            }
            '\r' => {
                self.line += 1;
                self.column = 0;
                self.pending_cr = true;
            }
            _ => {
                self.column += 1;
                self.pending_cr = false;
            }
        }
    }

    fn lex_char<H: ParseHandler>(
        &mut self,
        handler: &mut H,
        c: char,
        location: Location,
        replaced: bool,
    ) -> Result<(), ParseError> {
        match self.lexer {
            Lexer::Ready => self.lex_ready(handler, c, location),
            Lexer::Literal { token, pos } => self.lex_literal(token, pos, c),
            Lexer::LiteralEnd { token } => {
                if is_token_end(c) {
                    self.lexer = Lexer::Ready;
                    self.apply_literal(handler, token)?;
                    self.lex_char(handler, c, location, replaced)
                } else {
                    let at = self.token_start;
                    Err(self.fail(ParseErrorKind::UnknownToken, at))
                }
            }
            Lexer::Number(state) => self.lex_number(handler, state, c, location),
            Lexer::Str(state) => self.lex_string(handler, state, c, location, replaced),
            Lexer::CommentStart => match c {
                '/' => {
                    self.lexer = Lexer::LineComment;
                    Ok(())
                }
                '*' => {
                    self.lexer = Lexer::BlockComment;
                    Ok(())
                }
                _ => {
                    let at = self.token_start;
                    Err(self.fail(ParseErrorKind::UnknownToken, at))
                }
            },
            Lexer::LineComment => {
                if c == '\n' || c == '\r' {
                    self.lexer = Lexer::Ready;
                }
                Ok(())
            }
            Lexer::BlockComment => {
                if c == '*' {
                    self.lexer = Lexer::BlockCommentStar;
                }
                Ok(())
            }
            Lexer::BlockCommentStar => {
                match c {
                    '/' => self.lexer = Lexer::Ready,
                    '*' => {}
                    _ => self.lexer = Lexer::BlockComment,
                }
                Ok(())
            }
        }
    }

    fn lex_ready<H: ParseHandler>(
        &mut self,
        handler: &mut H,
        c: char,
        location: Location,
    ) -> Result<(), ParseError> {
        match c {
            ' ' | '\t' | '\n' | '\r' => Ok(()),
            '{' => {
                self.token_start = location;
                self.apply_token(handler, Tok::ObjectStart)
            }
            '}' => {
                self.token_start = location;
                self.apply_token(handler, Tok::ObjectEnd)
            }
            '[' => {
                self.token_start = location;
                self.apply_token(handler, Tok::ArrayStart)
            }
            ']' => {
                self.token_start = location;
                self.apply_token(handler, Tok::ArrayEnd)
            }
            ',' => {
                self.token_start = location;
                self.apply_token(handler, Tok::Comma)
            }
            ':' => {
                self.token_start = location;
                self.apply_token(handler, Tok::Colon)
            }
            '"' => {
                self.token_start = location;
                self.string_buf.clear();
                self.string_attrs = StringAttributes::NONE;
                self.lexer = Lexer::Str(StringState::Plain);
                Ok(())
            }
            '-' | '0'..='9' => {
                self.token_start = location;
                self.number_buf.clear();
                self.number_attrs = NumberAttributes::NONE;
                let state = match c {
                    '-' => {
                        self.number_attrs |= NumberAttributes::IS_NEGATIVE;
                        NumberState::Minus
                    }
                    '0' => NumberState::Zero,
                    _ => NumberState::Integer,
                };
                self.lexer = Lexer::Number(state);
                self.push_number_char(c)
            }
            'n' => self.begin_literal(LiteralToken::Null, location),
            't' => self.begin_literal(LiteralToken::True, location),
            'f' => self.begin_literal(LiteralToken::False, location),
            'N' if self.settings.allow_special_numbers => {
                self.begin_literal(LiteralToken::NaN, location)
            }
            'I' if self.settings.allow_special_numbers => {
                self.begin_literal(LiteralToken::Infinity, location)
            }
            '/' if self.settings.allow_comments => {
                self.token_start = location;
                self.lexer = Lexer::CommentStart;
                Ok(())
            }
            _ => {
                self.token_start = location;
                Err(self.fail(ParseErrorKind::UnknownToken, location))
            }
        }
    }

    fn begin_literal(&mut self, token: LiteralToken, location: Location) -> Result<(), ParseError> {
        self.token_start = location;
        self.lexer = Lexer::Literal { token, pos: 1 };
        Ok(())
    }

    fn lex_literal(&mut self, token: LiteralToken, pos: usize, c: char) -> Result<(), ParseError> {
        let text = token.text();
        if c == text[pos] as char {
            self.lexer = if pos + 1 == text.len() {
                Lexer::LiteralEnd { token }
            } else {
                Lexer::Literal {
                    token,
                    pos: pos + 1,
                }
            };
            Ok(())
        } else {
            let at = self.token_start;
            Err(self.fail(ParseErrorKind::UnknownToken, at))
        }
    }

    fn apply_literal<H: ParseHandler>(
        &mut self,
        handler: &mut H,
        token: LiteralToken,
    ) -> Result<(), ParseError> {
        let tok = match token {
            LiteralToken::Null => Tok::Null,
            LiteralToken::True => Tok::Boolean(true),
            LiteralToken::False => Tok::Boolean(false),
            LiteralToken::NaN => Tok::Special(SpecialNumber::NaN),
            LiteralToken::Infinity => Tok::Special(SpecialNumber::Infinity),
            LiteralToken::NegativeInfinity => Tok::Special(SpecialNumber::NegativeInfinity),
        };
        self.apply_token(handler, tok)
    }

    fn push_number_char(&mut self, c: char) -> Result<(), ParseError> {
        if self.number_buf.len() >= self.settings.max_number_length {
            let at = self.token_start;
            return Err(self.fail(ParseErrorKind::TooLongNumber, at));
        }
        self.number_buf.push(c);
        Ok(())
    }

    fn lex_number<H: ParseHandler>(
        &mut self,
        handler: &mut H,
        state: NumberState,
        c: char,
        location: Location,
    ) -> Result<(), ParseError> {
        use NumberState::*;
        let next = match (state, c) {
            (Minus, '0') => Zero,
            (Minus, '1'..='9') => Integer,
            (Minus, 'I') if self.settings.allow_special_numbers => {
                // `-I` continues as the -Infinity literal; the minus sign is
                // already matched
                self.lexer = Lexer::Literal {
                    token: LiteralToken::NegativeInfinity,
                    pos: 2,
                };
                return Ok(());
            }
            (Minus, _) => return self.number_error(ParseErrorKind::InvalidNumber),
            (Zero, 'x' | 'X')
                if self.settings.allow_hex_numbers
                    && !self.number_attrs.contains(NumberAttributes::IS_NEGATIVE) =>
            {
                self.number_attrs |= NumberAttributes::IS_HEX;
                HexPrefix
            }
            (Zero, '0'..='9') => return self.number_error(ParseErrorKind::InvalidNumber),
            (Zero | Integer, '.') => {
                self.number_attrs |= NumberAttributes::HAS_DECIMAL_POINT;
                Dot
            }
            (Zero | Integer | Fraction, 'e' | 'E') => {
                self.number_attrs |= NumberAttributes::HAS_EXPONENT;
                ExponentLetter
            }
            (Integer, '0'..='9') => Integer,
            (Dot, '0'..='9') => Fraction,
            (Dot, _) => return self.number_error(ParseErrorKind::InvalidNumber),
            (Fraction, '0'..='9') => Fraction,
            (ExponentLetter, '0'..='9') => ExponentDigits,
            (ExponentLetter, '+') => ExponentSign,
            (ExponentLetter, '-') => {
                self.number_attrs |= NumberAttributes::HAS_NEGATIVE_EXPONENT;
                ExponentSign
            }
            (ExponentLetter, _) => return self.number_error(ParseErrorKind::InvalidNumber),
            (ExponentSign, '0'..='9') => ExponentDigits,
            (ExponentSign, _) => return self.number_error(ParseErrorKind::InvalidNumber),
            (ExponentDigits, '0'..='9') => ExponentDigits,
            (HexPrefix, _) if c.is_ascii_hexdigit() => HexDigits,
            (HexPrefix, _) => return self.number_error(ParseErrorKind::InvalidNumber),
            (HexDigits, _) if c.is_ascii_hexdigit() => HexDigits,
            (Zero | Integer | Fraction | ExponentDigits | HexDigits, _) => {
                // the character does not extend the number: the number token
                // is complete and the character starts a new token
                self.lexer = Lexer::Ready;
                self.apply_token(handler, Tok::Number)?;
                return self.lex_char(handler, c, location, false);
            }
        };
        self.lexer = Lexer::Number(next);
        self.push_number_char(c)
    }

    fn number_error(&mut self, kind: ParseErrorKind) -> Result<(), ParseError> {
        let at = self.token_start;
        Err(self.fail(kind, at))
    }

    fn lex_string<H: ParseHandler>(
        &mut self,
        handler: &mut H,
        state: StringState,
        c: char,
        location: Location,
        replaced: bool,
    ) -> Result<(), ParseError> {
        use StringState::*;
        match state {
            Plain => match c {
                '"' => {
                    self.lexer = Lexer::Ready;
                    self.apply_token(handler, Tok::Str)
                }
                '\\' => {
                    self.escape_start = location;
                    self.lexer = Lexer::Str(Escape);
                    Ok(())
                }
                _ if (c as u32) < 0x20 => {
                    Err(self.fail(ParseErrorKind::UnescapedControlCharacter, location))
                }
                _ => self.append_string_char(c, replaced),
            },
            Escape => {
                let unescaped = match c {
                    '"' => Some('"'),
                    '\\' => Some('\\'),
                    '/' => Some('/'),
                    'b' => Some('\u{0008}'),
                    'f' => Some('\u{000C}'),
                    'n' => Some('\n'),
                    'r' => Some('\r'),
                    't' => Some('\t'),
                    'u' => None,
                    _ => {
                        let at = self.escape_start;
                        return Err(self.fail(ParseErrorKind::InvalidEscapeSequence, at));
                    }
                };
                match unescaped {
                    Some(u) => {
                        self.lexer = Lexer::Str(Plain);
                        self.append_string_char(u, false)
                    }
                    None => {
                        self.lexer = Lexer::Str(UnicodeEscape {
                            digits: 0,
                            value: 0,
                        });
                        Ok(())
                    }
                }
            }
            UnicodeEscape { digits, value } => {
                let value = match push_hex_digit(value, c) {
                    Some(value) => value,
                    None => {
                        let at = self.escape_start;
                        return Err(self.fail(ParseErrorKind::InvalidEscapeSequence, at));
                    }
                };
                if digits + 1 < 4 {
                    self.lexer = Lexer::Str(UnicodeEscape {
                        digits: digits + 1,
                        value,
                    });
                    return Ok(());
                }
                if encoding::is_utf16_high_surrogate(value) {
                    self.lexer = Lexer::Str(HighSurrogate { high: value });
                    Ok(())
                } else if encoding::is_utf16_low_surrogate(value) {
                    let at = self.escape_start;
                    Err(self.fail(ParseErrorKind::UnpairedSurrogateEscapeSequence, at))
                } else {
                    self.lexer = Lexer::Str(Plain);
                    self.append_string_char(char::from_u32(u32::from(value)).unwrap(), false)
                }
            }
            HighSurrogate { high } => {
                if c == '\\' {
                    self.lexer = Lexer::Str(HighSurrogateEscape { high });
                    Ok(())
                } else {
                    let at = self.escape_start;
                    Err(self.fail(ParseErrorKind::UnpairedSurrogateEscapeSequence, at))
                }
            }
            HighSurrogateEscape { high } => {
                if c == 'u' {
                    self.lexer = Lexer::Str(LowUnicodeEscape {
                        high,
                        digits: 0,
                        value: 0,
                    });
                    Ok(())
                } else {
                    let at = self.escape_start;
                    Err(self.fail(ParseErrorKind::UnpairedSurrogateEscapeSequence, at))
                }
            }
            LowUnicodeEscape {
                high,
                digits,
                value,
            } => {
                let value = match push_hex_digit(value, c) {
                    Some(value) => value,
                    None => {
                        let at = self.escape_start;
                        return Err(self.fail(ParseErrorKind::InvalidEscapeSequence, at));
                    }
                };
                if digits + 1 < 4 {
                    self.lexer = Lexer::Str(LowUnicodeEscape {
                        high,
                        digits: digits + 1,
                        value,
                    });
                    return Ok(());
                }
                if encoding::is_utf16_low_surrogate(value) {
                    self.lexer = Lexer::Str(Plain);
                    let c = encoding::combine_surrogate_pair(high, value);
                    self.append_string_char(c, false)
                } else {
                    let at = self.escape_start;
                    Err(self.fail(ParseErrorKind::UnpairedSurrogateEscapeSequence, at))
                }
            }
        }
    }

    fn append_string_char(&mut self, c: char, replaced: bool) -> Result<(), ParseError> {
        let encoded_len = encoding::encoded_len(c, self.settings.string_encoding);
        if self
            .string_buf
            .len()
            .checked_add(encoded_len)
            .map_or(true, |len| len > self.settings.max_string_length)
        {
            let at = self.token_start;
            return Err(self.fail(ParseErrorKind::TooLongString, at));
        }
        encoding::encode(c, self.settings.string_encoding, &mut self.string_buf);

        let c = c as u32;
        if c == 0 {
            self.string_attrs |= StringAttributes::CONTAINS_NUL;
        }
        if c < 0x20 {
            self.string_attrs |= StringAttributes::CONTAINS_CONTROL;
        }
        if c >= 0x80 {
            self.string_attrs |= StringAttributes::CONTAINS_NON_ASCII;
        }
        if c >= 0x10000 {
            self.string_attrs |= StringAttributes::CONTAINS_NON_BMP;
        }
        if replaced {
            self.string_attrs |= StringAttributes::CONTAINS_REPLACEMENT;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Grammar
    // ------------------------------------------------------------------

    fn apply_token<H: ParseHandler>(
        &mut self,
        handler: &mut H,
        tok: Tok,
    ) -> Result<(), ParseError> {
        if tok.is_value() {
            return self.apply_value(handler, tok);
        }
        let at = self.token_start;
        match tok {
            Tok::ObjectEnd => {
                let closeable = matches!(
                    self.stack.last().map(|f| f.state),
                    Some(FrameState::ObjectEmpty) | Some(FrameState::ObjectAfterValue)
                ) || (self.settings.allow_trailing_commas
                    && matches!(
                        self.stack.last().map(|f| f.state),
                        Some(FrameState::ObjectAfterComma)
                    ));
                if !closeable {
                    return Err(self.fail(ParseErrorKind::UnexpectedToken, at));
                }
                self.stack.pop();
                let location = Location {
                    depth: self.stack.len(),
                    ..at
                };
                let continuation = handler.end_object(&Token { location });
                self.check(continuation, location)?;
                self.value_completed();
                Ok(())
            }
            Tok::ArrayEnd => {
                let closeable = matches!(
                    self.stack.last().map(|f| f.state),
                    Some(FrameState::ArrayEmpty) | Some(FrameState::ArrayAfterValue)
                ) || (self.settings.allow_trailing_commas
                    && matches!(
                        self.stack.last().map(|f| f.state),
                        Some(FrameState::ArrayAfterComma)
                    ));
                if !closeable {
                    return Err(self.fail(ParseErrorKind::UnexpectedToken, at));
                }
                self.stack.pop();
                let location = Location {
                    depth: self.stack.len(),
                    ..at
                };
                let continuation = handler.end_array(&Token { location });
                self.check(continuation, location)?;
                self.value_completed();
                Ok(())
            }
            Tok::Comma => {
                let next = match self.stack.last().map(|f| f.state) {
                    Some(FrameState::ObjectAfterValue) => FrameState::ObjectAfterComma,
                    Some(FrameState::ArrayAfterValue) => FrameState::ArrayAfterComma,
                    _ => return Err(self.fail(ParseErrorKind::UnexpectedToken, at)),
                };
                self.stack.last_mut().unwrap().state = next;
                Ok(())
            }
            Tok::Colon => match self.stack.last().map(|f| f.state) {
                Some(FrameState::ObjectAfterName) => {
                    self.stack.last_mut().unwrap().state = FrameState::ObjectBeforeValue;
                    Ok(())
                }
                _ => Err(self.fail(ParseErrorKind::UnexpectedToken, at)),
            },
            _ => unreachable!("value tokens are handled by apply_value"),
        }
    }

    fn apply_value<H: ParseHandler>(
        &mut self,
        handler: &mut H,
        tok: Tok,
    ) -> Result<(), ParseError> {
        let at = self.token_start;
        match self.stack.last().map(|f| f.state) {
            None => {
                if self.root_consumed {
                    return Err(self.fail(ParseErrorKind::UnexpectedToken, at));
                }
            }
            Some(FrameState::ObjectEmpty) | Some(FrameState::ObjectAfterComma) => {
                // only a member name is allowed here
                if tok == Tok::Str {
                    return self.apply_member_name(handler);
                }
                return Err(self.fail(ParseErrorKind::UnexpectedToken, at));
            }
            Some(FrameState::ObjectBeforeValue) => {}
            Some(FrameState::ArrayEmpty) | Some(FrameState::ArrayAfterComma) => {
                let is_first = matches!(
                    self.stack.last().map(|f| f.state),
                    Some(FrameState::ArrayEmpty)
                );
                let location = at;
                let continuation = handler.array_item(&Token { location }, is_first);
                self.check(continuation, location)?;
            }
            Some(FrameState::ObjectAfterName) | Some(FrameState::ObjectAfterValue)
            | Some(FrameState::ArrayAfterValue) => {
                return Err(self.fail(ParseErrorKind::UnexpectedToken, at));
            }
        }

        let token = Token { location: at };
        match tok {
            Tok::ObjectStart => {
                let continuation = handler.start_object(&token);
                self.check(continuation, at)?;
                self.push_frame(FrameState::ObjectEmpty);
                Ok(())
            }
            Tok::ArrayStart => {
                let continuation = handler.start_array(&token);
                self.check(continuation, at)?;
                self.push_frame(FrameState::ArrayEmpty);
                Ok(())
            }
            Tok::Null => {
                let continuation = handler.null(&token);
                self.check(continuation, at)?;
                self.value_completed();
                Ok(())
            }
            Tok::Boolean(value) => {
                let continuation = handler.boolean(&token, value);
                self.check(continuation, at)?;
                self.value_completed();
                Ok(())
            }
            Tok::Special(value) => {
                let continuation = handler.special_number(&token, value);
                self.check(continuation, at)?;
                self.value_completed();
                Ok(())
            }
            Tok::Number => {
                let continuation = handler.number(&token, &self.number_buf, self.number_attrs);
                self.check(continuation, at)?;
                self.value_completed();
                Ok(())
            }
            Tok::Str => {
                let continuation = handler.string(&token, &self.string_buf, self.string_attrs);
                self.check(continuation, at)?;
                self.value_completed();
                Ok(())
            }
            _ => unreachable!("non-value tokens are handled by apply_token"),
        }
    }

    fn apply_member_name<H: ParseHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let location = self.token_start;
        let is_first = matches!(
            self.stack.last().map(|f| f.state),
            Some(FrameState::ObjectEmpty)
        );

        if let Some(names) = &self.stack.last().unwrap().member_names {
            if names.contains(&self.string_buf) {
                return Err(self.fail(ParseErrorKind::DuplicateObjectMember, location));
            }
        }

        let outcome = handler.object_member(
            &Token { location },
            &self.string_buf,
            is_first,
            self.string_attrs,
        );
        match outcome {
            MemberOutcome::Continue => {}
            MemberOutcome::Abort => {
                return Err(self.fail(ParseErrorKind::AbortedByHandler, location))
            }
            MemberOutcome::TreatAsDuplicate => {
                return Err(self.fail(ParseErrorKind::DuplicateObjectMember, location))
            }
        }

        let frame = self.stack.last_mut().unwrap();
        if let Some(names) = &mut frame.member_names {
            names.insert(self.string_buf.clone());
        }
        frame.state = FrameState::ObjectAfterName;
        Ok(())
    }

    fn push_frame(&mut self, state: FrameState) {
        let member_names = if self.settings.track_object_members
            && state == FrameState::ObjectEmpty
        {
            Some(BTreeSet::new())
        } else {
            None
        };
        self.stack.push(Frame {
            state,
            member_names,
        });
    }

    /// Advances the enclosing container (or the document) after a value was
    /// consumed completely
    fn value_completed(&mut self) {
        match self.stack.last_mut() {
            None => self.root_consumed = true,
            Some(frame) => {
                frame.state = match frame.state {
                    FrameState::ObjectBeforeValue => FrameState::ObjectAfterValue,
                    FrameState::ArrayEmpty | FrameState::ArrayAfterComma => {
                        FrameState::ArrayAfterValue
                    }
                    state => state,
                };
            }
        }
    }

    fn finish<H: ParseHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        // a partial character at end of input can never become valid
        if let Some(len) = self.decoder.as_mut().unwrap().finish() {
            let at = self.current_location();
            self.seq_start += len as u64;
            if self.settings.replace_invalid_encoding_sequences
                && matches!(self.lexer, Lexer::Str(_))
            {
                self.consume_char(handler, '\u{FFFD}', at.byte, true)?;
            } else {
                return Err(self.fail(ParseErrorKind::InvalidEncodingSequence, at));
            }
        }

        // close tokens which end of input completes, fail those it cannot
        match self.lexer {
            Lexer::Ready => {}
            Lexer::LiteralEnd { token } => {
                self.lexer = Lexer::Ready;
                self.apply_literal(handler, token)?;
            }
            Lexer::Literal { .. } => {
                let at = self.token_start;
                return Err(self.fail(ParseErrorKind::UnknownToken, at));
            }
            Lexer::Number(state) => {
                use NumberState::*;
                match state {
                    Zero | Integer | Fraction | ExponentDigits | HexDigits => {
                        self.lexer = Lexer::Ready;
                        self.apply_token(handler, Tok::Number)?;
                    }
                    Minus | Dot | ExponentLetter | ExponentSign | HexPrefix => {
                        let at = self.token_start;
                        return Err(self.fail(ParseErrorKind::IncompleteToken, at));
                    }
                }
            }
            Lexer::Str(_) => {
                let at = self.token_start;
                return Err(self.fail(ParseErrorKind::IncompleteToken, at));
            }
            Lexer::CommentStart => {
                let at = self.token_start;
                return Err(self.fail(ParseErrorKind::UnknownToken, at));
            }
            Lexer::LineComment => self.lexer = Lexer::Ready,
            Lexer::BlockComment | Lexer::BlockCommentStar => {
                let at = self.token_start;
                return Err(self.fail(ParseErrorKind::IncompleteToken, at));
            }
        }

        if !self.stack.is_empty() || !self.root_consumed {
            let at = self.current_location();
            return Err(self.fail(ParseErrorKind::ExpectedMoreTokens, at));
        }
        self.phase = Phase::FinishedOk;
        Ok(())
    }
}

fn is_token_end(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\n' | '\r' | '{' | '}' | '[' | ']' | ',' | ':' | '"' | '/'
    )
}

fn push_hex_digit(value: u16, c: char) -> Option<u16> {
    c.to_digit(16).map(|d| value << 4 | d as u16)
}
