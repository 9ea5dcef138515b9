//! Module for parsing JSON data
//!
//! [`PushParser`] is a streaming, event-driven JSON parser: the client pushes
//! raw input bytes in chunks of arbitrary size and implements [`ParseHandler`]
//! to be notified of the document structure as it is recognized. No document
//! tree is ever built.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::encoding::Encoding;

mod push_parser;
// Re-export streaming implementation under `parser` module
pub use push_parser::*;

/// A location in the parser's input stream
///
/// # Examples
/// Consider the following JSON document:
/// ```json
/// {
///   "a": null
/// }
/// ```
/// The location of `null` is:
/// - byte: 8
///   Byte numbering starts at 0; the `n` is the 9th byte of the document
/// - line: 1
///   Line numbering starts at 0 and it is in the second line
/// - column: 7
///   Column numbering starts at 0 and there are 7 characters in front of it
/// - depth: 1
///   It occurs inside one open container, the top-level object
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Location {
    /// Byte index in the raw input stream, starting at 0
    ///
    /// This is the only value which unambiguously identifies the location:
    /// `line` and `column` count characters, which may span multiple bytes
    /// depending on the input encoding.
    pub byte: u64,
    /// Line number, starting at 0
    ///
    /// The characters _CR_ (U+000D), _LF_ (U+000A) and the sequence _CR LF_
    /// are each considered a single line break. Escaped line breaks in member
    /// names and string values are not considered line breaks.
    pub line: u64,
    /// Character column within the current line, starting at 0
    ///
    /// Every character counts as one column, regardless of how many bytes its
    /// encoding occupies or how wide code editors render it.
    pub column: u64,
    /// Number of containers open at this location, starting at 0 at the top level
    pub depth: usize,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}, column {} (byte {})",
            self.line, self.column, self.byte
        )
    }
}

/// The token which triggered a [`ParseHandler`] invocation
///
/// A `Token` is only accessible for the duration of the handler call; this is
/// how the parser guarantees that token locations can be observed *only* from
/// within handlers.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Token {
    /// Location of the token's first byte
    pub location: Location,
}

/// Settings to customize the parser behavior
///
/// These settings are used by [`PushParser::new_custom`]. To avoid repeating the
/// default values for unchanged settings `..Default::default()` can be used:
/// ```
/// # use eventson::parser::ParserSettings;
/// ParserSettings {
///     allow_comments: true,
///     // For all other settings use the default
///     ..Default::default()
/// }
/// # ;
/// ```
#[derive(Clone, Debug)]
pub struct ParserSettings {
    /// Encoding of the input bytes
    ///
    /// With `None` the parser detects the encoding from the first bytes of the
    /// document: a byte order mark decides directly, otherwise the zero-byte
    /// pattern of the first up to four bytes is used, falling back to UTF-8.
    /// [`PushParser::input_encoding`] reports the detected value once known.
    pub input_encoding: Option<Encoding>,

    /// Encoding of the string data passed to [`ParseHandler::string`] and
    /// [`ParseHandler::object_member`]
    ///
    /// Member names and string values are decoded from the input encoding and
    /// re-encoded in this encoding before they are handed to the client.
    pub string_encoding: Encoding,

    /// Maximum length in bytes (not characters!) of the re-encoded string data
    /// passed to the client
    ///
    /// A member name or string value which exceeds this length in the
    /// [`string_encoding`](Self::string_encoding) fails the parse with
    /// [`ParseErrorKind::TooLongString`].
    pub max_string_length: usize,

    /// Maximum length in bytes of the text of a number literal
    ///
    /// Numbers are pure ASCII, so this is also the character count. Exceeding
    /// it fails the parse with [`ParseErrorKind::TooLongNumber`].
    pub max_number_length: usize,

    /// Whether the input may begin with a byte order mark
    ///
    /// RFC 4627 does not allow JSON text to begin with a BOM, but it can be
    /// convenient to accept one, for example when the input comes from a file
    /// saved by a BOM-writing editor. Without this setting a leading BOM fails
    /// the parse with [`ParseErrorKind::BomNotAllowed`].
    pub allow_bom: bool,

    /// Whether to allow comments in the JSON document
    ///
    /// When enabled the following two comment variants can be used where the
    /// JSON specification allows whitespace:
    /// - end of line comments: `// ...`\
    ///   The comment spans to the end of the line (next `\r\n`, `\r` or `\n`)
    /// - block comments: `/* ... */`\
    ///   The comment ends at the next `*/` and can include line breaks
    ///
    /// Note that unlike for member names and string values, control characters
    /// in the range `0x00` to `0x1F` (inclusive) are allowed in comments.
    pub allow_comments: bool,

    /// Whether to allow an optional trailing comma after the last object
    /// member or array item
    ///
    /// The JSON specification requires that there must not be a trailing comma
    /// (`,`) after the last item of a JSON array or the last member of a JSON
    /// object, but input produced by sloppy generators may contain one.
    pub allow_trailing_commas: bool,

    /// Whether to accept the literals `NaN`, `Infinity` and `-Infinity`
    ///
    /// RFC 4627 provides no way to represent these values, but many common
    /// JSON generators emit them. They are reported through
    /// [`ParseHandler::special_number`].
    pub allow_special_numbers: bool,

    /// Whether to accept hexadecimal number literals
    ///
    /// Recognizes `HexIntegerLiteral` as described in section 7.8.3 of
    /// ECMA-262: the prefix `0x` or `0X` followed by one or more hex digits.
    /// Hexadecimal numbers cannot be prefixed by a minus sign and have no
    /// fraction or exponent.
    pub allow_hex_numbers: bool,

    /// Whether to replace invalid encoding sequences in member names and
    /// string values with U+FFFD instead of failing the parse
    ///
    /// Each *maximal invalid subpart* (Unicode 5.2.0, section 3.9) of the
    /// input becomes a single replacement character. The replacement only
    /// applies inside string literals; a malformed sequence between tokens
    /// still fails the parse with
    /// [`ParseErrorKind::InvalidEncodingSequence`], preserving the document
    /// structure guarantee.
    pub replace_invalid_encoding_sequences: bool,

    /// Whether to track the member names of all open objects and fail on
    /// duplicates
    ///
    /// Tracking necessarily buffers every member name of every open object,
    /// which costs memory proportional to the document. Clients which build
    /// their own representation can usually detect duplicates cheaper in
    /// their [`ParseHandler::object_member`] implementation and return
    /// [`MemberOutcome::TreatAsDuplicate`] instead of enabling this setting.
    ///
    /// Names are compared bit-for-bit in the
    /// [`string_encoding`](Self::string_encoding).
    pub track_object_members: bool,
}

impl Default for ParserSettings {
    /// Creates the default parser settings
    ///
    /// - input encoding: auto-detected
    /// - string encoding: UTF-8
    /// - maximum string / number length: unbounded
    /// - BOM, comments, trailing commas, special numbers, hex numbers: disallowed
    /// - invalid encoding sequences: fail the parse
    /// - object member tracking: disabled
    ///
    /// Except for the unbounded lengths these defaults are compliant with RFC 4627.
    fn default() -> Self {
        ParserSettings {
            input_encoding: None,
            string_encoding: Encoding::Utf8,
            max_string_length: usize::MAX,
            max_number_length: usize::MAX,
            allow_bom: false,
            allow_comments: false,
            allow_trailing_commas: false,
            allow_special_numbers: false,
            allow_hex_numbers: false,
            replace_invalid_encoding_sequences: false,
            track_object_members: false,
        }
    }
}

/// Value returned by most [`ParseHandler`] methods to direct the parse
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Continuation {
    /// Continue parsing
    Continue,
    /// Stop parsing; the parse fails with [`ParseErrorKind::AbortedByHandler`]
    /// located at the triggering token
    Abort,
}

/// Value returned by [`ParseHandler::object_member`]
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MemberOutcome {
    /// Continue parsing
    Continue,
    /// Stop parsing; the parse fails with [`ParseErrorKind::AbortedByHandler`]
    Abort,
    /// Declare that the current object already contains a member with this
    /// name; the parse fails with [`ParseErrorKind::DuplicateObjectMember`]
    ///
    /// This allows clients to implement duplicate detection without the
    /// memory overhead of [`ParserSettings::track_object_members`].
    TreatAsDuplicate,
}

/// One of the "special" number literals enabled by
/// [`ParserSettings::allow_special_numbers`]
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum SpecialNumber {
    /// `NaN`
    NaN,
    /// `Infinity`
    Infinity,
    /// `-Infinity`
    NegativeInfinity,
}

/// Attributes of a member name or string value, reported alongside the data
///
/// The flags describe the *decoded* characters, so characters written as
/// escape sequences count too: `"\u0000"` sets [`CONTAINS_NUL`](Self::CONTAINS_NUL).
#[derive(PartialEq, Eq, Clone, Copy, Default)]
pub struct StringAttributes(u8);

impl StringAttributes {
    /// No attribute applies; the string is plain ASCII without control characters
    pub const NONE: StringAttributes = StringAttributes(0);
    /// The string contains U+0000
    pub const CONTAINS_NUL: StringAttributes = StringAttributes(1 << 0);
    /// The string contains a control character (U+0000 to U+001F)
    pub const CONTAINS_CONTROL: StringAttributes = StringAttributes(1 << 1);
    /// The string contains a character at or above U+0080
    pub const CONTAINS_NON_ASCII: StringAttributes = StringAttributes(1 << 2);
    /// The string contains a character outside the Basic Multilingual Plane
    /// (at or above U+10000)
    pub const CONTAINS_NON_BMP: StringAttributes = StringAttributes(1 << 3);
    /// At least one U+FFFD in the string is the result of replacing an invalid
    /// encoding sequence (see
    /// [`ParserSettings::replace_invalid_encoding_sequences`])
    ///
    /// The absence of this flag does not imply the string contains no U+FFFD
    /// characters; they may have been present in the input.
    pub const CONTAINS_REPLACEMENT: StringAttributes = StringAttributes(1 << 4);

    /// Whether all flags of `other` are set in `self`
    pub fn contains(self, other: StringAttributes) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flag is set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for StringAttributes {
    type Output = StringAttributes;

    fn bitor(self, rhs: StringAttributes) -> StringAttributes {
        StringAttributes(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for StringAttributes {
    fn bitor_assign(&mut self, rhs: StringAttributes) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Debug for StringAttributes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut set = f.debug_set();
        for (flag, name) in [
            (StringAttributes::CONTAINS_NUL, "CONTAINS_NUL"),
            (StringAttributes::CONTAINS_CONTROL, "CONTAINS_CONTROL"),
            (StringAttributes::CONTAINS_NON_ASCII, "CONTAINS_NON_ASCII"),
            (StringAttributes::CONTAINS_NON_BMP, "CONTAINS_NON_BMP"),
            (StringAttributes::CONTAINS_REPLACEMENT, "CONTAINS_REPLACEMENT"),
        ] {
            if self.contains(flag) {
                set.entry(&name);
            }
        }
        set.finish()
    }
}

/// Attributes of a number literal, reported alongside its text
#[derive(PartialEq, Eq, Clone, Copy, Default)]
pub struct NumberAttributes(u8);

impl NumberAttributes {
    /// No attribute applies; the number is a plain non-negative integer
    pub const NONE: NumberAttributes = NumberAttributes(0);
    /// The number starts with a minus sign
    pub const IS_NEGATIVE: NumberAttributes = NumberAttributes(1 << 0);
    /// The number is a hexadecimal literal (see
    /// [`ParserSettings::allow_hex_numbers`])
    pub const IS_HEX: NumberAttributes = NumberAttributes(1 << 1);
    /// The number has a fraction part
    pub const HAS_DECIMAL_POINT: NumberAttributes = NumberAttributes(1 << 2);
    /// The number has an exponent part
    pub const HAS_EXPONENT: NumberAttributes = NumberAttributes(1 << 3);
    /// The number's exponent is negative
    pub const HAS_NEGATIVE_EXPONENT: NumberAttributes = NumberAttributes(1 << 4);

    /// Whether all flags of `other` are set in `self`
    pub fn contains(self, other: NumberAttributes) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flag is set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for NumberAttributes {
    type Output = NumberAttributes;

    fn bitor(self, rhs: NumberAttributes) -> NumberAttributes {
        NumberAttributes(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for NumberAttributes {
    fn bitor_assign(&mut self, rhs: NumberAttributes) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Debug for NumberAttributes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut set = f.debug_set();
        for (flag, name) in [
            (NumberAttributes::IS_NEGATIVE, "IS_NEGATIVE"),
            (NumberAttributes::IS_HEX, "IS_HEX"),
            (NumberAttributes::HAS_DECIMAL_POINT, "HAS_DECIMAL_POINT"),
            (NumberAttributes::HAS_EXPONENT, "HAS_EXPONENT"),
            (NumberAttributes::HAS_NEGATIVE_EXPONENT, "HAS_NEGATIVE_EXPONENT"),
        ] {
            if self.contains(flag) {
                set.entry(&name);
            }
        }
        set.finish()
    }
}

/// Handler for JSON parse events; the parser calls these methods as the
/// document structure is recognized
///
/// All methods have default implementations returning
/// [`Continuation::Continue`], so a handler only implements the events it
/// cares about. A parser driven with a handler implementing nothing simply
/// validates the input.
///
/// String and name data passed to handlers is borrowed from the parser and
/// valid only for the duration of the call; it is encoded in
/// [`ParserSettings::string_encoding`]. Number text is always ASCII.
///
/// Returning [`Continuation::Abort`] (or [`MemberOutcome::Abort`]) from any
/// method stops the parse: the parser fails with
/// [`ParseErrorKind::AbortedByHandler`] located at the token which triggered
/// the handler.
pub trait ParseHandler {
    /// Called exactly once per parse, as soon as the input encoding is known
    ///
    /// For an explicitly configured encoding this is at the start of the
    /// first [`parse`](PushParser::parse) call; for auto-detection it is
    /// directly after the detection bytes were inspected. No token has been
    /// recognized yet when this is called.
    fn encoding_detected(&mut self, encoding: Encoding) -> Continuation {
        let _ = encoding;
        Continuation::Continue
    }

    /// Called when the parser encounters the `null` literal
    fn null(&mut self, token: &Token) -> Continuation {
        let _ = token;
        Continuation::Continue
    }

    /// Called when the parser encounters `true` or `false`
    fn boolean(&mut self, token: &Token, value: bool) -> Continuation {
        let _ = (token, value);
        Continuation::Continue
    }

    /// Called when the parser encounters a string value
    ///
    /// `value` is encoded in [`ParserSettings::string_encoding`]. JSON strings
    /// may contain embedded NUL characters (escapable as `\u0000`), so the
    /// data must not be treated as NUL-terminated.
    fn string(&mut self, token: &Token, value: &[u8], attributes: StringAttributes) -> Continuation {
        let _ = (token, value, attributes);
        Continuation::Continue
    }

    /// Called when the parser encounters a number value
    ///
    /// `text` is the number exactly as it appeared in the input. It is
    /// guaranteed to contain only characters valid in JSON number literals
    /// (with `a`-`f`, `A`-`F`, `x` and `X` possible when hex numbers are
    /// enabled), allowing clients to parse it with arbitrary precision.
    fn number(&mut self, token: &Token, text: &str, attributes: NumberAttributes) -> Continuation {
        let _ = (token, text, attributes);
        Continuation::Continue
    }

    /// Called when the parser encounters `NaN`, `Infinity` or `-Infinity`
    /// (see [`ParserSettings::allow_special_numbers`])
    fn special_number(&mut self, token: &Token, value: SpecialNumber) -> Continuation {
        let _ = (token, value);
        Continuation::Continue
    }

    /// Called when the parser encounters the `{` starting an object
    fn start_object(&mut self, token: &Token) -> Continuation {
        let _ = token;
        Continuation::Continue
    }

    /// Called when the parser encounters the `}` ending an object
    fn end_object(&mut self, token: &Token) -> Continuation {
        let _ = token;
        Continuation::Continue
    }

    /// Called when an object member name has been read, before the `:` and
    /// the member value
    ///
    /// `is_first` is true for the first member of each object. `name` is
    /// encoded in [`ParserSettings::string_encoding`], like string values.
    fn object_member(
        &mut self,
        token: &Token,
        name: &[u8],
        is_first: bool,
        attributes: StringAttributes,
    ) -> MemberOutcome {
        let _ = (token, name, is_first, attributes);
        MemberOutcome::Continue
    }

    /// Called when the parser encounters the `[` starting an array
    fn start_array(&mut self, token: &Token) -> Continuation {
        let _ = token;
        Continuation::Continue
    }

    /// Called when the parser encounters the `]` ending an array
    fn end_array(&mut self, token: &Token) -> Continuation {
        let _ = token;
        Continuation::Continue
    }

    /// Called directly before each array item's own event, located at the
    /// item's first token
    ///
    /// `is_first` is true for the first item of each array.
    fn array_item(&mut self, token: &Token, is_first: bool) -> Continuation {
        let _ = (token, is_first);
        Continuation::Continue
    }
}

/// Describes why a parse failed
///
/// The discriminant values are stable and exposed through
/// [`ParseError::code`], so they can be used in wire protocols and logs.
#[non_exhaustive]
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum ParseErrorKind {
    /// Memory for the nesting stack or a string buffer could not be allocated
    ///
    /// Present for stable error codes; the default allocator aborts instead
    /// of reporting failure, so this kind is not produced by this crate.
    OutOfMemory,
    /// A handler returned [`Continuation::Abort`] or [`MemberOutcome::Abort`]
    AbortedByHandler,
    /// The input begins with a byte order mark, which RFC 4627 does not allow
    /// (see [`ParserSettings::allow_bom`])
    BomNotAllowed,
    /// The input contains a byte sequence that is not valid in the input
    /// encoding, or its encoding could not be detected
    InvalidEncodingSequence,
    /// The input contains a token of no recognizable kind, for example `tru_`
    /// or `'text'`
    UnknownToken,
    /// The input contains a valid token where the grammar does not allow it
    UnexpectedToken,
    /// The input ends in the middle of a token, for example `"unterminated`
    IncompleteToken,
    /// The input ends although the document is not complete, for example
    /// after `{"a":`
    ExpectedMoreTokens,
    /// A member name or string value contains an unescaped control character
    /// (U+0000 to U+001F)
    UnescapedControlCharacter,
    /// A member name or string value contains an invalid escape sequence,
    /// for example `\v`
    InvalidEscapeSequence,
    /// An escaped UTF-16 surrogate is not part of a valid surrogate pair,
    /// for example `"\uD834"` without a following low surrogate escape
    UnpairedSurrogateEscapeSequence,
    /// A member name or string value exceeds
    /// [`ParserSettings::max_string_length`]
    TooLongString,
    /// The input contains a malformed number, for example `01` or `1.e5`
    InvalidNumber,
    /// A number literal exceeds [`ParserSettings::max_number_length`]
    TooLongNumber,
    /// An object contains two members with the same name (see
    /// [`ParserSettings::track_object_members`] and
    /// [`MemberOutcome::TreatAsDuplicate`])
    DuplicateObjectMember,
}

impl ParseErrorKind {
    /// Stable integer code of this error kind
    pub fn code(self) -> u32 {
        match self {
            ParseErrorKind::OutOfMemory => 1,
            ParseErrorKind::AbortedByHandler => 2,
            ParseErrorKind::BomNotAllowed => 3,
            ParseErrorKind::InvalidEncodingSequence => 4,
            ParseErrorKind::UnknownToken => 5,
            ParseErrorKind::UnexpectedToken => 6,
            ParseErrorKind::IncompleteToken => 7,
            ParseErrorKind::ExpectedMoreTokens => 8,
            ParseErrorKind::UnescapedControlCharacter => 9,
            ParseErrorKind::InvalidEscapeSequence => 10,
            ParseErrorKind::UnpairedSurrogateEscapeSequence => 11,
            ParseErrorKind::TooLongString => 12,
            ParseErrorKind::InvalidNumber => 13,
            ParseErrorKind::TooLongNumber => 14,
            ParseErrorKind::DuplicateObjectMember => 15,
        }
    }

    /// Constant human-readable description of this error kind
    pub fn description(self) -> &'static str {
        match self {
            ParseErrorKind::OutOfMemory => "could not allocate enough memory",
            ParseErrorKind::AbortedByHandler => "the operation was aborted by a handler",
            ParseErrorKind::BomNotAllowed => {
                "the input begins with a byte-order mark (BOM), which is not allowed by RFC 4627"
            }
            ParseErrorKind::InvalidEncodingSequence => {
                "the input contains a byte or sequence of bytes that is not valid for the input encoding"
            }
            ParseErrorKind::UnknownToken => "the input contains an unknown token",
            ParseErrorKind::UnexpectedToken => "the input contains an unexpected token",
            ParseErrorKind::IncompleteToken => "the input ends in the middle of a token",
            ParseErrorKind::ExpectedMoreTokens => "the input ends when more tokens are expected",
            ParseErrorKind::UnescapedControlCharacter => {
                "the input contains a string containing an unescaped control character (U+0000 - U+001F)"
            }
            ParseErrorKind::InvalidEscapeSequence => {
                "the input contains a string containing an invalid escape sequence"
            }
            ParseErrorKind::UnpairedSurrogateEscapeSequence => {
                "the input contains a string containing an unmatched UTF-16 surrogate codepoint"
            }
            ParseErrorKind::TooLongString => "the input contains a string that is too long",
            ParseErrorKind::InvalidNumber => "the input contains an invalid number",
            ParseErrorKind::TooLongNumber => "the input contains a number that is too long",
            ParseErrorKind::DuplicateObjectMember => {
                "the input contains an object with duplicate members"
            }
        }
    }
}

/// Error which caused a parse to fail
///
/// The location is the start of the offending token or byte sequence, except
/// where documented otherwise (for example unescaped control characters are
/// located at the character itself). Errors are single-shot: the first error
/// moves the parser into a finished state, and later
/// [`parse`](PushParser::parse) calls return the same error without
/// consuming input.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
#[error("{} at {location}", .kind.description())]
pub struct ParseError {
    /// Kind of the error
    pub kind: ParseErrorKind,
    /// Location where the error occurred in the input
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_flags() {
        let attrs = StringAttributes::CONTAINS_NUL | StringAttributes::CONTAINS_CONTROL;
        assert!(attrs.contains(StringAttributes::CONTAINS_NUL));
        assert!(attrs.contains(StringAttributes::CONTAINS_CONTROL));
        assert!(!attrs.contains(StringAttributes::CONTAINS_NON_ASCII));
        assert!(StringAttributes::NONE.is_empty());
        assert!(!attrs.is_empty());

        let attrs = NumberAttributes::IS_NEGATIVE | NumberAttributes::HAS_EXPONENT;
        assert!(attrs.contains(NumberAttributes::IS_NEGATIVE));
        assert!(!attrs.contains(NumberAttributes::IS_HEX));
    }

    #[test]
    fn error_codes() {
        assert_eq!(ParseErrorKind::OutOfMemory.code(), 1);
        assert_eq!(ParseErrorKind::AbortedByHandler.code(), 2);
        assert_eq!(ParseErrorKind::DuplicateObjectMember.code(), 15);
    }

    #[test]
    fn error_display() {
        let e = ParseError {
            kind: ParseErrorKind::UnexpectedToken,
            location: Location {
                byte: 3,
                line: 0,
                column: 3,
                depth: 1,
            },
        };
        assert_eq!(
            e.to_string(),
            "the input contains an unexpected token at line 0, column 3 (byte 3)"
        );
    }
}
