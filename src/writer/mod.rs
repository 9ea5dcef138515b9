//! Module for writing JSON data
//!
//! [`EventWriter`] is a streaming JSON writer which accepts the same kind of
//! events the parser emits (values, container boundaries and explicit
//! punctuation), validates them against the JSON grammar, and produces a byte
//! stream in any of the five supported encodings.

use std::io::ErrorKind;

use thiserror::Error;

mod event_writer;
// Re-export streaming implementation under `writer` module
pub use event_writer::*;

/// Settings to customize the writer behavior
///
/// These settings are used by [`EventWriter::new_custom`]. To avoid repeating
/// the default values for unchanged settings `..Default::default()` can be
/// used:
/// ```
/// # use eventson::writer::WriterSettings;
/// WriterSettings {
///     use_crlf: true,
///     // For all other settings use the default
///     ..Default::default()
/// }
/// # ;
/// ```
#[derive(Clone, Debug)]
pub struct WriterSettings {
    /// Encoding of the produced bytes
    ///
    /// All output, structural characters and literals as well as number and
    /// string data, is encoded in this encoding.
    pub output_encoding: crate::Encoding,

    /// Whether [`write_new_line`](EventWriter::write_new_line) emits `CR LF`
    /// instead of `LF`
    pub use_crlf: bool,

    /// Whether to replace invalid encoding sequences in string data with
    /// U+FFFD escapes instead of failing
    ///
    /// Each *maximal invalid subpart* (Unicode 5.2.0, section 3.9) of the
    /// string data passed to [`write_string`](EventWriter::write_string)
    /// becomes a single `\uFFFD` escape sequence in the output. A U+FFFD
    /// which was validly encoded in the input is passed through unescaped.
    pub replace_invalid_encoding_sequences: bool,
}

impl Default for WriterSettings {
    /// Creates the default writer settings
    ///
    /// - output encoding: UTF-8
    /// - newline: `LF`
    /// - invalid encoding sequences: fail the write
    fn default() -> Self {
        WriterSettings {
            output_encoding: crate::Encoding::Utf8,
            use_crlf: false,
            replace_invalid_encoding_sequences: false,
        }
    }
}

/// Error which caused a write to fail
///
/// Errors are single-shot: the first error poisons the writer and every
/// subsequent write returns the same error without producing output. Failed
/// writes never emit partial data; a primitive either produces its complete
/// byte sequence or nothing.
#[non_exhaustive]
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum WriterError {
    /// The write is not allowed by the JSON grammar at the current position,
    /// for example a colon anywhere other than directly after a member name
    #[error("the write is not allowed by the JSON grammar at this position")]
    UnexpectedWrite,

    /// The text passed to [`write_number`](EventWriter::write_number) is not
    /// a valid JSON number or hexadecimal literal
    #[error("invalid JSON number: {0}")]
    InvalidNumber(String),

    /// The string data passed to [`write_string`](EventWriter::write_string)
    /// contains a byte sequence that is not valid for its declared encoding
    /// (see [`WriterSettings::replace_invalid_encoding_sequences`])
    #[error("the string contains a byte or sequence of bytes that is not valid for its encoding")]
    InvalidEncodingSequence,

    /// The output sink failed or refused the data
    #[error("the operation was aborted by the output handler: {message}")]
    AbortedByHandler {
        /// Kind of the underlying IO error
        kind: ErrorKind,
        /// Message of the underlying IO error
        message: String,
    },
}
