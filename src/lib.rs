#![warn(missing_docs)]
// Enable 'unused' warnings for doc tests (are disabled by default)
#![doc(test(no_crate_inject))]
#![doc(test(attr(warn(unused))))]
// Fail on warnings in doc tests
#![doc(test(attr(deny(warnings))))]

//! Eventson is an [RFC 4627](https://www.ietf.org/rfc/rfc4627.txt) compliant streaming,
//! event-driven JSON parser and a matching streaming JSON writer.
//!
//! The parser consumes arbitrarily-chunked byte input in UTF-8, UTF-16 (LE or BE) or
//! UTF-32 (LE or BE), detecting the encoding automatically if desired, and notifies
//! a client-provided handler of the document structure as it is recognized, in the
//! style of SAX XML parsers. The writer accepts the same kind of events and produces
//! a byte stream in any of the five encodings. Neither side ever builds an in-memory
//! document tree, so memory usage stays proportional to the largest single string or
//! number value and the nesting depth, regardless of document size.
//!
//! Deviating from RFC 4627, any JSON value (not just an object or array) is accepted
//! as the top-level entity, consistent with ECMAScript's `JSON.parse`. Several opt-in
//! extensions are supported: a leading byte order mark, Javascript-style comments,
//! trailing commas, the literals `NaN` / `Infinity` / `-Infinity`, and hexadecimal
//! number literals.
//!
//! # Terminology
//!
//! This crate uses the same terminology as the JSON specification:
//!
//! - *object*: `{ ... }`
//!   - *member*: Entry in an object. For example the JSON object `{"a": 1}` has the member
//!     `"a": 1` where `"a"` is the member *name* and `1` is the member *value*.
//! - *array*: `[ ... ]`
//! - *literal*:
//!   - *boolean*: `true` or `false`
//!   - `null`
//! - *number*: number value, for example `123.4e+10`
//! - *string*: string value, for example `"text in \"quotes\""`
//!
//! # Usage examples
//!
//! ## Parsing
//! See [`PushParser`](crate::parser::PushParser).
//!
//! ```
//! use eventson::parser::*;
//!
//! #[derive(Default)]
//! struct MemberNames(Vec<String>);
//!
//! impl ParseHandler for MemberNames {
//!     fn object_member(
//!         &mut self,
//!         _token: &Token,
//!         name: &[u8],
//!         _is_first: bool,
//!         _attributes: StringAttributes,
//!     ) -> MemberOutcome {
//!         // names arrive in the configured string encoding; UTF-8 by default
//!         self.0.push(String::from_utf8(name.to_vec()).unwrap());
//!         MemberOutcome::Continue
//!     }
//! }
//!
//! let mut handler = MemberNames::default();
//! let mut parser = PushParser::new();
//! // Input may arrive in arbitrarily small chunks; here it comes in two
//! parser.parse(&mut handler, br#"{"a": 1, "#, false)?;
//! parser.parse(&mut handler, br#""b": [true]}"#, true)?;
//! assert_eq!(handler.0, vec!["a", "b"]);
//! # Ok::<(), eventson::parser::ParseError>(())
//! ```
//!
//! ## Writing
//! See [`EventWriter`](crate::writer::EventWriter).
//!
//! ```
//! use eventson::writer::*;
//!
//! // In this example JSON bytes are stored in a Vec;
//! // normally they would be written to a file or network connection
//! let mut output = Vec::<u8>::new();
//! let mut writer = EventWriter::new(&mut output);
//!
//! writer.write_start_object()?;
//! writer.write_str("a")?;
//! writer.write_colon()?;
//! writer.write_number("1")?;
//! writer.write_comma()?;
//! writer.write_str("b")?;
//! writer.write_colon()?;
//! writer.write_boolean(true)?;
//! writer.write_end_object()?;
//!
//! assert_eq!(String::from_utf8(output)?, r#"{"a":1,"b":true}"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Unlike pretty-printing writers, [`EventWriter`](crate::writer::EventWriter) emits
//! commas and colons only when the client writes them, and validates every write
//! against the JSON grammar, so the client controls the exact output layout through
//! [`write_space`](crate::writer::EventWriter::write_space) and
//! [`write_new_line`](crate::writer::EventWriter::write_new_line).

pub mod parser;
pub mod writer;

mod encoding;
mod json_number;

pub use encoding::Encoding;
