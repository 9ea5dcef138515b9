//! Common library module for integration tests
// See https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests

// not every integration test uses every helper
#![allow(dead_code)]

use eventson::Encoding;
use eventson::parser::{
    Continuation, Location, MemberOutcome, NumberAttributes, ParseError, ParseHandler,
    ParserSettings, PushParser, SpecialNumber, StringAttributes, Token,
};

/// One recorded parse event, together with the token location it was
/// reported at
#[derive(PartialEq, Clone, Debug)]
pub enum JsonEvent {
    EncodingDetected(Encoding),
    Null(Location),
    Boolean(bool, Location),
    Str(Vec<u8>, StringAttributes, Location),
    Num(String, NumberAttributes, Location),
    Special(SpecialNumber, Location),
    StartObject(Location),
    EndObject(Location),
    Member(Vec<u8>, bool, StringAttributes, Location),
    StartArray(Location),
    EndArray(Location),
    ArrayItem(bool, Location),
}

/// Handler which records every event it sees
#[derive(Default)]
pub struct RecordingHandler {
    pub events: Vec<JsonEvent>,
}

impl ParseHandler for RecordingHandler {
    fn encoding_detected(&mut self, encoding: Encoding) -> Continuation {
        self.events.push(JsonEvent::EncodingDetected(encoding));
        Continuation::Continue
    }

    fn null(&mut self, token: &Token) -> Continuation {
        self.events.push(JsonEvent::Null(token.location));
        Continuation::Continue
    }

    fn boolean(&mut self, token: &Token, value: bool) -> Continuation {
        self.events.push(JsonEvent::Boolean(value, token.location));
        Continuation::Continue
    }

    fn string(&mut self, token: &Token, value: &[u8], attributes: StringAttributes) -> Continuation {
        self.events
            .push(JsonEvent::Str(value.to_vec(), attributes, token.location));
        Continuation::Continue
    }

    fn number(&mut self, token: &Token, text: &str, attributes: NumberAttributes) -> Continuation {
        self.events
            .push(JsonEvent::Num(text.to_owned(), attributes, token.location));
        Continuation::Continue
    }

    fn special_number(&mut self, token: &Token, value: SpecialNumber) -> Continuation {
        self.events
            .push(JsonEvent::Special(value, token.location));
        Continuation::Continue
    }

    fn start_object(&mut self, token: &Token) -> Continuation {
        self.events.push(JsonEvent::StartObject(token.location));
        Continuation::Continue
    }

    fn end_object(&mut self, token: &Token) -> Continuation {
        self.events.push(JsonEvent::EndObject(token.location));
        Continuation::Continue
    }

    fn object_member(
        &mut self,
        token: &Token,
        name: &[u8],
        is_first: bool,
        attributes: StringAttributes,
    ) -> MemberOutcome {
        self.events.push(JsonEvent::Member(
            name.to_vec(),
            is_first,
            attributes,
            token.location,
        ));
        MemberOutcome::Continue
    }

    fn start_array(&mut self, token: &Token) -> Continuation {
        self.events.push(JsonEvent::StartArray(token.location));
        Continuation::Continue
    }

    fn end_array(&mut self, token: &Token) -> Continuation {
        self.events.push(JsonEvent::EndArray(token.location));
        Continuation::Continue
    }

    fn array_item(&mut self, token: &Token, is_first: bool) -> Continuation {
        self.events.push(JsonEvent::ArrayItem(is_first, token.location));
        Continuation::Continue
    }
}

/// Parses `chunks` (the last one final) and returns the recorded events and
/// the overall result
pub fn parse_chunks(
    settings: ParserSettings,
    chunks: &[&[u8]],
) -> (Vec<JsonEvent>, Result<(), ParseError>) {
    let mut handler = RecordingHandler::default();
    let mut parser = PushParser::new_custom(settings);
    let mut result = Ok(());
    for (i, chunk) in chunks.iter().enumerate() {
        let is_final = i + 1 == chunks.len();
        result = parser.parse(&mut handler, chunk, is_final);
        if result.is_err() {
            break;
        }
    }
    (handler.events, result)
}

/// Parses `bytes` as a single final chunk
pub fn parse_all(
    settings: ParserSettings,
    bytes: &[u8],
) -> (Vec<JsonEvent>, Result<(), ParseError>) {
    parse_chunks(settings, &[bytes])
}

pub fn loc(byte: u64, line: u64, column: u64, depth: usize) -> Location {
    Location {
        byte,
        line,
        column,
        depth,
    }
}

/// Encodes `text` in the given encoding, for building non-UTF-8 test input
pub fn encode_text(text: &str, encoding: Encoding) -> Vec<u8> {
    let mut bytes = Vec::new();
    for c in text.chars() {
        match encoding {
            Encoding::Utf8 => {
                let mut buf = [0; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            Encoding::Utf16Le => {
                let mut buf = [0; 2];
                for unit in c.encode_utf16(&mut buf) {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
            }
            Encoding::Utf16Be => {
                let mut buf = [0; 2];
                for unit in c.encode_utf16(&mut buf) {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
            }
            Encoding::Utf32Le => bytes.extend_from_slice(&(c as u32).to_le_bytes()),
            Encoding::Utf32Be => bytes.extend_from_slice(&(c as u32).to_be_bytes()),
        }
    }
    bytes
}
