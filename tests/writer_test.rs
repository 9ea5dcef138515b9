//! Byte-level tests for the event writer: exact output in every encoding,
//! escaping, validation and grammar enforcement

use duplicate::duplicate_item;
use eventson::writer::{EventWriter, WriterError, WriterSettings};
use eventson::Encoding;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn writer_for(encoding: Encoding) -> EventWriter<Vec<u8>> {
    EventWriter::new_custom(
        Vec::new(),
        WriterSettings {
            output_encoding: encoding,
            ..Default::default()
        },
    )
}

#[duplicate_item(
    test_name         encoding    expected;
    [null_utf8]       [Utf8]      [b"null"];
    [null_utf16le]    [Utf16Le]   [b"n\x00u\x00l\x00l\x00"];
    [null_utf16be]    [Utf16Be]   [b"\x00n\x00u\x00l\x00l"];
    [null_utf32le]    [Utf32Le]   [b"n\x00\x00\x00u\x00\x00\x00l\x00\x00\x00l\x00\x00\x00"];
    [null_utf32be]    [Utf32Be]   [b"\x00\x00\x00n\x00\x00\x00u\x00\x00\x00l\x00\x00\x00l"];
)]
#[test]
fn test_name() -> TestResult {
    let mut writer = writer_for(Encoding::encoding);
    writer.write_null()?;
    assert_eq!(writer.into_inner(), expected);
    Ok(())
}

#[duplicate_item(
    test_name          encoding    expected;
    [string_utf8]      [Utf8]      [&b"\"a\xC2\xA9\xE4\xB8\x81\xF0\x9F\x80\x84\""[..]];
    [string_utf16le]   [Utf16Le]   [b"\x22\x00\x61\x00\xA9\x00\x01\x4E\x3C\xD8\x04\xDC\x22\x00"];
    [string_utf16be]   [Utf16Be]   [b"\x00\x22\x00\x61\x00\xA9\x4E\x01\xD8\x3C\xDC\x04\x00\x22"];
    [string_utf32le]   [Utf32Le]   [b"\x22\x00\x00\x00\x61\x00\x00\x00\xA9\x00\x00\x00\x01\x4E\x00\x00\x04\xF0\x01\x00\x22\x00\x00\x00"];
    [string_utf32be]   [Utf32Be]   [b"\x00\x00\x00\x22\x00\x00\x00\x61\x00\x00\x00\xA9\x00\x00\x4E\x01\x00\x01\xF0\x04\x00\x00\x00\x22"];
)]
#[test]
fn test_name() -> TestResult {
    // U+0061, U+00A9, U+4E01, U+1F004 provided as UTF-8 data
    let mut writer = writer_for(Encoding::encoding);
    writer.write_string("a\u{A9}\u{4E01}\u{1F004}".as_bytes(), Encoding::Utf8)?;
    assert_eq!(writer.into_inner(), expected);
    Ok(())
}

#[test]
fn string_source_encodings() -> TestResult {
    // the same four characters, expressed in each source encoding
    let cases: [(Encoding, &[u8]); 5] = [
        (Encoding::Utf8, b"a\xC2\xA9\xE4\xB8\x81\xF0\x9F\x80\x84"),
        (Encoding::Utf16Le, b"\x61\x00\xA9\x00\x01\x4E\x3C\xD8\x04\xDC"),
        (Encoding::Utf16Be, b"\x00\x61\x00\xA9\x4E\x01\xD8\x3C\xDC\x04"),
        (
            Encoding::Utf32Le,
            b"\x61\x00\x00\x00\xA9\x00\x00\x00\x01\x4E\x00\x00\x04\xF0\x01\x00",
        ),
        (
            Encoding::Utf32Be,
            b"\x00\x00\x00\x61\x00\x00\x00\xA9\x00\x00\x4E\x01\x00\x01\xF0\x04",
        ),
    ];
    for (encoding, bytes) in cases {
        let mut writer = EventWriter::new(Vec::new());
        writer.write_string(bytes, encoding)?;
        assert_eq!(
            String::from_utf8(writer.into_inner())?,
            "\"a\u{A9}\u{4E01}\u{1F004}\"",
            "source encoding: {encoding}"
        );
    }
    Ok(())
}

#[test]
fn simple_escape_sequences() -> TestResult {
    let mut writer = EventWriter::new(Vec::new());
    writer.write_str("\\\"/\t\n\r\u{000C}\u{0008}")?;
    assert_eq!(
        String::from_utf8(writer.into_inner())?,
        "\"\\\\\\\"/\\t\\n\\r\\f\\b\""
    );
    Ok(())
}

#[test]
fn control_characters_are_escaped() -> TestResult {
    let mut writer = EventWriter::new(Vec::new());
    writer.write_str("\u{0000}\u{001F}\u{007F}")?;
    assert_eq!(
        String::from_utf8(writer.into_inner())?,
        "\"\\u0000\\u001F\\u007F\""
    );
    Ok(())
}

#[test]
fn noncharacters_are_escaped() -> TestResult {
    let mut writer = EventWriter::new(Vec::new());
    writer.write_str("\u{00FE}\u{00FF}\u{FFFE}\u{FFFF}")?;
    assert_eq!(
        String::from_utf8(writer.into_inner())?,
        "\"\\u00FE\\u00FF\\uFFFE\\uFFFF\""
    );

    let mut writer = EventWriter::new(Vec::new());
    writer.write_str("\u{FDD0}\u{FDEF}")?;
    assert_eq!(String::from_utf8(writer.into_inner())?, "\"\\uFDD0\\uFDEF\"");

    // non-BMP codepoints are escaped as surrogate pairs
    let mut writer = EventWriter::new(Vec::new());
    writer.write_str("\u{1D1FE}\u{1D1FF}")?;
    assert_eq!(
        String::from_utf8(writer.into_inner())?,
        "\"\\uD834\\uDDFE\\uD834\\uDDFF\""
    );
    Ok(())
}

#[test]
fn javascript_line_separators_are_escaped() -> TestResult {
    let mut writer = EventWriter::new(Vec::new());
    writer.write_str("\u{2028}\u{2029}")?;
    assert_eq!(String::from_utf8(writer.into_inner())?, "\"\\u2028\\u2029\"");
    Ok(())
}

#[test]
fn invalid_string_data_is_rejected() {
    for (bytes, encoding) in [
        (&b"\xC2"[..], Encoding::Utf8),          // truncated
        (b"\xED\xA0\x80", Encoding::Utf8),       // encoded surrogate
        (b"\x00\xD8", Encoding::Utf16Le),        // lone high surrogate
        (b"\x00\x00\xD8\x00", Encoding::Utf32Be) // encoded surrogate
    ] {
        let mut writer = EventWriter::new(Vec::new());
        assert_eq!(
            writer.write_string(bytes, encoding),
            Err(WriterError::InvalidEncodingSequence),
            "input: {bytes:X?}"
        );
        // a failed primitive must not emit anything
        assert_eq!(writer.into_inner(), b"", "input: {bytes:X?}");
    }
}

#[test]
fn replacement_uses_escapes() -> TestResult {
    let settings = || WriterSettings {
        replace_invalid_encoding_sequences: true,
        ..Default::default()
    };

    let mut writer = EventWriter::new_custom(Vec::new(), settings());
    writer.write_string(b"abc\xE0\xBF", Encoding::Utf8)?;
    assert_eq!(String::from_utf8(writer.into_inner())?, "\"abc\\uFFFD\"");

    // a replacement character already present in the data stays literal
    let mut writer = EventWriter::new_custom(Vec::new(), settings());
    writer.write_str("\u{FFFD}")?;
    assert_eq!(String::from_utf8(writer.into_inner())?, "\"\u{FFFD}\"");
    Ok(())
}

#[test]
fn number_validation() -> TestResult {
    let mut writer = EventWriter::new(Vec::new());
    writer.write_number("-0.1e+2")?;
    assert_eq!(writer.into_inner(), b"-0.1e+2");

    let mut writer = writer_for(Encoding::Utf16Be);
    writer.write_number("-0.1e+2")?;
    assert_eq!(
        writer.into_inner(),
        b"\x00\x2D\x00\x30\x00\x2E\x00\x31\x00\x65\x00\x2B\x00\x32"
    );

    for bad in ["-", "01", "1.", "1e", "1e+-1", "12a", "0x", "-0x1", "0x1.0", "NaN"] {
        let mut writer = EventWriter::new(Vec::new());
        assert_eq!(
            writer.write_number(bad),
            Err(WriterError::InvalidNumber(bad.to_owned())),
            "input: {bad}"
        );
    }
    Ok(())
}

#[test]
fn complete_document() -> TestResult {
    // mirrors the event sequence a client would produce for
    // {"a":{},"b":[[],0,"c"]} with explicit punctuation
    let mut writer = EventWriter::new(Vec::new());
    writer.write_start_object()?;
    writer.write_str("a")?;
    writer.write_colon()?;
    writer.write_start_object()?;
    writer.write_end_object()?;
    writer.write_comma()?;
    writer.write_str("b")?;
    writer.write_colon()?;
    writer.write_start_array()?;
    writer.write_start_array()?;
    writer.write_end_array()?;
    writer.write_comma()?;
    writer.write_number("0")?;
    writer.write_comma()?;
    writer.write_str("c")?;
    writer.write_end_array()?;
    writer.write_end_object()?;
    assert_eq!(
        String::from_utf8(writer.into_inner())?,
        "{\"a\":{},\"b\":[[],0,\"c\"]}"
    );
    Ok(())
}

#[test]
fn layout_control() -> TestResult {
    let mut writer = EventWriter::new_custom(
        Vec::new(),
        WriterSettings {
            use_crlf: true,
            ..Default::default()
        },
    );
    writer.write_start_array()?;
    writer.write_new_line()?;
    writer.write_space(4)?;
    writer.write_number("1")?;
    writer.write_new_line()?;
    writer.write_end_array()?;
    assert_eq!(String::from_utf8(writer.into_inner())?, "[\r\n    1\r\n]");
    Ok(())
}

#[duplicate_item(
    test_name            encoding   expected;
    [newline_utf8]       [Utf8]     [&b"\n"[..]];
    [newline_utf16le]    [Utf16Le]  [b"\n\x00"];
    [newline_utf16be]    [Utf16Be]  [b"\x00\n"];
    [newline_utf32le]    [Utf32Le]  [b"\n\x00\x00\x00"];
    [newline_utf32be]    [Utf32Be]  [b"\x00\x00\x00\n"];
)]
#[test]
fn test_name() -> TestResult {
    let mut writer = writer_for(Encoding::encoding);
    writer.write_new_line()?;
    assert_eq!(writer.into_inner(), expected);
    Ok(())
}

#[test]
fn punctuation_is_validated() {
    // a complete matrix of out-of-place writes in a small document
    let mut writer = EventWriter::new(Vec::new());
    writer.write_start_object().unwrap();
    // value instead of member name
    assert_eq!(writer.write_null(), Err(WriterError::UnexpectedWrite));

    let mut writer = EventWriter::new(Vec::new());
    writer.write_start_object().unwrap();
    writer.write_str("a").unwrap();
    // second name instead of colon
    assert_eq!(writer.write_str("b"), Err(WriterError::UnexpectedWrite));

    let mut writer = EventWriter::new(Vec::new());
    writer.write_start_object().unwrap();
    writer.write_str("a").unwrap();
    writer.write_colon().unwrap();
    // comma while a member value is expected
    assert_eq!(writer.write_comma(), Err(WriterError::UnexpectedWrite));

    let mut writer = EventWriter::new(Vec::new());
    writer.write_start_array().unwrap();
    writer.write_number("1").unwrap();
    // a second item requires a comma first
    assert_eq!(writer.write_number("2"), Err(WriterError::UnexpectedWrite));

    let mut writer = EventWriter::new(Vec::new());
    // closing at the top level
    assert_eq!(writer.write_end_array(), Err(WriterError::UnexpectedWrite));
}

#[test]
fn poisoned_writer_repeats_error() {
    let mut writer = EventWriter::new(Vec::new());
    let error = writer.write_comma().unwrap_err();
    assert_eq!(writer.write_null(), Err(error.clone()));
    assert_eq!(writer.write_new_line(), Err(error.clone()));
    assert_eq!(writer.error(), Some(&error));
}
