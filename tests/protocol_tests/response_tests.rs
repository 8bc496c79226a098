//! Tests for the response parser
//!
//! These tests verify:
//! - Header decoding and status word decomposition
//! - Row streaming with the size-excludes-cardinality rule
//! - Hard errors vs. retry hints vs. non-fatal return codes
//! - Column casting and the human-readable summary
//! - Truncated bodies fail instead of producing wrong values

use tarantool_codec::protocol::{
    decode_response, split_status, CompletionStatus, Field, FieldType, Header, RequestType,
    Response,
};
use tarantool_codec::CodecError;

// =============================================================================
// Helper Functions
// =============================================================================

fn from_hex(s: &str) -> Vec<u8> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact).unwrap()
}

fn header(request_type: RequestType, body_length: usize) -> Vec<u8> {
    Header {
        request_type: request_type.code(),
        body_length: body_length as u32,
        request_id: 0,
    }
    .encode()
    .to_vec()
}

/// Build a select-style body: status 0, count, then `<size><tuple>` for each row
fn rows_body(rows: &[&[&[u8]]]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&(rows.len() as u32).to_le_bytes());
    for row in rows {
        let mut fields = Vec::new();
        for field in row.iter() {
            fields.push(field.len() as u8);
            fields.extend_from_slice(field);
        }
        body.extend_from_slice(&(fields.len() as u32).to_le_bytes());
        body.extend_from_slice(&(row.len() as u32).to_le_bytes());
        body.extend_from_slice(&fields);
    }
    body
}

fn error_body(status_word: u32, message: &str) -> Vec<u8> {
    let mut body = status_word.to_le_bytes().to_vec();
    body.extend_from_slice(message.as_bytes());
    body.push(0);
    body
}

// =============================================================================
// Header and Status Tests
// =============================================================================

#[test]
fn test_header_decode() {
    let header = Header::decode(&from_hex("0d000000 14000000 11223344")).unwrap();
    assert_eq!(header.request_type, 13);
    assert_eq!(header.body_length, 20);
    assert_eq!(header.request_id, 0x44332211);
}

#[test]
fn test_header_too_short() {
    let result = Header::decode(&[0x0d, 0x00, 0x00]);
    assert!(matches!(result, Err(CodecError::TruncatedResponse { .. })));
}

#[test]
fn test_split_status() {
    assert_eq!(split_status(0x0000_0000), (0, 0));
    assert_eq!(split_status(0x0000_0200), (0, 2));
    assert_eq!(split_status(0x0000_3102), (2, 0x31));
    assert_eq!(split_status(0xFFFF_FF01), (1, 0x00FF_FFFF));
}

#[test]
fn test_empty_body() {
    let response = Response::new(&header(RequestType::Ping, 0), &[], None).unwrap();
    assert_eq!(response.return_code(), 0);
    assert_eq!(response.completion_status(), 0);
    assert!(response.return_message().is_none());
    assert!(response.rowcount().is_none());
    assert!(response.is_empty());
}

// =============================================================================
// Row Decoding Tests
// =============================================================================

#[test]
fn test_single_record() {
    let header = from_hex("0d000000 1b000000 00000000");
    let body = from_hex(
        "00000000 01000000 0b000000 02000000
         04 01000000 05 4a4b4c4d4e",
    );

    let response = Response::new(&header, &body, None).unwrap();
    assert_eq!(response.rowcount(), Some(1));
    assert_eq!(
        response.rows(),
        &[vec![
            Field::Bytes(vec![0x01, 0x00, 0x00, 0x00]),
            Field::Bytes(b"JKLMN".to_vec())
        ]]
    );
}

#[test]
fn test_multiple_records() {
    let header = from_hex("11000000 51000000 00000000");
    let body = from_hex(
        "00000000 03000000
         10000000 02000000 04 01000000 0a 31313131313131313131
         10000000 02000000 04 02000000 0a 32323232323232323232
         11000000 04000000 04 03000000 03 4c4c4c 03 4d4d4d 03 4e4e4e",
    );

    let response = Response::new(&header, &body, None).unwrap();
    let rows: Vec<&Vec<Field>> = response.iter().collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][1], Field::Bytes(b"1111111111".to_vec()));
    assert_eq!(rows[1][0].as_integer().unwrap(), 2);
    assert_eq!(rows[2].len(), 4);
    assert_eq!(rows[2][3], Field::Bytes(b"NNN".to_vec()));
}

#[test]
fn test_header_attributes() {
    let header = from_hex("0d000000 14000000 11223344");
    let body = from_hex("00000000 01000000 04000000 02000000 014b 015a");

    let response = Response::new(&header, &body, None).unwrap();
    assert_eq!(response.return_code(), 0);
    assert!(response.return_message().is_none());
    assert_eq!(response.status(), CompletionStatus::Ok);
    assert_eq!(response.rowcount(), Some(1));
    assert_eq!(response.body_length(), 20);
    assert_eq!(response.request_id(), 0x44332211);
    assert_eq!(response.request_type(), 13);
}

#[test]
fn test_rows_keep_declared_cardinality() {
    let body = rows_body(&[&[b"a"], &[b"b", b"cc"]]);
    let response = decode_response(&header(RequestType::Select, body.len()), &body, None).unwrap();

    assert_eq!(response.len(), 2);
    assert_eq!(response.rows()[0], &[Field::Bytes(b"a".to_vec())]);
    assert_eq!(
        response.rows()[1],
        vec![Field::Bytes(b"b".to_vec()), Field::Bytes(b"cc".to_vec())]
    );
}

#[test]
fn test_status_only_body() {
    let body = 0u32.to_le_bytes().repeat(2);
    let response = Response::new(&header(RequestType::Insert, 8), &body, None).unwrap();
    assert_eq!(response.rowcount(), Some(0));
    assert!(response.is_empty());
}

#[test]
fn test_zero_rowcount_skips_rows() {
    let body = rows_body(&[]);
    let response = Response::new(&header(RequestType::Select, 12), &body, None).unwrap();
    assert_eq!(response.rowcount(), Some(0));
    assert!(response.is_empty());
}

// =============================================================================
// Error Status Tests
// =============================================================================

#[test]
fn test_nonzero_code_without_hard_error() {
    let body = from_hex("00020000");
    let response = Response::new(&header(RequestType::Insert, 4), &body, None).unwrap();
    assert_eq!(response.return_code(), 2);
    assert_eq!(response.completion_status(), 0);
    assert!(response.rowcount().is_none());
    assert!(response.is_empty());
}

#[test]
fn test_hard_error_raises_database_error() {
    let body = error_body(0x0000_3102, "Duplicate key exists");
    let result = Response::new(&header(RequestType::Insert, body.len()), &body, None);

    match result {
        Err(CodecError::Database { code, message }) => {
            assert_eq!(code, 0x31);
            assert_eq!(message, "Duplicate key exists");
        }
        other => panic!("Expected Database error, got {:?}", other),
    }
}

#[test]
fn test_hard_error_helpers() {
    let body = error_body(0x0000_0202, "boom");
    let err = Response::new(&header(RequestType::Select, body.len()), &body, None).unwrap_err();
    assert!(err.is_database());
    assert_eq!(err.return_code(), Some(2));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn test_retry_hint_is_not_an_error() {
    let body = error_body(0x0000_0601, "Tuple is marked as read-only");
    let response = Response::new(&header(RequestType::Update, body.len()), &body, None).unwrap();

    assert_eq!(response.status(), CompletionStatus::TryAgain);
    assert_eq!(response.return_code(), 6);
    assert_eq!(response.return_message(), Some("Tuple is marked as read-only"));
    assert!(response.is_empty());
}

#[test]
fn test_error_message_is_lossy() {
    let mut body = 0x0000_0102u32.to_le_bytes().to_vec();
    body.extend_from_slice(b"bad \xFF byte");
    body.push(0);

    match Response::new(&header(RequestType::Call, body.len()), &body, None) {
        Err(CodecError::Database { message, .. }) => assert_eq!(message, "bad \u{FFFD} byte"),
        other => panic!("Expected Database error, got {:?}", other),
    }
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_tuple_past_body_length() {
    let mut body = rows_body(&[&[b"abc"]]);
    // Claim a larger tuple than the body holds
    body[8] = 0x20;
    let result = Response::new(&header(RequestType::Select, body.len()), &body, None);
    assert!(matches!(result, Err(CodecError::TruncatedResponse { .. })));
}

#[test]
fn test_body_shorter_than_declared() {
    let body = rows_body(&[&[b"abc"]]);
    let result = Response::new(&header(RequestType::Select, body.len() + 10), &body, None);
    assert!(matches!(result, Err(CodecError::TruncatedResponse { .. })));
}

#[test]
fn test_missing_rowcount() {
    let body = 0u32.to_le_bytes();
    let result = Response::new(&header(RequestType::Select, 4), &body, None);
    assert!(matches!(result, Err(CodecError::TruncatedResponse { .. })));
}

// =============================================================================
// Casting Tests
// =============================================================================

#[test]
fn test_cast_rows() {
    let id = 7u32.to_le_bytes();
    let body = rows_body(&[&[&id, b"name", b"x", b"y"]]);
    let types = [FieldType::Integer, FieldType::Text];
    let response =
        Response::new(&header(RequestType::Select, body.len()), &body, Some(&types[..])).unwrap();

    assert_eq!(
        response.rows()[0],
        vec![
            Field::Integer(7),
            Field::Text("name".into()),
            Field::Text("x".into()),
            Field::Text("y".into())
        ]
    );
}

#[test]
fn test_cast_raw_passes_through() {
    let body = rows_body(&[&[b"\x01\x02"]]);
    let types = [FieldType::Raw];
    let response =
        Response::new(&header(RequestType::Select, body.len()), &body, Some(&types[..])).unwrap();
    assert_eq!(response.rows()[0][0], Field::Bytes(vec![1, 2]));
}

#[test]
fn test_cast_integer_wrong_width() {
    let body = rows_body(&[&[b"abc"]]);
    let types = [FieldType::Integer];
    let result = Response::new(&header(RequestType::Select, body.len()), &body, Some(&types[..]));
    assert!(matches!(result, Err(CodecError::Cast(_))));
}

#[test]
fn test_empty_field_types_means_no_cast() {
    let body = rows_body(&[&[b"abc"]]);
    let types: [FieldType; 0] = [];
    let response =
        Response::new(&header(RequestType::Select, body.len()), &body, Some(&types[..])).unwrap();
    assert_eq!(response.rows()[0][0], Field::Bytes(b"abc".to_vec()));
}

// =============================================================================
// Summary Tests
// =============================================================================

#[test]
fn test_display_count_only() {
    let body = 0u32.to_le_bytes().repeat(2);
    let response = Response::new(&header(RequestType::Insert, 8), &body, None).unwrap();
    assert_eq!(response.to_string(), "0 records inserted");
}

#[test]
fn test_display_verbs() {
    let zero = 0u32.to_le_bytes().repeat(3);
    for (request_type, expected) in [
        (RequestType::Delete, "0 records deleted"),
        (RequestType::Update, "0 records updated"),
        (RequestType::Call, "0 records affected"),
    ] {
        let response = Response::new(&header(request_type, 12), &zero, None).unwrap();
        assert_eq!(response.to_string(), expected);
    }
}

#[test]
fn test_display_select_always_lists() {
    let body = rows_body(&[]);
    let response = Response::new(&header(RequestType::Select, 12), &body, None).unwrap();
    assert_eq!(response.to_string(), "[]");

    let body = rows_body(&[&[b"ab"]]);
    let types = [FieldType::Text];
    let response =
        Response::new(&header(RequestType::Select, body.len()), &body, Some(&types[..])).unwrap();
    assert_eq!(response.to_string(), "[(\"ab\")]");
}

#[test]
fn test_display_rows_for_insert_with_return_tuple() {
    let body = rows_body(&[&[b"k"]]);
    let response = Response::new(&header(RequestType::Insert, body.len()), &body, None).unwrap();
    assert_eq!(response.to_string(), "[(b\"k\")]");
}
