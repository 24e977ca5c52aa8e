// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Cursor;

#[tokio::test]
async fn write_then_read_round_trips_bytes() {
    let mut buf = Vec::new();
    write_message(&mut buf, b"hello").await.unwrap();

    let mut cursor = Cursor::new(buf);
    let read_back = read_message(&mut cursor).await.unwrap();
    assert_eq!(read_back, b"hello");
}

#[tokio::test]
async fn read_message_reports_connection_closed_on_empty_stream() {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn read_message_rejects_a_length_prefix_over_the_limit() {
    let mut buf = Vec::new();
    let bogus_len = (MAX_MESSAGE_SIZE as u32) + 1;
    buf.extend_from_slice(&bogus_len.to_be_bytes());

    let mut cursor = Cursor::new(buf);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[test]
fn encode_decode_round_trips_a_value() {
    #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
    struct Sample {
        a: u32,
        b: String,
    }
    let value = Sample {
        a: 7,
        b: "x".into(),
    };
    let bytes = encode(&value).unwrap();
    let back: Sample = decode(&bytes).unwrap();
    assert_eq!(value, back);
}
