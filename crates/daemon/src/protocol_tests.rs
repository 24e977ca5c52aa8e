// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn request_tag_round_trips_through_json() {
    let req = Request::EnableHost {
        host: "mirror1".into(),
    };
    let bytes = encode(&req).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.contains("\"type\":\"EnableHost\""));

    let back: Request = decode(&bytes).unwrap();
    match back {
        Request::EnableHost { host } => assert_eq!(host, "mirror1"),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn query_request_nests_the_query_tag() {
    let req = Request::Query {
        query: Query::GetHost {
            host: "mirror1".into(),
        },
    };
    let bytes = encode(&req).unwrap();
    let back: Request = decode(&bytes).unwrap();
    match back {
        Request::Query {
            query: Query::GetHost { host },
        } => assert_eq!(host, "mirror1"),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn protocol_version_has_no_build_hash_suffix() {
    assert!(!protocol_version().contains('+'));
}
