// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job_message::Originator;

#[test]
fn host_flag_set_serializes_with_type_tag() {
    let event = Event::HostFlagSet {
        host_id: HostId::new(3),
        flags: HostStatusFlags::PAUSE_QUEUE,
    };
    let json = serde_json::to_value(&event).expect("serialize");
    assert_eq!(json["type"], "host:flag_set");
    assert_eq!(json["host_id"], 3);
}

#[test]
fn job_enqueued_round_trips_through_json() {
    let event = Event::JobEnqueued {
        message: JobMessage {
            creation_time: 1,
            file_size: 2,
            job_id: JobId::new(3),
            split_job_counter: 0,
            files_to_send: 1,
            unique_number: UniqueNumber::new(5),
            dir_no: DirId::new(1),
            priority: b'5',
            originator: Originator::Amg,
        },
        staging_dir: "51_3_0_5/1".into(),
        created_at_ms: 100,
    };
    let json = serde_json::to_string(&event).expect("serialize");
    let decoded: Event = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, event);
}
