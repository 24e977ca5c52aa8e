// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fifo::ChannelFifo;
use afd_core::confirmation::ConfirmationType;
use afd_core::test_support::job_message;
use afd_core::JobId;

#[test]
fn job_bus_round_trips_a_message_over_a_channel_pair() {
    let (a, b) = ChannelFifo::pair(4);
    let mut sender = JobBus::new(a);
    let mut receiver = JobBus::new(b);

    let message = job_message(1, 1, 2, 4096);
    sender.send(&message).expect("send");
    let received = receiver.recv().expect("recv");
    assert_eq!(received, message);
}

#[test]
fn job_bus_recv_rejects_short_frame() {
    let (mut a, b) = ChannelFifo::pair(4);
    let mut receiver = JobBus::new(b);

    a.write_message(b"short").expect("write");
    assert!(receiver.recv().is_err());
}

#[test]
fn confirmation_bus_round_trips_a_variable_length_message() {
    let (a, b) = ChannelFifo::pair(4);
    let mut sender = ConfirmationBus::new(a);
    let mut receiver = ConfirmationBus::new(b);

    let message = ConfirmationMessage {
        file_size: 2048,
        job_number: JobId::new(7),
        unique_name_offset: 3,
        file_name_length: 9,
        confirmation_type: ConfirmationType::Normal,
        hostname: "mirror1.example".into(),
        file_name: "report.csv".into(),
    };
    sender.send(&message).expect("send");
    let received = receiver.recv().expect("recv");
    assert_eq!(received, message);
}
