use pgoutput_wire::envelope::{
    decode_envelope, decode_standby_message, encode_hot_standby_feedback, encode_primary_keepalive,
    encode_standby_status_update, encode_xlog_data, EnvelopeMessage, HotStandbyFeedbackMessage,
    PrimaryKeepaliveMessage, StandbyMessage, StandbyStatusUpdate, XLogData,
};
use pgoutput_wire::DecodeError;

const TIMESTAMPS: [i64; 5] = [0, -1, 1, i64::MIN, i64::MAX];
const POSITIONS: [u64; 4] = [0, 1, u64::MAX, 0x16_B374_D848];

#[test]
fn test_keepalive_round_trip() {
    for (&server_wal_end, &sent_at_unix_timestamp) in POSITIONS.iter().zip(TIMESTAMPS.iter().cycle()) {
        for reply_requested in [false, true] {
            let keepalive = PrimaryKeepaliveMessage {
                server_wal_end,
                sent_at_unix_timestamp,
                reply_requested,
            };
            let bytes = encode_primary_keepalive(&keepalive);
            assert_eq!(bytes.len(), 1 + PrimaryKeepaliveMessage::SIZE);
            assert_eq!(
                decode_envelope(&bytes).unwrap(),
                EnvelopeMessage::PrimaryKeepalive(keepalive)
            );
        }
    }
}

#[test]
fn test_status_update_round_trip() {
    for &sent_at_unix_timestamp in &TIMESTAMPS {
        let update = StandbyStatusUpdate {
            written_wal_position: u64::MAX,
            flushed_wal_position: 0x16_B374_D848,
            applied_wal_position: 0,
            sent_at_unix_timestamp,
            reply_requested: sent_at_unix_timestamp < 0,
        };
        let bytes = encode_standby_status_update(&update);
        assert_eq!(bytes.len(), 1 + StandbyStatusUpdate::SIZE);
        assert_eq!(
            decode_standby_message(&bytes).unwrap(),
            StandbyMessage::StatusUpdate(update)
        );
    }
}

#[test]
fn test_hot_standby_feedback_round_trip() {
    for &sent_at_unix_timestamp in &TIMESTAMPS {
        let feedback = HotStandbyFeedbackMessage {
            sent_at_unix_timestamp,
            xmin: u32::MAX,
            xmin_epoch: 0,
            lowest_replication_slot_catalog_xmin: 1,
            catalog_xmin_epoch: u32::MAX - 1,
        };
        let bytes = encode_hot_standby_feedback(&feedback);
        assert_eq!(bytes.len(), 1 + HotStandbyFeedbackMessage::SIZE);
        assert_eq!(
            decode_standby_message(&bytes).unwrap(),
            StandbyMessage::HotStandbyFeedback(feedback)
        );
    }
}

#[test]
fn test_xlogdata_round_trip() {
    let payload = b"B\x00\x01";
    let data = XLogData {
        message_wal_start: u64::MAX,
        server_wal_end: 0,
        sent_at_unix_timestamp: i64::MIN,
        wal_data: payload,
    };
    let bytes = encode_xlog_data(&data);
    assert_eq!(bytes.len(), 25 + payload.len());
    assert_eq!(decode_envelope(&bytes).unwrap(), EnvelopeMessage::XLogData(data));
}

#[test]
fn test_directions_do_not_mix() {
    let keepalive = encode_primary_keepalive(&PrimaryKeepaliveMessage {
        server_wal_end: 1,
        sent_at_unix_timestamp: 1,
        reply_requested: false,
    });
    assert_eq!(
        decode_standby_message(&keepalive),
        Err(DecodeError::UnknownTag(b'k'))
    );

    let feedback = encode_hot_standby_feedback(&HotStandbyFeedbackMessage {
        sent_at_unix_timestamp: 0,
        xmin: 0,
        xmin_epoch: 0,
        lowest_replication_slot_catalog_xmin: 0,
        catalog_xmin_epoch: 0,
    });
    assert_eq!(decode_envelope(&feedback), Err(DecodeError::UnknownTag(b'h')));
}

#[test]
fn test_status_update_rejects_bad_boolean() {
    let mut bytes = encode_standby_status_update(&StandbyStatusUpdate {
        written_wal_position: 3,
        flushed_wal_position: 2,
        applied_wal_position: 1,
        sent_at_unix_timestamp: 0,
        reply_requested: true,
    })
    .to_vec();
    bytes[33] = b'1';
    assert_eq!(
        decode_standby_message(&bytes),
        Err(DecodeError::InvalidBoolean(b'1'))
    );
}
