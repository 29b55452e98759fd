//! Unit tests for the telegram codec and stream reassembler.

use super::codec::{FrameError, checksum, decode, encode};
use super::reassembly::{Reassembler, Unit};
use super::types::{CONTROL_REQUEST, DEFAULT_ADDRESS, END, START};

#[test]
fn test_checksum_wraps_mod_256() {
    assert_eq!(checksum(&[]), 0);
    assert_eq!(checksum(&[0x53, 0x01]), 0x54);
    assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
}

#[test]
fn test_encode_layout() {
    let encoded = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();

    assert_eq!(encoded.len(), 4 + 9 + 2);
    assert_eq!(encoded[0], START);
    assert_eq!(encoded[1], 9); // control + address + 7 payload bytes
    assert_eq!(encoded[2], 9);
    assert_eq!(encoded[3], START);
    assert_eq!(encoded[4], CONTROL_REQUEST);
    assert_eq!(encoded[5], DEFAULT_ADDRESS);
    assert_eq!(&encoded[6..13], b"REQTIME");
    assert_eq!(encoded[13], checksum(&encoded[4..13]));
    assert_eq!(encoded[14], END);
}

#[test]
fn test_round_trip_payload_lengths() {
    for payload in [&b""[..], b"A", b"REQTIME", &[0xAB; 253]] {
        let encoded = encode(payload, CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
        let frame = decode(&encoded).unwrap();
        assert_eq!(frame.control, CONTROL_REQUEST);
        assert_eq!(frame.address, DEFAULT_ADDRESS);
        assert_eq!(frame.payload, payload);
    }
}

#[test]
fn test_round_trip_control_and_address() {
    for control in [0x00, 0x53, 0x73, 0xFF] {
        for address in [0x00, 0x01, 0x7F, 0xFF] {
            let encoded = encode(b"REQTIME", control, address).unwrap();
            let frame = decode(&encoded).unwrap();
            assert_eq!((frame.control, frame.address), (control, address));
        }
    }
}

#[test]
fn test_encode_rejects_oversized_payload() {
    let payload = [0u8; 254];
    assert_eq!(
        encode(&payload, CONTROL_REQUEST, DEFAULT_ADDRESS),
        Err(FrameError::PayloadTooLong { len: 254 })
    );
}

#[test]
fn test_decode_too_short() {
    assert_eq!(
        decode(&[START, 2, 2, START, 0x53]),
        Err(FrameError::TooShort { len: 5 })
    );
}

#[test]
fn test_decode_bad_start() {
    let mut encoded = encode(b"x", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    encoded[0] = 0x69;
    assert_eq!(decode(&encoded), Err(FrameError::BadStart));

    let mut encoded = encode(b"x", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    encoded[3] = 0x00;
    assert_eq!(decode(&encoded), Err(FrameError::BadStart));
}

#[test]
fn test_decode_length_copy_mismatch() {
    let mut encoded = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    encoded[2] = encoded[2].wrapping_add(1);
    assert_eq!(
        decode(&encoded),
        Err(FrameError::LengthMismatch {
            first: 9,
            second: 10
        })
    );
}

#[test]
fn test_decode_size_mismatch() {
    let mut encoded = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    encoded.push(0x00);
    assert_eq!(
        decode(&encoded),
        Err(FrameError::SizeMismatch {
            actual: 16,
            expected: 15
        })
    );
}

#[test]
fn test_decode_detects_any_single_bit_flip() {
    let encoded = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    // Flipping one bit anywhere in control, address, payload or checksum
    // shifts the sum mod 256 and must be caught.
    for idx in 4..encoded.len() - 1 {
        let mut tampered = encoded.clone();
        tampered[idx] ^= 0x01;
        assert!(
            matches!(decode(&tampered), Err(FrameError::ChecksumMismatch { .. })),
            "flip at offset {idx} went undetected"
        );
    }
}

#[test]
fn test_decode_bad_end() {
    let mut encoded = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    let last = encoded.len() - 1;
    encoded[last] = 0x00;
    assert_eq!(decode(&encoded), Err(FrameError::BadEnd));
}

#[test]
fn test_reassembler_single_chunk() {
    let encoded = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    let mut reassembler = Reassembler::new();

    let units = reassembler.push(&encoded);

    assert_eq!(units.len(), 1);
    match &units[0] {
        Unit::Frame(frame) => assert_eq!(frame.payload, b"REQTIME"),
        other => panic!("expected frame, got {other:?}"),
    }
    assert!(reassembler.is_empty());
}

#[test]
fn test_reassembler_byte_at_a_time_matches_single_chunk() {
    let encoded = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();

    let mut whole = Reassembler::new();
    let whole_units = whole.push(&encoded);

    let mut split = Reassembler::new();
    let mut split_units = Vec::new();
    for byte in &encoded {
        split_units.extend(split.push(&[*byte]));
    }

    assert_eq!(split_units, whole_units);
    assert_eq!(split_units.len(), 1);
    assert!(split.is_empty());
}

#[test]
fn test_reassembler_two_frames_one_chunk() {
    let first = encode(b"REQTIME", CONTROL_REQUEST, 0x01).unwrap();
    let second = encode(b"REQTIME", CONTROL_REQUEST, 0x02).unwrap();
    let mut combined = first.clone();
    combined.extend_from_slice(&second);

    let mut reassembler = Reassembler::new();
    let units = reassembler.push(&combined);

    assert_eq!(units.len(), 2);
    match (&units[0], &units[1]) {
        (Unit::Frame(a), Unit::Frame(b)) => {
            assert_eq!(a.address, 0x01);
            assert_eq!(b.address, 0x02);
        }
        other => panic!("expected two frames, got {other:?}"),
    }
}

#[test]
fn test_reassembler_partial_frame_stalls() {
    let encoded = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    let mut reassembler = Reassembler::new();

    assert!(reassembler.push(&encoded[..2]).is_empty());
    assert_eq!(reassembler.pending(), 2);
    assert!(reassembler.push(&encoded[2..10]).is_empty());

    let units = reassembler.push(&encoded[10..]);
    assert_eq!(units.len(), 1);
    assert!(reassembler.is_empty());
}

#[test]
fn test_reassembler_resync_on_stray_start_byte() {
    let valid = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    let mut input = vec![START];
    input.extend_from_slice(&valid);

    // The stray marker makes the length copies disagree; dropping exactly
    // one byte realigns on the genuine frame.
    let mut reassembler = Reassembler::new();
    let units = reassembler.push(&input);

    assert_eq!(units.len(), 1);
    match &units[0] {
        Unit::Frame(frame) => assert_eq!(frame.payload, b"REQTIME"),
        other => panic!("expected frame, got {other:?}"),
    }
    assert!(reassembler.is_empty());
}

#[test]
fn test_reassembler_resync_then_junk_flushed_as_line() {
    let valid = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    let mut input = vec![START, 0x05, 0x09];
    input.extend_from_slice(b"junk\n");
    input.extend_from_slice(&valid);

    // START with mismatched length copies is dropped byte-by-byte; the
    // remaining garbage leaves as a text line once its newline arrives,
    // and the genuine frame survives untouched.
    let mut reassembler = Reassembler::new();
    let units = reassembler.push(&input);

    assert_eq!(units.len(), 2);
    assert_eq!(units[0], Unit::Line(b"\x05\x09junk\n".to_vec()));
    match &units[1] {
        Unit::Frame(frame) => assert_eq!(frame.payload, b"REQTIME"),
        other => panic!("expected frame, got {other:?}"),
    }
}

#[test]
fn test_reassembler_corrupt_extent_reported_not_dropped() {
    let mut tampered = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    tampered[8] ^= 0xFF; // payload byte; length copies still agree
    let valid = encode(b"REQTIME", CONTROL_REQUEST, 0x07).unwrap();
    let mut input = tampered.clone();
    input.extend_from_slice(&valid);

    let mut reassembler = Reassembler::new();
    let units = reassembler.push(&input);

    assert_eq!(units.len(), 2);
    match &units[0] {
        Unit::Corrupt { bytes, error } => {
            assert_eq!(bytes, &tampered);
            assert!(matches!(error, FrameError::ChecksumMismatch { .. }));
        }
        other => panic!("expected corrupt extent, got {other:?}"),
    }
    match &units[1] {
        Unit::Frame(frame) => assert_eq!(frame.address, 0x07),
        other => panic!("expected frame, got {other:?}"),
    }
}

#[test]
fn test_reassembler_text_line() {
    let mut reassembler = Reassembler::new();

    assert!(reassembler.push(b"GETT").is_empty());
    let units = reassembler.push(b"IME\n");

    assert_eq!(units, vec![Unit::Line(b"GETTIME\n".to_vec())]);
    assert!(reassembler.is_empty());
}

#[test]
fn test_reassembler_line_then_frame_preserve_order() {
    let frame = encode(b"REQTIME", CONTROL_REQUEST, DEFAULT_ADDRESS).unwrap();
    let mut input = b"GETTIME\n".to_vec();
    input.extend_from_slice(&frame);
    input.extend_from_slice(b"gettime\n");

    let mut reassembler = Reassembler::new();
    let units = reassembler.push(&input);

    assert_eq!(units.len(), 3);
    assert_eq!(units[0], Unit::Line(b"GETTIME\n".to_vec()));
    assert!(matches!(units[1], Unit::Frame(_)));
    assert_eq!(units[2], Unit::Line(b"gettime\n".to_vec()));
}

#[test]
fn test_reassembler_buffer_grows_without_cap() {
    let mut reassembler = Reassembler::new();

    // No newline and no frame marker: everything is held back.
    let junk = vec![b'A'; 100_000];
    assert!(reassembler.push(&junk).is_empty());
    assert_eq!(reassembler.pending(), 100_000);

    // A newline finally flushes the whole backlog as one line.
    let units = reassembler.push(b"\n");
    assert_eq!(units.len(), 1);
    match &units[0] {
        Unit::Line(line) => assert_eq!(line.len(), 100_001),
        other => panic!("expected line, got {other:?}"),
    }
    assert!(reassembler.is_empty());
}
