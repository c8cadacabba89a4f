//! End-to-end exercises of the two pinned binary formats.
//!
//! Unit tests in the codec modules cover field-level validation; these tests
//! run the full production loop: record a session through the engine, write
//! the container, corrupt it every which way, carry state hashes through
//! packets, and prove the read side never accepts damaged bytes.

mod common;

use common::{scripted_p1, scripted_p2};
use rampart_rollback::checksum::state_hash;
use rampart_rollback::container::{read_replay, write_replay};
use rampart_rollback::network::packet::{
    decode, decode_into, encode, ChecksumReport, InputPacket, MAX_PACKET_INPUTS,
    MAX_PACKET_SIZE,
};
use rampart_rollback::replay::play;
use rampart_rollback::{
    CorruptKind, Frame, Input, PlayerSide, RampartError, ReplayRecorder,
    RollbackEngine, SimState,
};

/// Record a short confirmed session, persist it, reload it, and verify the
/// playback lands on the live engine's exact state.
#[test]
fn session_to_disk_and_back_reproduces_state() {
    let mut engine = RollbackEngine::new(
        SimState::new(1).expect("non-zero seed"),
        64,
        PlayerSide::P1,
    )
    .expect("valid capacity");
    let mut recorder = ReplayRecorder::new(1).expect("non-zero seed");

    for f in 0..240u32 {
        let (p1, p2) = (scripted_p1(f), scripted_p2(f));
        engine
            .set_remote_input(Frame::new(f), p2)
            .expect("in-window delivery");
        engine.tick(p1);
        recorder.append(p1, p2);
    }

    let mut bytes = Vec::new();
    write_replay(&recorder.build(), &mut bytes).expect("writable sink");

    let restored = read_replay(&mut bytes.as_slice()).expect("intact container");
    let replayed = play(&restored).expect("zero start frame");

    assert_eq!(&replayed, engine.current_state());
    assert_eq!(state_hash(&replayed), state_hash(engine.current_state()));
}

#[test]
fn every_container_payload_bit_flip_is_rejected() {
    let mut recorder = ReplayRecorder::new(7).expect("non-zero seed");
    for f in 0..16u32 {
        recorder.append(scripted_p1(f), scripted_p2(f));
    }
    let mut reference = Vec::new();
    write_replay(&recorder.build(), &mut reference).expect("writable sink");

    for byte in 32..reference.len() {
        for bit in 0..8 {
            let mut corrupted = reference.clone();
            corrupted[byte] ^= 1 << bit;
            assert!(
                matches!(
                    read_replay(&mut corrupted.as_slice()),
                    Err(RampartError::Corrupt {
                        kind: CorruptKind::ChecksumMismatch { .. }
                    })
                ),
                "payload flip at byte {byte} bit {bit} was accepted"
            );
        }
    }
}

#[test]
fn container_truncation_at_every_length_is_rejected() {
    let mut recorder = ReplayRecorder::new(7).expect("non-zero seed");
    for f in 0..8u32 {
        recorder.append(scripted_p1(f), scripted_p2(f));
    }
    let mut reference = Vec::new();
    write_replay(&recorder.build(), &mut reference).expect("writable sink");

    for len in 0..reference.len() {
        let result = read_replay(&mut reference[..len].as_ref());
        assert!(
            matches!(result, Err(RampartError::Truncated { .. })),
            "truncation to {len} bytes did not fail as Truncated"
        );
    }
}

/// A peer's send loop: bundle the last N inputs with the newest state hash,
/// ship it as bytes, and reassemble on the other side.
#[test]
fn packet_carries_redundant_inputs_and_opaque_hash() {
    let mut state = SimState::new(1).expect("non-zero seed");
    let mut history: Vec<Input> = Vec::new();
    for f in 0..40u32 {
        let input = scripted_p1(f);
        history.push(input);
        state = rampart_rollback::sim::step(&state, input, scripted_p2(f));
    }

    // Last 32 frames, tagged [8, 40).
    let window = &history[history.len() - MAX_PACKET_INPUTS..];
    let packet = InputPacket {
        start_frame: Frame::new(8),
        ack_frame: Frame::new(39),
        checksum: Some(ChecksumReport {
            frame: Frame::new(40),
            checksum: state_hash(&state),
        }),
        inputs: window.iter().copied().collect(),
    };

    let mut buf = [0u8; MAX_PACKET_SIZE];
    let len = encode(&packet, &mut buf).expect("valid packet");
    assert_eq!(len, MAX_PACKET_SIZE);

    let received = decode(&buf[..len]).expect("intact packet");
    assert_eq!(received, packet);
    // The receiver checks the fingerprint against its own timeline.
    assert_eq!(
        received.checksum.expect("attached").checksum,
        state_hash(&state)
    );
}

#[test]
fn zero_alloc_decode_feeds_the_engine() {
    let packet = InputPacket {
        start_frame: Frame::new(0),
        ack_frame: Frame::ZERO,
        checksum: None,
        inputs: (0..8u32).map(scripted_p2).collect(),
    };
    let mut buf = [0u8; MAX_PACKET_SIZE];
    let len = encode(&packet, &mut buf).expect("valid packet");

    let mut scratch = [Input::NEUTRAL; MAX_PACKET_INPUTS];
    let header = decode_into(&buf[..len], &mut scratch).expect("intact packet");

    let mut engine = RollbackEngine::new(
        SimState::new(1).expect("non-zero seed"),
        64,
        PlayerSide::P1,
    )
    .expect("valid capacity");
    for (i, &input) in scratch[..header.count].iter().enumerate() {
        engine
            .set_remote_input(header.start_frame + i as u32, input)
            .expect("in-window delivery");
        engine.tick(scripted_p1(i as u32));
    }

    let mut truth = SimState::new(1).expect("non-zero seed");
    for f in 0..8u32 {
        truth = rampart_rollback::sim::step(&truth, scripted_p1(f), scripted_p2(f));
    }
    assert_eq!(engine.current_state(), &truth);
}

#[test]
fn packet_corruption_matrix_is_rejected() {
    let packet = InputPacket {
        start_frame: Frame::new(3),
        ack_frame: Frame::new(1),
        checksum: None,
        inputs: [Input::LEFT, Input::ATTACK].into_iter().collect(),
    };
    let mut buf = [0u8; MAX_PACKET_SIZE];
    let len = encode(&packet, &mut buf).expect("valid packet");
    let reference = &buf[..len];

    // Magic corruption, each byte.
    for i in 0..4 {
        let mut bytes = reference.to_vec();
        bytes[i] ^= 0xFF;
        assert!(decode(&bytes).is_none(), "magic byte {i} corruption accepted");
    }
    // Every reserved flag bit.
    for bit in 1..8 {
        let mut bytes = reference.to_vec();
        bytes[5] |= 1 << bit;
        assert!(decode(&bytes).is_none(), "reserved flag bit {bit} accepted");
    }
    // Truncation by one byte.
    assert!(decode(&reference[..len - 1]).is_none());
    // A datagram from some other protocol entirely.
    assert!(decode(b"RPLK\x01\x00 definitely not an input packet").is_none());
}
