//! The RBN1 v1 wire packet: redundant input delivery over UDP.
//!
//! One packet carries up to [`MAX_PACKET_INPUTS`] consecutive input frames,
//! `[start_frame .. start_frame + count)`. Senders include the last N frames
//! in every packet, so a single lost datagram never stalls the receiver:
//! the next packet subsumes the gap. The codec itself is transport-agnostic:
//! it only transforms between packets and caller-provided byte buffers.
//!
//! ```text
//! offset      size  field
//!      0         4  magic           ASCII "RBN1"
//!      4         1  version         1
//!      5         1  flags           bit0 = has checksum; bits 1..7 zero
//!      6         4  start frame
//!     10         1  count           in [1, 32]
//!     11         4  ack frame
//!    [15]       [4] checksum frame  present iff bit0 of flags
//!    [19]       [4] checksum        present iff bit0 of flags
//! 15 or 23   2 × N  buttons, one u16 per frame
//! ```
//!
//! Everything is little-endian. The maximum packet is 87 bytes
//! (`23 + 32 × 2`), comfortably stack-allocated.
//!
//! The optional checksum block carries a state fingerprint for desync
//! detection. It is an opaque `u32` here; the codec neither computes nor
//! interprets it, which keeps this module independent of the simulation and
//! testable in isolation.
//!
//! # Failure contract
//!
//! Decoding returns `Option`: a packet that fails any validation step is
//! `None`, to be dropped by the caller. Stray or malicious datagrams are an
//! expected condition on a UDP port, not an error path. Encoding, by
//! contrast, returns typed errors: a local caller handing over an oversized
//! count or an undersized buffer is a bug worth surfacing.

use smallvec::SmallVec;

use crate::error::InvalidArgumentKind;
use crate::{Frame, Input, RampartError};

/// The four magic bytes opening every input packet.
pub const PACKET_MAGIC: [u8; 4] = *b"RBN1";

/// The packet format version this crate encodes and decodes.
pub const PACKET_VERSION: u8 = 1;

/// Maximum number of redundant input frames per packet.
pub const MAX_PACKET_INPUTS: usize = 32;

/// Header size without the checksum block.
pub const HEADER_SIZE: usize = 15;

/// Header size with the checksum block.
pub const HEADER_SIZE_WITH_CHECKSUM: usize = 23;

/// Maximum total packet size in bytes.
pub const MAX_PACKET_SIZE: usize = HEADER_SIZE_WITH_CHECKSUM + 2 * MAX_PACKET_INPUTS;

const FLAG_HAS_CHECKSUM: u8 = 0x01;
const FLAG_RESERVED_MASK: u8 = 0xFE;

/// A state-fingerprint attachment for desync detection.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct ChecksumReport {
    /// The frame the fingerprint was taken at.
    pub frame: Frame,
    /// The fingerprint itself; opaque to the codec.
    pub checksum: u32,
}

/// The decoded fixed-size portion of a packet, shared by both decode paths.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    /// Frame of the first input in the payload.
    pub start_frame: Frame,
    /// Number of inputs in the payload, in `[1, 32]`.
    pub count: usize,
    /// Highest frame this sender has confirmed receiving from its peer.
    pub ack_frame: Frame,
    /// Optional state-fingerprint attachment.
    pub checksum: Option<ChecksumReport>,
}

/// A full input packet: header plus the redundant input run.
///
/// `inputs[i]` is the input for frame `start_frame + i`. The inline capacity
/// of the vector covers [`MAX_PACKET_INPUTS`], so decoding never touches the
/// heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPacket {
    /// Frame of the first input in `inputs`.
    pub start_frame: Frame,
    /// Highest frame this sender has confirmed receiving from its peer.
    pub ack_frame: Frame,
    /// Optional state-fingerprint attachment.
    pub checksum: Option<ChecksumReport>,
    /// The redundant input run, oldest first.
    pub inputs: SmallVec<[Input; MAX_PACKET_INPUTS]>,
}

impl InputPacket {
    /// The encoded size of this packet in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let header = if self.checksum.is_some() {
            HEADER_SIZE_WITH_CHECKSUM
        } else {
            HEADER_SIZE
        };
        header + 2 * self.inputs.len()
    }
}

/// Encodes `packet` into `dst`, returning the number of bytes written.
///
/// The checksum attachment, if any, is copied verbatim; computing it is the
/// caller's concern.
///
/// # Errors
/// Returns [`RampartError::InvalidArgument`] if the input count is outside
/// `[1, 32]` or `dst` is smaller than [`InputPacket::encoded_len`].
pub fn encode(packet: &InputPacket, dst: &mut [u8]) -> Result<usize, RampartError> {
    let count = packet.inputs.len();
    if count < 1 || count > MAX_PACKET_INPUTS {
        return Err(InvalidArgumentKind::InputCountOutOfRange { count }.into());
    }
    let required = packet.encoded_len();
    if dst.len() < required {
        return Err(InvalidArgumentKind::DestinationTooSmall {
            required,
            provided: dst.len(),
        }
        .into());
    }

    dst[0..4].copy_from_slice(&PACKET_MAGIC);
    dst[4] = PACKET_VERSION;
    dst[5] = if packet.checksum.is_some() {
        FLAG_HAS_CHECKSUM
    } else {
        0
    };
    dst[6..10].copy_from_slice(&packet.start_frame.as_u32().to_le_bytes());
    dst[10] = count as u8;
    dst[11..15].copy_from_slice(&packet.ack_frame.as_u32().to_le_bytes());

    let mut offset = HEADER_SIZE;
    if let Some(report) = packet.checksum {
        dst[15..19].copy_from_slice(&report.frame.as_u32().to_le_bytes());
        dst[19..23].copy_from_slice(&report.checksum.to_le_bytes());
        offset = HEADER_SIZE_WITH_CHECKSUM;
    }

    for input in &packet.inputs {
        dst[offset..offset + 2].copy_from_slice(&input.bits().to_le_bytes());
        offset += 2;
    }

    Ok(offset)
}

/// Decodes a packet, collecting the inputs into the packet's inline vector.
///
/// Returns `None` on the first failed validation step: short buffer, wrong
/// magic, wrong version, reserved flag bits set, count outside `[1, 32]`, or
/// a total length that does not exactly match the declared count.
#[must_use]
pub fn decode(src: &[u8]) -> Option<InputPacket> {
    let mut inputs = SmallVec::new();
    let header = decode_header_and_inputs(src, &mut inputs)?;
    Some(InputPacket {
        start_frame: header.start_frame,
        ack_frame: header.ack_frame,
        checksum: header.checksum,
        inputs,
    })
}

/// Zero-allocation decode: writes the inputs into `inputs` and returns the
/// header separately.
///
/// `inputs` must hold at least the packet's declared count (≤
/// [`MAX_PACKET_INPUTS`]); shorter buffers fail the decode. Validation is
/// identical to [`decode`].
#[must_use]
pub fn decode_into(src: &[u8], inputs: &mut [Input]) -> Option<PacketHeader> {
    let header = validate(src)?;
    if inputs.len() < header.count {
        return None;
    }
    let offset = payload_offset(&header);
    for (i, slot) in inputs[..header.count].iter_mut().enumerate() {
        let at = offset + 2 * i;
        *slot = Input::from_bits(u16::from_le_bytes([src[at], src[at + 1]]));
    }
    Some(header)
}

fn decode_header_and_inputs(
    src: &[u8],
    inputs: &mut SmallVec<[Input; MAX_PACKET_INPUTS]>,
) -> Option<PacketHeader> {
    let header = validate(src)?;
    let offset = payload_offset(&header);
    for i in 0..header.count {
        let at = offset + 2 * i;
        inputs.push(Input::from_bits(u16::from_le_bytes([src[at], src[at + 1]])));
    }
    Some(header)
}

/// Runs the strict validation sequence and parses the fixed fields.
fn validate(src: &[u8]) -> Option<PacketHeader> {
    // 1. minimum header
    if src.len() < HEADER_SIZE {
        return None;
    }
    // 2. magic
    if src[0..4] != PACKET_MAGIC {
        return None;
    }
    // 3. version
    if src[4] != PACKET_VERSION {
        return None;
    }
    // 4. no reserved flag bits
    let flags = src[5];
    if flags & FLAG_RESERVED_MASK != 0 {
        return None;
    }
    let has_checksum = flags & FLAG_HAS_CHECKSUM != 0;
    // 5. count in range
    let count = src[10] as usize;
    if count < 1 || count > MAX_PACKET_INPUTS {
        return None;
    }
    // 6. exact total length
    let header_size = if has_checksum {
        HEADER_SIZE_WITH_CHECKSUM
    } else {
        HEADER_SIZE
    };
    if src.len() != header_size + 2 * count {
        return None;
    }

    let start_frame = Frame::new(u32::from_le_bytes([src[6], src[7], src[8], src[9]]));
    let ack_frame = Frame::new(u32::from_le_bytes([src[11], src[12], src[13], src[14]]));
    let checksum = if has_checksum {
        Some(ChecksumReport {
            frame: Frame::new(u32::from_le_bytes([src[15], src[16], src[17], src[18]])),
            checksum: u32::from_le_bytes([src[19], src[20], src[21], src[22]]),
        })
    } else {
        None
    };

    Some(PacketHeader {
        start_frame,
        count,
        ack_frame,
        checksum,
    })
}

const fn payload_offset(header: &PacketHeader) -> usize {
    if header.checksum.is_some() {
        HEADER_SIZE_WITH_CHECKSUM
    } else {
        HEADER_SIZE
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn sample_packet() -> InputPacket {
        InputPacket {
            start_frame: Frame::new(100),
            ack_frame: Frame::new(97),
            checksum: None,
            inputs: smallvec![Input::RIGHT, Input::RIGHT | Input::JUMP, Input::NEUTRAL],
        }
    }

    fn sample_packet_with_checksum() -> InputPacket {
        InputPacket {
            checksum: Some(ChecksumReport {
                frame: Frame::new(90),
                checksum: 0xDEADBEEF,
            }),
            ..sample_packet()
        }
    }

    fn encode_to_vec(packet: &InputPacket) -> Vec<u8> {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let len = encode(packet, &mut buf).unwrap();
        buf[..len].to_vec()
    }

    // ==========================================
    // Encode
    // ==========================================

    #[test]
    fn pinned_wire_layout() {
        // StartFrame=1, Count=1, AckFrame=2, buttons=0x0003, no checksum:
        // exactly the 17 bytes the format pins down.
        let packet = InputPacket {
            start_frame: Frame::new(1),
            ack_frame: Frame::new(2),
            checksum: None,
            inputs: smallvec![Input::from_bits(0x0003)],
        };
        let bytes = encode_to_vec(&packet);
        assert_eq!(
            bytes,
            [
                0x52, 0x42, 0x4E, 0x31, // "RBN1"
                0x01, // version
                0x00, // flags
                0x01, 0x00, 0x00, 0x00, // start frame
                0x01, // count
                0x02, 0x00, 0x00, 0x00, // ack frame
                0x03, 0x00, // buttons
            ]
        );
    }

    #[test]
    fn encoded_len_matches_written_bytes() {
        let packet = sample_packet();
        assert_eq!(encode_to_vec(&packet).len(), packet.encoded_len());
        assert_eq!(packet.encoded_len(), 15 + 3 * 2);

        let packet = sample_packet_with_checksum();
        assert_eq!(encode_to_vec(&packet).len(), packet.encoded_len());
        assert_eq!(packet.encoded_len(), 23 + 3 * 2);
    }

    #[test]
    fn checksum_flag_and_block_are_emitted() {
        let bytes = encode_to_vec(&sample_packet_with_checksum());
        assert_eq!(bytes[5], 0x01);
        assert_eq!(u32::from_le_bytes([bytes[15], bytes[16], bytes[17], bytes[18]]), 90);
        assert_eq!(
            u32::from_le_bytes([bytes[19], bytes[20], bytes[21], bytes[22]]),
            0xDEADBEEF
        );
    }

    #[test]
    fn empty_packet_is_rejected() {
        let packet = InputPacket {
            inputs: smallvec![],
            ..sample_packet()
        };
        let mut buf = [0u8; MAX_PACKET_SIZE];
        assert!(matches!(
            encode(&packet, &mut buf),
            Err(RampartError::InvalidArgument {
                kind: InvalidArgumentKind::InputCountOutOfRange { count: 0 }
            })
        ));
    }

    #[test]
    fn oversized_packet_is_rejected() {
        let packet = InputPacket {
            inputs: smallvec![Input::NEUTRAL; MAX_PACKET_INPUTS + 1],
            ..sample_packet()
        };
        let mut buf = [0u8; 2 * MAX_PACKET_SIZE];
        assert!(encode(&packet, &mut buf).is_err());
    }

    #[test]
    fn undersized_destination_is_rejected() {
        let packet = sample_packet();
        let mut buf = [0u8; 16]; // needs 21
        assert!(matches!(
            encode(&packet, &mut buf),
            Err(RampartError::InvalidArgument {
                kind: InvalidArgumentKind::DestinationTooSmall {
                    required: 21,
                    provided: 16
                }
            })
        ));
    }

    #[test]
    fn max_size_packet_fits_in_max_buffer() {
        let packet = InputPacket {
            checksum: Some(ChecksumReport {
                frame: Frame::ZERO,
                checksum: 0,
            }),
            inputs: smallvec![Input::ATTACK; MAX_PACKET_INPUTS],
            ..sample_packet()
        };
        let mut buf = [0u8; MAX_PACKET_SIZE];
        assert_eq!(encode(&packet, &mut buf).unwrap(), MAX_PACKET_SIZE);
        assert_eq!(MAX_PACKET_SIZE, 87);
    }

    // ==========================================
    // Decode round trips
    // ==========================================

    #[test]
    fn round_trip_without_checksum() {
        let packet = sample_packet();
        let decoded = decode(&encode_to_vec(&packet)).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn round_trip_with_checksum() {
        let packet = sample_packet_with_checksum();
        let decoded = decode(&encode_to_vec(&packet)).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn round_trip_preserves_reserved_input_bits() {
        let packet = InputPacket {
            inputs: smallvec![Input::from_bits(0xABCD)],
            ..sample_packet()
        };
        let decoded = decode(&encode_to_vec(&packet)).unwrap();
        assert_eq!(decoded.inputs[0].bits(), 0xABCD);
    }

    #[test]
    fn decode_into_matches_allocating_decode() {
        let packet = sample_packet_with_checksum();
        let bytes = encode_to_vec(&packet);

        let mut inputs = [Input::NEUTRAL; MAX_PACKET_INPUTS];
        let header = decode_into(&bytes, &mut inputs).unwrap();
        assert_eq!(header.start_frame, packet.start_frame);
        assert_eq!(header.ack_frame, packet.ack_frame);
        assert_eq!(header.checksum, packet.checksum);
        assert_eq!(header.count, 3);
        assert_eq!(&inputs[..3], packet.inputs.as_slice());
    }

    #[test]
    fn decode_into_rejects_short_destination() {
        let bytes = encode_to_vec(&sample_packet());
        let mut inputs = [Input::NEUTRAL; 2]; // packet carries 3
        assert!(decode_into(&bytes, &mut inputs).is_none());
    }

    // ==========================================
    // Decode validation, in order
    // ==========================================

    #[test]
    fn short_buffer_is_rejected() {
        let bytes = encode_to_vec(&sample_packet());
        assert!(decode(&bytes[..14]).is_none());
        assert!(decode(&[]).is_none());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = encode_to_vec(&sample_packet());
        bytes[3] = b'2';
        assert!(decode(&bytes).is_none());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut bytes = encode_to_vec(&sample_packet());
        bytes[4] = 0;
        assert!(decode(&bytes).is_none());
    }

    #[test]
    fn every_reserved_flag_bit_is_rejected() {
        let reference = encode_to_vec(&sample_packet());
        for bit in 1..8 {
            let mut bytes = reference.clone();
            bytes[5] |= 1 << bit;
            assert!(
                decode(&bytes).is_none(),
                "reserved flag bit {bit} was accepted"
            );
        }
    }

    #[test]
    fn zero_count_is_rejected() {
        let mut bytes = encode_to_vec(&sample_packet());
        bytes[10] = 0;
        assert!(decode(&bytes).is_none());
    }

    #[test]
    fn count_length_mismatch_is_rejected() {
        let mut bytes = encode_to_vec(&sample_packet());
        // Declare one more input than the buffer carries.
        bytes[10] += 1;
        assert!(decode(&bytes).is_none());
    }

    #[test]
    fn truncation_by_one_byte_is_rejected() {
        let bytes = encode_to_vec(&sample_packet());
        assert!(decode(&bytes[..bytes.len() - 1]).is_none());

        let bytes = encode_to_vec(&sample_packet_with_checksum());
        assert!(decode(&bytes[..bytes.len() - 1]).is_none());
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let mut bytes = encode_to_vec(&sample_packet());
        bytes.push(0x00);
        assert!(decode(&bytes).is_none());
    }

    #[test]
    fn checksum_is_carried_opaquely() {
        // The codec must not interpret the checksum: any bit pattern rides
        // through unchanged.
        for checksum in [0u32, 1, 0xFFFF_FFFF, 0x41B7_3DB7] {
            let packet = InputPacket {
                checksum: Some(ChecksumReport {
                    frame: Frame::new(12),
                    checksum,
                }),
                ..sample_packet()
            };
            let decoded = decode(&encode_to_vec(&packet)).unwrap();
            assert_eq!(decoded.checksum.unwrap().checksum, checksum);
        }
    }
}

// =============================================================================
// Property-Based Tests
// =============================================================================
