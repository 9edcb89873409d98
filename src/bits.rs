// src/bits.rs

// Conversion between FIFO bytes and '0'/'1' bit strings, and TX framing.
// A TX frame is always 512 bits: `10101010` preamble bytes, the 16-bit sync
// word, then the payload, all MSB first.

use heapless::{String, Vec};

use crate::config::SyncWord;
use crate::errors::FrameError;
use crate::registers::FIFO_SIZE;

pub const MAX_FRAME_BITS: usize = FIFO_SIZE * 8;
pub const SYNC_WORD_BITS: usize = 16;
/// Largest payload that still leaves room for the sync word.
pub const MAX_PAYLOAD_BITS: usize = MAX_FRAME_BITS - SYNC_WORD_BITS;
pub const PREAMBLE_BYTE: u8 = 0b1010_1010;

pub type BitString = String<MAX_FRAME_BITS>;
pub type Frame = Vec<u8, FIFO_SIZE>;

/// Eight characters per byte, most significant bit first.
pub fn bits_from_bytes(bytes: &[u8]) -> Result<BitString, FrameError> {
    let too_long = FrameError::InvalidLength { bytes: bytes.len() };
    let mut bits = BitString::new();
    for byte in bytes {
        for shift in (0..8).rev() {
            let digit = if (byte >> shift) & 1 == 1 { '1' } else { '0' };
            bits.push(digit).map_err(|_| too_long)?;
        }
    }
    Ok(bits)
}

/// Packs a bit string whose length is a multiple of 8.
pub fn pack_bits(bits: &str) -> Result<Frame, FrameError> {
    if bits.len() % 8 != 0 {
        return Err(FrameError::Misaligned { bits: bits.len() });
    }
    let mut bytes = Frame::new();
    for chunk in bits.as_bytes().chunks(8) {
        let mut byte = 0u8;
        for digit in chunk {
            byte = match digit {
                b'0' => byte << 1,
                b'1' => byte << 1 | 1,
                _ => return Err(FrameError::NotBinary),
            };
        }
        bytes
            .push(byte)
            .map_err(|_| FrameError::InvalidLength { bytes: bits.len() / 8 })?;
    }
    Ok(bytes)
}

/// Number of preamble bits placed in front of a payload of `payload_bits`.
pub fn padding_bits(payload_bits: usize) -> Option<usize> {
    MAX_PAYLOAD_BITS
        .checked_sub(payload_bits)
        .map(|free| free / 8 * 8)
}

/// Builds the on-air frame: preamble, sync word, payload.
pub fn frame_payload(payload: &str, sync_word: SyncWord) -> Result<Frame, FrameError> {
    let padding = padding_bits(payload.len())
        .ok_or(FrameError::PayloadTooLong { bits: payload.len() })?;
    let body = pack_bits(payload)?;

    let mut frame = Frame::new();
    let overflow = FrameError::PayloadTooLong { bits: payload.len() };
    for _ in 0..padding / 8 {
        frame.push(PREAMBLE_BYTE).map_err(|_| overflow)?;
    }
    frame
        .extend_from_slice(&sync_word.to_be_bytes())
        .map_err(|_| overflow)?;
    frame.extend_from_slice(&body).map_err(|_| overflow)?;
    Ok(frame)
}
