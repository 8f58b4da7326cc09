//! Running XOR checksum as kept by the stream classifier.
//!
//! The body checksum is the XOR of every byte between the start marker and
//! the `*`. The two transmitted hex digits are then folded into the same
//! accumulator nibble by nibble:
//!
//! ```text
//! acc = (acc ^ (nibble(d1) << 4)) << 4
//! acc = (acc ^ (nibble(d2) << 4)) << 4
//! ```
//!
//! which leaves `(body ^ transmitted) << 8`. A matching checksum therefore
//! clears the whole accumulator, and the byte above the low byte is the
//! residual that gets reported.

/// Converts an ASCII hex digit to its value, case-insensitively.
///
/// Bytes that are not hex digits are not rejected: they go through the same
/// arithmetic and wrap, so a corrupt checksum field still leaves a nonzero
/// residual behind.
pub fn nibble(byte: u8) -> u32 {
    // lowercase
    let byte = u32::from(byte | 0x20);
    if byte > u32::from(b'9') {
        byte.wrapping_sub(u32::from(b'a')).wrapping_add(10)
    } else {
        byte.wrapping_sub(u32::from(b'0'))
    }
}

/// XOR of all bytes in `body`.
pub fn checksum(body: &[u8]) -> u8 {
    body.iter().fold(0, |acc, b| acc ^ b)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Accumulator(u32);

impl Accumulator {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// XOR one body byte into the running checksum.
    pub fn absorb(&mut self, byte: u8) {
        self.0 ^= u32::from(byte);
    }

    /// Fold one transmitted checksum digit into the accumulator.
    pub fn fold_digit(&mut self, digit: u8) {
        self.0 ^= nibble(digit).wrapping_shl(4);
        self.0 = self.0.wrapping_shl(4);
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn low_byte(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn is_clear(&self) -> bool {
        self.0 == 0
    }

    /// Mismatch between recomputed and transmitted checksum, valid once
    /// both digits have been folded in.
    pub fn residual(&self) -> u32 {
        self.0 >> 8
    }
}
