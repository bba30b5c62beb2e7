//! Mapping of an arbitrary byte range onto 8-byte hardware words.
//!
//! The remote side addresses memory in aligned doublewords. A request names
//! the aligned base address, the number of words minus one, and one
//! byte-enable mask each for the first and the last word. Words in between
//! are always fully enabled.

/// Bytes per hardware word
pub const WORD_BYTES: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    /// Address rounded down to a word boundary
    pub base: u64,
    /// Position of the first byte inside the first word (0..=7)
    pub offset: u64,
    /// offset + length
    pub span: u64,
    /// Number of words touched
    pub dwords: u64,
    /// Wire value: dwords - 1
    pub request_len: u8,
    /// Bytes of the request that fall into the first word
    pub first_run: u64,
    pub first_mask: u8,
    /// Zero when the request fits in a single word
    pub last_mask: u8,
}

impl Alignment {
    /// Compute base address, word count and byte-enable masks for `len`
    /// bytes starting at `address`.
    ///
    /// `len` must be in `1..=226`; a zero length is treated as one word with
    /// no bytes enabled.
    pub fn compute(address: u64, len: usize) -> Self {
        let len = len as u64;
        let base = address & !(WORD_BYTES - 1);
        let offset = address - base;
        let span = offset + len;
        let dwords = span.div_ceil(WORD_BYTES).max(1);
        let first_run = len.min(WORD_BYTES - offset);

        let first_mask = if offset == 0 && first_run == WORD_BYTES {
            0xFF
        } else {
            (((1u16 << first_run) - 1) << offset) as u8
        };

        let last_mask = if dwords == 1 {
            0
        } else {
            match span % WORD_BYTES {
                0 => 0xFF,
                tail => ((1u16 << tail) - 1) as u8,
            }
        };

        Alignment {
            base,
            offset,
            span,
            dwords,
            request_len: (dwords - 1) as u8,
            first_run,
            first_mask,
            last_mask,
        }
    }

    /// Packed request attribute: first mask in the low byte, last mask in
    /// the high byte
    pub fn attribute(&self) -> u16 {
        self.first_mask as u16 | (self.last_mask as u16) << 8
    }
}
