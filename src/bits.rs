//! Per-channel bit fields within a packed 16-bit word.

/// Specifies which bits of a packed word one channel comes from.
///
/// Derived from a channel mask at layout construction: the shift is the
/// position of the mask's lowest set bit, the length its population count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct MaskBits {
    pub(crate) shift: u32,
    pub(crate) len: u32,
}

impl MaskBits {
    /// Derive the bit field selected by `mask`.
    ///
    /// Returns `None` for an empty mask and for a mask whose set bits are
    /// not contiguous, since neither has a usable shift/maximum pair.
    pub(crate) fn from_mask(mask: u16) -> Option<Self> {
        if mask == 0 {
            return None;
        }

        let shift = mask.trailing_zeros();
        let body = u32::from(mask) >> shift;
        let len = body.trailing_ones();

        if body != (1 << len) - 1 {
            return None;
        }

        Some(MaskBits { shift, len })
    }

    pub(crate) const fn mask(self) -> u16 {
        (((1u32 << self.len) - 1) << self.shift) as u16
    }

    /// The largest value the field can hold, e.g. 31 for a 5-bit channel.
    pub(crate) const fn max(self) -> u16 {
        ((1u32 << self.len) - 1) as u16
    }

    /// Widen the channel field of `word` to the canonical 8-bit range.
    ///
    /// Scales by `255 / max` with rounding to nearest, so a full field reads
    /// as 255 and an empty one as 0.
    pub(crate) fn expand(self, word: u16) -> u8 {
        let field = u32::from(word & self.mask()) >> self.shift;
        let max = u32::from(self.max());
        ((field * 255 + max / 2) / max) as u8
    }

    /// Narrow an 8-bit channel value into the field, merging it into `word`.
    ///
    /// Bits outside the field are left untouched.
    pub(crate) fn compress(self, word: u16, value: u8) -> u16 {
        let max = u32::from(self.max());
        let field = (u32::from(value) * max + 127) / 255;
        (word & !self.mask()) | ((field as u16) << self.shift)
    }
}
