//! Views over rows of sub-byte palette indices.
//!
//! Indices are packed most-significant-first within each byte: bit 7 of
//! byte 0 is logical index 0 of a 1-bit row, the high nibble of byte 0 is
//! logical index 0 of a 4-bit row. This matches the on-disk order of the
//! indexed BMP and PNG family of formats.
use crate::layout_::{IndexDepth, IndexLayout, LayoutError};

/// A read-only view of one row of 1-bit or 4-bit palette indices.
///
/// The view borrows the row buffer, it never allocates, frees or resizes
/// it. Dropping the view has no effect on the buffer.
#[derive(Clone, Copy)]
pub struct IndexRow<'buf> {
    bytes: &'buf [u8],
    layout: IndexLayout,
}

/// A mutable view of one row of 1-bit or 4-bit palette indices.
///
/// Writes are masked merges: sibling indices sharing a byte and the trailing
/// bits of a final partial byte are never disturbed.
pub struct IndexRowMut<'buf> {
    bytes: &'buf mut [u8],
    layout: IndexLayout,
}

fn get_at(bytes: &[u8], depth: IndexDepth, at: u32) -> u8 {
    match depth {
        IndexDepth::One => {
            let byte = bytes[(at / 8) as usize];
            (byte >> (7 - at % 8)) & 1
        }
        IndexDepth::Four => {
            let byte = bytes[(at / 2) as usize];
            if at % 2 == 0 {
                byte >> 4
            } else {
                byte & 0xf
            }
        }
    }
}

impl<'buf> IndexRow<'buf> {
    /// Create a view of `bytes` under `layout`.
    ///
    /// Fails if the slice does not cover the row.
    pub fn with_layout(layout: IndexLayout, bytes: &'buf [u8]) -> Result<Self, LayoutError> {
        if bytes.len() < layout.byte_len() {
            return Err(LayoutError::TOO_SHORT);
        }

        Ok(IndexRow { bytes, layout })
    }

    pub fn layout(&self) -> IndexLayout {
        self.layout
    }

    /// The number of indices in the row.
    pub fn len(&self) -> u32 {
        self.layout.width()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.width() == 0
    }

    /// The borrowed row storage, including any partial final byte.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes
    }

    /// The index at position `at`.
    ///
    /// # Panics
    ///
    /// When `at` is not less than the row width.
    pub fn get(&self, at: u32) -> u8 {
        assert!(
            at < self.layout.width(),
            "index {at} out of row of {}",
            self.layout.width()
        );
        get_at(self.bytes, self.layout.depth(), at)
    }

    /// Iterate the indices of the row in order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        let depth = self.layout.depth();
        (0..self.layout.width()).map(move |at| get_at(self.bytes, depth, at))
    }

    /// Unpack the row into `out`, one byte per index.
    ///
    /// # Panics
    ///
    /// When `out` is not exactly as long as the row.
    pub fn unpack_into(&self, out: &mut [u8]) {
        assert_eq!(
            out.len(),
            self.layout.width() as usize,
            "destination length must match the row width"
        );
        for (slot, value) in out.iter_mut().zip(self.iter()) {
            *slot = value;
        }
    }

    /// The unpacked row, one byte per index.
    pub fn unpack_to_vec(&self) -> Vec<u8> {
        self.iter().collect()
    }
}

impl<'buf> IndexRowMut<'buf> {
    /// Create a mutable view of `bytes` under `layout`.
    ///
    /// Fails if the slice does not cover the row.
    pub fn with_layout(layout: IndexLayout, bytes: &'buf mut [u8]) -> Result<Self, LayoutError> {
        if bytes.len() < layout.byte_len() {
            return Err(LayoutError::TOO_SHORT);
        }

        Ok(IndexRowMut { bytes, layout })
    }

    /// Reborrow as a read-only view.
    pub fn as_ref(&self) -> IndexRow<'_> {
        IndexRow {
            bytes: self.bytes,
            layout: self.layout,
        }
    }

    pub fn layout(&self) -> IndexLayout {
        self.layout
    }

    pub fn len(&self) -> u32 {
        self.layout.width()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.width() == 0
    }

    /// The borrowed row storage, including any partial final byte.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.bytes
    }

    /// The index at position `at`.
    ///
    /// # Panics
    ///
    /// When `at` is not less than the row width.
    pub fn get(&self, at: u32) -> u8 {
        self.as_ref().get(at)
    }

    /// Store `value` at position `at` without disturbing sibling indices.
    ///
    /// # Panics
    ///
    /// When `at` is not less than the row width, or `value` exceeds the
    /// depth's maximum (1 for 1-bit rows, 15 for 4-bit rows).
    pub fn set(&mut self, at: u32, value: u8) {
        let width = self.layout.width();
        let max = self.layout.depth().max_index();
        assert!(at < width, "index {at} out of row of {width}");
        assert!(value <= max, "index value {value} exceeds {max}");

        match self.layout.depth() {
            IndexDepth::One => {
                let bit = 7 - at % 8;
                let byte = &mut self.bytes[(at / 8) as usize];
                *byte = (*byte & !(1 << bit)) | (value << bit);
            }
            IndexDepth::Four => {
                let byte = &mut self.bytes[(at / 2) as usize];
                if at % 2 == 0 {
                    *byte = (*byte & 0x0f) | (value << 4);
                } else {
                    *byte = (*byte & 0xf0) | value;
                }
            }
        }
    }

    /// Pack a full row of one-byte-per-index values.
    ///
    /// Bulk counterpart of [`Self::set`]: whole bytes are composed in one
    /// write each, a final partial byte is merged so its trailing bits keep
    /// their previous contents.
    ///
    /// # Panics
    ///
    /// When `values` is not exactly as long as the row, or any value exceeds
    /// the depth's maximum.
    pub fn pack_from(&mut self, values: &[u8]) {
        let width = self.layout.width() as usize;
        let depth = self.layout.depth();
        let max = depth.max_index();
        assert_eq!(values.len(), width, "source length must match the row width");

        let per_byte = depth.per_byte() as usize;
        let bits = depth.bits();

        let mut chunks = values.chunks_exact(per_byte);
        for (byte, chunk) in self.bytes.iter_mut().zip(&mut chunks) {
            let mut acc = 0u8;
            for &value in chunk {
                assert!(value <= max, "index value {value} exceeds {max}");
                acc = (acc << bits) | value;
            }
            *byte = acc;
        }

        let tail = chunks.remainder();
        if !tail.is_empty() {
            let mut acc = 0u8;
            for &value in tail {
                assert!(value <= max, "index value {value} exceeds {max}");
                acc = (acc << bits) | value;
            }

            let used = tail.len() as u32 * bits;
            let keep = 8 - used;
            let written = !0u8 << keep;
            let byte = &mut self.bytes[width / per_byte];
            *byte = (*byte & !written) | (acc << keep);
        }
    }
}
