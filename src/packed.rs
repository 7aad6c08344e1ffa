//! Views over rows of packed color pixels.
//!
//! A view interprets a borrowed byte slice as pixels in one of the encodings
//! of [`ColorCodec`], converting through the canonical [`Color`] on every
//! access. The buffer is owned elsewhere, typically by a format decoder; the
//! view never copies or reallocates it.
use crate::color::{Channel, Color};
use crate::layout_::{ColorCodec, LayoutError, RowLayout};

/// A read-only view of one row of packed color pixels.
#[derive(Clone, Copy)]
pub struct PackedRow<'buf> {
    bytes: &'buf [u8],
    layout: RowLayout,
}

/// A mutable view of one row of packed color pixels.
pub struct PackedRowMut<'buf> {
    bytes: &'buf mut [u8],
    layout: RowLayout,
}

fn offset(layout: &RowLayout, at: u32) -> usize {
    assert!(
        at < layout.width(),
        "pixel {at} out of row of {}",
        layout.width()
    );
    at as usize * layout.codec().bytes_per_pixel()
}

fn color_at(bytes: &[u8], layout: &RowLayout, at: u32) -> Color {
    let start = offset(layout, at);
    match layout.codec() {
        ColorCodec::Index8 => panic!("an 8-bit indexed row resolves colors through a palette"),
        ColorCodec::Packed16(_) => {
            let word = u16::from_le_bytes([bytes[start], bytes[start + 1]]);
            let [r, g, b] = layout.fields();
            Color::rgb(r.expand(word), g.expand(word), b.expand(word))
        }
        ColorCodec::Rgb24 => Color::rgb(bytes[start], bytes[start + 1], bytes[start + 2]),
        ColorCodec::Rgba32 => Color::new(
            bytes[start],
            bytes[start + 1],
            bytes[start + 2],
            bytes[start + 3],
        ),
    }
}

fn word_at(bytes: &[u8], layout: &RowLayout, at: u32) -> u32 {
    let start = offset(layout, at);
    match layout.codec() {
        ColorCodec::Index8 => u32::from(bytes[start]),
        ColorCodec::Packed16(_) => u32::from(u16::from_le_bytes([bytes[start], bytes[start + 1]])),
        ColorCodec::Rgb24 => u32::from_le_bytes([bytes[start], bytes[start + 1], bytes[start + 2], 0]),
        ColorCodec::Rgba32 => u32::from_le_bytes([
            bytes[start],
            bytes[start + 1],
            bytes[start + 2],
            bytes[start + 3],
        ]),
    }
}

impl<'buf> PackedRow<'buf> {
    /// Create a view of `bytes` under `layout`.
    ///
    /// Fails if the slice does not cover the row.
    pub fn with_layout(layout: RowLayout, bytes: &'buf [u8]) -> Result<Self, LayoutError> {
        if bytes.len() < layout.byte_len() {
            return Err(LayoutError::TOO_SHORT);
        }

        Ok(PackedRow { bytes, layout })
    }

    pub fn layout(&self) -> RowLayout {
        self.layout
    }

    /// The number of pixels in the row.
    pub fn len(&self) -> u32 {
        self.layout.width()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.width() == 0
    }

    /// The borrowed row storage.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes
    }

    /// The pixel at position `at` widened to canonical form.
    ///
    /// # Panics
    ///
    /// When `at` is not less than the row width, and on an
    /// [`ColorCodec::Index8`] row, which has no intrinsic colors.
    pub fn color(&self, at: u32) -> Color {
        color_at(self.bytes, &self.layout, at)
    }

    /// One channel of the pixel at position `at`, widened to 8 bits.
    ///
    /// [`Channel::A`] reads 255 on encodings that store no alpha.
    ///
    /// # Panics
    ///
    /// As [`Self::color`].
    pub fn channel(&self, at: u32, which: Channel) -> u8 {
        self.color(at).channel(which)
    }

    /// The raw bits of the pixel at position `at`.
    ///
    /// Escape hatch for format codecs that need direct access: the index
    /// byte of an `Index8` row, the little-endian word of a `Packed16` row,
    /// the three bytes of an `Rgb24` pixel in the low 24 bits, the four
    /// bytes of an `Rgba32` pixel.
    ///
    /// # Panics
    ///
    /// When `at` is not less than the row width.
    pub fn packed_word(&self, at: u32) -> u32 {
        word_at(self.bytes, &self.layout, at)
    }

    /// The palette index at position `at` of a [`ColorCodec::Index8`] row.
    ///
    /// # Panics
    ///
    /// When `at` is not less than the row width, or the row has another
    /// codec.
    pub fn index(&self, at: u32) -> u8 {
        assert_eq!(
            self.layout.codec(),
            ColorCodec::Index8,
            "only 8-bit indexed rows store palette indices"
        );
        self.bytes[offset(&self.layout, at)]
    }

    /// Iterate the palette indices of a [`ColorCodec::Index8`] row.
    ///
    /// # Panics
    ///
    /// When the row has another codec.
    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        assert_eq!(
            self.layout.codec(),
            ColorCodec::Index8,
            "only 8-bit indexed rows store palette indices"
        );
        self.bytes[..self.layout.byte_len()].iter().copied()
    }

    /// Iterate the pixels of the row in canonical form.
    ///
    /// # Panics
    ///
    /// On a [`ColorCodec::Index8`] row, which has no intrinsic colors.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        assert_ne!(
            self.layout.codec(),
            ColorCodec::Index8,
            "an 8-bit indexed row resolves colors through a palette"
        );
        (0..self.layout.width()).map(move |at| color_at(self.bytes, &self.layout, at))
    }
}

impl<'buf> PackedRowMut<'buf> {
    /// Create a mutable view of `bytes` under `layout`.
    ///
    /// Fails if the slice does not cover the row.
    pub fn with_layout(layout: RowLayout, bytes: &'buf mut [u8]) -> Result<Self, LayoutError> {
        if bytes.len() < layout.byte_len() {
            return Err(LayoutError::TOO_SHORT);
        }

        Ok(PackedRowMut { bytes, layout })
    }

    /// Reborrow as a read-only view.
    pub fn as_ref(&self) -> PackedRow<'_> {
        PackedRow {
            bytes: self.bytes,
            layout: self.layout,
        }
    }

    pub fn layout(&self) -> RowLayout {
        self.layout
    }

    pub fn len(&self) -> u32 {
        self.layout.width()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.width() == 0
    }

    /// The borrowed row storage.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.bytes
    }

    /// The pixel at position `at` widened to canonical form.
    ///
    /// # Panics
    ///
    /// As [`PackedRow::color`].
    pub fn color(&self, at: u32) -> Color {
        color_at(self.bytes, &self.layout, at)
    }

    /// Store `color` at position `at`, narrowed to the row's encoding.
    ///
    /// The alpha channel is dropped by encodings that store none; a
    /// `Packed16` pixel keeps any word bits outside the channel masks.
    ///
    /// # Panics
    ///
    /// When `at` is not less than the row width, and on an
    /// [`ColorCodec::Index8`] row, which has no intrinsic colors.
    pub fn set_color(&mut self, at: u32, color: Color) {
        let start = offset(&self.layout, at);
        match self.layout.codec() {
            ColorCodec::Index8 => {
                panic!("an 8-bit indexed row resolves colors through a palette")
            }
            ColorCodec::Packed16(_) => {
                let word = u16::from_le_bytes([self.bytes[start], self.bytes[start + 1]]);
                let [r, g, b] = self.layout.fields();
                let word = r.compress(word, color.r);
                let word = g.compress(word, color.g);
                let word = b.compress(word, color.b);
                self.bytes[start..start + 2].copy_from_slice(&word.to_le_bytes());
            }
            ColorCodec::Rgb24 => {
                self.bytes[start..start + 3].copy_from_slice(&[color.r, color.g, color.b]);
            }
            ColorCodec::Rgba32 => {
                self.bytes[start..start + 4]
                    .copy_from_slice(&[color.r, color.g, color.b, color.a]);
            }
        }
    }

    /// One channel of the pixel at position `at`, widened to 8 bits.
    ///
    /// # Panics
    ///
    /// As [`PackedRow::color`].
    pub fn channel(&self, at: u32, which: Channel) -> u8 {
        self.color(at).channel(which)
    }

    /// Store one channel of the pixel at position `at`.
    ///
    /// Writing [`Channel::A`] on an encoding without stored alpha has no
    /// effect.
    ///
    /// # Panics
    ///
    /// As [`Self::set_color`].
    pub fn set_channel(&mut self, at: u32, which: Channel, value: u8) {
        if matches!(which, Channel::A)
            && !matches!(self.layout.codec(), ColorCodec::Rgba32 | ColorCodec::Index8)
        {
            return;
        }

        let mut color = self.color(at);
        color.set_channel(which, value);
        self.set_color(at, color);
    }

    /// The raw bits of the pixel at position `at`.
    ///
    /// # Panics
    ///
    /// As [`PackedRow::packed_word`].
    pub fn packed_word(&self, at: u32) -> u32 {
        word_at(self.bytes, &self.layout, at)
    }

    /// Store the raw bits of the pixel at position `at`.
    ///
    /// Counterpart of [`PackedRow::packed_word`] with the same word layout
    /// per codec.
    ///
    /// # Panics
    ///
    /// When `at` is not less than the row width, or `raw` has bits set
    /// outside the codec's word size.
    pub fn set_packed_word(&mut self, at: u32, raw: u32) {
        let start = offset(&self.layout, at);
        let size = self.layout.codec().bytes_per_pixel();
        assert!(
            size == 4 || raw >> (8 * size) == 0,
            "raw word {raw:#x} exceeds {size} bytes per pixel"
        );
        self.bytes[start..start + size].copy_from_slice(&raw.to_le_bytes()[..size]);
    }

    /// The palette index at position `at` of a [`ColorCodec::Index8`] row.
    ///
    /// # Panics
    ///
    /// As [`PackedRow::index`].
    pub fn index(&self, at: u32) -> u8 {
        self.as_ref().index(at)
    }

    /// Store the palette index at position `at` of an
    /// [`ColorCodec::Index8`] row.
    ///
    /// # Panics
    ///
    /// When `at` is not less than the row width, or the row has another
    /// codec.
    pub fn set_index(&mut self, at: u32, index: u8) {
        assert_eq!(
            self.layout.codec(),
            ColorCodec::Index8,
            "only 8-bit indexed rows store palette indices"
        );
        let start = offset(&self.layout, at);
        self.bytes[start] = index;
    }
}

#[cfg(test)]
mod tests {
    use super::{PackedRow, PackedRowMut};
    use crate::color::{Channel, Color};
    use crate::layout_::{ChannelMasks, ColorCodec, LayoutError, RowLayout};

    fn row_555(width: u32) -> RowLayout {
        RowLayout::new(ColorCodec::Packed16(ChannelMasks::RGB555), width).unwrap()
    }

    #[test]
    fn packed16_white_round_trips_within_quantization() {
        let layout = row_555(4);
        let mut bytes = [0u8; 8];
        let mut row = PackedRowMut::with_layout(layout, &mut bytes).unwrap();

        row.set_color(2, Color::WHITE);
        let back = row.color(2);
        for which in [Channel::R, Channel::G, Channel::B] {
            assert!(255 - back.channel(which) <= 8, "{which:?} read {back:?}");
        }
        assert_eq!(back.a, 255);
    }

    #[test]
    fn packed16_word_is_little_endian() {
        let layout = RowLayout::new(ColorCodec::Packed16(ChannelMasks::RGB565), 2).unwrap();
        let mut bytes = [0u8; 4];
        let mut row = PackedRowMut::with_layout(layout, &mut bytes).unwrap();

        row.set_color(0, Color::rgb(255, 0, 0));
        assert_eq!(row.packed_word(0), 0xf800);
        assert_eq!(bytes, [0x00, 0xf8, 0x00, 0x00]);
    }

    #[test]
    fn packed16_preserves_unmasked_bits() {
        // The x-bit of a 15-bit layout survives color writes.
        let layout = row_555(1);
        let mut bytes = 0x8000u16.to_le_bytes();
        let mut row = PackedRowMut::with_layout(layout, &mut bytes).unwrap();

        row.set_color(0, Color::rgb(12, 34, 56));
        assert_eq!(row.packed_word(0) & 0x8000, 0x8000);
    }

    #[test]
    fn packed16_channel_write_is_isolated() {
        let layout = row_555(1);
        let mut bytes = [0u8; 2];
        let mut row = PackedRowMut::with_layout(layout, &mut bytes).unwrap();

        row.set_color(0, Color::rgb(255, 255, 255));
        row.set_channel(0, Channel::G, 0);
        let color = row.color(0);
        assert_eq!(color.g, 0);
        assert_eq!(color.r, 255);
        assert_eq!(color.b, 255);
    }

    #[test]
    fn rgb24_is_direct_and_opaque() {
        let layout = RowLayout::new(ColorCodec::Rgb24, 2).unwrap();
        let mut bytes = [0u8; 6];
        let mut row = PackedRowMut::with_layout(layout, &mut bytes).unwrap();

        row.set_color(1, Color::new(1, 2, 3, 77));
        assert_eq!(bytes, [0, 0, 0, 1, 2, 3]);

        let row = PackedRow::with_layout(layout, &bytes).unwrap();
        // Stored alpha was dropped, reads opaque.
        assert_eq!(row.color(1), Color::new(1, 2, 3, 255));
        assert_eq!(row.packed_word(1), 0x03_02_01);
    }

    #[test]
    fn rgba32_round_trips_exactly() {
        let layout = RowLayout::new(ColorCodec::Rgba32, 3).unwrap();
        let mut bytes = [0u8; 12];
        let mut row = PackedRowMut::with_layout(layout, &mut bytes).unwrap();

        let colors = [
            Color::new(0, 255, 17, 3),
            Color::new(128, 127, 126, 0),
            Color::new(9, 8, 7, 255),
        ];
        for (at, &color) in colors.iter().enumerate() {
            row.set_color(at as u32, color);
        }
        for (at, &color) in colors.iter().enumerate() {
            assert_eq!(row.color(at as u32), color);
        }
    }

    #[test]
    fn alpha_write_on_opaque_encoding_is_dropped() {
        let layout = RowLayout::new(ColorCodec::Rgb24, 1).unwrap();
        let mut bytes = [7u8; 3];
        let mut row = PackedRowMut::with_layout(layout, &mut bytes).unwrap();

        row.set_channel(0, Channel::A, 0);
        assert_eq!(bytes, [7, 7, 7]);
    }

    #[test]
    fn index8_stores_raw_bytes() {
        let layout = RowLayout::new(ColorCodec::Index8, 4).unwrap();
        let mut bytes = [0u8; 4];
        let mut row = PackedRowMut::with_layout(layout, &mut bytes).unwrap();

        row.set_index(0, 3);
        row.set_packed_word(1, 200);
        assert_eq!(row.index(0), 3);
        assert_eq!(row.as_ref().indices().collect::<Vec<_>>(), [3, 200, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "through a palette")]
    fn index8_has_no_intrinsic_colors() {
        let layout = RowLayout::new(ColorCodec::Index8, 1).unwrap();
        let bytes = [0u8; 1];
        let row = PackedRow::with_layout(layout, &bytes).unwrap();
        row.color(0);
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn oversized_raw_word_is_a_contract_violation() {
        let layout = RowLayout::new(ColorCodec::Index8, 1).unwrap();
        let mut bytes = [0u8; 1];
        let mut row = PackedRowMut::with_layout(layout, &mut bytes).unwrap();
        row.set_packed_word(0, 0x100);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let layout = RowLayout::new(ColorCodec::Rgba32, 2).unwrap();
        let bytes = [0u8; 7];
        assert_eq!(
            PackedRow::with_layout(layout, &bytes).err(),
            Some(LayoutError::TOO_SHORT)
        );
    }
}
