//! Palette storage and palette reduction.
//!
//! Index rows store small integers, the palette owns the colors they refer
//! to. Keeping the lookup on this side of the boundary means the row views
//! stay thin codecs over raw bytes; anything that needs actual colors for
//! an indexed image goes through [`Palette::resolve`].
use std::collections::{HashMap, HashSet};

use crate::color::Color;
use crate::index::IndexRowMut;
use crate::layout_::LayoutError;

/// An ordered sequence of up to 256 colors referenced by index rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Create a palette from its colors, in slot order.
    ///
    /// Fails when more than 256 colors are given, the most an 8-bit index
    /// can reference.
    pub fn with_colors(colors: Vec<Color>) -> Result<Self, LayoutError> {
        if colors.len() > 256 {
            return Err(LayoutError::PALETTE_TOO_LARGE);
        }

        Ok(Palette { colors })
    }

    /// Create a palette from raw `r, g, b, a` quads.
    ///
    /// Fails when the byte length is not a multiple of four or describes
    /// more than 256 colors.
    pub fn from_rgba_bytes(bytes: &[u8]) -> Result<Self, LayoutError> {
        let colors: &[Color] =
            bytemuck::try_cast_slice(bytes).map_err(|_| LayoutError::TOO_SHORT)?;
        Self::with_colors(colors.to_vec())
    }

    /// The number of palette slots.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// All slots in index order.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// The palette storage as raw `r, g, b, a` quads.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// The color in `slot`.
    ///
    /// # Panics
    ///
    /// When `slot` is not less than the palette length.
    pub fn get(&self, slot: u8) -> Color {
        self.colors[usize::from(slot)]
    }

    /// Replace the color in `slot`.
    ///
    /// # Panics
    ///
    /// When `slot` is not less than the palette length.
    pub fn set(&mut self, slot: u8, color: Color) {
        self.colors[usize::from(slot)] = color;
    }

    /// Map a stream of palette indices to their colors.
    ///
    /// The returned iterator panics on an index that is not a palette slot,
    /// the same contract as [`Self::get`].
    pub fn resolve<'p, I>(&'p self, indices: I) -> impl Iterator<Item = Color> + 'p
    where
        I: IntoIterator<Item = u8>,
        I::IntoIter: 'p,
    {
        indices.into_iter().map(move |slot| self.get(slot))
    }

    /// Count the distinct colors an index stream references.
    ///
    /// Two slots holding the same color value count once, so the result can
    /// be lower than the number of distinct indices.
    pub fn unique_color_count<I>(&self, indices: I) -> usize
    where
        I: IntoIterator<Item = u8>,
    {
        unique_color_count(self.resolve(indices))
    }

    /// Build the table that compacts duplicate slots.
    ///
    /// Slots are scanned in index order; every slot maps to the first slot
    /// holding an equal color, so ties deterministically resolve to the
    /// lowest index. The palette itself and any pixel data are untouched.
    pub fn shrink_lut(&self) -> ShrinkLut {
        let mut first_seen: HashMap<Color, u8> = HashMap::with_capacity(self.colors.len());
        let mut map = Vec::with_capacity(self.colors.len());

        for (slot, &color) in self.colors.iter().enumerate() {
            let canonical = *first_seen.entry(color).or_insert(slot as u8);
            map.push(canonical);
        }

        ShrinkLut {
            distinct: first_seen.len(),
            map: map.into_boxed_slice(),
        }
    }
}

/// Count the distinct colors in a pixel stream.
///
/// Use with [`PackedRow::colors`](crate::PackedRow::colors) for direct-color
/// rows, or [`Palette::unique_color_count`] for indexed rows.
pub fn unique_color_count(colors: impl IntoIterator<Item = Color>) -> usize {
    let mut seen = HashSet::new();
    seen.extend(colors);
    seen.len()
}

/// A table mapping redundant palette slots to their first-seen equal.
///
/// Built by [`Palette::shrink_lut`]. Applying it to an index row makes
/// every index refer to the canonical slot of its color, after which the
/// trailing duplicate slots of the palette are dead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShrinkLut {
    map: Box<[u8]>,
    distinct: usize,
}

impl ShrinkLut {
    /// The canonical slot for `slot`, the first one holding an equal color.
    ///
    /// Always at most `slot`, so a remapped index stays within the range of
    /// its row depth.
    ///
    /// # Panics
    ///
    /// When `slot` is not a slot of the palette this table was built from.
    pub fn remap(&self, slot: u8) -> u8 {
        self.map[usize::from(slot)]
    }

    /// The number of distinct colors in the palette.
    pub fn distinct(&self) -> usize {
        self.distinct
    }

    /// The full table, one canonical slot per palette slot.
    pub fn as_slice(&self) -> &[u8] {
        &self.map
    }

    /// Rewrite a sub-byte index row through the table.
    ///
    /// # Panics
    ///
    /// When the row references a slot outside the palette.
    pub fn apply(&self, row: &mut IndexRowMut<'_>) {
        for at in 0..row.len() {
            let slot = row.get(at);
            row.set(at, self.remap(slot));
        }
    }

    /// Rewrite a row of 8-bit indices through the table.
    ///
    /// Accepts the raw bytes of a [`ColorCodec::Index8`] row, see
    /// [`PackedRowMut::as_bytes_mut`](crate::PackedRowMut::as_bytes_mut).
    ///
    /// # Panics
    ///
    /// When the row references a slot outside the palette.
    ///
    /// [`ColorCodec::Index8`]: crate::layout::ColorCodec::Index8
    pub fn apply_bytes(&self, indices: &mut [u8]) {
        for slot in indices {
            *slot = self.remap(*slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{unique_color_count, Palette};
    use crate::color::Color;
    use crate::index::IndexRowMut;
    use crate::layout_::{IndexDepth, IndexLayout, LayoutError};

    const A: Color = Color::rgb(10, 0, 0);
    const B: Color = Color::rgb(0, 20, 0);
    const C: Color = Color::rgb(0, 0, 30);

    #[test]
    fn shrink_lut_maps_to_first_occurrence() {
        let palette = Palette::with_colors(vec![A, B, A, C, B]).unwrap();
        let lut = palette.shrink_lut();

        assert_eq!(lut.as_slice(), [0, 1, 0, 3, 1]);
        assert_eq!(lut.distinct(), 3);
    }

    #[test]
    fn equal_slots_count_once() {
        let palette = Palette::with_colors(vec![A; 16]).unwrap();
        // Indices referencing many distinct slots of one color.
        assert_eq!(palette.unique_color_count([0, 3, 7, 15, 3]), 1);

        let mut palette = palette;
        palette.set(7, B);
        assert_eq!(palette.unique_color_count([0, 3, 7, 15, 3]), 2);
    }

    #[test]
    fn count_ignores_unreferenced_slots() {
        let palette = Palette::with_colors(vec![A, B, C]).unwrap();
        assert_eq!(palette.unique_color_count([1, 1, 1]), 1);
        assert_eq!(palette.unique_color_count([]), 0);
    }

    #[test]
    fn direct_color_counting() {
        assert_eq!(unique_color_count([A, B, A, A, B]), 2);
        assert_eq!(unique_color_count([]), 0);
    }

    #[test]
    fn apply_rewrites_indices_in_place() {
        let palette = Palette::with_colors(vec![A, B, A, C, B]).unwrap();
        let lut = palette.shrink_lut();

        let layout = IndexLayout::new(IndexDepth::Four, 6).unwrap();
        let mut bytes = [0u8; 3];
        let mut row = IndexRowMut::with_layout(layout, &mut bytes).unwrap();
        row.pack_from(&[0, 2, 4, 1, 3, 2]);

        lut.apply(&mut row);
        assert_eq!(row.as_ref().unpack_to_vec(), [0, 0, 1, 1, 3, 0]);

        let mut raw = [0u8, 2, 4, 1, 3, 2];
        lut.apply_bytes(&mut raw);
        assert_eq!(raw, [0, 0, 1, 1, 3, 0]);
    }

    #[test]
    fn palette_byte_round_trip() {
        let palette = Palette::from_rgba_bytes(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(palette.colors(), [Color::new(1, 2, 3, 4), Color::new(5, 6, 7, 8)]);
        assert_eq!(palette.as_bytes(), [1, 2, 3, 4, 5, 6, 7, 8]);

        assert_eq!(
            Palette::from_rgba_bytes(&[0; 5]).err(),
            Some(LayoutError::TOO_SHORT)
        );
    }

    #[test]
    fn oversized_palette_is_rejected() {
        let colors = vec![A; 257];
        assert_eq!(
            Palette::with_colors(colors).err(),
            Some(LayoutError::PALETTE_TOO_LARGE)
        );
    }

    #[test]
    #[should_panic]
    fn resolving_a_missing_slot_is_a_contract_violation() {
        let palette = Palette::with_colors(vec![A, B]).unwrap();
        let _ = palette.resolve([0, 2]).count();
    }
}
