//! Borrowed, typed views over rows of packed and palette-indexed pixels.
//!
//! A format codec owns its scanline buffers; this crate only interprets
//! them. A view pairs a borrowed byte slice with a layout describing how
//! elements are packed into it, and every color access converts through the
//! canonical 8-bit [`Color`]. Nothing here allocates pixel storage or does
//! I/O.
//!
//! # Usage
//!
//! Reading and writing 16-bit packed pixels through a layout:
//!
//! ```
//! use rowview::{Color, PackedRowMut};
//! use rowview::layout::{ChannelMasks, ColorCodec, RowLayout};
//!
//! let layout = RowLayout::new(ColorCodec::Packed16(ChannelMasks::RGB565), 4)?;
//! let mut scanline = [0u8; 8];
//! let mut row = PackedRowMut::with_layout(layout, &mut scanline)?;
//!
//! row.set_color(0, Color::rgb(255, 0, 0));
//! assert_eq!(row.packed_word(0), 0xf800);
//! # use rowview::layout::LayoutError;
//! # Ok::<(), LayoutError>(())
//! ```
//!
//! Sub-byte palette indices are packed most-significant-first:
//!
//! ```
//! use rowview::IndexRowMut;
//! use rowview::layout::{IndexDepth, IndexLayout};
//!
//! let layout = IndexLayout::new(IndexDepth::Four, 5)?;
//! let mut scanline = [0u8; 3];
//! let mut row = IndexRowMut::with_layout(layout, &mut scanline)?;
//!
//! row.set(0, 0xa);
//! row.set(1, 0xb);
//! assert_eq!(scanline[0], 0xab);
//! # use rowview::layout::LayoutError;
//! # Ok::<(), LayoutError>(())
//! ```
//!
//! Ratio-valued metadata stays exact as a [`Rational`]:
//!
//! ```
//! use rowview::Rational;
//!
//! let exposure: Rational = "0.0125".parse().unwrap();
//! assert_eq!((exposure.numer(), exposure.denom()), (1, 80));
//! ```
#![deny(unsafe_code)]

mod bits;
mod color;
mod index;
/// The layout descriptors and their validation.
#[path = "layout.rs"]
mod layout_;
mod packed;
mod palette;
mod rational;


pub use self::color::{Channel, Color};
pub use self::index::{IndexRow, IndexRowMut};
pub use self::packed::{PackedRow, PackedRowMut};
pub use self::palette::{unique_color_count, Palette, ShrinkLut};
pub use self::rational::{ParseRationalError, Rational};

pub mod layout {
    pub use crate::layout_::{
        ChannelMasks, ColorCodec, IndexDepth, IndexLayout, LayoutError, RowLayout,
    };
}
