//! Layout descriptors for rows of packed and indexed pixel data.
//!
//! A layout pairs an encoding with an element count and answers how many
//! bytes of buffer the row occupies. All validation lives here: a view
//! constructed from a valid layout never re-checks its codec on the access
//! path.
use core::fmt;

use crate::bits::MaskBits;

/// Bit width of a palette index stored at sub-byte granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum IndexDepth {
    /// One bit per index, eight indices per byte.
    One = 1,
    /// Four bits per index, two indices per byte.
    Four = 4,
}

impl IndexDepth {
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// How many indices are packed into each byte.
    pub const fn per_byte(self) -> u32 {
        8 / self as u32
    }

    /// The largest index value this depth can store.
    pub const fn max_index(self) -> u8 {
        match self {
            IndexDepth::One => 1,
            IndexDepth::Four => 15,
        }
    }
}

/// The layout of one row of sub-byte palette indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexLayout {
    depth: IndexDepth,
    width: u32,
}

impl IndexLayout {
    /// Describe a row of `width` indices at the given depth.
    pub fn new(depth: IndexDepth, width: u32) -> Result<Self, LayoutError> {
        let bits = u64::from(width) * u64::from(depth.bits());
        if usize::try_from(bits.div_ceil(8)).is_err() {
            return Err(LayoutError::TOO_LARGE);
        }

        Ok(IndexLayout { depth, width })
    }

    pub fn depth(&self) -> IndexDepth {
        self.depth
    }

    /// The number of indices in the row.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The number of buffer bytes the row occupies.
    ///
    /// A final partial byte counts in full; its trailing bits are outside
    /// the row and views neither read nor write them.
    pub fn byte_len(&self) -> usize {
        let bits = u64::from(self.width) * u64::from(self.depth.bits());
        // Checked in the constructor.
        bits.div_ceil(8) as usize
    }
}

/// The three channel masks of a 16-bit packed encoding.
///
/// Each mask selects the contiguous bits of the word holding one channel.
/// Masks may leave word bits unused but must not overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelMasks {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl ChannelMasks {
    /// Five bits per channel in the low 15 bits, the common x-5-5-5 layout.
    pub const RGB555: Self = ChannelMasks {
        r: 0x7c00,
        g: 0x03e0,
        b: 0x001f,
    };

    /// Five red, six green, five blue, the common 5-6-5 layout.
    pub const RGB565: Self = ChannelMasks {
        r: 0xf800,
        g: 0x07e0,
        b: 0x001f,
    };

    pub(crate) fn validate(self) -> Result<[MaskBits; 3], LayoutError> {
        let r = MaskBits::from_mask(self.r).ok_or(LayoutError::BAD_MASK)?;
        let g = MaskBits::from_mask(self.g).ok_or(LayoutError::BAD_MASK)?;
        let b = MaskBits::from_mask(self.b).ok_or(LayoutError::BAD_MASK)?;

        if self.r & self.g != 0 || self.r & self.b != 0 || self.g & self.b != 0 {
            return Err(LayoutError::OVERLAPPING_MASKS);
        }

        Ok([r, g, b])
    }
}

/// How the pixels of a packed row are encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorCodec {
    /// One palette index byte per pixel.
    ///
    /// Rows of this codec have no intrinsic colors; resolving an index to a
    /// color is the palette layer's job. See [`crate::Palette`].
    Index8,
    /// One 16-bit word per pixel, little-endian in the byte stream, with
    /// channels described by masks.
    Packed16(ChannelMasks),
    /// Three bytes per pixel in `r, g, b` order. Alpha is always opaque.
    Rgb24,
    /// Four bytes per pixel in `r, g, b, a` order. Lossless.
    Rgba32,
}

impl ColorCodec {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorCodec::Index8 => 1,
            ColorCodec::Packed16(_) => 2,
            ColorCodec::Rgb24 => 3,
            ColorCodec::Rgba32 => 4,
        }
    }
}

/// The layout of one row of packed color pixels.
///
/// Construction validates the codec, in particular the channel masks of
/// [`ColorCodec::Packed16`]; per-pixel accessors rely on that and never
/// re-check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowLayout {
    codec: ColorCodec,
    width: u32,
    /// Derived channel fields, meaningful for `Packed16` only.
    fields: [MaskBits; 3],
}

impl RowLayout {
    /// Describe a row of `width` pixels in the given encoding.
    pub fn new(codec: ColorCodec, width: u32) -> Result<Self, LayoutError> {
        let fields = match codec {
            ColorCodec::Packed16(masks) => masks.validate()?,
            _ => [MaskBits { shift: 0, len: 8 }; 3],
        };

        let bytes = u64::from(width) * codec.bytes_per_pixel() as u64;
        if usize::try_from(bytes).is_err() {
            return Err(LayoutError::TOO_LARGE);
        }

        Ok(RowLayout {
            codec,
            width,
            fields,
        })
    }

    pub fn codec(&self) -> ColorCodec {
        self.codec
    }

    /// The number of pixels in the row.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The number of buffer bytes the row occupies.
    pub fn byte_len(&self) -> usize {
        // Checked in the constructor.
        self.width as usize * self.codec.bytes_per_pixel()
    }

    pub(crate) fn fields(&self) -> [MaskBits; 3] {
        self.fields
    }
}

/// Error from constructing a layout or a view over an unsuitable buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutError {
    inner: ErrorKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ErrorKind {
    BadMask,
    OverlappingMasks,
    TooShort,
    TooLarge,
    PaletteTooLarge,
}

impl LayoutError {
    pub(crate) const BAD_MASK: Self = LayoutError {
        inner: ErrorKind::BadMask,
    };
    pub(crate) const OVERLAPPING_MASKS: Self = LayoutError {
        inner: ErrorKind::OverlappingMasks,
    };
    pub(crate) const TOO_SHORT: Self = LayoutError {
        inner: ErrorKind::TooShort,
    };
    pub(crate) const TOO_LARGE: Self = LayoutError {
        inner: ErrorKind::TooLarge,
    };
    pub(crate) const PALETTE_TOO_LARGE: Self = LayoutError {
        inner: ErrorKind::PaletteTooLarge,
    };
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.inner {
            ErrorKind::BadMask => "channel mask is empty or not contiguous",
            ErrorKind::OverlappingMasks => "channel masks select overlapping bits",
            ErrorKind::TooShort => "buffer is shorter than the layout requires",
            ErrorKind::TooLarge => "layout does not fit addressable memory",
            ErrorKind::PaletteTooLarge => "more colors than an 8-bit index can reference",
        })
    }
}

impl std::error::Error for LayoutError {}
