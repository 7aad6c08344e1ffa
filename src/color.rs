//! The canonical color value all packed encodings convert through.
use bytemuck::{Pod, Zeroable};

/// A color as four independent 8-bit channels.
///
/// This is the exchange type between all row encodings: reading a pixel from
/// any [`PackedRow`](crate::PackedRow) widens it to this form, writing one
/// narrows it back. Palette entries are also stored in this form, with the
/// fourth byte doubling as the reserved byte of formats that carry no alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Selects one channel of a [`Color`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    R,
    G,
    B,
    A,
}

impl Color {
    pub const BLACK: Self = Color::new(0, 0, 0, 255);
    pub const WHITE: Self = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// An opaque color from its three color channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn channel(self, which: Channel) -> u8 {
        match which {
            Channel::R => self.r,
            Channel::G => self.g,
            Channel::B => self.b,
            Channel::A => self.a,
        }
    }

    pub fn set_channel(&mut self, which: Channel, value: u8) {
        match which {
            Channel::R => self.r = value,
            Channel::G => self.g = value,
            Channel::B => self.b = value,
            Channel::A => self.a = value,
        }
    }
}
