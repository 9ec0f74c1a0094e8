use std::ops::{BitAnd, BitOr, Not, Shl};

use serde::{Deserialize, Serialize};

///
/// Unsigned storage backing a [`BitSet`]. Only the widths the instruction
/// language needs are implemented.
///
pub trait Width:
    Copy
    + Eq
    + Default
    + BitOr<Output = Self>
    + BitAnd<Output = Self>
    + Not<Output = Self>
    + Shl<u32, Output = Self>
{
    const BITS: u32;
    const ONE: Self;
}

impl Width for u8 {
    const BITS: u32 = u8::BITS;
    const ONE: Self = 1;
}

impl Width for u16 {
    const BITS: u32 = u16::BITS;
    const ONE: Self = 1;
}

///
/// Fixed width set of bit positions. `shift` sets a bit, `unshift` clears it
/// and `positive` tests it; setting or clearing twice is the same as once.
/// Positions outside the width are ignored.
///
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitSet<W: Width>(W);

impl<W: Width> BitSet<W> {
    pub fn new() -> Self {
        BitSet(W::default())
    }

    pub fn from_bits(bits: W) -> Self {
        BitSet(bits)
    }

    pub fn bits(&self) -> W {
        self.0
    }

    pub fn positive(&self, bit: u32) -> bool {
        bit < W::BITS && (self.0 & (W::ONE << bit)) != W::default()
    }

    pub fn shift(&mut self, bit: u32) -> &mut Self {
        if bit < W::BITS {
            self.0 = self.0 | (W::ONE << bit);
        }
        self
    }

    pub fn unshift(&mut self, bit: u32) -> &mut Self {
        if bit < W::BITS {
            self.0 = self.0 & !(W::ONE << bit);
        }
        self
    }

    pub fn is_zero(&self) -> bool {
        self.0 == W::default()
    }

    /// Set positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = u32> + '_ {
        (0..W::BITS).filter(move |bit| self.positive(*bit))
    }

    pub fn len(&self) -> usize {
        self.positions().count()
    }

    pub fn is_empty(&self) -> bool {
        self.is_zero()
    }
}
