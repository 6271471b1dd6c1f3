//! Byte classes for single-unit matching.
//!
//! A [`CharSet`] is a 256-bit membership table, so every byte value
//! (`0x00..=0xFF`) can be a member. Sets compose with `|` (union), `-`
//! (difference) and `!` (complement).

use std::fmt;
use std::ops::{BitOr, Not, Sub};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharSet {
    bits: [u64; 4],
}

impl CharSet {
    pub const EMPTY: CharSet = CharSet { bits: [0; 4] };

    pub const fn full() -> Self {
        CharSet {
            bits: [u64::MAX; 4],
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut set = Self::EMPTY;
        for &b in bytes {
            set.insert(b);
        }
        set
    }

    /// Every byte in `lo..=hi`.
    pub fn range(lo: u8, hi: u8) -> Self {
        let mut set = Self::EMPTY;
        set.insert_range(lo, hi);
        set
    }

    /// Build a set from a range expression such as `b"a-zA-Z_"`.
    ///
    /// A `-` that is first or last in the expression is taken literally.
    pub fn parse(spec: &[u8]) -> Self {
        let mut set = Self::EMPTY;
        let mut i = 0;
        while i < spec.len() {
            if i + 2 < spec.len() && spec[i + 1] == b'-' {
                set.insert_range(spec[i], spec[i + 2]);
                i += 3;
            } else {
                set.insert(spec[i]);
                i += 1;
            }
        }
        set
    }

    pub fn insert(&mut self, b: u8) {
        self.bits[usize::from(b >> 6)] |= 1 << (b & 63);
    }

    pub fn insert_range(&mut self, lo: u8, hi: u8) {
        for b in lo..=hi {
            self.insert(b);
        }
    }

    pub fn contains(&self, b: u8) -> bool {
        self.bits[usize::from(b >> 6)] & (1 << (b & 63)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|word| *word == 0)
    }

    pub fn union(self, other: CharSet) -> Self {
        let mut bits = self.bits;
        for (word, other) in bits.iter_mut().zip(other.bits) {
            *word |= other;
        }
        CharSet { bits }
    }

    pub fn minus(self, other: CharSet) -> Self {
        let mut bits = self.bits;
        for (word, other) in bits.iter_mut().zip(other.bits) {
            *word &= !other;
        }
        CharSet { bits }
    }

    pub fn complement(self) -> Self {
        CharSet::full().minus(self)
    }

    /// Printable ASCII, `0x20..=0x7E`. Tab is not printable.
    pub fn printable() -> Self {
        Self::range(0x20, 0x7E)
    }

    pub fn alpha() -> Self {
        Self::parse(b"a-zA-Z")
    }

    pub fn digit() -> Self {
        Self::range(b'0', b'9')
    }

    pub fn alnum() -> Self {
        Self::alpha() | Self::digit()
    }

    /// Space and tab.
    pub fn blank() -> Self {
        Self::from_bytes(b" \t")
    }

    fn members(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|b| self.contains(*b))
    }
}

impl BitOr for CharSet {
    type Output = CharSet;

    fn bitor(self, rhs: CharSet) -> CharSet {
        self.union(rhs)
    }
}

impl Sub for CharSet {
    type Output = CharSet;

    fn sub(self, rhs: CharSet) -> CharSet {
        self.minus(rhs)
    }
}

impl Not for CharSet {
    type Output = CharSet;

    fn not(self) -> CharSet {
        self.complement()
    }
}

impl fmt::Debug for CharSet {
    /// Renders runs of members as ranges, e.g. `CharSet[0x30-0x39]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut runs: Vec<(u8, u8)> = Vec::new();
        for b in self.members() {
            match runs.last_mut() {
                Some((_, hi)) if u16::from(*hi) + 1 == u16::from(b) => *hi = b,
                _ => runs.push((b, b)),
            }
        }
        f.write_str("CharSet[")?;
        for (i, (lo, hi)) in runs.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if lo == hi {
                write!(f, "{lo:#04x}")?;
            } else {
                write!(f, "{lo:#04x}-{hi:#04x}")?;
            }
        }
        f.write_str("]")
    }
}
