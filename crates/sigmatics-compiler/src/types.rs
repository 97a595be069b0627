//! Core coordinate types of the ≡₉₆ class system
//!
//! A class index decomposes as `24*h₂ + 8*d + ℓ` with h₂ ∈ Z4 (scope
//! quadrant), d ∈ Z3 (modality) and ℓ ∈ Z8 (context slot).

use crate::error::ConstructionError;
use std::fmt;

/// Number of equivalence classes
pub const CLASS_COUNT: u8 = 96;

/// Order of the rotation group acting on h₂
pub const ROTATE_ORDER: u8 = 4;

/// Order of the triality group acting on d
pub const TRIALITY_ORDER: u8 = 3;

/// Order of the twist group acting on ℓ
pub const TWIST_ORDER: u8 = 8;

/// Order of the mirror involution
pub const MIRROR_ORDER: u8 = 2;

/// Scope quadrant (h₂) - 0..3
pub type ScopeQuadrant = u8;

/// Context slot (ℓ) - 0..7
pub type ContextSlot = u8;

/// Modality (d) - neutral, produce, consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Modality {
    Neutral = 0, // (b4, b5) = (0, 0) or (1, 1)
    Produce = 1, // (b4, b5) = (1, 0)
    Consume = 2, // (b4, b5) = (0, 1)
}

impl Modality {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Modality::Neutral),
            1 => Some(Modality::Produce),
            2 => Some(Modality::Consume),
            _ => None,
        }
    }

    /// Reduce any integer into Z3 and return the matching modality
    pub fn from_residue(value: i64) -> Self {
        match value.rem_euclid(3) {
            0 => Modality::Neutral,
            1 => Modality::Produce,
            _ => Modality::Consume,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Shift the modality by `k` steps in Z3
    pub fn shifted(self, k: i64) -> Self {
        Self::from_residue(self.as_u8() as i64 + k)
    }

    /// Mirror image `(3 - d) mod 3`: produce and consume swap, neutral is fixed
    pub fn mirrored(self) -> Self {
        Self::from_residue(3 - self.as_u8() as i64)
    }
}

/// Sigil components: (h₂, d, ℓ) triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigilComponents {
    pub h2: ScopeQuadrant,
    pub d: Modality,
    pub l: ContextSlot,
}

impl SigilComponents {
    pub fn new(h2: u8, d: Modality, l: u8) -> Result<Self, ConstructionError> {
        if h2 >= ROTATE_ORDER {
            return Err(ConstructionError::descriptor_field("h2", format!("must be 0..3, got {h2}")));
        }
        if l >= TWIST_ORDER {
            return Err(ConstructionError::descriptor_field("l", format!("must be 0..7, got {l}")));
        }
        Ok(SigilComponents { h2, d, l })
    }
}

impl fmt::Display for SigilComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(h2={}, d={}, l={})", self.h2, self.d.as_u8(), self.l)
    }
}

/// Everything known about a byte's class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassInfo {
    pub class_index: u8,
    pub components: SigilComponents,
    pub canonical_byte: u8,
}

/// Validate a class index coming from untyped input
pub fn checked_class_index(value: i64) -> Result<u8, ConstructionError> {
    if (0..CLASS_COUNT as i64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ConstructionError::InvalidClassIndex(value))
    }
}
