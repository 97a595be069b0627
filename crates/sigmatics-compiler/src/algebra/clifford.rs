//! Integer multivectors over Cl(7,0)
//!
//! Basis blades are bitmasks over the generators e1..e7 (bit `i-1` set when
//! eᵢ participates). Every generator squares to +1, so the geometric product
//! of two blades is their symmetric difference, signed by the number of
//! transpositions needed to bring the factors into canonical order.

use super::fano::cross;
use crate::error::AlgebraError;
use std::collections::BTreeMap;
use std::fmt;

/// Number of generators
pub const GENERATOR_COUNT: u8 = 7;

/// Highest blade grade
pub const MAX_GRADE: u8 = GENERATOR_COUNT;

/// A basis blade, stored as a generator bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Blade(u8);

impl Blade {
    pub const SCALAR: Blade = Blade(0);

    /// Blade from a raw bitmask; bits above e7 are discarded
    pub fn from_bits(bits: u8) -> Self {
        Blade(bits & 0x7F)
    }

    /// Single generator eᵢ, i ∈ 1..7
    pub fn generator(index: u8) -> Option<Self> {
        (1..=GENERATOR_COUNT)
            .contains(&index)
            .then(|| Blade(1 << (index - 1)))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn grade(self) -> u8 {
        self.0.count_ones() as u8
    }

    /// Generator index when this blade has grade 1
    pub fn generator_index(self) -> Option<u8> {
        (self.grade() == 1).then(|| self.0.trailing_zeros() as u8 + 1)
    }

    /// Geometric product of two blades: (sign, blade)
    pub fn product(self, other: Blade) -> (i64, Blade) {
        let mut left = self.0 >> 1;
        let mut swaps = 0;
        while left != 0 {
            swaps += (left & other.0).count_ones();
            left >>= 1;
        }
        let sign = if swaps % 2 == 0 { 1 } else { -1 };
        (sign, Blade(self.0 ^ other.0))
    }
}

impl fmt::Display for Blade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "1");
        }
        write!(f, "e")?;
        for i in 0..GENERATOR_COUNT {
            if self.0 & (1 << i) != 0 {
                write!(f, "{}", i + 1)?;
            }
        }
        Ok(())
    }
}

/// Sparse multivector with integer coefficients; zero terms are never stored
///
/// Coefficient arithmetic is checked: any sum or product leaving the `i64`
/// range fails with [`AlgebraError::CoefficientOverflow`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Multivector {
    terms: BTreeMap<Blade, i64>,
}

impl Multivector {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn scalar(value: i64) -> Self {
        Self::term(Blade::SCALAR, value)
    }

    pub fn term(blade: Blade, coefficient: i64) -> Self {
        let mut mv = Self::zero();
        if coefficient != 0 {
            mv.terms.insert(blade, coefficient);
        }
        mv
    }

    /// Add `coefficient` to the blade's current value
    pub fn accumulate(&mut self, blade: Blade, coefficient: i64) -> Result<(), AlgebraError> {
        if coefficient == 0 {
            return Ok(());
        }
        let current = self.coefficient(blade);
        let sum = current
            .checked_add(coefficient)
            .ok_or(AlgebraError::CoefficientOverflow)?;
        if sum == 0 {
            self.terms.remove(&blade);
        } else {
            self.terms.insert(blade, sum);
        }
        Ok(())
    }

    pub fn coefficient(&self, blade: Blade) -> i64 {
        self.terms.get(&blade).copied().unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in blade order
    pub fn terms(&self) -> impl Iterator<Item = (Blade, i64)> + '_ {
        self.terms.iter().map(|(&blade, &coefficient)| (blade, coefficient))
    }

    pub fn add(&self, other: &Multivector) -> Result<Multivector, AlgebraError> {
        let mut sum = self.clone();
        for (blade, coefficient) in other.terms() {
            sum.accumulate(blade, coefficient)?;
        }
        Ok(sum)
    }

    pub fn scale(&self, factor: i64) -> Result<Multivector, AlgebraError> {
        self.map_terms(|blade, coefficient| {
            coefficient
                .checked_mul(factor)
                .map(|scaled| (blade, scaled))
                .ok_or(AlgebraError::CoefficientOverflow)
        })
    }

    pub fn geometric_product(&self, other: &Multivector) -> Result<Multivector, AlgebraError> {
        let mut product = Multivector::zero();
        for (a, ca) in self.terms() {
            for (b, cb) in other.terms() {
                let (sign, blade) = a.product(b);
                let term = ca
                    .checked_mul(cb)
                    .and_then(|c| c.checked_mul(sign))
                    .ok_or(AlgebraError::CoefficientOverflow)?;
                product.accumulate(blade, term)?;
            }
        }
        Ok(product)
    }

    /// Fano cross product of the grade-1 parts; other grades are ignored
    pub fn cross_product(&self, other: &Multivector) -> Result<Multivector, AlgebraError> {
        let mut product = Multivector::zero();
        for (a, ca) in self.terms() {
            let Some(i) = a.generator_index() else { continue };
            for (b, cb) in other.terms() {
                let Some(j) = b.generator_index() else { continue };
                let (k, sign) = cross(i, j)?;
                let Some(blade) = Blade::generator(k) else { continue };
                let term = ca
                    .checked_mul(cb)
                    .and_then(|c| c.checked_mul(sign as i64))
                    .ok_or(AlgebraError::CoefficientOverflow)?;
                product.accumulate(blade, term)?;
            }
        }
        Ok(product)
    }

    /// Keep only blades of the given grade
    pub fn grade_part(&self, grade: u8) -> Multivector {
        Multivector {
            terms: self
                .terms
                .iter()
                .filter(|(blade, _)| blade.grade() == grade)
                .map(|(&blade, &coefficient)| (blade, coefficient))
                .collect(),
        }
    }

    /// Multiply each grade-k term by `sign(k)` (±1)
    pub fn signed_by_grade(&self, sign: impl Fn(u8) -> i64) -> Result<Multivector, AlgebraError> {
        self.map_terms(|blade, coefficient| {
            let signed = if sign(blade.grade()) < 0 {
                coefficient.checked_neg()
            } else {
                Some(coefficient)
            };
            signed
                .map(|c| (blade, c))
                .ok_or(AlgebraError::CoefficientOverflow)
        })
    }

    /// Relabel blades through a bijection; coefficients are untouched
    pub fn permute_blades(&self, f: impl Fn(Blade) -> Blade) -> Multivector {
        Multivector {
            terms: self.terms().map(|(blade, coefficient)| (f(blade), coefficient)).collect(),
        }
    }

    /// Rebuild through a fallible term map; colliding blades accumulate
    pub fn map_terms(
        &self,
        f: impl Fn(Blade, i64) -> Result<(Blade, i64), AlgebraError>,
    ) -> Result<Multivector, AlgebraError> {
        let mut mapped = Multivector::zero();
        for (blade, coefficient) in self.terms() {
            let (blade, coefficient) = f(blade, coefficient)?;
            mapped.accumulate(blade, coefficient)?;
        }
        Ok(mapped)
    }
}

impl fmt::Display for Multivector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, (blade, coefficient)) in self.terms().enumerate() {
            match (i, coefficient < 0) {
                (0, false) => write!(f, "{coefficient}·{blade}")?,
                (0, true) => write!(f, "-{}·{blade}", -coefficient)?,
                (_, false) => write!(f, " + {coefficient}·{blade}")?,
                (_, true) => write!(f, " - {}·{blade}", -coefficient)?,
            }
        }
        Ok(())
    }
}
