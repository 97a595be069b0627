//! SGA elements: Z4 × Z3 × Cl(7) with integer coefficients

use super::clifford::{Blade, Multivector, GENERATOR_COUNT};
use crate::error::AlgebraError;
use crate::types::{ROTATE_ORDER, TRIALITY_ORDER, TWIST_ORDER};
use std::fmt;

/// Algebraic element combining a Z4 coordinate, a Z3 coordinate and a
/// Clifford multivector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SgaElement {
    z4: u8,
    z3: u8,
    clifford: Multivector,
}

impl SgaElement {
    /// Build an element, reducing the cyclic coordinates into range
    pub fn new(z4: i64, z3: i64, clifford: Multivector) -> Self {
        Self {
            z4: z4.rem_euclid(ROTATE_ORDER as i64) as u8,
            z3: z3.rem_euclid(TRIALITY_ORDER as i64) as u8,
            clifford,
        }
    }

    /// Additive zero: trivial cyclic coordinates, empty Clifford part
    pub fn zero() -> Self {
        Self::new(0, 0, Multivector::zero())
    }

    /// Multiplicative identity: trivial cyclic coordinates, scalar 1
    pub fn identity() -> Self {
        Self::new(0, 0, Multivector::scalar(1))
    }

    pub fn z4(&self) -> u8 {
        self.z4
    }

    pub fn z3(&self) -> u8 {
        self.z3
    }

    pub fn clifford(&self) -> &Multivector {
        &self.clifford
    }

    /// Rank-1: exactly one unit term on the scalar or a single generator
    pub fn is_rank1(&self) -> bool {
        self.context_slot().is_some()
    }

    /// Context slot ℓ of a rank-1 element (scalar is slot 0, eᵢ is slot i)
    pub fn context_slot(&self) -> Option<u8> {
        let mut terms = self.clifford.terms();
        match (terms.next(), terms.next()) {
            (Some((blade, 1)), None) if blade == Blade::SCALAR => Some(0),
            (Some((blade, 1)), None) => blade.generator_index(),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Ring structure
    // ------------------------------------------------------------------

    pub fn multiply(&self, other: &SgaElement) -> Result<SgaElement, AlgebraError> {
        Ok(Self::new(
            self.z4 as i64 + other.z4 as i64,
            self.z3 as i64 + other.z3 as i64,
            self.clifford.geometric_product(&other.clifford)?,
        ))
    }

    pub fn add(&self, other: &SgaElement) -> Result<SgaElement, AlgebraError> {
        Ok(Self::new(
            self.z4 as i64 + other.z4 as i64,
            self.z3 as i64 + other.z3 as i64,
            self.clifford.add(&other.clifford)?,
        ))
    }

    pub fn scale(&self, factor: i64) -> Result<SgaElement, AlgebraError> {
        Ok(self.with_clifford(self.clifford.scale(factor)?))
    }

    /// Fano cross product of the vector parts; cyclic coordinates add
    pub fn cross(&self, other: &SgaElement) -> Result<SgaElement, AlgebraError> {
        Ok(Self::new(
            self.z4 as i64 + other.z4 as i64,
            self.z3 as i64 + other.z3 as i64,
            self.clifford.cross_product(&other.clifford)?,
        ))
    }

    /// Integer power by repeated squaring; `pow(0)` is the identity
    pub fn pow(&self, exponent: i64) -> Result<SgaElement, AlgebraError> {
        if exponent < 0 {
            return Err(AlgebraError::NegativePower(exponent));
        }
        let mut result = SgaElement::identity();
        let mut base = self.clone();
        let mut remaining = exponent;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.multiply(&base)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base.multiply(&base)?;
            }
        }
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Involutions
    // ------------------------------------------------------------------

    /// Grade involution: grade k scaled by (-1)^k
    pub fn grade_involution(&self) -> Result<SgaElement, AlgebraError> {
        let clifford = self.clifford.signed_by_grade(|k| parity_sign(k as u32))?;
        Ok(self.with_clifford(clifford))
    }

    /// Reversion: grade k scaled by (-1)^(k(k-1)/2)
    pub fn reversion(&self) -> Result<SgaElement, AlgebraError> {
        let clifford = self
            .clifford
            .signed_by_grade(|k| parity_sign((k as u32) * (k as u32).saturating_sub(1) / 2))?;
        Ok(self.with_clifford(clifford))
    }

    /// Clifford conjugation: grade k scaled by (-1)^(k(k+1)/2)
    pub fn clifford_conjugation(&self) -> Result<SgaElement, AlgebraError> {
        let clifford = self
            .clifford
            .signed_by_grade(|k| parity_sign((k as u32) * (k as u32 + 1) / 2))?;
        Ok(self.with_clifford(clifford))
    }

    // ------------------------------------------------------------------
    // Transform endomorphisms
    // ------------------------------------------------------------------

    /// R^k acts on the Z4 coordinate
    pub fn rotate(&self, k: i64) -> SgaElement {
        Self::new(self.z4 as i64 + k, self.z3 as i64, self.clifford.clone())
    }

    /// D^k acts on the Z3 coordinate
    pub fn triality(&self, k: i64) -> SgaElement {
        Self::new(self.z4 as i64, self.z3 as i64 + k, self.clifford.clone())
    }

    /// T^k rotates the context ring {1, e1, …, e7}; higher grades are fixed
    pub fn twist(&self, k: i64) -> SgaElement {
        let shift = k.rem_euclid(TWIST_ORDER as i64) as u8;
        if shift == 0 {
            return self.clone();
        }
        self.with_clifford(self.clifford.permute_blades(|blade| {
            let slot = match blade.grade() {
                0 => 0,
                1 => blade.generator_index().unwrap_or(0),
                _ => return blade,
            };
            slot_blade((slot + shift) % TWIST_ORDER)
        }))
    }

    /// M maps z3 to (3 - z3) mod 3
    pub fn mirror(&self) -> SgaElement {
        Self::new(self.z4 as i64, 3 - self.z3 as i64, self.clifford.clone())
    }

    /// Keep only the grade-`grade` part of the Clifford component
    pub fn grade_projection(&self, grade: u8) -> SgaElement {
        self.with_clifford(self.clifford.grade_part(grade))
    }

    fn with_clifford(&self, clifford: Multivector) -> SgaElement {
        SgaElement {
            z4: self.z4,
            z3: self.z3,
            clifford,
        }
    }
}

/// Blade sitting at a context-ring slot (0 = scalar, i = eᵢ)
pub(crate) fn slot_blade(slot: u8) -> Blade {
    if slot == 0 || slot > GENERATOR_COUNT {
        Blade::SCALAR
    } else {
        Blade::from_bits(1 << (slot - 1))
    }
}

fn parity_sign(n: u32) -> i64 {
    if n % 2 == 0 {
        1
    } else {
        -1
    }
}

impl fmt::Display for SgaElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "⟨z4={}, z3={} | {}⟩", self.z4, self.z3, self.clifford)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SgaElement {
        let mut mv = Multivector::scalar(3);
        mv.accumulate(Blade::from_bits(0b001), -2).unwrap();
        mv.accumulate(Blade::from_bits(0b011), 5).unwrap();
        mv.accumulate(Blade::from_bits(0b111), 7).unwrap();
        SgaElement::new(1, 2, mv)
    }

    #[test]
    fn test_identity_is_neutral() {
        let x = sample();
        assert_eq!(x.multiply(&SgaElement::identity()), Ok(x.clone()));
        assert_eq!(SgaElement::identity().multiply(&x), Ok(x.clone()));
        assert_eq!(x.add(&SgaElement::zero()), Ok(x));
    }

    #[test]
    fn test_involutions() {
        let x = sample();
        assert_eq!(x.grade_involution().unwrap().grade_involution(), Ok(x.clone()));
        assert_eq!(x.reversion().unwrap().reversion(), Ok(x.clone()));
        assert_eq!(x.clifford_conjugation().unwrap().clifford_conjugation(), Ok(x.clone()));
        // conjugation is the composition of the other two
        assert_eq!(x.grade_involution().unwrap().reversion(), x.clifford_conjugation());
    }

    #[test]
    fn test_involution_signs() {
        let x = sample();
        let rev = x.reversion().unwrap();
        assert_eq!(rev.clifford().coefficient(Blade::from_bits(0b011)), -5);
        assert_eq!(rev.clifford().coefficient(Blade::from_bits(0b111)), -7);
        let inv = x.grade_involution().unwrap();
        assert_eq!(inv.clifford().coefficient(Blade::from_bits(0b001)), 2);
        assert_eq!(inv.clifford().coefficient(Blade::from_bits(0b111)), -7);
    }

    #[test]
    fn test_pow() {
        let x = sample();
        assert_eq!(x.pow(0), Ok(SgaElement::identity()));
        assert_eq!(x.pow(1), Ok(x.clone()));
        let cube = x.multiply(&x).unwrap().multiply(&x).unwrap();
        assert_eq!(x.pow(3), Ok(cube.clone()));
        assert_eq!(x.pow(6), cube.multiply(&cube));
        assert_eq!(x.pow(-1), Err(AlgebraError::NegativePower(-1)));
    }

    #[test]
    fn test_pow_large_exponent_on_unit() {
        // e1 squares to one, so odd powers return e1 without a linear walk
        let e1 = SgaElement::new(0, 0, Multivector::term(slot_blade(1), 1));
        assert_eq!(e1.pow(1_000_000_001), Ok(e1.clone()));
        assert_eq!(e1.pow(i64::MAX - 1), Ok(SgaElement::identity()));
    }

    #[test]
    fn test_overflow_surfaces_as_error() {
        let big = SgaElement::identity().scale(i64::MAX).unwrap();
        assert_eq!(big.scale(2), Err(AlgebraError::CoefficientOverflow));
        assert_eq!(big.multiply(&big), Err(AlgebraError::CoefficientOverflow));
        assert_eq!(big.add(&big), Err(AlgebraError::CoefficientOverflow));
        assert_eq!(
            SgaElement::identity().scale(3).unwrap().pow(40),
            Err(AlgebraError::CoefficientOverflow)
        );
    }

    #[test]
    fn test_cross_combines_cyclic_parts() {
        let a = SgaElement::new(1, 2, Multivector::term(slot_blade(6), 1));
        let b = SgaElement::new(3, 2, Multivector::term(slot_blade(7), 2));
        // (6, 7, 2) is a Fano line
        let c = a.cross(&b).unwrap();
        assert_eq!(c.z4(), 0);
        assert_eq!(c.z3(), 1);
        assert_eq!(c.clifford(), &Multivector::term(slot_blade(2), 2));
        assert_eq!(b.cross(&a).unwrap().clifford(), &Multivector::term(slot_blade(2), -2));
    }

    #[test]
    fn test_rank1_detection() {
        assert!(SgaElement::identity().is_rank1());
        assert!(SgaElement::new(2, 1, Multivector::term(slot_blade(4), 1)).is_rank1());
        assert!(!SgaElement::new(0, 0, Multivector::term(slot_blade(4), 2)).is_rank1());
        assert!(!SgaElement::zero().is_rank1());
        assert!(!sample().is_rank1());
    }

    #[test]
    fn test_twist_cycles_context_ring() {
        let x = SgaElement::new(0, 0, Multivector::scalar(1));
        assert_eq!(x.twist(3).context_slot(), Some(3));
        assert_eq!(x.twist(8), x);
        let y = sample();
        let mut z = y.clone();
        for _ in 0..8 {
            z = z.twist(1);
        }
        assert_eq!(z, y);
    }

    #[test]
    fn test_transform_orders() {
        let x = sample();
        assert_eq!(x.rotate(4), x);
        assert_eq!(x.triality(3), x);
        assert_eq!(x.mirror().mirror(), x);
    }

    #[test]
    fn test_grade_projection_keeps_cyclic_parts() {
        let x = sample().grade_projection(2);
        assert_eq!(x.z4(), 1);
        assert_eq!(x.z3(), 2);
        assert_eq!(x.clifford().len(), 1);
        assert_eq!(x.clifford().coefficient(Blade::from_bits(0b011)), 5);
    }

    #[test]
    fn test_display() {
        let x = SgaElement::new(1, 2, Multivector::term(slot_blade(5), 1));
        assert_eq!(x.to_string(), "⟨z4=1, z3=2 | 1·e5⟩");
    }
}
