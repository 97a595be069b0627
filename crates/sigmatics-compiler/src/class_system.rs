//! Sigmatics 96-Class System (≡₉₆)
//!
//! Byte → class mapping and the transform actions on class indices.
//!
//! ## Formula
//!
//! ```text
//! class = 24*h₂ + 8*d + ℓ
//! ```
//!
//! Where:
//! - h₂ = (b7<<1) | b6 ∈ {0..3} (scope quadrant)
//! - d = modality from (b4, b5): 00→0, 10→1, 01→2, 11→0
//! - ℓ = (b3<<2)|(b2<<1)|b1 ∈ {0..7} (context slot)
//!
//! b0 never contributes, and the (1,1) modality pattern folds onto 0, so
//! neutral classes own four bytes while produce/consume classes own two.

use crate::error::ConstructionError;
use crate::types::{
    checked_class_index, ClassInfo, Modality, SigilComponents, CLASS_COUNT, ROTATE_ORDER, TWIST_ORDER,
};

// ============================================================================
// Byte ↔ Components
// ============================================================================

/// Decode byte to (h₂, d, ℓ) components
pub fn decode_byte_to_components(byte: u8) -> SigilComponents {
    let bit = |n: u8| (byte >> n) & 1;

    let h2 = (bit(7) << 1) | bit(6);
    let d = match (bit(4), bit(5)) {
        (1, 0) => Modality::Produce,
        (0, 1) => Modality::Consume,
        _ => Modality::Neutral,
    };
    let l = (bit(3) << 2) | (bit(2) << 1) | bit(1);

    SigilComponents { h2, d, l }
}

/// Encode components to their canonical byte (b0 = 0)
pub fn encode_components_to_byte(comp: &SigilComponents) -> u8 {
    let (b4, b5) = match comp.d {
        Modality::Neutral => (0, 0),
        Modality::Produce => (1, 0),
        Modality::Consume => (0, 1),
    };

    ((comp.h2 & 0b11) << 6) | (b5 << 5) | (b4 << 4) | ((comp.l & 0b111) << 1)
}

// ============================================================================
// Components ↔ Class Index
// ============================================================================

/// Compute class index from components: `24*h₂ + 8*d + ℓ`
pub fn components_to_class_index(comp: &SigilComponents) -> u8 {
    let class = 24 * comp.h2 + 8 * comp.d.as_u8() + comp.l;
    debug_assert!(class < CLASS_COUNT);
    class
}

/// Decode a class index into its components
///
/// Out-of-range indices are rejected rather than wrapped.
pub fn decode_class_index(class_index: u8) -> Result<SigilComponents, ConstructionError> {
    let class_index = checked_class_index(class_index as i64)?;
    Ok(split_class_index(class_index))
}

/// Split an index already known to be in range
pub(crate) fn split_class_index(class_index: u8) -> SigilComponents {
    let h2 = class_index / 24;
    let remainder = class_index % 24;
    SigilComponents {
        h2,
        d: Modality::from_residue((remainder / 8) as i64),
        l: remainder % 8,
    }
}

/// Compute class index directly from byte
pub fn byte_to_class_index(byte: u8) -> u8 {
    components_to_class_index(&decode_byte_to_components(byte))
}

/// Canonical representative byte for a class index
pub fn class_index_to_canonical_byte(class_index: u8) -> Result<u8, ConstructionError> {
    Ok(encode_components_to_byte(&decode_class_index(class_index)?))
}

/// Full class info for a byte
pub fn get_class_info(byte: u8) -> ClassInfo {
    let components = decode_byte_to_components(byte);
    let class_index = components_to_class_index(&components);

    ClassInfo {
        class_index,
        components,
        canonical_byte: encode_components_to_byte(&components),
    }
}

// ============================================================================
// Transform Actions
// ============================================================================

/// Rotation R^k: h₂ ↦ h₂ + k (mod 4)
pub fn apply_rotation(comp: &SigilComponents, k: i64) -> SigilComponents {
    let h2 = (comp.h2 as i64 + k).rem_euclid(ROTATE_ORDER as i64) as u8;
    SigilComponents { h2, ..*comp }
}

/// Triality D^k: d ↦ d + k (mod 3)
pub fn apply_triality(comp: &SigilComponents, k: i64) -> SigilComponents {
    SigilComponents {
        d: comp.d.shifted(k),
        ..*comp
    }
}

/// Twist T^k: ℓ ↦ ℓ + k (mod 8)
pub fn apply_twist(comp: &SigilComponents, k: i64) -> SigilComponents {
    let l = (comp.l as i64 + k).rem_euclid(TWIST_ORDER as i64) as u8;
    SigilComponents { l, ..*comp }
}

/// Mirror M: d ↦ (3 - d) mod 3, h₂ and ℓ unchanged
pub fn apply_mirror(comp: &SigilComponents) -> SigilComponents {
    SigilComponents {
        d: comp.d.mirrored(),
        ..*comp
    }
}

// ============================================================================
// Equivalence
// ============================================================================

/// Test if two bytes are in the same equivalence class
pub fn equivalent(a: u8, b: u8) -> bool {
    byte_to_class_index(a) == byte_to_class_index(b)
}

/// All bytes in an equivalence class
pub fn equivalence_class(class_index: u8) -> Vec<u8> {
    (0..=255u8)
        .filter(|&byte| byte_to_class_index(byte) == class_index)
        .collect()
}

/// All 96 class indices with their canonical bytes
pub fn all_classes() -> Vec<(u8, u8)> {
    (0..CLASS_COUNT)
        .map(|class_index| (class_index, encode_components_to_byte(&split_class_index(class_index))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_to_class_basic() {
        // 0x2A = 0b0010_1010: h₂=0, (b4,b5)=(0,1) → consume, ℓ=5
        assert_eq!(byte_to_class_index(0x2A), 21);
    }

    #[test]
    fn test_canonical_roundtrip() {
        for class_index in 0..CLASS_COUNT {
            let canonical = class_index_to_canonical_byte(class_index).unwrap();
            assert_eq!(canonical & 1, 0, "class {class_index} canonical byte should have b0=0");
            assert_eq!(byte_to_class_index(canonical), class_index);
        }
    }

    #[test]
    fn test_components_roundtrip() {
        for class_index in 0..CLASS_COUNT {
            let comp = decode_class_index(class_index).unwrap();
            assert_eq!(components_to_class_index(&comp), class_index);
        }
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        assert_eq!(decode_class_index(96), Err(ConstructionError::InvalidClassIndex(96)));
    }

    #[test]
    fn test_mapping_is_surjective_with_unequal_classes() {
        let mut sizes = [0usize; CLASS_COUNT as usize];
        for byte in 0..=255u8 {
            sizes[byte_to_class_index(byte) as usize] += 1;
        }
        assert!(sizes.iter().all(|&n| n > 0));
        assert_eq!(sizes.iter().sum::<usize>(), 256);
        // neutral modality absorbs (b4,b5)=(1,1)
        assert_eq!(sizes[0], 4);
        assert_eq!(sizes[8], 2);
        assert_eq!(equivalence_class(8).len(), 2);
    }

    #[test]
    fn test_rotation() {
        let comp = split_class_index(0);
        assert_eq!(apply_rotation(&comp, 1).h2, 1);
        assert_eq!(apply_rotation(&comp, 4).h2, 0);
        assert_eq!(apply_rotation(&comp, -1).h2, 3);
    }

    #[test]
    fn test_twist() {
        let comp = split_class_index(5);
        assert_eq!(apply_twist(&comp, 2).l, 7);
        assert_eq!(apply_twist(&comp, 3).l, 0);
        assert_eq!(apply_twist(&comp, -1).l, 4);
    }

    #[test]
    fn test_triality() {
        let comp = split_class_index(16); // d = 2
        assert_eq!(apply_triality(&comp, 1).d, Modality::Neutral);
        assert_eq!(apply_triality(&comp, 2).d, Modality::Produce);
    }

    #[test]
    fn test_mirror() {
        let comp = SigilComponents {
            h2: 2,
            d: Modality::Produce,
            l: 6,
        };
        let mirrored = apply_mirror(&comp);
        assert_eq!(mirrored.d, Modality::Consume);
        assert_eq!(mirrored.h2, 2);
        assert_eq!(mirrored.l, 6);
    }

    #[test]
    fn test_equivalence() {
        assert!(equivalent(0x00, 0x01));
        assert!(equivalent(0x00, 0x30));
        assert!(!equivalent(0x00, 0x02));
    }

    #[test]
    fn test_all_classes_unique() {
        let classes = all_classes();
        assert_eq!(classes.len(), 96);
        let mut bytes: Vec<u8> = classes.iter().map(|(_, b)| *b).collect();
        bytes.sort_unstable();
        bytes.dedup();
        assert_eq!(bytes.len(), 96);
    }

    #[test]
    fn test_class_info() {
        let info = get_class_info(0x2B);
        assert_eq!(info.class_index, 21);
        assert_eq!(info.canonical_byte, 0x2A);
        assert_eq!(info.components.d, Modality::Consume);
    }
}
