//! Class index ↔ SGA element bridge
//!
//! `lift` places the class coordinates into the element: h₂ → Z4,
//! d → Z3, ℓ → the context ring of the Clifford part (ℓ = 0 is the scalar
//! `1`, ℓ = i is the generator eᵢ). `project` reads them back from any
//! rank-1 element, so `project(lift(i)) == Some(i)` for every class.

use crate::algebra::element::slot_blade;
use crate::algebra::{Multivector, SgaElement};
use crate::class_system::{components_to_class_index, split_class_index};
use crate::error::BridgeError;
use crate::types::{Modality, SigilComponents, CLASS_COUNT};

/// Canonical rank-1 element for a class index
pub fn lift(class_index: u8) -> Result<SgaElement, BridgeError> {
    if class_index >= CLASS_COUNT {
        return Err(BridgeError::InvalidClassIndex(class_index as i64));
    }
    Ok(lift_components(&split_class_index(class_index)))
}

/// Rank-1 element for already-decoded components
pub fn lift_components(comp: &SigilComponents) -> SgaElement {
    SgaElement::new(
        comp.h2 as i64,
        comp.d.as_u8() as i64,
        Multivector::term(slot_blade(comp.l), 1),
    )
}

/// Class index of a rank-1 element; `None` for composite elements
pub fn project(element: &SgaElement) -> Option<u8> {
    let l = element.context_slot()?;
    Some(components_to_class_index(&SigilComponents {
        h2: element.z4(),
        d: Modality::from_residue(element.z3() as i64),
        l,
    }))
}

/// Like [`project`] but composite elements are an error
pub fn project_strict(element: &SgaElement) -> Result<u8, BridgeError> {
    project(element).ok_or_else(|| BridgeError::NonRank1(element.to_string()))
}

/// Whether the element corresponds to a single class index
pub fn is_rank1(element: &SgaElement) -> bool {
    element.is_rank1()
}

/// Lift every index, preserving order
pub fn lift_batch(class_indices: &[u8]) -> Result<Vec<SgaElement>, BridgeError> {
    class_indices.iter().map(|&index| lift(index)).collect()
}

/// Project every element, preserving order and length
pub fn project_batch(elements: &[SgaElement]) -> Vec<Option<u8>> {
    elements.iter().map(project).collect()
}
