//! Execution backends
//!
//! Both backends lower a normalized tree through [`extract_transforms`]:
//! every leaf contributes its atom op followed by its transforms, innermost
//! first, and leaves run left to right. The class backend works on bare
//! class indices; the SGA backend additionally carries algebraic elements.
//!
//! [`extract_transforms`]: crate::rewrite::extract_transforms

pub mod class;
pub mod sga;

pub use class::{execute_class_plan, lower_to_class_backend, ClassOp};
pub use sga::{execute_sga_plan, lower_to_sga_backend, SgaOp};

use crate::algebra::SgaElement;
use crate::bridge;
use crate::class_system::{
    apply_mirror, apply_rotation, apply_triality, apply_twist, components_to_class_index, split_class_index,
};
use crate::error::{ExecutionError, LoweringError};
use crate::fuser::Backend;
use crate::ir::{IrNode, OverflowMode, TransformOp};
use crate::types::CLASS_COUNT;
use std::collections::BTreeMap;

/// Runtime operand names read by ring operations
pub const LEFT_OPERAND: &str = "a";
pub const RIGHT_OPERAND: &str = "b";

/// A modular ring result with its overflow flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RingResult {
    pub value: u8,
    pub overflow: bool,
}

/// Final result of running a plan
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Bare class value
    Number(u8),
    /// Class value from a tracked ring operation
    Tracked(RingResult),
    /// Algebraic element (SGA backend only)
    Element(SgaElement),
    /// Class projection of a composite element
    Absent,
    /// The plan never established a value
    Fallback,
}

impl Outcome {
    /// Class value, if one exists; fallback counts as 0
    pub fn value(&self) -> Option<u8> {
        match self {
            Outcome::Number(value) => Some(*value),
            Outcome::Tracked(result) => Some(result.value),
            Outcome::Element(element) => bridge::project(element),
            Outcome::Absent => None,
            Outcome::Fallback => Some(0),
        }
    }

    /// Overflow flag when the last ring op tracked it
    pub fn overflow(&self) -> Option<bool> {
        match self {
            Outcome::Tracked(result) => Some(result.overflow),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<&SgaElement> {
        match self {
            Outcome::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Outcome::Absent)
    }
}

/// A runtime parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Element(SgaElement),
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<SgaElement> for ParamValue {
    fn from(element: SgaElement) -> Self {
        ParamValue::Element(element)
    }
}

/// Named runtime parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeParams {
    values: BTreeMap<String, ParamValue>,
}

impl RuntimeParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    fn require(&self, name: &str) -> Result<&ParamValue, ExecutionError> {
        self.get(name)
            .ok_or_else(|| ExecutionError::MissingParameter(name.to_string()))
    }

    /// Integer parameter; elements are rejected
    pub fn int(&self, name: &str) -> Result<i64, ExecutionError> {
        match self.require(name)? {
            ParamValue::Int(value) => Ok(*value),
            ParamValue::Element(_) => Err(ExecutionError::ParameterType {
                name: name.to_string(),
                expected: "integer",
            }),
        }
    }

    /// Integer parameter, or the class index of a rank-1 element
    pub(crate) fn ring_operand(&self, name: &str) -> Result<i64, ExecutionError> {
        match self.require(name)? {
            ParamValue::Int(value) => Ok(*value),
            ParamValue::Element(element) => Ok(bridge::project_strict(element)? as i64),
        }
    }
}

/// Arithmetic performed by a ring op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingOp {
    Add,
    Sub,
    Mul,
}

/// Class value with the overflow flag of the last ring op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumberState {
    pub value: u8,
    pub overflow: Option<bool>,
}

impl NumberState {
    pub fn plain(value: u8) -> Self {
        NumberState { value, overflow: None }
    }

    /// Reduce an arbitrary integer into the class range
    pub fn from_int(value: i64) -> Self {
        Self::plain(value.rem_euclid(CLASS_COUNT as i64) as u8)
    }

    pub fn transformed(self, op: &TransformOp) -> Self {
        NumberState {
            value: transform_class_index(self.value, op),
            ..self
        }
    }

    pub fn into_outcome(self) -> Outcome {
        match self.overflow {
            Some(overflow) => Outcome::Tracked(RingResult {
                value: self.value,
                overflow,
            }),
            None => Outcome::Number(self.value),
        }
    }
}

/// `left op right` modulo 96
pub(crate) fn ring_apply(op: RingOp, left: i64, right: i64, mode: OverflowMode) -> NumberState {
    let (left, right) = (left as i128, right as i128);
    let raw = match op {
        RingOp::Add => left + right,
        RingOp::Sub => left - right,
        RingOp::Mul => left * right,
    };
    let modulus = CLASS_COUNT as i128;
    NumberState {
        value: raw.rem_euclid(modulus) as u8,
        overflow: match mode {
            OverflowMode::Track => Some(!(0..modulus).contains(&raw)),
            OverflowMode::Drop => None,
        },
    }
}

/// Apply a transform to a class index through its components
pub fn transform_class_index(class_index: u8, op: &TransformOp) -> u8 {
    let comp = split_class_index(class_index % CLASS_COUNT);
    let moved = match *op {
        TransformOp::Rotate(k) => apply_rotation(&comp, k as i64),
        TransformOp::Triality(k) => apply_triality(&comp, k as i64),
        TransformOp::Twist(k) => apply_twist(&comp, k as i64),
        TransformOp::Mirror => apply_mirror(&comp),
    };
    components_to_class_index(&moved)
}

/// A lowered plan for either backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendPlan {
    Class(Vec<ClassOp>),
    Sga(Vec<SgaOp>),
}

impl BackendPlan {
    /// Lower a normalized tree for `backend`
    pub fn lower(node: &IrNode, backend: Backend) -> Result<Self, LoweringError> {
        match backend {
            Backend::Class => Ok(BackendPlan::Class(lower_to_class_backend(node)?)),
            Backend::Sga => Ok(BackendPlan::Sga(lower_to_sga_backend(node))),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            BackendPlan::Class(_) => Backend::Class,
            BackendPlan::Sga(_) => Backend::Sga,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BackendPlan::Class(ops) => ops.len(),
            BackendPlan::Sga(ops) => ops.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn execute(&self, params: &RuntimeParams) -> Result<Outcome, ExecutionError> {
        match self {
            BackendPlan::Class(ops) => execute_class_plan(ops, params),
            BackendPlan::Sga(ops) => execute_sga_plan(ops, params),
        }
    }
}
