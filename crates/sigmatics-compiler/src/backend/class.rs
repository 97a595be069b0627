//! Class backend: linear plans over bare class indices

use super::{ring_apply, NumberState, Outcome, RingOp, RuntimeParams, LEFT_OPERAND, RIGHT_OPERAND};
use crate::error::{ExecutionError, LoweringError};
use crate::ir::{AtomOp, IrNode, OverflowMode, TransformOp};
use crate::rewrite::extract_transforms;
use sigmatics_tracing::perf_span;
use std::fmt;

/// Class backend instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassOp {
    Literal(u8),
    Load(String),
    Add96(OverflowMode),
    Sub96(OverflowMode),
    Mul96(OverflowMode),
    R(u8),
    D(u8),
    T(u8),
    M,
    Lift(u8),
    ProjectClass,
}

impl From<TransformOp> for ClassOp {
    fn from(op: TransformOp) -> Self {
        match op {
            TransformOp::Rotate(k) => ClassOp::R(k),
            TransformOp::Triality(k) => ClassOp::D(k),
            TransformOp::Twist(k) => ClassOp::T(k),
            TransformOp::Mirror => ClassOp::M,
        }
    }
}

impl fmt::Display for ClassOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassOp::Literal(c) => write!(f, "literal c{c:02}"),
            ClassOp::Load(name) => write!(f, "load ${name}"),
            ClassOp::Add96(mode) => write!(f, "add96 {mode:?}"),
            ClassOp::Sub96(mode) => write!(f, "sub96 {mode:?}"),
            ClassOp::Mul96(mode) => write!(f, "mul96 {mode:?}"),
            ClassOp::R(k) => write!(f, "R^{k}"),
            ClassOp::D(k) => write!(f, "D^{k}"),
            ClassOp::T(k) => write!(f, "T^{k}"),
            ClassOp::M => write!(f, "M"),
            ClassOp::Lift(c) => write!(f, "lift c{c:02}"),
            ClassOp::ProjectClass => write!(f, "projectClass"),
        }
    }
}

/// Lower a normalized tree; grade projection is rejected
pub fn lower_to_class_backend(node: &IrNode) -> Result<Vec<ClassOp>, LoweringError> {
    let _span = perf_span!("lower_class");

    let mut ops = Vec::new();
    for leaf in extract_transforms(node) {
        ops.push(match &leaf.atom {
            AtomOp::ClassLiteral(c) => ClassOp::Literal(*c),
            AtomOp::Param(name) => ClassOp::Load(name.clone()),
            AtomOp::Lift(c) => ClassOp::Lift(*c),
            AtomOp::ProjectGrade(_) => return Err(LoweringError::GradeProjectionRequiresSga),
            AtomOp::ProjectClass => ClassOp::ProjectClass,
            AtomOp::Add96(mode) => ClassOp::Add96(*mode),
            AtomOp::Sub96(mode) => ClassOp::Sub96(*mode),
            AtomOp::Mul96(mode) => ClassOp::Mul96(*mode),
        });
        ops.extend(leaf.application_order().map(|op| ClassOp::from(*op)));
    }

    tracing::debug!(ops = ops.len(), "lowered to class backend");
    Ok(ops)
}

/// Run a class plan
pub fn execute_class_plan(ops: &[ClassOp], params: &RuntimeParams) -> Result<Outcome, ExecutionError> {
    let _span = perf_span!("execute_class_plan", ops = ops.len());

    let mut state: Option<NumberState> = None;
    for op in ops {
        state = match op {
            ClassOp::Literal(c) | ClassOp::Lift(c) => Some(NumberState::plain(*c)),
            ClassOp::Load(name) => Some(NumberState::from_int(params.int(name)?)),
            ClassOp::Add96(mode) => Some(ring_step(RingOp::Add, state, params, *mode)?),
            ClassOp::Sub96(mode) => Some(ring_step(RingOp::Sub, state, params, *mode)?),
            ClassOp::Mul96(mode) => Some(ring_step(RingOp::Mul, state, params, *mode)?),
            ClassOp::R(k) => state.map(|s| s.transformed(&TransformOp::Rotate(*k))),
            ClassOp::D(k) => state.map(|s| s.transformed(&TransformOp::Triality(*k))),
            ClassOp::T(k) => state.map(|s| s.transformed(&TransformOp::Twist(*k))),
            ClassOp::M => state.map(|s| s.transformed(&TransformOp::Mirror)),
            ClassOp::ProjectClass => state,
        };
    }

    let outcome = state.map_or(Outcome::Fallback, NumberState::into_outcome);
    tracing::trace!(?outcome, "class plan finished");
    Ok(outcome)
}

fn ring_step(
    op: RingOp,
    state: Option<NumberState>,
    params: &RuntimeParams,
    mode: OverflowMode,
) -> Result<NumberState, ExecutionError> {
    let left = match state {
        Some(current) => current.value as i64,
        None => params.int(LEFT_OPERAND)?,
    };
    let right = params.int(RIGHT_OPERAND)?;
    Ok(ring_apply(op, left, right, mode))
}
