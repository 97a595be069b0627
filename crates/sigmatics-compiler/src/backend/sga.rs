//! SGA backend: plans over class values and algebraic elements
//!
//! Numeric state behaves exactly as in the class backend; ring operations
//! bridge element operands down to class indices, so both backends agree on
//! `value` and `overflow` for the same inputs.

use super::{ring_apply, NumberState, Outcome, ParamValue, RingOp, RuntimeParams, LEFT_OPERAND, RIGHT_OPERAND};
use crate::algebra::SgaElement;
use crate::bridge;
use crate::error::ExecutionError;
use crate::ir::{AtomOp, IrNode, OverflowMode, TransformOp};
use crate::rewrite::extract_transforms;
use sigmatics_tracing::perf_span;

/// SGA backend instruction
#[derive(Debug, Clone, PartialEq)]
pub enum SgaOp {
    /// Right-multiply the current element by a constant
    Multiply(SgaElement),
    /// Add a constant element
    Add(SgaElement),
    /// Scale the Clifford part
    Scale(i64),
    /// Fano cross product with a constant element
    Cross(SgaElement),
    Literal(u8),
    Load(String),
    Add96(OverflowMode),
    Sub96(OverflowMode),
    Mul96(OverflowMode),
    R(u8),
    D(u8),
    T(u8),
    M,
    ProjectGrade(u8),
    Lift(u8),
    ProjectClass,
}

impl SgaOp {
    fn transform(&self) -> Option<TransformOp> {
        match *self {
            SgaOp::R(k) => Some(TransformOp::Rotate(k)),
            SgaOp::D(k) => Some(TransformOp::Triality(k)),
            SgaOp::T(k) => Some(TransformOp::Twist(k)),
            SgaOp::M => Some(TransformOp::Mirror),
            _ => None,
        }
    }
}

impl From<TransformOp> for SgaOp {
    fn from(op: TransformOp) -> Self {
        match op {
            TransformOp::Rotate(k) => SgaOp::R(k),
            TransformOp::Triality(k) => SgaOp::D(k),
            TransformOp::Twist(k) => SgaOp::T(k),
            TransformOp::Mirror => SgaOp::M,
        }
    }
}

/// Lower a normalized tree; every atom is accepted
pub fn lower_to_sga_backend(node: &IrNode) -> Vec<SgaOp> {
    let _span = perf_span!("lower_sga");

    let mut ops = Vec::new();
    for leaf in extract_transforms(node) {
        ops.push(match &leaf.atom {
            AtomOp::ClassLiteral(c) => SgaOp::Literal(*c),
            AtomOp::Param(name) => SgaOp::Load(name.clone()),
            AtomOp::Lift(c) => SgaOp::Lift(*c),
            AtomOp::ProjectGrade(g) => SgaOp::ProjectGrade(*g),
            AtomOp::ProjectClass => SgaOp::ProjectClass,
            AtomOp::Add96(mode) => SgaOp::Add96(*mode),
            AtomOp::Sub96(mode) => SgaOp::Sub96(*mode),
            AtomOp::Mul96(mode) => SgaOp::Mul96(*mode),
        });
        ops.extend(leaf.application_order().map(|op| SgaOp::from(*op)));
    }

    tracing::debug!(ops = ops.len(), "lowered to sga backend");
    ops
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Number(NumberState),
    Element(SgaElement),
}

impl State {
    fn into_element(self) -> Result<SgaElement, ExecutionError> {
        match self {
            State::Number(number) => Ok(bridge::lift(number.value)?),
            State::Element(element) => Ok(element),
        }
    }

    fn class_value(&self) -> Result<i64, ExecutionError> {
        match self {
            State::Number(number) => Ok(number.value as i64),
            State::Element(element) => Ok(bridge::project_strict(element)? as i64),
        }
    }
}

/// Run an SGA plan
pub fn execute_sga_plan(ops: &[SgaOp], params: &RuntimeParams) -> Result<Outcome, ExecutionError> {
    let _span = perf_span!("execute_sga_plan", ops = ops.len());

    let mut state: Option<State> = None;
    for op in ops {
        if let Some(transform) = op.transform() {
            state = state.map(|s| apply_transform(s, &transform));
            continue;
        }

        state = Some(match op {
            SgaOp::Literal(c) => State::Number(NumberState::plain(*c)),
            SgaOp::Load(name) => match params.get(name) {
                Some(ParamValue::Int(value)) => State::Number(NumberState::from_int(*value)),
                Some(ParamValue::Element(element)) => State::Element(element.clone()),
                None => return Err(ExecutionError::MissingParameter(name.clone())),
            },
            SgaOp::Lift(c) => State::Element(bridge::lift(*c)?),
            SgaOp::Add96(mode) => ring_step(RingOp::Add, state.as_ref(), params, *mode)?,
            SgaOp::Sub96(mode) => ring_step(RingOp::Sub, state.as_ref(), params, *mode)?,
            SgaOp::Mul96(mode) => ring_step(RingOp::Mul, state.as_ref(), params, *mode)?,
            SgaOp::ProjectGrade(grade) => {
                let current = state.take().ok_or(ExecutionError::MissingOperand("projectGrade"))?;
                State::Element(current.into_element()?.grade_projection(*grade))
            }
            SgaOp::ProjectClass => match state.take().ok_or(ExecutionError::ProjectClassRequiresInput)? {
                State::Number(number) => State::Number(number),
                State::Element(element) => match bridge::project(&element) {
                    Some(class_index) => State::Number(NumberState::plain(class_index)),
                    None => {
                        tracing::debug!(%element, "projectClass on a composite element");
                        return Ok(Outcome::Absent);
                    }
                },
            },
            SgaOp::Multiply(rhs) => {
                let current = state.take().ok_or(ExecutionError::MissingOperand("multiply"))?;
                State::Element(current.into_element()?.multiply(rhs)?)
            }
            SgaOp::Add(rhs) => {
                let current = state.take().ok_or(ExecutionError::MissingOperand("add"))?;
                State::Element(current.into_element()?.add(rhs)?)
            }
            SgaOp::Scale(factor) => {
                let current = state.take().ok_or(ExecutionError::MissingOperand("scale"))?;
                State::Element(current.into_element()?.scale(*factor)?)
            }
            SgaOp::Cross(rhs) => {
                let current = state.take().ok_or(ExecutionError::MissingOperand("cross"))?;
                State::Element(current.into_element()?.cross(rhs)?)
            }
            // transforms are handled above
            SgaOp::R(_) | SgaOp::D(_) | SgaOp::T(_) | SgaOp::M => continue,
        });
    }

    let outcome = match state {
        Some(State::Number(number)) => number.into_outcome(),
        Some(State::Element(element)) => Outcome::Element(element),
        None => Outcome::Fallback,
    };
    tracing::trace!(?outcome, "sga plan finished");
    Ok(outcome)
}

fn apply_transform(state: State, op: &TransformOp) -> State {
    match state {
        State::Number(number) => State::Number(number.transformed(op)),
        State::Element(element) => State::Element(match *op {
            TransformOp::Rotate(k) => element.rotate(k as i64),
            TransformOp::Triality(k) => element.triality(k as i64),
            TransformOp::Twist(k) => element.twist(k as i64),
            TransformOp::Mirror => element.mirror(),
        }),
    }
}

fn ring_step(
    op: RingOp,
    state: Option<&State>,
    params: &RuntimeParams,
    mode: OverflowMode,
) -> Result<State, ExecutionError> {
    let left = match state {
        Some(current) => current.class_value()?,
        None => params.ring_operand(LEFT_OPERAND)?,
    };
    let right = params.ring_operand(RIGHT_OPERAND)?;
    Ok(State::Number(ring_apply(op, left, right, mode)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Blade, Multivector};
    use crate::backend::{execute_class_plan, lower_to_class_backend, RingResult};
    use crate::error::{AlgebraError, BridgeError};

    fn lit(i: i64) -> IrNode {
        IrNode::class_literal(i).unwrap()
    }

    fn run(ops: &[SgaOp], params: &RuntimeParams) -> Outcome {
        execute_sga_plan(ops, params).unwrap()
    }

    #[test]
    fn test_lower_accepts_grade_projection() {
        let node = IrNode::seq(IrNode::lift(5).unwrap(), IrNode::project_grade(1).unwrap());
        assert_eq!(lower_to_sga_backend(&node), vec![SgaOp::Lift(5), SgaOp::ProjectGrade(1)]);
    }

    #[test]
    fn test_matches_class_backend_on_literals() {
        let node = IrNode::mirror(IrNode::rotate(IrNode::twist(lit(42), 3), 2));
        let params = RuntimeParams::new();
        let class = execute_class_plan(&lower_to_class_backend(&node).unwrap(), &params).unwrap();
        let sga = run(&lower_to_sga_backend(&node), &params);
        assert_eq!(class, sga);
    }

    #[test]
    fn test_lift_then_transform_then_project() {
        let ops = vec![SgaOp::Lift(3), SgaOp::R(1), SgaOp::ProjectClass];
        assert_eq!(run(&ops, &RuntimeParams::new()), Outcome::Number(27));
    }

    #[test]
    fn test_lift_result_is_element() {
        let outcome = run(&[SgaOp::Lift(9)], &RuntimeParams::new());
        assert_eq!(outcome.element(), Some(&bridge::lift(9).unwrap()));
        assert_eq!(outcome.value(), Some(9));
    }

    #[test]
    fn test_project_class_requires_input() {
        assert_eq!(
            execute_sga_plan(&[SgaOp::ProjectClass], &RuntimeParams::new()),
            Err(ExecutionError::ProjectClassRequiresInput)
        );
    }

    #[test]
    fn test_project_grade_requires_state() {
        assert_eq!(
            execute_sga_plan(&[SgaOp::ProjectGrade(0)], &RuntimeParams::new()),
            Err(ExecutionError::MissingOperand("projectGrade"))
        );
    }

    #[test]
    fn test_composite_projection_is_absent() {
        let ops = vec![
            SgaOp::Lift(1),
            SgaOp::Add(bridge::lift(2).unwrap()),
            SgaOp::ProjectClass,
            SgaOp::Literal(7),
        ];
        assert_eq!(run(&ops, &RuntimeParams::new()), Outcome::Absent);
    }

    #[test]
    fn test_grade_projection_lifts_numbers() {
        // class 5 lifts onto e5, a grade-1 blade
        let kept = run(&[SgaOp::Literal(5), SgaOp::ProjectGrade(1)], &RuntimeParams::new());
        assert_eq!(kept.value(), Some(5));
        let dropped = run(&[SgaOp::Literal(5), SgaOp::ProjectGrade(2)], &RuntimeParams::new());
        assert!(dropped.element().is_some_and(|e| e.clifford().is_zero()));
    }

    #[test]
    fn test_ring_ops_bridge_elements() {
        let params = RuntimeParams::new()
            .with("a", bridge::lift(90).unwrap())
            .with("b", 10);
        let ops = vec![SgaOp::Add96(OverflowMode::Track)];
        assert_eq!(run(&ops, &params), Outcome::Tracked(RingResult { value: 4, overflow: true }));
    }

    #[test]
    fn test_ring_op_rejects_composite_operand() {
        let composite = bridge::lift(1).unwrap().add(&bridge::lift(2).unwrap()).unwrap();
        let params = RuntimeParams::new().with("a", composite).with("b", 1);
        let err = execute_sga_plan(&[SgaOp::Mul96(OverflowMode::Drop)], &params).unwrap_err();
        assert!(matches!(err, ExecutionError::Bridge(BridgeError::NonRank1(_))));
    }

    #[test]
    fn test_multiply_and_scale() {
        let e1 = bridge::lift(1).unwrap();
        let ops = vec![SgaOp::Lift(1), SgaOp::Multiply(e1), SgaOp::Scale(3)];
        let outcome = run(&ops, &RuntimeParams::new());
        // e1·e1 = 1, z4 and z3 stay 0
        assert_eq!(outcome, Outcome::Element(SgaElement::new(0, 0, Multivector::scalar(3))));
        assert_eq!(
            execute_sga_plan(&[SgaOp::Scale(2)], &RuntimeParams::new()),
            Err(ExecutionError::MissingOperand("scale"))
        );
    }

    #[test]
    fn test_element_parameter_load() {
        let params = RuntimeParams::new().with("x", bridge::lift(30).unwrap());
        let ops = vec![SgaOp::Load("x".to_string()), SgaOp::T(1), SgaOp::ProjectClass];
        assert_eq!(run(&ops, &params), Outcome::Number(31));
    }

    #[test]
    fn test_coefficient_overflow_is_an_error() {
        let ops = vec![SgaOp::Lift(1), SgaOp::Scale(i64::MAX), SgaOp::Scale(2)];
        assert_eq!(
            execute_sga_plan(&ops, &RuntimeParams::new()),
            Err(ExecutionError::Algebra(AlgebraError::CoefficientOverflow))
        );

        let big = bridge::lift(1).unwrap().scale(i64::MAX).unwrap();
        let ops = vec![SgaOp::Lift(1), SgaOp::Scale(i64::MAX), SgaOp::Multiply(big)];
        assert_eq!(
            execute_sga_plan(&ops, &RuntimeParams::new()),
            Err(ExecutionError::Algebra(AlgebraError::CoefficientOverflow))
        );
    }

    #[test]
    fn test_cross_along_fano_line() {
        // e1 × e2 = e4 on the line (1, 2, 4); class 4 lifts onto e4
        let ops = vec![SgaOp::Lift(1), SgaOp::Cross(bridge::lift(2).unwrap()), SgaOp::ProjectClass];
        assert_eq!(run(&ops, &RuntimeParams::new()), Outcome::Number(4));

        let ops = vec![SgaOp::Lift(2), SgaOp::Cross(bridge::lift(1).unwrap())];
        let outcome = run(&ops, &RuntimeParams::new());
        let e4 = Blade::generator(4).unwrap();
        assert_eq!(outcome.element().map(|e| e.clifford()), Some(&Multivector::term(e4, -1)));
        assert_eq!(
            execute_sga_plan(&[SgaOp::Cross(SgaElement::identity())], &RuntimeParams::new()),
            Err(ExecutionError::MissingOperand("cross"))
        );
    }
}
