//! Intermediate representation for ≡₉₆ expressions
//!
//! ```text
//! node ::= atom(op) | seq(node, node) | par(node, node) | transform(τ, node)
//! τ    ::= R^k (k mod 4) | D^k (k mod 3) | T^k (k mod 8) | M
//! ```
//!
//! Nodes are immutable values. The smart constructors on [`IrNode`] validate
//! atoms eagerly and reduce transform exponents modulo their order; an
//! exponent ≡ 0 yields the child itself, so a tree built through them never
//! contains an identity transform. The variants stay public so the rewrite
//! engine can build intermediate terms that it will fold itself.

use crate::error::ConstructionError;
use crate::types::{checked_class_index, MIRROR_ORDER, ROTATE_ORDER, TRIALITY_ORDER, TWIST_ORDER};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How ring operations report results leaving [0, 96)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowMode {
    /// Bare modded value
    #[default]
    Drop,
    /// Value plus an overflow flag
    Track,
}

/// Leaf operations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AtomOp {
    /// Constant class index
    ClassLiteral(u8),
    /// Named runtime parameter
    Param(String),
    /// Lift a class index into its rank-1 algebraic element
    Lift(u8),
    /// Keep only the given grade of the Clifford component
    ProjectGrade(u8),
    /// Map the current rank-1 element back to its class index
    ProjectClass,
    Add96(OverflowMode),
    Sub96(OverflowMode),
    Mul96(OverflowMode),
}

impl AtomOp {
    /// Ring operations consume runtime operands
    pub fn is_ring_op(&self) -> bool {
        matches!(self, AtomOp::Add96(_) | AtomOp::Sub96(_) | AtomOp::Mul96(_))
    }

    /// Whether executing this atom reads runtime parameters
    pub fn reads_runtime_input(&self) -> bool {
        self.is_ring_op() || matches!(self, AtomOp::Param(_))
    }
}

/// Which coordinate a transform acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransformKind {
    Rotate,
    Triality,
    Twist,
    Mirror,
}

impl TransformKind {
    pub fn order(self) -> u8 {
        match self {
            TransformKind::Rotate => ROTATE_ORDER,
            TransformKind::Triality => TRIALITY_ORDER,
            TransformKind::Twist => TWIST_ORDER,
            TransformKind::Mirror => MIRROR_ORDER,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TransformKind::Rotate => "R",
            TransformKind::Triality => "D",
            TransformKind::Twist => "T",
            TransformKind::Mirror => "M",
        }
    }
}

/// Transform operations: R (mod 4 on h₂), D (mod 3 on d), T (mod 8 on ℓ), M
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformOp {
    Rotate(u8),
    Triality(u8),
    Twist(u8),
    Mirror,
}

impl TransformOp {
    /// Build a transform of `kind` with exponent `k` reduced into range
    pub fn new(kind: TransformKind, k: i64) -> Self {
        let reduced = k.rem_euclid(kind.order() as i64) as u8;
        match kind {
            TransformKind::Rotate => TransformOp::Rotate(reduced),
            TransformKind::Triality => TransformOp::Triality(reduced),
            TransformKind::Twist => TransformOp::Twist(reduced),
            TransformKind::Mirror => TransformOp::Mirror,
        }
    }

    pub fn kind(&self) -> TransformKind {
        match self {
            TransformOp::Rotate(_) => TransformKind::Rotate,
            TransformOp::Triality(_) => TransformKind::Triality,
            TransformOp::Twist(_) => TransformKind::Twist,
            TransformOp::Mirror => TransformKind::Mirror,
        }
    }

    /// Raw exponent as stored; the mirror counts as exponent 1
    pub fn exponent(&self) -> u8 {
        match *self {
            TransformOp::Rotate(k) | TransformOp::Triality(k) | TransformOp::Twist(k) => k,
            TransformOp::Mirror => 1,
        }
    }

    pub fn order(&self) -> u8 {
        self.kind().order()
    }

    /// Exponent ≡ 0 modulo the order
    pub fn is_identity(&self) -> bool {
        self.exponent() % self.order() == 0
    }

    /// Exponent already inside `0..order`
    pub fn is_reduced(&self) -> bool {
        self.exponent() < self.order()
    }

    /// Same kind with the exponent reduced into range
    pub fn reduced(&self) -> Self {
        Self::new(self.kind(), self.exponent() as i64)
    }
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformOp::Mirror => write!(f, "M"),
            op => write!(f, "{}^{}", op.kind().symbol(), op.exponent()),
        }
    }
}

/// Immutable expression tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrNode {
    Atom(AtomOp),
    Seq(Box<IrNode>, Box<IrNode>),
    Par(Box<IrNode>, Box<IrNode>),
    Transform(TransformOp, Box<IrNode>),
}

impl IrNode {
    // ------------------------------------------------------------------
    // Atom constructors
    // ------------------------------------------------------------------

    pub fn class_literal(index: i64) -> Result<Self, ConstructionError> {
        Ok(IrNode::Atom(AtomOp::ClassLiteral(checked_class_index(index)?)))
    }

    pub fn lift(index: i64) -> Result<Self, ConstructionError> {
        Ok(IrNode::Atom(AtomOp::Lift(checked_class_index(index)?)))
    }

    pub fn project_grade(grade: i64) -> Result<Self, ConstructionError> {
        if !(0..=7).contains(&grade) {
            return Err(ConstructionError::InvalidGrade(grade));
        }
        Ok(IrNode::Atom(AtomOp::ProjectGrade(grade as u8)))
    }

    pub fn project_class() -> Self {
        IrNode::Atom(AtomOp::ProjectClass)
    }

    pub fn param(name: impl Into<String>) -> Result<Self, ConstructionError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConstructionError::InvalidParameter(name));
        }
        Ok(IrNode::Atom(AtomOp::Param(name)))
    }

    pub fn add96(mode: OverflowMode) -> Self {
        IrNode::Atom(AtomOp::Add96(mode))
    }

    pub fn sub96(mode: OverflowMode) -> Self {
        IrNode::Atom(AtomOp::Sub96(mode))
    }

    pub fn mul96(mode: OverflowMode) -> Self {
        IrNode::Atom(AtomOp::Mul96(mode))
    }

    // ------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------

    pub fn seq(left: IrNode, right: IrNode) -> Self {
        IrNode::Seq(Box::new(left), Box::new(right))
    }

    pub fn par(left: IrNode, right: IrNode) -> Self {
        IrNode::Par(Box::new(left), Box::new(right))
    }

    /// Wrap `child` in `op`, reducing the exponent; identity ops vanish
    pub fn transform(op: TransformOp, child: IrNode) -> Self {
        let op = op.reduced();
        if op.is_identity() {
            child
        } else {
            IrNode::Transform(op, Box::new(child))
        }
    }

    pub fn rotate(child: IrNode, k: i64) -> Self {
        Self::transform(TransformOp::new(TransformKind::Rotate, k), child)
    }

    pub fn triality(child: IrNode, k: i64) -> Self {
        Self::transform(TransformOp::new(TransformKind::Triality, k), child)
    }

    pub fn twist(child: IrNode, k: i64) -> Self {
        Self::transform(TransformOp::new(TransformKind::Twist, k), child)
    }

    pub fn mirror(child: IrNode) -> Self {
        Self::transform(TransformOp::Mirror, child)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn is_atom(&self) -> bool {
        matches!(self, IrNode::Atom(_))
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        match self {
            IrNode::Atom(_) => 1,
            IrNode::Seq(l, r) | IrNode::Par(l, r) => 1 + l.node_count() + r.node_count(),
            IrNode::Transform(_, child) => 1 + child.node_count(),
        }
    }

    /// Number of transform nodes in the tree
    pub fn transform_count(&self) -> usize {
        match self {
            IrNode::Atom(_) => 0,
            IrNode::Seq(l, r) | IrNode::Par(l, r) => l.transform_count() + r.transform_count(),
            IrNode::Transform(_, child) => 1 + child.transform_count(),
        }
    }

    /// Visit every atom, left to right
    pub fn atoms(&self) -> Vec<&AtomOp> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a AtomOp>) {
        match self {
            IrNode::Atom(op) => out.push(op),
            IrNode::Seq(l, r) | IrNode::Par(l, r) => {
                l.collect_atoms(out);
                r.collect_atoms(out);
            }
            IrNode::Transform(_, child) => child.collect_atoms(out),
        }
    }
}

impl fmt::Display for AtomOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = |mode: &OverflowMode| match mode {
            OverflowMode::Drop => "drop",
            OverflowMode::Track => "track",
        };
        match self {
            AtomOp::ClassLiteral(c) => write!(f, "c{c:02}"),
            AtomOp::Param(name) => write!(f, "${name}"),
            AtomOp::Lift(c) => write!(f, "lift(c{c:02})"),
            AtomOp::ProjectGrade(g) => write!(f, "grade({g})"),
            AtomOp::ProjectClass => write!(f, "class"),
            AtomOp::Add96(m) => write!(f, "add96[{}]", mode(m)),
            AtomOp::Sub96(m) => write!(f, "sub96[{}]", mode(m)),
            AtomOp::Mul96(m) => write!(f, "mul96[{}]", mode(m)),
        }
    }
}

impl fmt::Display for IrNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrNode::Atom(op) => write!(f, "{op}"),
            IrNode::Seq(l, r) => write!(f, "({l} ; {r})"),
            IrNode::Par(l, r) => write!(f, "({l} || {r})"),
            IrNode::Transform(op, child) => write!(f, "{op}({child})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(i: i64) -> IrNode {
        IrNode::class_literal(i).unwrap()
    }

    #[test]
    fn test_literal_validation() {
        assert!(IrNode::class_literal(95).is_ok());
        assert_eq!(IrNode::class_literal(96), Err(ConstructionError::InvalidClassIndex(96)));
        assert_eq!(IrNode::lift(-1), Err(ConstructionError::InvalidClassIndex(-1)));
    }

    #[test]
    fn test_grade_validation() {
        assert!(IrNode::project_grade(0).is_ok());
        assert!(IrNode::project_grade(7).is_ok());
        assert_eq!(IrNode::project_grade(8), Err(ConstructionError::InvalidGrade(8)));
        assert_eq!(IrNode::project_grade(-1), Err(ConstructionError::InvalidGrade(-1)));
    }

    #[test]
    fn test_param_validation() {
        assert!(IrNode::param("x").is_ok());
        assert!(matches!(IrNode::param("  "), Err(ConstructionError::InvalidParameter(_))));
    }

    #[test]
    fn test_exponents_reduced_at_construction() {
        assert_eq!(IrNode::rotate(lit(3), 5), IrNode::rotate(lit(3), 1));
        assert_eq!(IrNode::triality(lit(3), -1), IrNode::triality(lit(3), 2));
        assert_eq!(IrNode::twist(lit(3), 17), IrNode::twist(lit(3), 1));
    }

    #[test]
    fn test_identity_transforms_collapse() {
        assert_eq!(IrNode::rotate(lit(3), 4), lit(3));
        assert_eq!(IrNode::triality(lit(3), 0), lit(3));
        assert_eq!(IrNode::twist(lit(3), -8), lit(3));
        assert_eq!(IrNode::transform(TransformOp::Rotate(12), lit(1)), lit(1));
    }

    #[test]
    fn test_counts() {
        let node = IrNode::seq(IrNode::rotate(lit(1), 1), IrNode::mirror(IrNode::twist(lit(2), 3)));
        assert_eq!(node.node_count(), 6);
        assert_eq!(node.transform_count(), 3);
        assert_eq!(node.atoms().len(), 2);
    }

    #[test]
    fn test_display() {
        let node = IrNode::seq(IrNode::rotate(lit(3), 1), IrNode::add96(OverflowMode::Track));
        assert_eq!(node.to_string(), "(R^1(c03) ; add96[track])");
        assert_eq!(IrNode::mirror(lit(0)).to_string(), "M(c00)");
    }
}
