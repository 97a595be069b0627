//! Rewrite Rules for Normalization
//!
//! Each rule inspects a single node (with its already-normalized children)
//! and either returns a replacement or declines. Rules are tried in
//! [`RuleSet`] order and the first match wins.

use crate::ir::{IrNode, TransformKind, TransformOp};

/// A local rewrite on transform nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `X^0(x) → x`; out-of-range exponents are reduced in place
    IdentityElimination,
    /// `X^a(X^b(x)) → X^(a+b)(x)` for R, D, T
    PowerFolding,
    /// `M(M(x)) → x`
    MirrorCancellation,
    /// `M(D^k(x)) → D^(3-k)(x)`, `M(T^k(x)) → T^(8-k)(x)`
    MirrorConjugation,
    /// `τ(a ; b) → τ(a) ; τ(b)` and likewise for `||`
    Distribution,
    /// Reorder adjacent R/D/T so R is outermost and T innermost
    CommutationOrdering,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::IdentityElimination => "identity-elimination",
            Rule::PowerFolding => "power-folding",
            Rule::MirrorCancellation => "mirror-cancellation",
            Rule::MirrorConjugation => "mirror-conjugation",
            Rule::Distribution => "distribution",
            Rule::CommutationOrdering => "commutation-ordering",
        }
    }

    /// Try this rule at the root of `node`
    pub fn apply(&self, node: &IrNode) -> Option<IrNode> {
        let IrNode::Transform(op, child) = node else {
            return None;
        };

        match self {
            Rule::IdentityElimination => {
                if op.is_identity() {
                    Some((**child).clone())
                } else if !op.is_reduced() {
                    Some(IrNode::Transform(op.reduced(), child.clone()))
                } else {
                    None
                }
            }

            Rule::PowerFolding => match (op, child.as_ref()) {
                (outer, IrNode::Transform(inner, grandchild))
                    if outer.kind() == inner.kind() && outer.kind() != TransformKind::Mirror =>
                {
                    // Built raw: a sum ≡ 0 is left for identity elimination
                    let folded = TransformOp::new(
                        outer.kind(),
                        outer.exponent() as i64 + inner.exponent() as i64,
                    );
                    Some(IrNode::Transform(folded, grandchild.clone()))
                }
                _ => None,
            },

            Rule::MirrorCancellation => match (op, child.as_ref()) {
                (TransformOp::Mirror, IrNode::Transform(TransformOp::Mirror, grandchild)) => {
                    Some((**grandchild).clone())
                }
                _ => None,
            },

            Rule::MirrorConjugation => match (op, child.as_ref()) {
                (TransformOp::Mirror, IrNode::Transform(inner, _)) if inner.is_identity() => None,
                (TransformOp::Mirror, IrNode::Transform(inner, grandchild)) => match inner.kind() {
                    TransformKind::Triality | TransformKind::Twist => {
                        let order = inner.order() as i64;
                        let conjugated = TransformOp::new(inner.kind(), order - inner.exponent() as i64);
                        Some(IrNode::Transform(conjugated, grandchild.clone()))
                    }
                    TransformKind::Rotate | TransformKind::Mirror => None,
                },
                _ => None,
            },

            Rule::Distribution => match child.as_ref() {
                IrNode::Seq(left, right) => Some(IrNode::Seq(
                    Box::new(IrNode::Transform(*op, left.clone())),
                    Box::new(IrNode::Transform(*op, right.clone())),
                )),
                IrNode::Par(left, right) => Some(IrNode::Par(
                    Box::new(IrNode::Transform(*op, left.clone())),
                    Box::new(IrNode::Transform(*op, right.clone())),
                )),
                _ => None,
            },

            Rule::CommutationOrdering => match child.as_ref() {
                IrNode::Transform(inner, grandchild) => {
                    let (Some(outer_rank), Some(inner_rank)) = (chain_rank(op), chain_rank(inner)) else {
                        return None;
                    };
                    (outer_rank > inner_rank).then(|| {
                        IrNode::Transform(*inner, Box::new(IrNode::Transform(*op, grandchild.clone())))
                    })
                }
                _ => None,
            },
        }
    }
}

/// Position in the canonical chain R, D, T; the mirror never moves
fn chain_rank(op: &TransformOp) -> Option<u8> {
    match op.kind() {
        TransformKind::Rotate => Some(0),
        TransformKind::Triality => Some(1),
        TransformKind::Twist => Some(2),
        TransformKind::Mirror => None,
    }
}

/// Ordered collection of rules
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Standard normalization order
    pub fn standard() -> Self {
        RuleSet {
            rules: vec![
                Rule::IdentityElimination,
                Rule::PowerFolding,
                Rule::MirrorCancellation,
                Rule::MirrorConjugation,
                Rule::Distribution,
                Rule::CommutationOrdering,
            ],
        }
    }

    /// Empty rule set
    pub fn empty() -> Self {
        RuleSet { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First rule that matches at the root of `node`
    pub fn apply_first(&self, node: &IrNode) -> Option<(Rule, IrNode)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(node).map(|rewritten| (*rule, rewritten)))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}
