//! Rewrite Engine for Normalization
//!
//! Drives the [`RuleSet`] over an IR tree until nothing changes. A pass
//! rewrites children before their parent and fires at most one rule per
//! node; passes repeat until one makes no change.

use crate::error::RewriteError;
use crate::ir::{AtomOp, IrNode, TransformOp};
use crate::rules::{Rule, RuleSet};
use sigmatics_tracing::perf_span;

/// Default bound on the number of passes
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Result of a rewrite operation
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteResult {
    /// The normalized tree
    pub node: IrNode,
    /// Whether any rewrite was applied
    pub changed: bool,
    /// Number of rewrites applied
    pub rewrite_count: usize,
    /// Rules in the order they fired
    pub applied_rules: Vec<Rule>,
}

/// Rewrite engine
#[derive(Debug, Clone)]
pub struct RewriteEngine {
    rules: RuleSet,
    max_iterations: usize,
}

impl RewriteEngine {
    /// Create a new rewrite engine with standard rules
    pub fn new() -> Self {
        RewriteEngine {
            rules: RuleSet::standard(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Create with custom rules
    pub fn with_rules(rules: RuleSet) -> Self {
        RewriteEngine {
            rules,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set maximum passes before giving up
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Rewrite to a fixed point
    pub fn rewrite(&self, node: &IrNode) -> Result<RewriteResult, RewriteError> {
        let (result, converged) = self.run(node);
        if converged {
            Ok(result)
        } else {
            Err(RewriteError::IterationLimit(self.max_iterations))
        }
    }

    /// Returns the last tree reached and whether it is a fixed point
    fn run(&self, node: &IrNode) -> (RewriteResult, bool) {
        let _span = perf_span!("normalize", nodes = node.node_count());

        let mut current = node.clone();
        let mut applied_rules = Vec::new();
        let mut converged = false;

        for pass in 0..self.max_iterations {
            let before = applied_rules.len();
            current = self.apply_pass(&current, &mut applied_rules);
            if applied_rules.len() == before {
                tracing::trace!(passes = pass + 1, "normalization converged");
                converged = true;
                break;
            }
        }

        tracing::debug!(
            rewrites = applied_rules.len(),
            converged,
            result = %current,
            "normalized IR"
        );

        let rewrite_count = applied_rules.len();
        (
            RewriteResult {
                node: current,
                changed: rewrite_count > 0,
                rewrite_count,
                applied_rules,
            },
            converged,
        )
    }

    /// One bottom-up pass
    ///
    /// A mirror is matched against its operand as written before the operand
    /// is rewritten, so `M(D^k(x))` conjugates the `D^k` it was built over
    /// rather than whatever transform ordering later moves under it.
    fn apply_pass(&self, node: &IrNode, applied: &mut Vec<Rule>) -> IrNode {
        if let IrNode::Transform(TransformOp::Mirror, _) = node {
            if let Some(rewritten) = self.fire(node, applied) {
                return rewritten;
            }
        }

        let rebuilt = match node {
            IrNode::Atom(_) => node.clone(),
            IrNode::Seq(left, right) => IrNode::Seq(
                Box::new(self.apply_pass(left, applied)),
                Box::new(self.apply_pass(right, applied)),
            ),
            IrNode::Par(left, right) => IrNode::Par(
                Box::new(self.apply_pass(left, applied)),
                Box::new(self.apply_pass(right, applied)),
            ),
            IrNode::Transform(op, child) => IrNode::Transform(*op, Box::new(self.apply_pass(child, applied))),
        };

        match self.fire(&rebuilt, applied) {
            Some(rewritten) => rewritten,
            None => rebuilt,
        }
    }

    fn fire(&self, node: &IrNode, applied: &mut Vec<Rule>) -> Option<IrNode> {
        let (rule, rewritten) = self.rules.apply_first(node)?;
        tracing::trace!(rule = rule.name(), before = %node, after = %rewritten, "rewrite");
        applied.push(rule);
        Some(rewritten)
    }

    /// Whether no rule applies anywhere in the tree
    pub fn is_normal_form(&self, node: &IrNode) -> bool {
        if self.rules.apply_first(node).is_some() {
            return false;
        }
        match node {
            IrNode::Atom(_) => true,
            IrNode::Seq(left, right) | IrNode::Par(left, right) => {
                self.is_normal_form(left) && self.is_normal_form(right)
            }
            IrNode::Transform(_, child) => self.is_normal_form(child),
        }
    }
}

impl Default for RewriteEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with the standard rules
///
/// The standard rules always terminate; should the pass bound still be hit,
/// the last tree reached is returned and a warning is logged.
pub fn normalize(node: &IrNode) -> IrNode {
    let engine = RewriteEngine::new();
    let (result, converged) = engine.run(node);
    if !converged {
        tracing::warn!(
            max_iterations = engine.max_iterations(),
            "normalization stopped before reaching a fixed point"
        );
    }
    result.node
}

/// A leaf atom with the transforms above it, outermost first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafChain {
    pub atom: AtomOp,
    pub transforms: Vec<TransformOp>,
}

impl LeafChain {
    /// Transforms in application order (innermost first)
    pub fn application_order(&self) -> impl Iterator<Item = &TransformOp> {
        self.transforms.iter().rev()
    }
}

/// Leaves in left-to-right order, each with its root-to-leaf transform chain
pub fn extract_transforms(node: &IrNode) -> Vec<LeafChain> {
    let mut leaves = Vec::new();
    let mut chain = Vec::new();
    collect_leaves(node, &mut chain, &mut leaves);
    leaves
}

fn collect_leaves(node: &IrNode, chain: &mut Vec<TransformOp>, leaves: &mut Vec<LeafChain>) {
    match node {
        IrNode::Atom(atom) => leaves.push(LeafChain {
            atom: atom.clone(),
            transforms: chain.clone(),
        }),
        IrNode::Seq(left, right) | IrNode::Par(left, right) => {
            collect_leaves(left, chain, leaves);
            collect_leaves(right, chain, leaves);
        }
        IrNode::Transform(op, child) => {
            chain.push(*op);
            collect_leaves(child, chain, leaves);
            chain.pop();
        }
    }
}
