//! Complexity classification and backend selection
//!
//! | class | condition                                            | backend (auto) |
//! |-------|------------------------------------------------------|----------------|
//! | C0    | single atom, compiled, no runtime inputs, class pure | class          |
//! | C1    | class pure, seq depth ≤ 5                            | class          |
//! | C2    | grade projection present, seq depth ≤ 5              | sga            |
//! | C3    | seq depth > 5                                        | sga            |

use crate::error::LoweringError;
use crate::ir::{AtomOp, IrNode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deepest `seq` nesting still considered bounded
pub const MAX_BOUNDED_SEQ_DEPTH: usize = 5;

/// Fusion tier assigned by [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Complexity {
    C0,
    C1,
    C2,
    C3,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::C0 => "C0",
            Complexity::C1 => "C1",
            Complexity::C2 => "C2",
            Complexity::C3 => "C3",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = LoweringError;

    fn from_str(hint: &str) -> Result<Self, Self::Err> {
        match hint {
            "C0" => Ok(Complexity::C0),
            "C1" => Ok(Complexity::C1),
            "C2" => Ok(Complexity::C2),
            "C3" => Ok(Complexity::C3),
            other => Err(LoweringError::InvalidComplexityHint(other.to_string())),
        }
    }
}

/// Requested backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    Class,
    Sga,
    #[default]
    Auto,
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "class" => Ok(BackendPreference::Class),
            "sga" => Ok(BackendPreference::Sga),
            "auto" => Ok(BackendPreference::Auto),
            other => Err(format!("unknown backend preference: {other}")),
        }
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendPreference::Class => f.write_str("class"),
            BackendPreference::Sga => f.write_str("sga"),
            BackendPreference::Auto => f.write_str("auto"),
        }
    }
}

/// Concrete execution backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Class,
    Sga,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Class => f.write_str("class"),
            Backend::Sga => f.write_str("sga"),
        }
    }
}

/// Structural facts gathered in one walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    /// Maximum nesting of `seq` nodes along any path
    pub seq_depth: usize,
    /// No grade projection is reachable
    pub class_pure: bool,
    /// Some atom reads a runtime parameter
    pub has_runtime_inputs: bool,
    /// The whole tree is one atom
    pub is_single_atom: bool,
}

impl Signals {
    pub fn analyze(node: &IrNode) -> Self {
        let mut signals = Signals {
            seq_depth: 0,
            class_pure: true,
            has_runtime_inputs: false,
            is_single_atom: node.is_atom(),
        };
        signals.seq_depth = walk(node, &mut signals);
        signals
    }
}

/// Returns the seq depth below `node` and folds atom facts into `signals`
fn walk(node: &IrNode, signals: &mut Signals) -> usize {
    match node {
        IrNode::Atom(op) => {
            if matches!(op, AtomOp::ProjectGrade(_)) {
                signals.class_pure = false;
            }
            if op.reads_runtime_input() {
                signals.has_runtime_inputs = true;
            }
            0
        }
        IrNode::Seq(left, right) => 1 + walk(left, signals).max(walk(right, signals)),
        IrNode::Par(left, right) => walk(left, signals).max(walk(right, signals)),
        IrNode::Transform(_, child) => walk(child, signals),
    }
}

/// Assign a complexity tier; `compiled` means every compile-time parameter is bound
pub fn classify(node: &IrNode, compiled: bool) -> Complexity {
    classify_signals(&Signals::analyze(node), compiled)
}

pub fn classify_signals(signals: &Signals, compiled: bool) -> Complexity {
    if signals.seq_depth > MAX_BOUNDED_SEQ_DEPTH {
        Complexity::C3
    } else if signals.is_single_atom && compiled && !signals.has_runtime_inputs && signals.class_pure {
        Complexity::C0
    } else if signals.class_pure {
        Complexity::C1
    } else {
        Complexity::C2
    }
}

pub fn should_use_class_backend(node: &IrNode) -> bool {
    Signals::analyze(node).class_pure
}

pub fn requires_sga_backend(node: &IrNode) -> bool {
    !should_use_class_backend(node)
}

/// Explicit preferences win over the tier
pub fn select_backend(complexity: Complexity, preference: BackendPreference) -> Backend {
    match (preference, complexity) {
        (BackendPreference::Class, _) => Backend::Class,
        (BackendPreference::Sga, _) => Backend::Sga,
        (BackendPreference::Auto, Complexity::C0 | Complexity::C1) => Backend::Class,
        (BackendPreference::Auto, Complexity::C2 | Complexity::C3) => Backend::Sga,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::OverflowMode;

    fn lit(i: i64) -> IrNode {
        IrNode::class_literal(i).unwrap()
    }

    fn nested_seq(depth: usize) -> IrNode {
        (0..depth).fold(lit(0), |acc, i| IrNode::seq(lit(i as i64 + 1), acc))
    }

    #[test]
    fn test_classify_scenarios() {
        assert_eq!(classify(&lit(7), true), Complexity::C0);
        assert_eq!(classify(&IrNode::rotate(lit(3), 1), false), Complexity::C1);
        let projected = IrNode::seq(IrNode::project_grade(2).unwrap(), lit(2));
        assert_eq!(classify(&projected, false), Complexity::C2);
        assert_eq!(classify(&nested_seq(7), true), Complexity::C3);
    }

    #[test]
    fn test_c0_needs_compiled_and_no_runtime_inputs() {
        assert_eq!(classify(&lit(7), false), Complexity::C1);
        assert_eq!(classify(&IrNode::param("x").unwrap(), true), Complexity::C1);
        assert_eq!(classify(&IrNode::add96(OverflowMode::Drop), true), Complexity::C1);
    }

    #[test]
    fn test_depth_boundary() {
        assert_eq!(Signals::analyze(&nested_seq(5)).seq_depth, 5);
        assert_eq!(classify(&nested_seq(5), true), Complexity::C1);
        assert_eq!(classify(&nested_seq(6), true), Complexity::C3);
    }

    #[test]
    fn test_par_and_transforms_do_not_add_depth() {
        let node = IrNode::par(IrNode::rotate(nested_seq(2), 1), nested_seq(3));
        assert_eq!(Signals::analyze(&node).seq_depth, 3);
    }

    #[test]
    fn test_backend_predicates() {
        let pure = IrNode::seq(lit(1), IrNode::project_class());
        assert!(should_use_class_backend(&pure));
        let graded = IrNode::twist(IrNode::project_grade(1).unwrap(), 2);
        assert!(requires_sga_backend(&graded));
    }

    #[test]
    fn test_select_backend() {
        use BackendPreference::*;
        assert_eq!(select_backend(Complexity::C0, Auto), Backend::Class);
        assert_eq!(select_backend(Complexity::C1, Auto), Backend::Class);
        assert_eq!(select_backend(Complexity::C2, Auto), Backend::Sga);
        assert_eq!(select_backend(Complexity::C3, Auto), Backend::Sga);
        assert_eq!(select_backend(Complexity::C3, Class), Backend::Class);
        assert_eq!(select_backend(Complexity::C0, Sga), Backend::Sga);
    }

    #[test]
    fn test_complexity_hint_parsing() {
        assert_eq!("C2".parse::<Complexity>(), Ok(Complexity::C2));
        assert_eq!(
            "C4".parse::<Complexity>(),
            Err(LoweringError::InvalidComplexityHint("C4".to_string()))
        );
        assert!("c1".parse::<Complexity>().is_err());
    }

    #[test]
    fn test_preference_parsing() {
        assert_eq!("SGA".parse::<BackendPreference>(), Ok(BackendPreference::Sga));
        assert!("gpu".parse::<BackendPreference>().is_err());
        let json = serde_json::to_string(&BackendPreference::Class).unwrap();
        assert_eq!(json, "\"class\"");
    }
}
