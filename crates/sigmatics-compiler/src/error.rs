//! Error types for the sigmatics compiler core
//!
//! Errors are grouped by the pipeline stage that raises them: construction
//! (IR building, eager), lowering (before execution), execution (`run`).
//! [`CompileError`] wraps the stages reachable from `compile_model`.

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Invalid input detected while building IR or reading a descriptor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("invalid class index: {0} (must be 0..=95)")]
    InvalidClassIndex(i64),

    #[error("invalid grade: {0} (must be 0..=7)")]
    InvalidGrade(i64),

    #[error("invalid parameter name: {0:?}")]
    InvalidParameter(String),

    #[error("invalid descriptor field `{field}`: {reason}")]
    InvalidDescriptorField { field: String, reason: String },
}

/// Failures raised while selecting a backend or lowering IR to a plan
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoweringError {
    #[error("Grade projection requires SGA backend")]
    GradeProjectionRequiresSga,

    #[error("invalid complexity hint: {0:?} (expected one of C0, C1, C2, C3)")]
    InvalidComplexityHint(String),
}

/// Failures of the algebraic model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgebraError {
    #[error("negative power {0} is not defined for algebraic elements")]
    NegativePower(i64),

    #[error("invalid Fano generator index: {0} (must be 1..=7)")]
    InvalidGenerator(i64),

    #[error("coefficient overflow: result exceeds the i64 range")]
    CoefficientOverflow,
}

/// Failures converting between class indices and algebraic elements
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("element is not rank-1 and has no class index: {0}")]
    NonRank1(String),

    #[error("invalid class index: {0} (must be 0..=95)")]
    InvalidClassIndex(i64),
}

/// Failures of the rewrite engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    #[error("normalization did not converge within {0} passes")]
    IterationLimit(usize),
}

/// Failures raised while running a plan
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("missing runtime parameter: {0}")]
    MissingParameter(String),

    #[error("runtime parameter `{name}` has the wrong type: expected {expected}")]
    ParameterType { name: String, expected: &'static str },

    #[error("{0} requires an input value but no state is established")]
    MissingOperand(&'static str),

    #[error("projectClass requires an input element")]
    ProjectClassRequiresInput,

    #[error("algebra error: {0}")]
    Algebra(#[from] AlgebraError),

    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

/// Top-level error for model compilation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("UnknownModel: {0}")]
    UnknownModel(String),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Lowering(#[from] LoweringError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

impl ConstructionError {
    /// Create a descriptor field error
    pub fn descriptor_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptorField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
