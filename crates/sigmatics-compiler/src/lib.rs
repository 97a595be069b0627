//! # Sigmatics ≡₉₆ compiler core
//!
//! Compiles expressions over the 96 resonance classes to one of two execution
//! backends:
//! - **96-Class System**: class index = 24·h₂ + 8·d + ℓ, byte decoding, equivalence
//! - **Algebraic Model**: Z4 × Z3 × Cl(7,0) elements with rotate (R), triality (D),
//!   twist (T) and mirror (M) actions
//! - **Bridge**: `lift`/`project` between class indices and rank-1 elements
//! - **IR + Rewriting**: immutable expression trees normalized to a fixed point
//! - **Fuser**: complexity tiers C0–C3 and backend selection
//! - **Backends**: a fast class backend and the general SGA backend
//! - **Models**: descriptor-driven compilation, key derivation and caching
//!
//! ## Example: Normalization
//!
//! ```text
//! use sigmatics_compiler::{normalize, IrNode};
//!
//! // R^3(R^1(c10)) folds to R^0 and disappears
//! let node = IrNode::rotate(IrNode::rotate(IrNode::class_literal(10)?, 1), 3);
//! assert_eq!(normalize(&node), IrNode::class_literal(10)?);
//! ```
//!
//! ## Example: Compiling a model
//!
//! ```text
//! use sigmatics_compiler::{compile_model, ModelDescriptor, RuntimeParams};
//!
//! let descriptor = ModelDescriptor::new("add96", "1.0.0", "sigmatics.core")
//!     .with_param("overflow", "track")
//!     .with_runtime_param("a")
//!     .with_runtime_param("b");
//! let model = compile_model(&descriptor)?;
//! let outcome = model.run(&RuntimeParams::new().with("a", 80).with("b", 30))?;
//! assert_eq!(outcome.value(), Some(14));
//! assert_eq!(outcome.overflow(), Some(true));
//! ```

pub mod algebra;
pub mod backend;
pub mod bridge;
pub mod cache;
pub mod class_system;
pub mod config;
pub mod error;
pub mod fuser;
pub mod ir;
pub mod model;
pub mod rewrite;
pub mod rules;
pub mod types;
pub mod validation;

pub use algebra::{Blade, Multivector, SgaElement};
pub use backend::{
    execute_class_plan, execute_sga_plan, lower_to_class_backend, lower_to_sga_backend, BackendPlan, ClassOp,
    Outcome, ParamValue, RingResult, RuntimeParams, SgaOp,
};
pub use cache::{CacheStats, ModelCache};
pub use class_system::*;
pub use config::CompileOptions;
pub use error::{
    AlgebraError, BridgeError, CompileError, ConstructionError, ExecutionError, LoweringError, Result, RewriteError,
};
pub use fuser::{
    classify, requires_sga_backend, select_backend, should_use_class_backend, Backend, BackendPreference,
    Complexity, Signals,
};
pub use ir::{AtomOp, IrNode, OverflowMode, TransformKind, TransformOp};
pub use model::{compile_model, compile_model_with, model_key, model_key_with, CompiledModel, ModelDescriptor, ModelKey};
pub use rewrite::{extract_transforms, normalize, LeafChain, RewriteEngine, RewriteResult};
pub use rules::{Rule, RuleSet};
pub use types::*;
pub use validation::{validate_descriptor, ValidationReport};
