//! Model descriptors and compiled models
//!
//! A [`ModelDescriptor`] names a recipe and carries its parameters. Compiling
//! one runs the full pipeline:
//!
//! ```text
//! recipe → IR → normalize → classify → select backend → lower → CompiledModel
//! ```
//!
//! Recipes read these compile-time parameters:
//!
//! | parameter  | meaning                                 | default |
//! |------------|-----------------------------------------|---------|
//! | `class`    | class index operand                     | none    |
//! | `k`        | transform exponent                      | 1       |
//! | `grade`    | grade kept by `project_grade`           | none    |
//! | `overflow` | `drop` or `track` for ring recipes      | `drop`  |
//!
//! When `class` is absent, recipes that need an operand fall back to the
//! runtime parameter `x`.

use crate::backend::{BackendPlan, Outcome, RuntimeParams};
use crate::config::CompileOptions;
use crate::error::{CompileError, ConstructionError, ExecutionError, Result};
use crate::fuser::{classify, select_backend, Backend, BackendPreference, Complexity};
use crate::ir::{IrNode, OverflowMode};
use crate::rewrite::RewriteEngine;
use serde::{Deserialize, Serialize};
use sigmatics_tracing::perf_span;
use std::collections::BTreeMap;
use std::fmt;

/// Runtime parameter used when a recipe has no compiled `class`
pub const RUNTIME_OPERAND: &str = "x";

/// Recipe names understood by [`compile_model`]
pub const RECIPES: [&str; 11] = [
    "literal",
    "lift",
    "project",
    "project_grade",
    "add96",
    "sub96",
    "mul96",
    "rotate",
    "triality",
    "twist",
    "mirror",
];

/// Declarative description of a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub name: String,
    pub version: String,
    pub namespace: String,
    #[serde(default)]
    pub compiled_params: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub runtime_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendPreference>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.compiled_params.insert(name.into(), value.into());
        self
    }

    pub fn with_runtime_param(mut self, name: impl Into<String>) -> Self {
        self.runtime_params.push(name.into());
        self
    }

    pub fn with_complexity_hint(mut self, hint: impl Into<String>) -> Self {
        self.complexity_hint = Some(hint.into());
        self
    }

    pub fn with_backend(mut self, preference: BackendPreference) -> Self {
        self.backend = Some(preference);
        self
    }

    /// Parse a descriptor from JSON
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn int_param(&self, field: &str) -> std::result::Result<Option<i64>, ConstructionError> {
        match self.compiled_params.get(field) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| ConstructionError::descriptor_field(field, format!("expected an integer, got {value}"))),
        }
    }

    fn overflow_mode(&self) -> std::result::Result<OverflowMode, ConstructionError> {
        match self.compiled_params.get("overflow") {
            None => Ok(OverflowMode::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|_| ConstructionError::descriptor_field("overflow", format!("expected \"drop\" or \"track\", got {value}"))),
        }
    }

    fn has_runtime_operand(&self) -> bool {
        self.runtime_params.iter().any(|name| name == RUNTIME_OPERAND)
    }
}

/// Operand for a recipe: the compiled class, else the runtime `x`
fn operand(descriptor: &ModelDescriptor, lifted: bool) -> std::result::Result<IrNode, ConstructionError> {
    match descriptor.int_param("class")? {
        Some(class) if lifted => IrNode::lift(class),
        Some(class) => IrNode::class_literal(class),
        None if descriptor.has_runtime_operand() => IrNode::param(RUNTIME_OPERAND),
        None => Err(ConstructionError::descriptor_field(
            "class",
            format!("required unless `{RUNTIME_OPERAND}` is a runtime parameter"),
        )),
    }
}

fn required_int(descriptor: &ModelDescriptor, field: &str) -> std::result::Result<i64, ConstructionError> {
    descriptor
        .int_param(field)?
        .ok_or_else(|| ConstructionError::descriptor_field(field, "required"))
}

/// Ring recipes start from the compiled class when one is given
fn ring_recipe(descriptor: &ModelDescriptor, op: fn(OverflowMode) -> IrNode) -> std::result::Result<IrNode, ConstructionError> {
    let ring = op(descriptor.overflow_mode()?);
    Ok(match descriptor.int_param("class")? {
        Some(class) => IrNode::seq(IrNode::class_literal(class)?, ring),
        None => ring,
    })
}

/// Build the IR named by the descriptor's recipe
pub fn build_recipe(descriptor: &ModelDescriptor) -> Result<IrNode> {
    let exponent = || descriptor.int_param("k").map(|k| k.unwrap_or(1));

    let node = match descriptor.name.as_str() {
        "literal" => operand(descriptor, false)?,
        "lift" => IrNode::lift(required_int(descriptor, "class")?)?,
        "project" => IrNode::seq(operand(descriptor, true)?, IrNode::project_class()),
        "project_grade" => IrNode::seq(
            operand(descriptor, true)?,
            IrNode::project_grade(required_int(descriptor, "grade")?)?,
        ),
        "add96" => ring_recipe(descriptor, IrNode::add96)?,
        "sub96" => ring_recipe(descriptor, IrNode::sub96)?,
        "mul96" => ring_recipe(descriptor, IrNode::mul96)?,
        "rotate" => IrNode::rotate(operand(descriptor, false)?, exponent()?),
        "triality" => IrNode::triality(operand(descriptor, false)?, exponent()?),
        "twist" => IrNode::twist(operand(descriptor, false)?, exponent()?),
        "mirror" => IrNode::mirror(operand(descriptor, false)?),
        other => return Err(CompileError::UnknownModel(other.to_string())),
    };
    Ok(node)
}

/// Cache identity of a compiled model
///
/// Besides the descriptor's identity the key carries every input that changes
/// what compilation produces: the effective backend preference, the
/// complexity hint, the declared runtime parameters and the `compiled` flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelKey {
    pub name: String,
    pub version: String,
    /// BLAKE3 of the canonical JSON of the compiled parameters
    pub params_hash: String,
    /// BLAKE3 of the schema text, when one is associated
    pub schema_hash: Option<String>,
    /// Options override, else the descriptor's preference, else `auto`
    pub preference: BackendPreference,
    pub complexity_hint: Option<String>,
    pub runtime_params: Vec<String>,
    pub compiled: bool,
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = |hash: &str| hash.get(..16).unwrap_or(hash).to_string();
        write!(f, "{}@{}#{}", self.name, self.version, short(&self.params_hash))?;
        if let Some(schema) = &self.schema_hash {
            write!(f, "/{}", short(schema))?;
        }
        write!(f, "[{}", self.preference)?;
        if let Some(hint) = &self.complexity_hint {
            write!(f, ",{hint}")?;
        }
        if !self.compiled {
            write!(f, ",runtime")?;
        }
        write!(f, "]")
    }
}

/// Cache key under default compile options
pub fn model_key(descriptor: &ModelDescriptor, schema: Option<&str>) -> ModelKey {
    model_key_with(descriptor, schema, &CompileOptions::default())
}

/// Cache key for a descriptor compiled with `options`
///
/// Parameters are rebuilt into a sorted JSON object, so logically equal
/// parameter sets hash identically regardless of insertion order.
pub fn model_key_with(descriptor: &ModelDescriptor, schema: Option<&str>, options: &CompileOptions) -> ModelKey {
    let canonical: serde_json::Map<String, serde_json::Value> = descriptor
        .compiled_params
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let canonical = serde_json::Value::Object(canonical).to_string();

    ModelKey {
        name: descriptor.name.clone(),
        version: descriptor.version.clone(),
        params_hash: blake3::hash(canonical.as_bytes()).to_hex().to_string(),
        schema_hash: schema.map(|text| blake3::hash(text.as_bytes()).to_hex().to_string()),
        preference: effective_preference(descriptor, options),
        complexity_hint: descriptor.complexity_hint.clone(),
        runtime_params: descriptor.runtime_params.clone(),
        compiled: options.compiled,
    }
}

fn effective_preference(descriptor: &ModelDescriptor, options: &CompileOptions) -> BackendPreference {
    options
        .preference_override
        .or(descriptor.backend)
        .unwrap_or_default()
}

/// A model ready to run
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledModel {
    namespace: String,
    name: String,
    version: String,
    ir: IrNode,
    complexity: Complexity,
    backend: Backend,
    plan: BackendPlan,
    runtime_params: Vec<String>,
    folded: Option<Outcome>,
}

impl CompiledModel {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Normalized IR
    pub fn ir(&self) -> &IrNode {
        &self.ir
    }

    pub fn complexity(&self) -> Complexity {
        self.complexity
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn plan(&self) -> &BackendPlan {
        &self.plan
    }

    /// C0 models are evaluated once at compile time
    pub fn is_folded(&self) -> bool {
        self.folded.is_some()
    }

    /// Execute with the given runtime parameters
    pub fn run(&self, params: &RuntimeParams) -> std::result::Result<Outcome, ExecutionError> {
        if let Some(missing) = self.runtime_params.iter().find(|name| !params.contains(name)) {
            return Err(ExecutionError::MissingParameter(missing.clone()));
        }

        if let Some(outcome) = &self.folded {
            return Ok(outcome.clone());
        }

        let span = perf_span!("run_model", model = self.name.as_str());
        let outcome = self.plan.execute(params)?;
        sigmatics_tracing::performance::record_execution(
            &self.backend.to_string(),
            self.plan.len(),
            span.elapsed_us(),
        );
        Ok(outcome)
    }
}

/// Compile with default options
pub fn compile_model(descriptor: &ModelDescriptor) -> Result<CompiledModel> {
    compile_model_with(descriptor, &CompileOptions::default())
}

/// Compile honouring explicit options
pub fn compile_model_with(descriptor: &ModelDescriptor, options: &CompileOptions) -> Result<CompiledModel> {
    let _span = perf_span!("compile_model", model = descriptor.name.as_str());

    // hints are checked before anything is lowered
    let hint = descriptor
        .complexity_hint
        .as_deref()
        .map(str::parse::<Complexity>)
        .transpose()?;

    let ir = build_recipe(descriptor)?;
    let normalized = RewriteEngine::new()
        .with_max_iterations(options.max_rewrite_iterations)
        .rewrite(&ir)?
        .node;

    let compiled = options.compiled && descriptor.runtime_params.is_empty();
    let classified = classify(&normalized, compiled);
    let complexity = match hint {
        Some(hint) if hint != classified => {
            tracing::warn!(
                model = %descriptor.name,
                %hint,
                %classified,
                "complexity hint disagrees with classifier; using hint"
            );
            hint
        }
        Some(hint) => hint,
        None => classified,
    };

    let backend = select_backend(complexity, effective_preference(descriptor, options));
    let plan = BackendPlan::lower(&normalized, backend)?;

    let folded = if complexity == Complexity::C0 {
        fold_constant(&plan)
    } else {
        None
    };

    tracing::debug!(
        model = %descriptor.name,
        %complexity,
        %backend,
        ops = plan.len(),
        folded = folded.is_some(),
        "compiled model"
    );

    Ok(CompiledModel {
        namespace: descriptor.namespace.clone(),
        name: descriptor.name.clone(),
        version: descriptor.version.clone(),
        ir: normalized,
        complexity,
        backend,
        plan,
        runtime_params: descriptor.runtime_params.clone(),
        folded,
    })
}

/// Evaluate a plan that needs no runtime input
fn fold_constant(plan: &BackendPlan) -> Option<Outcome> {
    match plan.execute(&RuntimeParams::new()) {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            tracing::debug!(%err, "constant folding skipped");
            None
        }
    }
}
