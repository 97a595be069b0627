//! Compile options
//!
//! Options are plain values with a `Default`; `from_env` overlays the
//! `SIGMATICS_*` environment variables the same way the tracing crate reads
//! its profile.

use crate::fuser::BackendPreference;
use crate::rewrite::DEFAULT_MAX_ITERATIONS;

/// Environment variable forcing a backend (`class`, `sga`, `auto`)
pub const ENV_BACKEND: &str = "SIGMATICS_BACKEND";

/// Environment variable bounding rewrite passes
pub const ENV_MAX_REWRITES: &str = "SIGMATICS_MAX_REWRITES";

/// Options honoured by [`compile_model_with`](crate::model::compile_model_with)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Overrides the descriptor's backend preference when set
    pub preference_override: Option<BackendPreference>,
    /// Pass bound handed to the rewrite engine
    pub max_rewrite_iterations: usize,
    /// Treat compile-time parameters as bound (enables C0 folding)
    pub compiled: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            preference_override: None,
            max_rewrite_iterations: DEFAULT_MAX_ITERATIONS,
            compiled: true,
        }
    }
}

impl CompileOptions {
    /// Force a backend regardless of descriptor or complexity
    pub fn with_backend(mut self, preference: BackendPreference) -> Self {
        self.preference_override = Some(preference);
        self
    }

    pub fn with_max_rewrite_iterations(mut self, max: usize) -> Self {
        self.max_rewrite_iterations = max;
        self
    }

    pub fn with_compiled(mut self, compiled: bool) -> Self {
        self.compiled = compiled;
        self
    }

    /// Defaults overlaid with environment variables; unparsable values are
    /// ignored with a warning
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(value) = std::env::var(ENV_BACKEND) {
            match value.parse::<BackendPreference>() {
                Ok(preference) => options.preference_override = Some(preference),
                Err(err) => tracing::warn!(variable = ENV_BACKEND, %err, "ignoring backend override"),
            }
        }

        if let Ok(value) = std::env::var(ENV_MAX_REWRITES) {
            match value.trim().parse::<usize>() {
                Ok(max) if max > 0 => options.max_rewrite_iterations = max,
                _ => tracing::warn!(variable = ENV_MAX_REWRITES, %value, "ignoring rewrite bound"),
            }
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let options = CompileOptions::default();
        assert_eq!(options.preference_override, None);
        assert_eq!(options.max_rewrite_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(options.compiled);
    }

    #[test]
    fn test_builders() {
        let options = CompileOptions::default()
            .with_backend(BackendPreference::Sga)
            .with_max_rewrite_iterations(7)
            .with_compiled(false);
        assert_eq!(options.preference_override, Some(BackendPreference::Sga));
        assert_eq!(options.max_rewrite_iterations, 7);
        assert!(!options.compiled);
    }

    #[test]
    fn test_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var(ENV_BACKEND, "class");
        std::env::set_var(ENV_MAX_REWRITES, "64");
        let options = CompileOptions::from_env();
        assert_eq!(options.preference_override, Some(BackendPreference::Class));
        assert_eq!(options.max_rewrite_iterations, 64);

        std::env::set_var(ENV_BACKEND, "gpu");
        std::env::set_var(ENV_MAX_REWRITES, "zero");
        let options = CompileOptions::from_env();
        assert_eq!(options, CompileOptions::default());

        std::env::remove_var(ENV_BACKEND);
        std::env::remove_var(ENV_MAX_REWRITES);
    }
}
