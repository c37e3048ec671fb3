//! Validation engine for run specifications.
//!
//! The engine runs all registered [`ValidationRule`]s against a
//! [`RankSpec`](super::spec::RankSpec) and collects every diagnostic into a
//! [`ValidationReport`]. It never short-circuits on the first error, so
//! users see all problems at once.
//!
//! # Quick start
//!
//! ```rust
//! use linkrank::pipeline::spec::RankSpec;
//! use linkrank::pipeline::validation::ValidationEngine;
//!
//! let report = ValidationEngine::with_defaults().validate(&RankSpec::default());
//! assert!(report.is_valid());
//! ```

use std::fmt;

use serde::Serialize;

use super::spec::RankSpec;
use crate::errors::{RankError, Result};
use crate::types::RankConfig;

// ─── Error code ─────────────────────────────────────────────────────────────

/// Stable machine-readable category for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A numeric field lies outside its admissible range.
    OutOfRange,
    /// A numeric field is NaN or infinite.
    NonFinite,
    /// The iteration budget cannot plausibly reach the threshold.
    IterationBudget,
    /// A field the schema does not recognize.
    UnknownField,
}

// ─── Spec error ─────────────────────────────────────────────────────────────

/// A finding located by JSON pointer, with an optional fix-up hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecError {
    pub code: ErrorCode,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl SpecError {
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Last segment of the JSON pointer, i.e. the offending field name.
    pub fn field(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

impl From<&SpecError> for RankError {
    fn from(err: &SpecError) -> Self {
        if err.code == ErrorCode::NonFinite && err.field() == "initial_value" {
            RankError::InvalidInitialState(err.message.clone())
        } else {
            RankError::config(err.field(), err.message.clone())
        }
    }
}

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding with its severity.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: SpecError,
}

impl ValidationDiagnostic {
    pub fn error(err: SpecError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: SpecError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &SpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &SpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Total number of diagnostics (errors + warnings).
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if there are no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Convert the first error into a [`RankError`], if there is one.
    pub fn into_result(self) -> Result<()> {
        match self.errors().next() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects a [`RankSpec`] and returns
/// zero or more diagnostics.
///
/// Rules are stateless and must be `Send + Sync` so they can be shared
/// across threads.
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"damping_range"`).
    fn name(&self) -> &str;

    /// Inspect `spec` and return any findings.
    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a [`RankSpec`] and collects
/// all diagnostics into a [`ValidationReport`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Create an empty engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(DampingRangeRule));
        engine.add_rule(Box::new(ThresholdRule));
        engine.add_rule(Box::new(IterationBudgetRule));
        engine.add_rule(Box::new(InitialValueRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    /// Register an additional rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in run order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run all rules against `spec` and return the collected report.
    pub fn validate(&self, spec: &RankSpec) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(spec));
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RankConfig {
    /// Check this configuration with the default rules.
    ///
    /// Returns the first error as [`RankError::InvalidConfiguration`], or
    /// [`RankError::InvalidInitialState`] for a non-finite initial value.
    pub fn validate(&self) -> Result<()> {
        let spec = RankSpec::from(self.clone());
        ValidationEngine::with_defaults()
            .validate(&spec)
            .into_result()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. damping factor strictly inside (0, 1) ───────────────────────────────

struct DampingRangeRule;

impl ValidationRule for DampingRangeRule {
    fn name(&self) -> &str {
        "damping_range"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        let d = spec.rank.damping_factor;
        if d > 0.0 && d < 1.0 {
            return vec![];
        }
        vec![ValidationDiagnostic::error(
            SpecError::new(
                ErrorCode::OutOfRange,
                "/rank/damping_factor",
                format!("damping_factor must lie strictly between 0 and 1, got {d}"),
            )
            .with_hint("0.85 is the usual choice"),
        )]
    }
}

// ─── 2. convergence threshold positive and finite ───────────────────────────

struct ThresholdRule;

impl ValidationRule for ThresholdRule {
    fn name(&self) -> &str {
        "convergence_threshold"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        let eps = spec.rank.convergence_threshold;
        if eps.is_finite() && eps > 0.0 {
            return vec![];
        }
        vec![ValidationDiagnostic::error(
            SpecError::new(
                ErrorCode::OutOfRange,
                "/rank/convergence_threshold",
                format!("convergence_threshold must be a positive finite number, got {eps}"),
            )
            .with_hint("The threshold is an absolute L1 distance; 1e-6 suits small corpora"),
        )]
    }
}

// ─── 3. iteration budget ────────────────────────────────────────────────────

struct IterationBudgetRule;

impl ValidationRule for IterationBudgetRule {
    fn name(&self) -> &str {
        "iteration_budget"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        let cfg = &spec.rank;
        if cfg.max_iterations <= 0 {
            return vec![ValidationDiagnostic::error(SpecError::new(
                ErrorCode::OutOfRange,
                "/rank/max_iterations",
                format!("max_iterations must be at least 1, got {}", cfg.max_iterations),
            ))];
        }

        // The error contracts by a factor of `d` per step, so d^m above the
        // threshold means the budget runs out first on almost any input.
        let d = cfg.damping_factor;
        let eps = cfg.convergence_threshold;
        let valid_inputs = d > 0.0 && d < 1.0 && eps.is_finite() && eps > 0.0;
        let iterations = i32::try_from(cfg.max_iterations).unwrap_or(i32::MAX);
        if valid_inputs && d.powi(iterations) > eps {
            return vec![ValidationDiagnostic::warning(
                SpecError::new(
                    ErrorCode::IterationBudget,
                    "/rank/max_iterations",
                    format!(
                        "{} iterations at damping {d} are unlikely to reach threshold {eps}",
                        cfg.max_iterations
                    ),
                )
                .with_hint("Raise max_iterations or loosen convergence_threshold"),
            )];
        }

        vec![]
    }
}

// ─── 4. initial value finite and non-negative ───────────────────────────────

struct InitialValueRule;

impl ValidationRule for InitialValueRule {
    fn name(&self) -> &str {
        "initial_value"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        let v = spec.rank.initial_value;
        if !v.is_finite() {
            vec![ValidationDiagnostic::error(SpecError::new(
                ErrorCode::NonFinite,
                "/rank/initial_value",
                format!("initial_value must be finite, got {v}"),
            ))]
        } else if v < 0.0 {
            vec![ValidationDiagnostic::error(SpecError::new(
                ErrorCode::OutOfRange,
                "/rank/initial_value",
                format!("initial_value must not be negative, got {v}"),
            ))]
        } else {
            vec![]
        }
    }
}

// ─── 5. Unknown fields (strict → error, non-strict → warning) ──────────────

struct UnknownFieldsRule;

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        let mut keys: Vec<&String> = spec.unknown_fields.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                let diag_fn = if spec.strict {
                    ValidationDiagnostic::error
                } else {
                    ValidationDiagnostic::warning
                };
                diag_fn(
                    SpecError::new(
                        ErrorCode::UnknownField,
                        format!("/{key}"),
                        format!("unrecognized field \"{key}\""),
                    )
                    .with_hint("Check spelling or remove this field"),
                )
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════
