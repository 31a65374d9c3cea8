//! Analyzer rule configuration.
//!
//! Each check and rewrite rule can be enabled or disabled independently.
//! The policy is built once at startup and passed into the `Analyzer`
//! constructor; there is no process-wide registry.

use indexmap::IndexMap;

/// Rule: `return` directly at top level is an error.
pub const TOPLEVEL_RETURN: &str = "toplevel-return";
/// Rule: a reference must resolve to a visible declaration.
pub const UNDECLARED_VARIABLE: &str = "undeclared-variable";
/// Rule: a name may be declared once per block.
pub const DUPLICATE_DECLARATION: &str = "duplicate-declaration";
/// Rule: reading the value of `_` is an error.
pub const UNDERSCORE_REFERENCE: &str = "underscore-variable-reference";
/// Rule: a `const` binding cannot be an assignment target.
pub const CONST_ASSIGNMENT: &str = "assignment-to-const-variable";
/// Rewrite: mangle `_`-prefixed bindings into target-legal names.
pub const CONVERT_UNDERSCORE: &str = "convert-underscore-variable";

const ALL_RULES: &[&str] = &[
    TOPLEVEL_RETURN,
    UNDECLARED_VARIABLE,
    DUPLICATE_DECLARATION,
    UNDERSCORE_REFERENCE,
    CONST_ASSIGNMENT,
    CONVERT_UNDERSCORE,
];

/// Which analyzer rules run, keyed by rule name.
#[derive(Debug, Clone)]
pub struct Policy {
    rules: IndexMap<&'static str, bool>,
}

impl Default for Policy {
    fn default() -> Self {
        Self::all()
    }
}

impl Policy {
    /// Every rule enabled.
    pub fn all() -> Self {
        Self {
            rules: ALL_RULES.iter().map(|&r| (r, true)).collect(),
        }
    }

    /// Every rule disabled.
    pub fn none() -> Self {
        Self {
            rules: ALL_RULES.iter().map(|&r| (r, false)).collect(),
        }
    }

    /// Enable or disable one rule by name.
    ///
    /// Unknown rule names are rejected so a typo in configuration cannot
    /// silently leave a rule at its default.
    pub fn set(&mut self, rule: &str, enabled: bool) -> Result<(), UnknownRule> {
        match self.rules.get_mut(rule) {
            Some(slot) => {
                *slot = enabled;
                Ok(())
            }
            None => Err(UnknownRule(rule.to_string())),
        }
    }

    /// Whether a rule is enabled. Unknown names are disabled.
    pub fn enabled(&self, rule: &str) -> bool {
        self.rules.get(rule).copied().unwrap_or(false)
    }

    /// All known rule names, in definition order.
    pub fn rule_names() -> &'static [&'static str] {
        ALL_RULES
    }
}

/// A rule name that is not part of the rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRule(pub String);

impl std::fmt::Display for UnknownRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown analyzer rule: {}", self.0)
    }
}

impl std::error::Error for UnknownRule {}
