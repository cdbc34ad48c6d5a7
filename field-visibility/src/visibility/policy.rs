//! The redaction policy: what a hidden field turns into.
//!
//! A policy is configured once at startup and read-only afterwards. It does not
//! decide visibility; it only shapes the value that replaces a hidden field.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::VisibilityError;

/// Default placeholder substituted for hidden fields.
pub const HIDDEN_PLACEHOLDER: &str = "<Hidden>";

static GLOBAL_POLICY: OnceCell<Arc<RedactionPolicy>> = OnceCell::new();

/// Process-wide redaction settings.
///
/// With the `serde` feature this deserializes from configuration; both keys
/// are optional:
///
/// ```toml
/// placeholder = "<Hidden>"
/// hide_empty = false
/// ```
///
/// Deserialization validates the policy, so an empty placeholder in a
/// configuration file is an error at load time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PolicyConfig"))]
pub struct RedactionPolicy {
    /// The marker that replaces a hidden value when no redaction hook answers.
    placeholder: String,
    /// Whether blank values are redacted too. Off by default: a blank value
    /// has nothing to leak.
    hide_empty: bool,
}

impl RedactionPolicy {
    /// Uses a custom placeholder.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets whether blank values of hidden fields are redacted.
    #[must_use]
    pub fn with_hide_empty(mut self, hide_empty: bool) -> Self {
        self.hide_empty = hide_empty;
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn hide_empty(&self) -> bool {
        self.hide_empty
    }

    /// Checks the policy for configuration errors.
    ///
    /// An empty placeholder is rejected: a redacted field would be
    /// indistinguishable from a blank one.
    pub fn validate(&self) -> Result<(), VisibilityError> {
        if self.placeholder.is_empty() {
            return Err(VisibilityError::InvalidPolicy(
                "placeholder must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Installs `policy` as the process-wide policy.
    ///
    /// Succeeds once per process. The policy is validated first.
    pub fn install(policy: RedactionPolicy) -> Result<(), VisibilityError> {
        policy.validate()?;
        GLOBAL_POLICY
            .set(Arc::new(policy))
            .map_err(|_| VisibilityError::PolicyAlreadyInstalled)
    }

    /// Returns the process-wide policy, or the default one if none was installed.
    pub fn global() -> Arc<RedactionPolicy> {
        GLOBAL_POLICY
            .get()
            .cloned()
            .unwrap_or_else(|| Arc::new(RedactionPolicy::default()))
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            placeholder: HIDDEN_PLACEHOLDER.to_owned(),
            hide_empty: false,
        }
    }
}

/// The unvalidated form of a policy, as read from configuration.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default)]
struct PolicyConfig {
    placeholder: String,
    hide_empty: bool,
}

#[cfg(feature = "serde")]
impl Default for PolicyConfig {
    fn default() -> Self {
        let RedactionPolicy {
            placeholder,
            hide_empty,
        } = RedactionPolicy::default();
        Self {
            placeholder,
            hide_empty,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<PolicyConfig> for RedactionPolicy {
    type Error = VisibilityError;

    fn try_from(config: PolicyConfig) -> Result<Self, Self::Error> {
        let policy = Self {
            placeholder: config.placeholder,
            hide_empty: config.hide_empty,
        };
        policy.validate()?;
        Ok(policy)
    }
}
