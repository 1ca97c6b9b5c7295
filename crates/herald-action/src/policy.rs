//! Confirmation policy with the confidence bypass.

use std::collections::HashSet;

use herald_core::config::ConfirmationConfig;
use herald_core::HeraldError;

use crate::error::ActionError;
use crate::types::{ActionContext, ActionKind};

/// Built-ins that never consult the policy and so cannot be gated.
const UNGATED_BUILTINS: [ActionKind; 2] = [ActionKind::ProcessReceipt, ActionKind::CheckStatus];

/// Decides whether an action must wait for explicit user approval.
#[derive(Debug, Clone)]
pub struct ConfirmationPolicy {
    bypass_confidence: f64,
    critical: HashSet<String>,
    gated: HashSet<String>,
}

impl ConfirmationPolicy {
    pub fn new(config: &ConfirmationConfig) -> Self {
        Self {
            bypass_confidence: config.bypass_confidence,
            critical: config.critical_actions.iter().cloned().collect(),
            gated: config.gated_actions.iter().cloned().collect(),
        }
    }

    pub fn is_critical(&self, action: &str) -> bool {
        self.critical.contains(action)
    }

    /// Whether `action` requires confirmation in `context`.
    ///
    /// Gated actions are exempted when the classifier confidence reaches the
    /// bypass threshold, except for critical actions which are never exempted.
    pub fn needs_confirmation(&self, action: &str, context: &ActionContext) -> bool {
        if self.is_critical(action) {
            return true;
        }
        if !self.gated.contains(action) {
            return false;
        }
        // Non-finite confidence never earns the bypass.
        let confidence = context
            .confidence
            .filter(|c| c.is_finite())
            .unwrap_or(0.0);
        confidence < self.bypass_confidence
    }

    /// Check the configured lists against what the built-in handlers honour.
    ///
    /// `deploy` always confirms, so it must be listed as critical.
    /// `process-receipt` and `check-status` never confirm, so they may not
    /// appear in either list.
    pub fn validate_builtins(&self) -> Result<(), ActionError> {
        let deploy = ActionKind::Deploy.as_str();
        if !self.is_critical(deploy) {
            return Err(HeraldError::Config(format!(
                "confirmation.critical_actions must include \"{}\"",
                deploy
            ))
            .into());
        }
        for kind in UNGATED_BUILTINS {
            let name = kind.as_str();
            if self.critical.contains(name) || self.gated.contains(name) {
                return Err(HeraldError::Config(format!(
                    "\"{}\" never requires confirmation and cannot be listed in confirmation.critical_actions or confirmation.gated_actions",
                    name
                ))
                .into());
            }
        }
        Ok(())
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::new(&ConfirmationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(confidence: Option<f64>) -> ActionContext {
        ActionContext {
            confidence,
            ..ActionContext::default()
        }
    }

    #[test]
    fn test_deploy_always_needs_confirmation() {
        let policy = ConfirmationPolicy::default();
        assert!(policy.needs_confirmation("deploy", &ctx(None)));
        assert!(policy.needs_confirmation("deploy", &ctx(Some(0.95))));
        assert!(policy.needs_confirmation("deploy", &ctx(Some(1.0))));
    }

    #[test]
    fn test_gated_actions_bypassed_at_high_confidence() {
        let policy = ConfirmationPolicy::default();
        for action in ["create-page", "create-feature", "create-task", "code-task"] {
            assert!(policy.needs_confirmation(action, &ctx(Some(0.5))), "{action}");
            assert!(!policy.needs_confirmation(action, &ctx(Some(0.95))), "{action}");
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = ConfirmationPolicy::default();
        assert!(!policy.needs_confirmation("create-page", &ctx(Some(0.9))));
        assert!(policy.needs_confirmation("create-page", &ctx(Some(0.899))));
    }

    #[test]
    fn test_missing_confidence_counts_as_low() {
        let policy = ConfirmationPolicy::default();
        assert!(policy.needs_confirmation("create-task", &ctx(None)));
    }

    #[test]
    fn test_ungated_actions_never_need_confirmation() {
        let policy = ConfirmationPolicy::default();
        assert!(!policy.needs_confirmation("process-receipt", &ctx(Some(0.1))));
        assert!(!policy.needs_confirmation("check-status", &ctx(None)));
        assert!(!policy.needs_confirmation("unknown-action", &ctx(None)));
    }

    #[test]
    fn test_custom_critical_set() {
        let config = ConfirmationConfig {
            critical_actions: vec!["deploy".to_string(), "code-task".to_string()],
            ..ConfirmationConfig::default()
        };
        let policy = ConfirmationPolicy::new(&config);
        assert!(policy.needs_confirmation("code-task", &ctx(Some(1.0))));
        assert!(!policy.needs_confirmation("create-page", &ctx(Some(1.0))));
    }

    #[test]
    fn test_non_finite_confidence_counts_as_low() {
        let policy = ConfirmationPolicy::default();
        assert!(policy.needs_confirmation("create-page", &ctx(Some(f64::NAN))));
        assert!(policy.needs_confirmation("create-page", &ctx(Some(f64::INFINITY))));
        assert!(policy.needs_confirmation("code-task", &ctx(Some(f64::NEG_INFINITY))));
    }

    #[test]
    fn test_default_lists_are_valid() {
        assert!(ConfirmationPolicy::default().validate_builtins().is_ok());
    }

    #[test]
    fn test_deploy_must_stay_critical() {
        let config = ConfirmationConfig {
            critical_actions: vec![],
            ..ConfirmationConfig::default()
        };
        let err = ConfirmationPolicy::new(&config).validate_builtins().unwrap_err();
        assert_eq!(err.kind(), "core");
        assert!(err.to_string().contains("deploy"));
    }

    #[test]
    fn test_ungated_builtins_rejected_in_lists() {
        let gated = ConfirmationConfig {
            gated_actions: vec!["check-status".to_string()],
            ..ConfirmationConfig::default()
        };
        let err = ConfirmationPolicy::new(&gated).validate_builtins().unwrap_err();
        assert!(err.to_string().contains("check-status"));

        let critical = ConfirmationConfig {
            critical_actions: vec!["deploy".to_string(), "process-receipt".to_string()],
            ..ConfirmationConfig::default()
        };
        let err = ConfirmationPolicy::new(&critical).validate_builtins().unwrap_err();
        assert!(err.to_string().contains("process-receipt"));
    }

    #[test]
    fn test_custom_actions_may_be_listed() {
        let config = ConfirmationConfig {
            gated_actions: vec!["send-invoice".to_string()],
            ..ConfirmationConfig::default()
        };
        let policy = ConfirmationPolicy::new(&config);
        assert!(policy.validate_builtins().is_ok());
        assert!(policy.needs_confirmation("send-invoice", &ctx(Some(0.5))));
    }
}
