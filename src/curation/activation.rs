//! Activation policy
//!
//! Decides whether a game is publicly visible. Rules are checked in order
//! and the first one that matches wins:
//!
//! 1. failing safety gates never publish
//! 2. LOW quality confidence never publishes
//! 3. TIER_3 sources never publish
//! 4. bootstrap mode publishes everything that got this far
//! 5. review mode publishes only manually approved games
//! 6. any other mode publishes nothing

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tiers::{QualityConfidence, TrustTier};

/// Process-wide operating mode, read once at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemMode {
    /// Qualifying TIER_1/TIER_2 games publish without review
    #[default]
    Bootstrap,
    /// Every game needs manual approval
    Review,
    /// A configured mode nobody recognises; nothing publishes
    #[serde(other)]
    Unrecognized,
}

impl SystemMode {
    /// Interpret the `SYSTEM_MODE` setting. Unset means bootstrap.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("BOOTSTRAP") => SystemMode::Bootstrap,
            Some("REVIEW") => SystemMode::Review,
            Some(_) => SystemMode::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemMode::Bootstrap => "BOOTSTRAP",
            SystemMode::Review => "REVIEW",
            SystemMode::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields of a game the policy looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationInputs {
    pub passes_gate_criteria: bool,
    pub quality_confidence: QualityConfidence,
    pub trust_tier: TrustTier,
    pub manually_approved: bool,
}

/// Outcome of the policy, with the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationDecision {
    Activate,
    GatesFailed,
    LowConfidence,
    UntrustedSource,
    AwaitingApproval,
    UnrecognizedMode,
}

impl ActivationDecision {
    pub fn is_active(&self) -> bool {
        matches!(self, ActivationDecision::Activate)
    }
}

pub fn evaluate_activation(inputs: &ActivationInputs, mode: SystemMode) -> ActivationDecision {
    if !inputs.passes_gate_criteria {
        return ActivationDecision::GatesFailed;
    }
    if !inputs.quality_confidence.auto_activates() {
        return ActivationDecision::LowConfidence;
    }
    if !inputs.trust_tier.auto_activates() {
        return ActivationDecision::UntrustedSource;
    }

    match mode {
        SystemMode::Bootstrap => ActivationDecision::Activate,
        SystemMode::Review if inputs.manually_approved => ActivationDecision::Activate,
        SystemMode::Review => ActivationDecision::AwaitingApproval,
        SystemMode::Unrecognized => ActivationDecision::UnrecognizedMode,
    }
}

pub fn should_activate(inputs: &ActivationInputs, mode: SystemMode) -> bool {
    evaluate_activation(inputs, mode).is_active()
}
