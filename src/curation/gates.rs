//! Safety gates
//!
//! Five independent checks a game must pass before it can ever be published:
//! - no in-game ads (banners, video ads, interstitials)
//! - respectful monetization (no pay-to-win, no punishing non-payers)
//! - no contact with strangers (leaderboards are fine, chat is not)
//! - no manipulative design (dark patterns, artificial timers, gambling)
//! - age appropriate (no violence, scary content or mature themes)
//!
//! A flag that was never reviewed is `None` and counts as failing.

use serde::{Deserialize, Serialize};

/// Raw safety flags as recorded at ingestion or by a reviewer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyFlags {
    pub has_no_in_game_ads: Option<bool>,
    pub has_respectful_monetization: Option<bool>,
    pub has_no_contact_with_strangers: Option<bool>,
    pub has_no_manipulative_design: Option<bool>,
    pub is_age_appropriate: Option<bool>,
}

impl SafetyFlags {
    /// Every flag explicitly set to `true`
    pub fn all_passing() -> Self {
        Self {
            has_no_in_game_ads: Some(true),
            has_respectful_monetization: Some(true),
            has_no_contact_with_strangers: Some(true),
            has_no_manipulative_design: Some(true),
            is_age_appropriate: Some(true),
        }
    }

    pub fn get(&self, gate: Gate) -> Option<bool> {
        match gate {
            Gate::NoAds => self.has_no_in_game_ads,
            Gate::RespectfulMonetization => self.has_respectful_monetization,
            Gate::NoStrangerContact => self.has_no_contact_with_strangers,
            Gate::NoManipulativeDesign => self.has_no_manipulative_design,
            Gate::AgeAppropriate => self.is_age_appropriate,
        }
    }

    pub fn set(&mut self, gate: Gate, value: Option<bool>) {
        match gate {
            Gate::NoAds => self.has_no_in_game_ads = value,
            Gate::RespectfulMonetization => self.has_respectful_monetization = value,
            Gate::NoStrangerContact => self.has_no_contact_with_strangers = value,
            Gate::NoManipulativeDesign => self.has_no_manipulative_design = value,
            Gate::AgeAppropriate => self.is_age_appropriate = value,
        }
    }
}

/// One of the five safety checks, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    #[serde(rename = "hasNoInGameAds")]
    NoAds,
    #[serde(rename = "hasRespectfulMonetization")]
    RespectfulMonetization,
    #[serde(rename = "hasNoContactWithStrangers")]
    NoStrangerContact,
    #[serde(rename = "hasNoManipulativeDesign")]
    NoManipulativeDesign,
    #[serde(rename = "isAgeAppropriate")]
    AgeAppropriate,
}

impl Gate {
    pub const ALL: [Gate; 5] = [
        Gate::NoAds,
        Gate::RespectfulMonetization,
        Gate::NoStrangerContact,
        Gate::NoManipulativeDesign,
        Gate::AgeAppropriate,
    ];

    /// Field name of the flag backing this gate
    pub fn key(&self) -> &'static str {
        match self {
            Gate::NoAds => "hasNoInGameAds",
            Gate::RespectfulMonetization => "hasRespectfulMonetization",
            Gate::NoStrangerContact => "hasNoContactWithStrangers",
            Gate::NoManipulativeDesign => "hasNoManipulativeDesign",
            Gate::AgeAppropriate => "isAgeAppropriate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Gate::NoAds => "No banners, video ads, or interstitials",
            Gate::RespectfulMonetization => {
                "No aggressive prompts, pay-to-win, or punishment for non-payers"
            }
            Gate::NoStrangerContact => "No chat or direct contact (leaderboards OK)",
            Gate::NoManipulativeDesign => {
                "No dark patterns, artificial timers, guilt-tripping, or gambling"
            }
            Gate::AgeAppropriate => "No violence, scary content, or mature themes",
        }
    }
}

/// True only when all five flags are exactly `true`
pub fn compute_gate_criteria(flags: &SafetyFlags) -> bool {
    Gate::ALL.iter().all(|gate| flags.get(*gate) == Some(true))
}

/// Gates that are not satisfied, in fixed display order
pub fn failing_gates(flags: &SafetyFlags) -> Vec<Gate> {
    Gate::ALL
        .iter()
        .copied()
        .filter(|gate| flags.get(*gate) != Some(true))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag_values() -> [Option<bool>; 3] {
        [Some(true), Some(false), None]
    }

    #[test]
    fn test_all_true_passes() {
        assert!(compute_gate_criteria(&SafetyFlags::all_passing()));
        assert!(failing_gates(&SafetyFlags::all_passing()).is_empty());
    }

    #[test]
    fn test_fresh_record_fails_every_gate() {
        let flags = SafetyFlags::default();
        assert!(!compute_gate_criteria(&flags));
        assert_eq!(failing_gates(&flags), Gate::ALL.to_vec());
    }

    #[test]
    fn test_single_false_flag_fails() {
        let mut flags = SafetyFlags::all_passing();
        flags.is_age_appropriate = Some(false);
        assert!(!compute_gate_criteria(&flags));
        assert_eq!(failing_gates(&flags), vec![Gate::AgeAppropriate]);
    }

    #[test]
    fn test_gate_totality_over_all_combinations() {
        for a in flag_values() {
            for b in flag_values() {
                for c in flag_values() {
                    for d in flag_values() {
                        for e in flag_values() {
                            let flags = SafetyFlags {
                                has_no_in_game_ads: a,
                                has_respectful_monetization: b,
                                has_no_contact_with_strangers: c,
                                has_no_manipulative_design: d,
                                is_age_appropriate: e,
                            };
                            let expected = [a, b, c, d, e].iter().all(|v| *v == Some(true));
                            assert_eq!(compute_gate_criteria(&flags), expected);
                            assert_eq!(failing_gates(&flags).is_empty(), expected);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_failing_gates_keep_declared_order() {
        let mut flags = SafetyFlags::default();
        flags.set(Gate::RespectfulMonetization, Some(true));
        flags.set(Gate::NoManipulativeDesign, Some(true));
        assert_eq!(
            failing_gates(&flags),
            vec![Gate::NoAds, Gate::NoStrangerContact, Gate::AgeAppropriate]
        );
    }

    #[test]
    fn test_gate_serializes_as_flag_key() {
        for gate in Gate::ALL {
            let json = serde_json::to_string(&gate).unwrap();
            assert_eq!(json, format!("\"{}\"", gate.key()));
        }
    }
}
