//! Curation policy
//!
//! Pure functions over a single game's fields. Nothing here touches the
//! store or reads process state; the operating mode is passed in.

pub mod activation;
pub mod age;
pub mod badges;
pub mod gates;
pub mod slug;
pub mod taxonomy;
pub mod tiers;

pub use activation::{
    evaluate_activation, should_activate, ActivationDecision, ActivationInputs, SystemMode,
};
pub use age::{compute_age_group, format_age_range, AgeGroup};
pub use badges::{
    compute_badges, count_badges, get_active_badges, AssignedBadges, Badge, BadgeInputs, BadgeSet,
};
pub use gates::{compute_gate_criteria, failing_gates, Gate, SafetyFlags};
pub use slug::{generate_slug, SlugCandidates};
pub use taxonomy::{Category, LinkStatus, PricingFilter, PricingModel, SessionLength};
pub use tiers::{QualityConfidence, TrustTier};
