//! Display badges
//!
//! Four badges are derived from structured fields every time a game is
//! saved. The other four (educational, creative, popular, polished) come from
//! the external text-enhancement collaborator and are stored as given.

use serde::{Deserialize, Serialize};

use super::taxonomy::SessionLength;
use super::tiers::TrustTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Badge {
    Educational,
    Creative,
    Popular,
    Polished,
    TrustedSource,
    OfflineFriendly,
    QuickPlay,
    SiblingFriendly,
}

impl Badge {
    /// Declaration order, which is also display order
    pub const ALL: [Badge; 8] = [
        Badge::Educational,
        Badge::Creative,
        Badge::Popular,
        Badge::Polished,
        Badge::TrustedSource,
        Badge::OfflineFriendly,
        Badge::QuickPlay,
        Badge::SiblingFriendly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Badge::Educational => "Educational",
            Badge::Creative => "Creative",
            Badge::Popular => "Popular",
            Badge::Polished => "Polished",
            Badge::TrustedSource => "Trusted Source",
            Badge::OfflineFriendly => "Works Offline",
            Badge::QuickPlay => "Quick Play",
            Badge::SiblingFriendly => "Sibling Friendly",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Badge::Educational => "📚",
            Badge::Creative => "🎨",
            Badge::Popular => "⭐",
            Badge::Polished => "✨",
            Badge::TrustedSource => "🏛️",
            Badge::OfflineFriendly => "✈️",
            Badge::QuickPlay => "⚡",
            Badge::SiblingFriendly => "👨‍👩‍👧‍👦",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Badge::Educational => "Strong learning value",
            Badge::Creative => "Encourages creativity",
            Badge::Popular => "Well-known, many positive reviews",
            Badge::Polished => "High production quality",
            Badge::TrustedSource => "From PBS, CBeebies, or similar",
            Badge::OfflineFriendly => "Great for travel",
            Badge::QuickPlay => "Perfect for 1-5 min sessions",
            Badge::SiblingFriendly => "Multiple profiles or turn-taking",
        }
    }

    /// Whether this badge is recomputed from game fields
    pub fn is_rule_derived(&self) -> bool {
        matches!(
            self,
            Badge::TrustedSource | Badge::OfflineFriendly | Badge::QuickPlay | Badge::SiblingFriendly
        )
    }
}

/// Badge suggestions supplied by the enhancement collaborator.
/// Trusted as given; `None` means never assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedBadges {
    #[serde(rename = "badgeEducational")]
    pub educational: Option<bool>,
    #[serde(rename = "badgeCreative")]
    pub creative: Option<bool>,
    #[serde(rename = "badgePopular")]
    pub popular: Option<bool>,
    #[serde(rename = "badgePolished")]
    pub polished: Option<bool>,
}

/// Fields the rule-derived badges are computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeInputs {
    pub trust_tier: TrustTier,
    pub works_offline: bool,
    pub session_length: Option<SessionLength>,
    pub supports_multiple_profiles: bool,
}

/// The eight badge flags as persisted on a game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeSet {
    #[serde(rename = "badgeEducational")]
    pub educational: bool,
    #[serde(rename = "badgeCreative")]
    pub creative: bool,
    #[serde(rename = "badgePopular")]
    pub popular: bool,
    #[serde(rename = "badgePolished")]
    pub polished: bool,
    #[serde(rename = "badgeTrustedSource")]
    pub trusted_source: bool,
    #[serde(rename = "badgeOfflineFriendly")]
    pub offline_friendly: bool,
    #[serde(rename = "badgeQuickPlay")]
    pub quick_play: bool,
    #[serde(rename = "badgeSiblingFriendly")]
    pub sibling_friendly: bool,
}

impl BadgeSet {
    pub fn has(&self, badge: Badge) -> bool {
        match badge {
            Badge::Educational => self.educational,
            Badge::Creative => self.creative,
            Badge::Popular => self.popular,
            Badge::Polished => self.polished,
            Badge::TrustedSource => self.trusted_source,
            Badge::OfflineFriendly => self.offline_friendly,
            Badge::QuickPlay => self.quick_play,
            Badge::SiblingFriendly => self.sibling_friendly,
        }
    }

    /// The externally assigned half, for feeding back into `compute_badges`
    pub fn assigned(&self) -> AssignedBadges {
        AssignedBadges {
            educational: Some(self.educational),
            creative: Some(self.creative),
            popular: Some(self.popular),
            polished: Some(self.polished),
        }
    }
}

/// Recompute rule-derived badges and pass assigned ones through
pub fn compute_badges(inputs: &BadgeInputs, assigned: &AssignedBadges) -> BadgeSet {
    BadgeSet {
        educational: assigned.educational.unwrap_or(false),
        creative: assigned.creative.unwrap_or(false),
        popular: assigned.popular.unwrap_or(false),
        polished: assigned.polished.unwrap_or(false),
        trusted_source: inputs.trust_tier == TrustTier::Tier1,
        offline_friendly: inputs.works_offline,
        quick_play: inputs.session_length == Some(SessionLength::Quick),
        sibling_friendly: inputs.supports_multiple_profiles,
    }
}

/// Badges that are set, in declaration order
pub fn get_active_badges(badges: &BadgeSet) -> Vec<Badge> {
    Badge::ALL.iter().copied().filter(|b| badges.has(*b)).collect()
}

pub fn count_badges(badges: &BadgeSet) -> usize {
    get_active_badges(badges).len()
}
