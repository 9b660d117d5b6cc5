//! Source trust tiers and quality confidence levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;

/// How reputable a game's source is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustTier {
    /// PBS Kids, CBeebies, Sesame Street, Nick Jr, Disney Junior
    #[serde(rename = "TIER_1")]
    Tier1,
    /// ABCya, Starfall, National Geographic Kids, Fun Brain
    #[serde(rename = "TIER_2")]
    Tier2,
    /// Aggregator portals and unknown sources
    #[serde(rename = "TIER_3")]
    Tier3,
}

impl TrustTier {
    pub const ALL: [TrustTier; 3] = [TrustTier::Tier1, TrustTier::Tier2, TrustTier::Tier3];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrustTier::Tier1 => "TIER_1",
            TrustTier::Tier2 => "TIER_2",
            TrustTier::Tier3 => "TIER_3",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrustTier::Tier1 => "Tier 1 - Trusted",
            TrustTier::Tier2 => "Tier 2 - Educational",
            TrustTier::Tier3 => "Tier 3 - Review Required",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TrustTier::Tier1 => "PBS Kids, CBeebies, Sesame Street, Nick Jr, Disney Junior",
            TrustTier::Tier2 => "ABCya, Starfall, National Geographic Kids, Fun Brain",
            TrustTier::Tier3 => "Poki, CrazyGames, unknown sources",
        }
    }

    /// Whether games from this tier are ever activated. TIER_3 never is,
    /// even after manual approval.
    pub fn auto_activates(&self) -> bool {
        !matches!(self, TrustTier::Tier3)
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrustTier {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TIER_1" => Ok(TrustTier::Tier1),
            "TIER_2" => Ok(TrustTier::Tier2),
            "TIER_3" => Ok(TrustTier::Tier3),
            other => Err(UnknownVariant::new("trust tier", other)),
        }
    }
}

/// Certainty about a game's curated quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityConfidence {
    High,
    Medium,
    Low,
}

impl QualityConfidence {
    pub const ALL: [QualityConfidence; 3] = [
        QualityConfidence::High,
        QualityConfidence::Medium,
        QualityConfidence::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityConfidence::High => "HIGH",
            QualityConfidence::Medium => "MEDIUM",
            QualityConfidence::Low => "LOW",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityConfidence::High => "High",
            QualityConfidence::Medium => "Medium",
            QualityConfidence::Low => "Low",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QualityConfidence::High => "TIER_1 source OR manually verified",
            QualityConfidence::Medium => "TIER_2 source, looks good",
            QualityConfidence::Low => "Uncertain, needs review",
        }
    }

    /// LOW confidence keeps a game inactive regardless of mode
    pub fn auto_activates(&self) -> bool {
        !matches!(self, QualityConfidence::Low)
    }
}

impl fmt::Display for QualityConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityConfidence {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(QualityConfidence::High),
            "MEDIUM" => Ok(QualityConfidence::Medium),
            "LOW" => Ok(QualityConfidence::Low),
            other => Err(UnknownVariant::new("quality confidence", other)),
        }
    }
}
