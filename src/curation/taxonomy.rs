//! Catalog vocabulary: categories, pricing, session length, link status

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Learning,
    Puzzle,
    Creative,
    Adventure,
    Music,
    Matching,
    Coloring,
    Counting,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Learning,
        Category::Puzzle,
        Category::Creative,
        Category::Adventure,
        Category::Music,
        Category::Matching,
        Category::Coloring,
        Category::Counting,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Learning => "learning",
            Category::Puzzle => "puzzle",
            Category::Creative => "creative",
            Category::Adventure => "adventure",
            Category::Music => "music",
            Category::Matching => "matching",
            Category::Coloring => "coloring",
            Category::Counting => "counting",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Learning => "Learning",
            Category::Puzzle => "Puzzles",
            Category::Creative => "Creative",
            Category::Adventure => "Adventure",
            Category::Music => "Music",
            Category::Matching => "Matching",
            Category::Coloring => "Coloring",
            Category::Counting => "Counting",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Learning => "📚",
            Category::Puzzle => "🧩",
            Category::Creative => "🎨",
            Category::Adventure => "🗺️",
            Category::Music => "🎵",
            Category::Matching => "🔍",
            Category::Coloring => "🖌️",
            Category::Counting => "🔢",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.key() == s)
            .ok_or_else(|| UnknownVariant::new("category", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingModel {
    #[default]
    Free,
    OneTime,
    Subscription,
    Freemium,
}

impl PricingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModel::Free => "free",
            PricingModel::OneTime => "one-time",
            PricingModel::Subscription => "subscription",
            PricingModel::Freemium => "freemium",
        }
    }

    /// Short label shown on game cards
    pub fn label(&self) -> &'static str {
        match self {
            PricingModel::Free => "Free",
            PricingModel::OneTime => "Paid",
            PricingModel::Subscription => "Sub",
            PricingModel::Freemium => "Free+",
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingModel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PricingModel::Free),
            "one-time" => Ok(PricingModel::OneTime),
            "subscription" => Ok(PricingModel::Subscription),
            "freemium" => Ok(PricingModel::Freemium),
            other => Err(UnknownVariant::new("pricing model", other)),
        }
    }
}

/// Pricing bucket accepted by the listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PricingFilter {
    #[default]
    All,
    /// `pricing_model = free`
    Free,
    /// Anything that is not free
    Paid,
}

impl PricingFilter {
    /// Unknown values fall back to `All`
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("free") => PricingFilter::Free,
            Some("paid") => PricingFilter::Paid,
            _ => PricingFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionLength {
    Quick,
    Medium,
    Long,
}

impl SessionLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionLength::Quick => "quick",
            SessionLength::Medium => "medium",
            SessionLength::Long => "long",
        }
    }
}

impl fmt::Display for SessionLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionLength {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quick" => Ok(SessionLength::Quick),
            "medium" => Ok(SessionLength::Medium),
            "long" => Ok(SessionLength::Long),
            other => Err(UnknownVariant::new("session length", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Ok,
    Broken,
    Redirected,
    #[default]
    Unknown,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Ok => "ok",
            LinkStatus::Broken => "broken",
            LinkStatus::Redirected => "redirected",
            LinkStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(LinkStatus::Ok),
            "broken" => Ok(LinkStatus::Broken),
            "redirected" => Ok(LinkStatus::Redirected),
            "unknown" => Ok(LinkStatus::Unknown),
            other => Err(UnknownVariant::new("link status", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_keys() {
        for category in Category::ALL {
            assert_eq!(category.key().parse::<Category>().unwrap(), category);
            assert_eq!(
                serde_json::to_string(&category).unwrap(),
                format!("\"{}\"", category.key())
            );
        }
        assert!("sports".parse::<Category>().is_err());
    }

    #[test]
    fn test_pricing_model_wire_format() {
        assert_eq!(serde_json::to_string(&PricingModel::OneTime).unwrap(), "\"one-time\"");
        assert_eq!("one-time".parse::<PricingModel>().unwrap(), PricingModel::OneTime);
        assert_eq!(PricingModel::Freemium.label(), "Free+");
    }

    #[test]
    fn test_pricing_filter_is_lenient() {
        assert_eq!(PricingFilter::parse_lenient(Some("free")), PricingFilter::Free);
        assert_eq!(PricingFilter::parse_lenient(Some("paid")), PricingFilter::Paid);
        assert_eq!(PricingFilter::parse_lenient(Some("all")), PricingFilter::All);
        assert_eq!(PricingFilter::parse_lenient(Some("cheap")), PricingFilter::All);
        assert_eq!(PricingFilter::parse_lenient(None), PricingFilter::All);
    }

    #[test]
    fn test_new_links_start_unknown() {
        assert_eq!(LinkStatus::default(), LinkStatus::Unknown);
        assert_eq!("broken".parse::<LinkStatus>().unwrap(), LinkStatus::Broken);
    }
}
