//! Age bands
//!
//! A game's band is picked from the midpoint of its age range using
//! half-open intervals: [0,2) [2,4) [4,6) [6,8) [8,∞).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "0-2")]
    Baby,
    #[serde(rename = "2-4")]
    Toddler,
    #[serde(rename = "4-6")]
    Preschool,
    #[serde(rename = "6-8")]
    School,
    #[serde(rename = "8-10")]
    Tween,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Baby,
        AgeGroup::Toddler,
        AgeGroup::Preschool,
        AgeGroup::School,
        AgeGroup::Tween,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AgeGroup::Baby => "0-2",
            AgeGroup::Toddler => "2-4",
            AgeGroup::Preschool => "4-6",
            AgeGroup::School => "6-8",
            AgeGroup::Tween => "8-10",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Baby => "Baby",
            AgeGroup::Toddler => "Toddler",
            AgeGroup::Preschool => "Preschool",
            AgeGroup::School => "School",
            AgeGroup::Tween => "Tween",
        }
    }

    pub fn range(&self) -> &'static str {
        match self {
            AgeGroup::Baby => "0-2 years",
            AgeGroup::Toddler => "2-4 years",
            AgeGroup::Preschool => "4-6 years",
            AgeGroup::School => "6-8 years",
            AgeGroup::Tween => "8-10 years",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AgeGroup::Baby => "Sensory, cause-effect, simple touch",
            AgeGroup::Toddler => "Simple interaction, exploration, no rules",
            AgeGroup::Preschool => "Basic rules, letters, numbers, colors",
            AgeGroup::School => "Reading, math, logic, creativity",
            AgeGroup::Tween => "Complex games, strategy, challenges",
        }
    }

    pub fn is_valid_key(key: &str) -> bool {
        key.parse::<AgeGroup>().is_ok()
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AgeGroup {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeGroup::ALL
            .iter()
            .copied()
            .find(|g| g.key() == s)
            .ok_or_else(|| UnknownVariant::new("age group", s))
    }
}

/// Band for an age range, bucketed by midpoint
pub fn compute_age_group(min_age: u32, max_age: u32) -> AgeGroup {
    let midpoint = (min_age as f64 + max_age as f64) / 2.0;

    if midpoint < 2.0 {
        AgeGroup::Baby
    } else if midpoint < 4.0 {
        AgeGroup::Toddler
    } else if midpoint < 6.0 {
        AgeGroup::Preschool
    } else if midpoint < 8.0 {
        AgeGroup::School
    } else {
        AgeGroup::Tween
    }
}

/// "Age 3", "Ages 4+" or "Ages 2-4"
pub fn format_age_range(min_age: u32, max_age: u32) -> String {
    if min_age == max_age {
        format!("Age {}", min_age)
    } else if max_age >= 10 {
        format!("Ages {}+", min_age)
    } else {
        format!("Ages {}-{}", min_age, max_age)
    }
}
