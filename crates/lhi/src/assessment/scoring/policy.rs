use serde::{Deserialize, Serialize};

/// Health band of a single dimension, derived from its z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Low,
    Moderate,
    High,
}

impl Level {
    pub fn from_z_score(z_score: f64) -> Self {
        if z_score < -0.5 {
            Level::Low
        } else if z_score > 0.5 {
            Level::High
        } else {
            Level::Moderate
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Moderate => "Moderate",
            Level::High => "High",
        }
    }
}

/// Ordered bucket of the aggregate health index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Fragile,
    #[serde(rename = "Below Average")]
    BelowAverage,
    Average,
    Healthy,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Fragile,
        Category::BelowAverage,
        Category::Average,
        Category::Healthy,
    ];

    pub fn from_total_score(total_score: u8) -> Self {
        match total_score {
            0..=30 => Category::Fragile,
            31..=50 => Category::BelowAverage,
            51..=70 => Category::Average,
            _ => Category::Healthy,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Fragile => "Fragile",
            Category::BelowAverage => "Below Average",
            Category::Average => "Average",
            Category::Healthy => "Healthy",
        }
    }
}

/// Quadrant of the anxiety x avoidance attachment model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentStyle {
    #[serde(rename = "Secure (安全型)")]
    Secure,
    #[serde(rename = "Dismissive-Avoidant (疏离-回避型)")]
    DismissiveAvoidant,
    #[serde(rename = "Anxious-Preoccupied (焦虑-迷恋型)")]
    AnxiousPreoccupied,
    #[serde(rename = "Fearful-Avoidant (恐惧-回避型)")]
    FearfulAvoidant,
}

impl AttachmentStyle {
    pub const ALL: [AttachmentStyle; 4] = [
        AttachmentStyle::Secure,
        AttachmentStyle::DismissiveAvoidant,
        AttachmentStyle::AnxiousPreoccupied,
        AttachmentStyle::FearfulAvoidant,
    ];

    /// Both inputs are health-signed: positive means low anxiety / low avoidance.
    /// A zero z-score counts as the unhealthy side of its axis.
    pub fn classify(anxiety_z: f64, avoidance_z: f64) -> Self {
        match (anxiety_z > 0.0, avoidance_z > 0.0) {
            (true, true) => AttachmentStyle::Secure,
            (true, false) => AttachmentStyle::DismissiveAvoidant,
            (false, true) => AttachmentStyle::AnxiousPreoccupied,
            (false, false) => AttachmentStyle::FearfulAvoidant,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttachmentStyle::Secure => "Secure (安全型)",
            AttachmentStyle::DismissiveAvoidant => "Dismissive-Avoidant (疏离-回避型)",
            AttachmentStyle::AnxiousPreoccupied => "Anxious-Preoccupied (焦虑-迷恋型)",
            AttachmentStyle::FearfulAvoidant => "Fearful-Avoidant (恐惧-回避型)",
        }
    }
}
