//! Quest reward table.
//!
//! Rewards depend only on the quest tier, the reported completion quality and
//! the quest axis. The calculation is pure: no I/O, no failure modes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Axis, EngineError};

const GOLD_BY_TIER: [i64; 5] = [10, 25, 50, 100, 200];
const EXPERIENCE_BY_TIER: [i64; 5] = [5, 15, 30, 60, 120];
const AXIS_BY_TIER: [i64; 5] = [1, 2, 4, 8, 15];

/// Self-reported completion quality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Low,
    #[default]
    Mid,
    High,
}

impl Quality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mid => "mid",
            Self::High => "high",
        }
    }

    /// Reward multiplier expressed in halves (0.5, 1.0, 1.5), so that the
    /// floored result can be computed with integer division.
    const fn multiplier_halves(self) -> i64 {
        match self {
            Self::Low => 1,
            Self::Mid => 2,
            Self::High => 3,
        }
    }
}

impl TryFrom<&str> for Quality {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "low" => Ok(Self::Low),
            "mid" => Ok(Self::Mid),
            "high" => Ok(Self::High),
            other => Err(EngineError::InvalidValue(format!("invalid quality: {other}"))),
        }
    }
}

/// Where a completion was reported from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientSource {
    #[default]
    App,
    Notification,
    Widget,
    Unknown,
}

impl ClientSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Notification => "notification",
            Self::Widget => "widget",
            Self::Unknown => "unknown",
        }
    }
}

impl TryFrom<&str> for ClientSource {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "app" => Ok(Self::App),
            "notification" => Ok(Self::Notification),
            "widget" => Ok(Self::Widget),
            "unknown" => Ok(Self::Unknown),
            other => Err(EngineError::InvalidValue(format!(
                "invalid client source: {other}"
            ))),
        }
    }
}

/// Deltas produced by one quest completion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDeltas {
    pub gold: i64,
    pub diamond: i64,
    pub experience: i64,
    pub axis: BTreeMap<Axis, i64>,
}

/// Compute the reward for a quest of `tier` completed at `quality`.
///
/// `tier` is clamped into `1..=5`.
#[must_use]
pub fn calculate_rewards(tier: i32, quality: Quality, axis: Axis) -> RewardDeltas {
    let index = (tier.clamp(1, 5) - 1) as usize;
    let scale = |base: i64| base * quality.multiplier_halves() / 2;

    RewardDeltas {
        gold: scale(GOLD_BY_TIER[index]),
        diamond: 0,
        experience: scale(EXPERIENCE_BY_TIER[index]),
        axis: BTreeMap::from([(axis, scale(AXIS_BY_TIER[index]))]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_three_mid() {
        let reward = calculate_rewards(3, Quality::Mid, Axis::Focus);

        assert_eq!(reward.gold, 50);
        assert_eq!(reward.experience, 30);
        assert_eq!(reward.diamond, 0);
        assert_eq!(reward.axis, BTreeMap::from([(Axis::Focus, 4)]));
    }

    #[test]
    fn low_quality_floors_halves() {
        let reward = calculate_rewards(2, Quality::Low, Axis::Body);

        // 25 * 0.5 = 12.5, 15 * 0.5 = 7.5, 2 * 0.5 = 1
        assert_eq!(reward.gold, 12);
        assert_eq!(reward.experience, 7);
        assert_eq!(reward.axis[&Axis::Body], 1);
    }

    #[test]
    fn high_quality_tier_five() {
        let reward = calculate_rewards(5, Quality::High, Axis::Social);

        assert_eq!(reward.gold, 300);
        assert_eq!(reward.experience, 180);
        assert_eq!(reward.axis[&Axis::Social], 22);
    }

    #[test]
    fn tier_is_clamped() {
        assert_eq!(
            calculate_rewards(0, Quality::Mid, Axis::Body),
            calculate_rewards(1, Quality::Mid, Axis::Body)
        );
        assert_eq!(
            calculate_rewards(9, Quality::Mid, Axis::Body),
            calculate_rewards(5, Quality::Mid, Axis::Body)
        );
    }

    #[test]
    fn rewards_are_monotonic_in_tier_and_quality() {
        let qualities = [Quality::Low, Quality::Mid, Quality::High];
        for axis in Axis::ALL {
            for tier in 1..=5 {
                for pair in qualities.windows(2) {
                    let lower = calculate_rewards(tier, pair[0], axis);
                    let higher = calculate_rewards(tier, pair[1], axis);
                    assert!(lower.gold <= higher.gold);
                    assert!(lower.experience <= higher.experience);
                    assert!(lower.axis[&axis] <= higher.axis[&axis]);
                }
                if tier < 5 {
                    for quality in qualities {
                        let lower = calculate_rewards(tier, quality, axis);
                        let higher = calculate_rewards(tier + 1, quality, axis);
                        assert!(lower.gold <= higher.gold);
                        assert!(lower.experience <= higher.experience);
                        assert!(lower.axis[&axis] <= higher.axis[&axis]);
                    }
                }
            }
        }
    }
}
