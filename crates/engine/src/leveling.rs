//! Level curve.
//!
//! The experience needed to leave level `L` is `floor(100 × 1.2^(L-1))`.
//! Experience carries over: a large gain can cross several levels at once.

use serde::{Deserialize, Serialize};

const BASE_EXPERIENCE: f64 = 100.0;
const GROWTH: f64 = 1.2;

/// Experience needed to advance from `level` to `level + 1`.
#[must_use]
pub fn experience_to_next(level: i32) -> i64 {
    let exponent = f64::from(level.max(1) - 1);
    (BASE_EXPERIENCE * GROWTH.powf(exponent)).floor() as i64
}

/// Result of applying an experience gain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOutcome {
    pub level: i32,
    pub experience: i64,
    pub experience_to_next: i64,
    pub leveled_up: bool,
}

/// Apply `delta` experience to a (level, experience) pair.
///
/// Each iteration consumes at least 100 experience, so the loop runs at most
/// `delta / 100 + 1` times.
#[must_use]
pub fn apply_experience(level: i32, experience: i64, delta: i64) -> LevelOutcome {
    let mut level = level.max(1);
    let mut experience = experience.max(0) + delta.max(0);
    let mut threshold = experience_to_next(level);
    let mut leveled_up = false;

    while experience >= threshold {
        experience -= threshold;
        level += 1;
        leveled_up = true;
        threshold = experience_to_next(level);
    }

    LevelOutcome {
        level,
        experience,
        experience_to_next: threshold,
        leveled_up,
    }
}

/// Lifetime experience represented by a (level, experience) pair.
#[must_use]
pub fn total_experience(level: i32, experience: i64) -> i64 {
    (1..level.max(1)).map(experience_to_next).sum::<i64>() + experience
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_follow_curve() {
        assert_eq!(experience_to_next(1), 100);
        assert_eq!(experience_to_next(2), 120);
        assert_eq!(experience_to_next(3), 144);
        assert_eq!(experience_to_next(4), 172);
        assert_eq!(experience_to_next(5), 207);
    }

    #[test]
    fn gain_below_threshold_keeps_level() {
        let outcome = apply_experience(1, 0, 30);

        assert_eq!(
            outcome,
            LevelOutcome {
                level: 1,
                experience: 30,
                experience_to_next: 100,
                leveled_up: false,
            }
        );
    }

    #[test]
    fn exact_threshold_levels_up() {
        let outcome = apply_experience(1, 70, 30);

        assert_eq!(outcome.level, 2);
        assert_eq!(outcome.experience, 0);
        assert_eq!(outcome.experience_to_next, 120);
        assert!(outcome.leveled_up);
    }

    #[test]
    fn large_gain_crosses_several_levels() {
        // 100 + 120 + 144 = 364
        let outcome = apply_experience(1, 0, 400);

        assert_eq!(outcome.level, 4);
        assert_eq!(outcome.experience, 36);
        assert!(outcome.leveled_up);
    }

    #[test]
    fn result_always_settles_below_threshold() {
        for level in 1..25 {
            let threshold = experience_to_next(level);
            for experience in [0, threshold / 2, threshold - 1] {
                for delta in [0, 1, 5, 30, 99, 120, 1_000, 25_000] {
                    let outcome = apply_experience(level, experience, delta);
                    assert!(outcome.level >= level);
                    assert!(outcome.experience >= 0);
                    assert!(outcome.experience < experience_to_next(outcome.level));
                    assert_eq!(outcome.experience_to_next, experience_to_next(outcome.level));
                    assert_eq!(
                        total_experience(outcome.level, outcome.experience),
                        total_experience(level, experience) + delta
                    );
                }
            }
        }
    }
}
