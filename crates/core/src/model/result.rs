use serde::{Deserialize, Serialize};

//
// ─── LESSON RESULT ─────────────────────────────────────────────────────────────
//

/// Aggregate metrics of a completed lesson attempt, handed to the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonResult {
    score: u32,
    total_questions: u32,
    accuracy: u32,
    stars_earned: u8,
    xp_earned: u32,
}

impl LessonResult {
    /// Derive the result from the final score.
    ///
    /// Accuracy is `score / total * 100` rounded half up; an empty lesson scores 0.
    #[must_use]
    pub fn compute(score: u32, total_questions: u32, xp_per_correct: u32) -> Self {
        let accuracy = accuracy_percent(score, total_questions);
        Self {
            score,
            total_questions,
            accuracy,
            stars_earned: stars_for_accuracy(accuracy),
            xp_earned: score.saturating_mul(xp_per_correct),
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn accuracy(&self) -> u32 {
        self.accuracy
    }

    #[must_use]
    pub fn stars_earned(&self) -> u8 {
        self.stars_earned
    }

    #[must_use]
    pub fn xp_earned(&self) -> u32 {
        self.xp_earned
    }
}

fn accuracy_percent(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score);
    let total = u64::from(total);
    let rounded = (score * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Star tiers: 90+ → 5, 70+ → 4, 50+ → 3, 30+ → 2, otherwise 1.
#[must_use]
pub fn stars_for_accuracy(accuracy: u32) -> u8 {
    match accuracy {
        90.. => 5,
        70..=89 => 4,
        50..=69 => 3,
        30..=49 => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_lesson() {
        let r = LessonResult::compute(5, 5, 10);
        assert_eq!(r.accuracy(), 100);
        assert_eq!(r.stars_earned(), 5);
        assert_eq!(r.xp_earned(), 50);
    }

    #[test]
    fn three_of_five() {
        let r = LessonResult::compute(3, 5, 10);
        assert_eq!(r.accuracy(), 60);
        assert_eq!(r.stars_earned(), 3);
        assert_eq!(r.xp_earned(), 30);
    }

    #[test]
    fn accuracy_rounds_half_up() {
        // 1/8 = 12.5%
        assert_eq!(LessonResult::compute(1, 8, 10).accuracy(), 13);
        // 2/3 = 66.67%
        assert_eq!(LessonResult::compute(2, 3, 10).accuracy(), 67);
        // 1/3 = 33.33%
        assert_eq!(LessonResult::compute(1, 3, 10).accuracy(), 33);
    }

    #[test]
    fn zero_score_still_earns_a_star() {
        let r = LessonResult::compute(0, 4, 10);
        assert_eq!(r.accuracy(), 0);
        assert_eq!(r.stars_earned(), 1);
        assert_eq!(r.xp_earned(), 0);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(stars_for_accuracy(90), 5);
        assert_eq!(stars_for_accuracy(89), 4);
        assert_eq!(stars_for_accuracy(70), 4);
        assert_eq!(stars_for_accuracy(69), 3);
        assert_eq!(stars_for_accuracy(50), 3);
        assert_eq!(stars_for_accuracy(49), 2);
        assert_eq!(stars_for_accuracy(30), 2);
        assert_eq!(stars_for_accuracy(29), 1);
    }
}
