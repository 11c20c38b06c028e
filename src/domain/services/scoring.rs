use super::SubmissionFault;
use crate::domain::model::{NegativeScores, ScoringPolicy};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub raw_score: i64,
    pub fraction_incorrect: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreCalculator {
    points_per_correct: i64,
    points_per_incorrect: i64,
    negative_scores: NegativeScores,
}

impl ScoreCalculator {
    pub fn new(points_per_correct: i64, points_per_incorrect: i64, negative_scores: NegativeScores) -> Self {
        Self {
            points_per_correct,
            points_per_incorrect,
            negative_scores,
        }
    }

    pub fn from_policy(policy: &ScoringPolicy) -> Self {
        Self::new(
            policy.points_per_correct,
            policy.points_per_incorrect,
            policy.negative_scores,
        )
    }

    /// Every card not accounted for by an edit counts as correct. The correct
    /// count goes negative when the distance exceeds the submission length.
    pub fn score(&self, submitted_length: usize, edit_distance: usize) -> Result<Score, SubmissionFault> {
        if submitted_length == 0 {
            return Err(SubmissionFault::Empty);
        }

        let incorrect = edit_distance as i64;
        let correct = submitted_length as i64 - incorrect;
        let raw_score = correct * self.points_per_correct - incorrect * self.points_per_incorrect;
        let raw_score = match self.negative_scores {
            NegativeScores::Keep => raw_score,
            NegativeScores::Clamp => raw_score.max(0),
        };

        Ok(Score {
            raw_score,
            fraction_incorrect: round_ratio(edit_distance, submitted_length),
        })
    }
}

/// `numerator / denominator` as an `f64`, rounded to two decimals.
///
/// Rounding looks at the exact binary value of the quotient, so 1/40 (stored
/// just above 0.025) gives 0.03 while 1/8 (exactly 0.125) ties to even 0.12.
fn round_ratio(numerator: usize, denominator: usize) -> f64 {
    let ratio = numerator as f64 / denominator as f64;

    // ratio == mantissa * 2^exponent, exactly
    let bits = ratio.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };

    let scaled = mantissa as u128 * 100;
    let hundredths = if exponent >= 0 {
        scaled << exponent as u32
    } else if exponent <= -120 {
        // scaled < 2^60, far below half a hundredth at this scale
        0
    } else {
        let shift = exponent.unsigned_abs();
        let quotient = scaled >> shift;
        let remainder = scaled & ((1u128 << shift) - 1);
        match remainder.cmp(&(1u128 << (shift - 1))) {
            Ordering::Less => quotient,
            Ordering::Greater => quotient + 1,
            Ordering::Equal if quotient % 2 == 0 => quotient,
            Ordering::Equal => quotient + 1,
        }
    };

    hundredths as f64 / 100.0
}
