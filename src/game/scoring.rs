use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_SCORE: u32 = 100;
pub const DEFAULT_ATTEMPT_PENALTY: u32 = 15;
pub const DEFAULT_HINT_PENALTY: u32 = 5;
pub const DEFAULT_STREAK_BONUS: u32 = 5;
pub const OPTIMAL_COMPLETION_TIME: Duration = Duration::from_secs(5 * 60);

/// `base - attempts * penalty`, zero once `max_attempts` is exceeded.
pub fn attempt_based_score(
    attempts: u32,
    max_attempts: u32,
    base_score: u32,
    penalty_per_attempt: u32,
) -> u32 {
    if attempts > max_attempts {
        return 0;
    }
    base_score.saturating_sub(attempts.saturating_mul(penalty_per_attempt))
}

pub fn streak_bonus(streak_count: u32, bonus_per_streak: u32) -> u32 {
    streak_count.saturating_mul(bonus_per_streak)
}

pub fn hint_penalty(hints_used: u32, penalty_per_hint: u32) -> u32 {
    hints_used.saturating_mul(penalty_per_hint)
}

/// Bonus for finishing under `optimal`, penalty (negative) for finishing over it.
pub fn time_bonus(
    completion_time: Duration,
    optimal: Duration,
    bonus_per_second_under: f64,
    penalty_per_second_over: f64,
) -> f64 {
    let difference = completion_time.as_secs_f64() - optimal.as_secs_f64();
    if difference < 0.0 {
        difference.abs() * bonus_per_second_under
    } else {
        -difference * penalty_per_second_over
    }
}

pub fn final_score(base: u32, streak_bonus: u32, hint_penalty: u32, time_bonus: f64) -> u32 {
    let total = f64::from(base) + f64::from(streak_bonus) - f64::from(hint_penalty) + time_bonus;
    total.round().max(0.0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PerformanceRating {
    Poor,
    Fair,
    Good,
    Great,
    Excellent,
}

impl PerformanceRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => PerformanceRating::Excellent,
            80..=89 => PerformanceRating::Great,
            70..=79 => PerformanceRating::Good,
            60..=69 => PerformanceRating::Fair,
            _ => PerformanceRating::Poor,
        }
    }
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PerformanceRating::Excellent => "Excellent",
            PerformanceRating::Great => "Great",
            PerformanceRating::Good => "Good",
            PerformanceRating::Fair => "Fair",
            PerformanceRating::Poor => "Poor",
        };
        f.write_str(label)
    }
}

/// Mean rounded to one decimal place.
pub fn average_attempts(attempts: &[u32]) -> f64 {
    if attempts.is_empty() {
        return 0.0;
    }
    let sum: u32 = attempts.iter().sum();
    let average = f64::from(sum) / attempts.len() as f64;
    (average * 10.0).round() / 10.0
}

pub fn win_percentage(wins: u32, total_games: u32) -> u32 {
    if total_games == 0 {
        return 0;
    }
    (f64::from(wins) / f64::from(total_games) * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub score: u32,
    pub rating: PerformanceRating,
    pub attempts: u32,
    pub hints_used: u32,
    pub completion_seconds: Option<u64>,
    pub summary: String,
}

pub fn performance_summary(
    score: u32,
    attempts: u32,
    hints_used: u32,
    completion_time: Option<Duration>,
) -> PerformanceSummary {
    let rating = PerformanceRating::from_score(score);
    let completion_seconds = completion_time
        .map(|time| time.as_secs_f64().round() as u64)
        .filter(|seconds| *seconds > 0);

    let mut summary = format!(
        "You scored {} points with a {} performance! You completed the game in {} attempts",
        score, rating, attempts
    );
    if hints_used > 0 {
        summary.push_str(&format!(" using {} hints", hints_used));
    }
    if let Some(seconds) = completion_seconds {
        summary.push_str(&format!(" in {} seconds", seconds));
    }
    summary.push('.');

    PerformanceSummary {
        score,
        rating,
        attempts,
        hints_used,
        completion_seconds,
        summary,
    }
}
