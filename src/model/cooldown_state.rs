use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownState {
    pub is_on_cooldown: bool,
    pub remaining: Duration,
    pub formatted: String,
}

impl CooldownState {
    pub fn new(remaining: Duration) -> Self {
        Self {
            is_on_cooldown: !remaining.is_zero(),
            remaining,
            formatted: format_time_remaining(remaining),
        }
    }

    pub fn ready() -> Self {
        Self::new(Duration::ZERO)
    }
}

/// "5h 12m" while at least an hour remains, "42m" below that.
pub fn format_time_remaining(remaining: Duration) -> String {
    let total_minutes = remaining.as_secs() / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
