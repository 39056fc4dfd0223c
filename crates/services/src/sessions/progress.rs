/// Aggregated view of lesson progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    /// Progress bar fill in `[0, 100]`. The current question counts once its feedback is shown.
    pub percent: f64,
}

impl SessionProgress {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn new(total: usize, answered: usize, current_index: usize, revealed: bool) -> Self {
        let done = if revealed {
            current_index + 1
        } else {
            current_index
        };
        let percent = if total == 0 {
            0.0
        } else {
            (done.min(total) as f64 / total as f64) * 100.0
        };
        Self {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            percent,
        }
    }
}
