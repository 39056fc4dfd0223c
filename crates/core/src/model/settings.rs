use chrono::Duration;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("max hearts must be > 0")]
    InvalidMaxHearts,

    #[error("staleness window must be positive")]
    InvalidStalenessWindow,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Tunables for a lesson attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    max_hearts: u32,
    staleness_window: Duration,
    xp_per_correct: u32,
}

impl SessionSettings {
    pub const DEFAULT_MAX_HEARTS: u32 = 5;
    pub const DEFAULT_XP_PER_CORRECT: u32 = 10;

    /// Snapshots older than this are discarded instead of resumed.
    #[must_use]
    pub fn default_staleness_window() -> Duration {
        Duration::hours(1)
    }

    /// Build validated settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` when hearts are zero or the window is not positive.
    pub fn new(
        max_hearts: u32,
        staleness_window: Duration,
        xp_per_correct: u32,
    ) -> Result<Self, SettingsError> {
        if max_hearts == 0 {
            return Err(SettingsError::InvalidMaxHearts);
        }
        if staleness_window <= Duration::zero() {
            return Err(SettingsError::InvalidStalenessWindow);
        }
        Ok(Self {
            max_hearts,
            staleness_window,
            xp_per_correct,
        })
    }

    #[must_use]
    pub fn max_hearts(&self) -> u32 {
        self.max_hearts
    }

    #[must_use]
    pub fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    #[must_use]
    pub fn xp_per_correct(&self) -> u32 {
        self.xp_per_correct
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_hearts: Self::DEFAULT_MAX_HEARTS,
            staleness_window: Self::default_staleness_window(),
            xp_per_correct: Self::DEFAULT_XP_PER_CORRECT,
        }
    }
}
