use std::time::Duration;

use crate::config::BannerTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BannerPhase {
    #[default]
    Hidden,
    /// Displayed but still transparent, waiting for the fade-in.
    Shown,
    Visible,
    FadingOut,
}

/// Auto-dismissing error banner. Every `show` starts a new generation so timer
/// expirations from an earlier run are recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransientBanner {
    phase: BannerPhase,
    generation: u64,
    shows: u64,
}

impl TransientBanner {
    /// Starts the timeline. Returns the generation and the delay until the
    /// next step.
    pub fn show(&mut self, timing: &BannerTiming) -> (u64, Duration) {
        self.generation += 1;
        self.shows += 1;
        self.phase = BannerPhase::Shown;
        (self.generation, timing.fade_in_delay)
    }

    /// Advances one step. Returns the delay until the following step, or
    /// `None` once hidden or when `generation` is stale.
    pub fn advance(&mut self, generation: u64, timing: &BannerTiming) -> Option<Duration> {
        if generation != self.generation {
            return None;
        }
        match self.phase {
            BannerPhase::Shown => {
                self.phase = BannerPhase::Visible;
                Some(timing.hold)
            }
            BannerPhase::Visible => {
                self.phase = BannerPhase::FadingOut;
                Some(timing.fade_out)
            }
            BannerPhase::FadingOut => {
                self.phase = BannerPhase::Hidden;
                None
            }
            BannerPhase::Hidden => None,
        }
    }

    /// Hides immediately and invalidates pending steps.
    pub fn hide(&mut self) {
        if self.phase != BannerPhase::Hidden {
            self.generation += 1;
            self.phase = BannerPhase::Hidden;
        }
    }

    pub fn phase(&self) -> BannerPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// How many times the banner was shown this session.
    pub fn shows(&self) -> u64 {
        self.shows
    }
}
