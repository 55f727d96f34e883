use std::time::Duration;

/// Which files the upload queue accepts and how many it moves at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Lowercase extension without the dot.
    pub accepted_extension: String,
    /// Files accepted per session.
    pub max_files: usize,
    /// Concurrent transmissions.
    pub parallel_uploads: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            accepted_extension: "csv".to_string(),
            max_files: 13,
            parallel_uploads: 3,
        }
    }
}

/// Timeline of the transient error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerTiming {
    pub fade_in_delay: Duration,
    pub hold: Duration,
    pub fade_out: Duration,
}

impl Default for BannerTiming {
    fn default() -> Self {
        Self {
            fade_in_delay: Duration::from_millis(10),
            hold: Duration::from_secs(1),
            fade_out: Duration::from_millis(500),
        }
    }
}

/// Delay between a job reaching a terminal state and the page reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadDelays {
    pub success: Duration,
    pub failure: Duration,
}

impl Default for ReloadDelays {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(10),
            failure: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerConfig {
    pub upload: UploadPolicy,
    pub banner: BannerTiming,
    pub reload: ReloadDelays,
}
