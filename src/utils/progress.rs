// src/utils/progress.rs - Env-driven progress reporting configuration

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::env;

/// Progress-bar configuration loaded from the environment, so batch runs in
/// cron or CI can switch the bars off without a CLI flag.
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    pub enabled: bool,
    pub detailed: bool,
}

impl ProgressConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("PROGRESS_BARS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);
        let detailed = env::var("PROGRESS_BARS_DETAILED")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        debug!(
            "Progress config: enabled={}, detailed={}",
            enabled, detailed
        );
        Self { enabled, detailed }
    }

    /// Bars off regardless of the environment, for tests and library callers.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            detailed: false,
        }
    }

    pub fn create_bar(&self, len: u64, message: &str) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message(message.to_string());
        Some(pb)
    }

    pub fn create_spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        pb.set_message(message.to_string());
        Some(pb)
    }
}
