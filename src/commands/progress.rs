use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::install::{InstallObserver, InstallState};

const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {bytes} downloaded";

/// Terminal rendering of an install: a byte progress bar while downloading
/// and a status line per state.
pub struct ProgressObserver {
    bar: ProgressBar,
    sized: bool,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Progress observer that draws nothing
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden()))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
            bar.set_style(style);
        }
        Self { bar, sized: false }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl InstallObserver for ProgressObserver {
    fn on_state(&mut self, state: InstallState) {
        match state {
            InstallState::Idle => {}
            InstallState::Downloading => self.bar.println(" downloading"),
            InstallState::Extracting => {
                self.bar.finish_and_clear();
                println!("  extracting");
            }
            InstallState::Finalizing => println!("  finalizing"),
            InstallState::Done => {}
            InstallState::Failed => self.bar.abandon(),
        }
    }

    fn on_progress(&mut self, downloaded: u64, total: u64) {
        if total > 0 && !self.sized {
            self.sized = true;
            self.bar.set_length(total);
            if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                self.bar.set_style(style.progress_chars("=>-"));
            }
        }
        self.bar.set_position(downloaded);
    }

    fn on_warning(&mut self, message: &str) {
        self.bar.suspend(|| eprintln!("warning: {}", message));
    }
}
