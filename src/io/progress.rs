//! Terminal progress display for mosaic builds

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

use crate::algorithm::builder::BuildObserver;
use crate::algorithm::mosaic::Phase;
use crate::io::configuration::PROGRESS_BAR_WIDTH;

static ROUND_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] {{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static STITCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("[{elapsed_precise}] {prefix} {spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

/// Progress bar that follows the build phases
///
/// Progressive merging is shown as a bar over the threshold schedule;
/// stitching switches to a spinner since its pass count is not known up front.
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Bar sized for `rounds` progressive rounds
    pub fn new(rounds: usize) -> Self {
        Self::with_bar(ProgressBar::new(rounds as u64))
    }

    /// Manager that tracks state without drawing
    pub fn hidden(rounds: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(rounds as u64);
        Self::with_bar(bar)
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(ROUND_STYLE.clone());
        bar.set_prefix("seeding");
        Self { bar }
    }

    /// Completed progressive rounds
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Current status message
    pub fn message(&self) -> String {
        self.bar.message()
    }

    /// Remove the display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl BuildObserver for ProgressManager {
    fn phase_started(&mut self, phase: Phase, live_sections: usize) {
        match phase {
            Phase::Seed => self.bar.set_prefix("seeding"),
            Phase::ProgressiveMerge => {
                self.bar.set_prefix("merging");
                self.bar.set_position(0);
            }
            Phase::Stitch => {
                self.bar.set_style(STITCH_STYLE.clone());
                self.bar.set_prefix("stitching");
            }
            Phase::Done => self.bar.set_prefix("done"),
        }
        self.bar.set_message(format!("{live_sections} sections"));
    }

    fn round_finished(&mut self, round: usize, max_distance: f64, live_sections: usize) {
        self.bar.set_position(round as u64 + 1);
        self.bar
            .set_message(format!("{live_sections} sections at {max_distance:.3}"));
    }

    fn stitch_pass_finished(&mut self, pass: usize, live_sections: usize) {
        self.bar.tick();
        self.bar
            .set_message(format!("pass {pass}: {live_sections} sections"));
    }
}
