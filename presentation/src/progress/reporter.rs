//! Progress reporting for council execution

use colored::Colorize;
use council_application::ports::progress::ProgressNotifier;
use council_domain::{CouncilStage, Model};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a council run with progress bars on stderr
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::stderr()),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_short_name(stage: &CouncilStage) -> &'static str {
        match stage {
            CouncilStage::Collect => "Stage 1",
            CouncilStage::Rank => "Stage 2",
            CouncilStage::Synthesize => "Stage 3",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: &CouncilStage, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(stage.display_name().to_string());
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.stage_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_task_complete(&self, _stage: &CouncilStage, model: &Model, success: bool) {
        let Ok(slot) = self.stage_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), model)
            } else {
                format!("{} {}", "x".red(), model)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: &CouncilStage) {
        let Ok(mut slot) = self.stage_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.take() {
            let name = Self::stage_short_name(stage);
            pb.finish_with_message(format!("{} complete!", name.green()));
        }
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: &CouncilStage, total_tasks: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            stage.display_name().bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _stage: &CouncilStage, model: &Model, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), model);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), model);
        }
    }

    fn on_stage_complete(&self, _stage: &CouncilStage) {
        eprintln!();
    }
}
