//! Progress reporting for review runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use prismatic_application::ports::progress::ProgressNotifier;
use prismatic_domain::Phase;
use std::sync::Mutex;

/// Reports progress during a review run with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: &Phase, total_agents: usize) {
        let pb = self.multi.add(ProgressBar::new(total_agents as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(phase.display_name());
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.phase_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_agent_complete(&self, _phase: &Phase, agent: &str, success: bool) {
        let Ok(slot) = self.phase_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), agent)
            } else {
                format!("{} {}", "x".red(), agent)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, phase: &Phase) {
        let finished = self.phase_bar.lock().ok().and_then(|mut slot| slot.take());
        if let Some(pb) = finished {
            pb.finish_with_message(format!("{} complete!", phase.display_name().green()));
        }
    }
}

/// Plain line-based progress on stderr (no bars)
pub struct SimpleProgress;

impl SimpleProgress {
    fn agent_line(agent: &str, success: bool) -> String {
        if success {
            format!("  {} {}", "v".green(), agent)
        } else {
            format!("  {} {} (failed)", "x".red(), agent)
        }
    }
}

impl ProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, phase: &Phase, total_agents: usize) {
        let unit = if total_agents == 1 { "agent" } else { "agents" };
        eprintln!(
            "{} {} ({} {})",
            "->".cyan(),
            phase.display_name().bold(),
            total_agents,
            unit
        );
    }

    fn on_agent_complete(&self, _phase: &Phase, agent: &str, success: bool) {
        eprintln!("{}", Self::agent_line(agent, success));
    }

    fn on_phase_complete(&self, _phase: &Phase) {
        eprintln!();
    }
}
