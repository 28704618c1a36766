//! Console output formatter for review reports

use colored::Colorize;
use prismatic_application::ReviewReport;
use prismatic_domain::{AgentOutput, Usage};

/// Formats review reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report: summary, each review, the aggregated review
    pub fn format(report: &ReviewReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Code Review"));
        output.push('\n');

        let reviewers: Vec<&str> = report.reviews.iter().map(|r| r.agent.as_str()).collect();
        output.push_str(&format!(
            "{} {}\n",
            "Reviewers:".cyan().bold(),
            reviewers.join(", ")
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Aggregator:".cyan().bold(),
            report.aggregator.agent
        ));

        if let Some(summary) = &report.summary {
            output.push_str(&Self::section_header("Change Summary"));
            output.push_str(&format!("\n{}\n", summary));
        }

        output.push_str(&Self::section_header("Individual Reviews"));
        for review in &report.reviews {
            output.push_str(&Self::agent_block(review));
        }

        output.push_str(&Self::section_header("Aggregated Review"));
        output.push_str(&format!("\n{}\n", report.final_text));

        output.push_str(&format!(
            "\n{} {}\n",
            "Tokens:".dimmed(),
            Self::usage_line(&Self::total_usage(report)).dimmed()
        ));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(report: &ReviewReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the aggregated review only
    pub fn format_final_only(report: &ReviewReport) -> String {
        let mut output = report.final_text.clone();
        if !output.ends_with('\n') {
            output.push('\n');
        }
        output
    }

    fn agent_block(review: &AgentOutput) -> String {
        let turns = if review.turns == 1 { "turn" } else { "turns" };
        format!(
            "\n{} {}\n{}\n",
            format!("── {} ──", review.agent).yellow().bold(),
            format!("({} {})", review.turns, turns).dimmed(),
            review.text
        )
    }

    fn total_usage(report: &ReviewReport) -> Usage {
        report
            .reviews
            .iter()
            .chain(std::iter::once(&report.aggregator))
            .fold(Usage::default(), |acc, output| acc + output.usage)
    }

    fn usage_line(usage: &Usage) -> String {
        format!(
            "{} in / {} out ({} cache write, {} cache read)",
            usage.input_tokens,
            usage.output_tokens,
            usage.cache_creation_input_tokens,
            usage.cache_read_input_tokens
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
