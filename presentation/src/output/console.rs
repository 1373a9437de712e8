//! Console output formatter for query runs

use colored::Colorize;
use lab_application::{QueryOutcome, QueryReport};
use lab_domain::{CallPlan, Signature, ToolDefinition};

/// Formats run results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One query and its outcome
    pub fn format_report(index: usize, report: &QueryReport) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {}\n",
            format!("[{}] Q:", index).cyan().bold(),
            report.query
        ));
        match &report.outcome {
            QueryOutcome::Answered(answer) => {
                output.push_str(&format!("    {} ", "A:".green().bold()));
                output.push_str(Self::indent(&answer.text, "       ").trim_start());
                output.push('\n');
            }
            QueryOutcome::Failed(error) => {
                output.push_str(&format!("    {} {}\n", "Error:".red().bold(), error));
            }
            QueryOutcome::Skipped => {
                output.push_str(&format!("    {}\n", "(skipped: dry run)".dimmed()));
            }
        }
        output
    }

    /// Every report plus a one-line tally
    pub fn format_run(reports: &[QueryReport]) -> String {
        let mut output = Self::header("Agent Run");
        output.push('\n');
        for (i, report) in reports.iter().enumerate() {
            output.push('\n');
            output.push_str(&Self::format_report(i + 1, report));
        }

        let answered = reports
            .iter()
            .filter(|r| matches!(r.outcome, QueryOutcome::Answered(_)))
            .count();
        let failed = reports
            .iter()
            .filter(|r| matches!(r.outcome, QueryOutcome::Failed(_)))
            .count();
        let skipped = reports.len() - answered - failed;

        output.push_str(&format!(
            "\n{} {} answered, {} failed, {} skipped\n",
            "Summary:".cyan().bold(),
            answered.to_string().green(),
            failed.to_string().red(),
            skipped
        ));
        output.push_str(&Self::footer());
        output
    }

    /// Which constructor was negotiated
    pub fn format_construction(signature: &Signature, shape: &CallPlan, attempt: usize) -> String {
        format!(
            "{} {}\n{} {}{} {}\n",
            "Constructor:".cyan().bold(),
            signature,
            "Call shape: ".cyan().bold(),
            signature.entry_point(),
            shape,
            format!("(attempt {})", attempt).dimmed()
        )
    }

    pub fn format_tools(tools: &[ToolDefinition]) -> String {
        let mut output = Self::header("Built-in Tools");
        output.push('\n');
        let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
        for tool in tools {
            output.push_str(&format!(
                "  {:width$}  {}\n",
                tool.name.yellow().bold(),
                tool.description,
                width = width
            ));
        }
        output.push_str(&Self::footer());
        output
    }

    pub fn key_value(key: &str, value: impl std::fmt::Display) -> String {
        format!("  {} {}\n", format!("{}:", key).cyan(), value)
    }

    pub fn success(message: &str) -> String {
        format!("{} {}\n", "✓".green().bold(), message)
    }

    pub fn failure(message: &str) -> String {
        format!("{} {}\n", "✗".red().bold(), message)
    }

    pub fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    pub fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
