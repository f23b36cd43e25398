use headliner_core::{RunOutcome, RunReport, ScrapeConfig};
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner with the effective settings
pub fn print_banner(config: &ScrapeConfig) {
    eprintln!("\n{} {} {}", "Headliner".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Scrape a news listing into a spreadsheet and a text report\n".dimmed());
    eprintln!("  {} {}", "Listing:".dimmed(), config.listing_url.bright_white().underline());
    let content = if config.fetch_content { "yes" } else { "no" };
    eprintln!("  {} {}", "Content:".dimmed(), content.bright_white());
    eprintln!();
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print the run summary
pub fn print_report(report: &RunReport) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Run Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("  {} {}", "Final state:".dimmed(), report.state.to_string().bright_white());
    eprintln!("  {} {}", "Candidates:".dimmed(), report.candidates.to_string().bright_white());
    eprintln!("  {} {}", "Articles:".dimmed(), report.records.to_string().bright_white());

    for export in &report.exports {
        let status = if export.success { "written".green().to_string() } else { "failed".red().to_string() };
        eprintln!("  {} {} ({})", format!("{}:", export.exporter).dimmed(), export.path.display(), status);
    }
    eprintln!();

    match report.outcome() {
        RunOutcome::Success => print_success(&format!("Exported {} articles", report.records)),
        RunOutcome::Partial => print_warning("Some exports failed; see the log for details"),
        RunOutcome::Failed => print_error("All exports failed"),
        RunOutcome::Aborted => {
            let reason = report.abort_reason.as_ref().map(ToString::to_string).unwrap_or_default();
            print_error(&format!("Run aborted: {}", reason))
        }
    }
}
