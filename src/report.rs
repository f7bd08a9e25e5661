//! Terminal output for the CLI. Logs go to stderr through tracing; only
//! these user-facing lines go to stdout.

use colored::Colorize;

use crate::pr::PullRequest;
use crate::review::{Review, Verdict};

/// Printed by `review_pr` when no PR number was given.
pub const USAGE_HINT: &str = "Please provide a valid PR number.";

pub fn print_usage_hint() {
    println!("{USAGE_HINT}");
}

/// Per-PR completion line.
pub fn print_submitted(number: u64, review: &Review) {
    println!(
        "Review submitted for PR #{} ({})",
        number,
        colorize_verdict(review.verdict)
    );
}

/// Show a review that was not published (`--dry-run`).
pub fn print_dry_run(pr: &PullRequest, review: &Review, currency: &str) {
    println!();
    println!("{}", pr_header(pr));
    println!();
    println!("═══ Verdict: {} ═══", colorize_verdict(review.verdict));
    println!("{}", cost_line(review, currency));
    println!();
    println!("{}", review.body);
    println!();
}

fn pr_header(pr: &PullRequest) -> String {
    format!(
        "PR #{}: \"{}\"\nAuthor: {} | Files changed: {} | +{} -{} | Comments: {}",
        pr.number,
        pr.title,
        pr.author,
        pr.files.len(),
        pr.additions(),
        pr.deletions(),
        pr.comments.len()
    )
}

fn cost_line(review: &Review, currency: &str) -> String {
    format!(
        "Tokens: {} | Estimated cost: {} {}",
        review.total_tokens, review.cost, currency
    )
}

fn colorize_verdict(verdict: Verdict) -> colored::ColoredString {
    match verdict {
        Verdict::Approve => verdict.as_str().green().bold(),
        Verdict::RequestChanges => verdict.as_str().red().bold(),
        Verdict::Comment => verdict.as_str().yellow().bold(),
    }
}
