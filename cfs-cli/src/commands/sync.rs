//! `cfs sync`: reconcile documents with GitHub issues.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use cfs_sync::{pipeline, ExecuteOptions, Outcome, SyncReport};

use super::status::action_label;
use super::{tracker, CategoryFilter, Global};
use crate::prompt::TerminalPrompt;

/// Arguments for `cfs sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Show what would change without touching documents or issues.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub filter: CategoryFilter,

    /// Emit the per-item report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "result")]
    result: String,
}

impl SyncArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let store = global.store()?;
        let config = global.config(&store)?;
        let categories = self.filter.categories(&config);
        let client = tracker(&config);
        let options = ExecuteOptions {
            dry_run: self.dry_run,
            label_color: config.github.label_color.clone(),
        };

        let mut prompt = TerminalPrompt::new();
        let (_plan, report) = pipeline::run(
            &store,
            &client,
            &mut prompt,
            &categories,
            config.github.issue_limit,
            &options,
        )
        .context("sync failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize sync report")?
            );
        } else {
            print_report(&report);
        }
        if report.counts.errors > 0 {
            bail!("{} item(s) failed", report.counts.errors);
        }
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    if report.results.is_empty() && !report.aborted {
        println!("{prefix}✓ nothing to do");
        return;
    }

    let rows: Vec<ResultRow> = report
        .results
        .iter()
        .map(|r| ResultRow {
            action: action_label(r.action),
            target: r.target.clone(),
            title: r.title.clone(),
            result: outcome_label(&r.outcome),
        })
        .collect();
    if !rows.is_empty() {
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    let c = &report.counts;
    println!(
        "{prefix}{} created locally, {} created on GitHub, {} closed, {} completed, {} resolved, {} skipped, {} errors",
        c.created_local,
        c.created_remote,
        c.closed_remote,
        c.completed_local,
        c.resolved_conflicts,
        c.skipped,
        c.errors,
    );
    if report.aborted {
        println!("{}", "Aborted; remaining items were not processed.".yellow());
    }
}

fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied => "✓ applied".green().to_string(),
        Outcome::WouldApply => "~ would apply".cyan().to_string(),
        Outcome::Skipped { reason } => format!("· skipped ({reason})").bright_black().to_string(),
        Outcome::Failed { message } => format!("✗ {message}").red().to_string(),
        Outcome::Previewed => "? needs a category".yellow().to_string(),
    }
}
