//! `cfs status`: the sync plan without applying it.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use cfs_core::Category;
use cfs_sync::{diff, pipeline, ActionKind, SyncItem, SyncPlan};

use super::{tracker, CategoryFilter, Global};

/// Arguments for `cfs status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub filter: CategoryFilter,

    /// Print a diff for every content conflict.
    #[arg(long)]
    pub diff: bool,

    /// Emit machine-readable JSON.
    #[arg(long, conflicts_with = "diff")]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let store = global.store()?;
        let config = global.config(&store)?;
        let categories = self.filter.categories(&config);
        let client = tracker(&config);

        let plan = pipeline::prepare(&store, &client, &categories, config.github.issue_limit)
            .context("failed to build sync plan")?;

        if self.json {
            return print_json(&plan);
        }
        print_table(&plan);
        if self.diff {
            print_diffs(&plan);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson {
    categories: Vec<Category>,
    summary: SummaryJson,
    duplicates: BTreeMap<Category, Vec<String>>,
    items: Vec<ItemJson>,
}

#[derive(Serialize)]
struct SummaryJson {
    linked: usize,
    unlinked_local: usize,
    unlinked_remote: usize,
    actions: usize,
    conflicts: usize,
}

#[derive(Serialize)]
struct ItemJson {
    action: ActionKind,
    category: Option<Category>,
    document: Option<String>,
    issue: Option<u64>,
    title: String,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "title")]
    title: String,
}

fn print_json(plan: &SyncPlan) -> Result<()> {
    let payload = StatusJson {
        categories: plan.categories.iter().copied().collect(),
        summary: SummaryJson {
            linked: plan.linked_count,
            unlinked_local: plan.unlinked_cfs_count,
            unlinked_remote: plan.unlinked_github_count,
            actions: plan.actionable_count(),
            conflicts: plan.count(ActionKind::ContentConflict),
        },
        duplicates: plan.duplicate_categories.clone(),
        items: plan
            .actionable()
            .map(|item| ItemJson {
                action: item.kind(),
                category: item.category(),
                document: item.document().map(|d| d.to_string()),
                issue: item.issue_number(),
                title: item.title().to_string(),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(plan: &SyncPlan) {
    println!(
        "cfs v{} | {} linked | {} unlinked local | {} unlinked remote | {} actions",
        env!("CARGO_PKG_VERSION"),
        plan.linked_count,
        plan.unlinked_cfs_count,
        plan.unlinked_github_count,
        plan.actionable_count(),
    );
    for (category, problems) in &plan.duplicate_categories {
        println!(
            "{} {category}: new documents will not be created here",
            "duplicates".yellow().bold()
        );
        for p in problems {
            println!("  {p}");
        }
    }

    let rows: Vec<PlanRow> = plan
        .actionable()
        .map(|item| PlanRow {
            action: action_label(item.kind()),
            target: item.describe(),
            title: item.title().to_string(),
        })
        .collect();
    if rows.is_empty() {
        println!("{}", "Everything is in sync.".green());
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("Run 'cfs sync' to apply, or 'cfs sync --dry-run' to preview.");
}

fn print_diffs(plan: &SyncPlan) {
    for item in plan.actionable() {
        if let SyncItem::ContentConflict(conflict) = item {
            println!();
            println!("{}", item.describe().bold());
            print!("{}", diff::render_conflict(conflict));
        }
    }
}

pub(crate) fn action_label(kind: ActionKind) -> String {
    let s = kind.as_str();
    match kind {
        ActionKind::CreateCfs | ActionKind::CreateGithub => s.green().to_string(),
        ActionKind::CloseRemote | ActionKind::CompleteLocal => s.cyan().to_string(),
        ActionKind::ContentConflict => s.red().bold().to_string(),
        ActionKind::NoAction => s.bright_black().to_string(),
    }
}
