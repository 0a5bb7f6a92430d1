//! Document subcommands: `list`, `show`, `complete`, `delete`.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use cfs_core::{frontmatter, Category, DocumentEntry, DocumentId, Store};

use super::Global;
use crate::prompt;

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

/// List documents in one or all categories.
#[derive(Args, Debug)]
pub struct ListArgs {
    pub category: Option<Category>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct DocumentJson {
    category: Category,
    id: DocumentId,
    title: String,
    done: bool,
    github_issue: Option<u64>,
    modified: Option<DateTime<Utc>>,
    path: String,
}

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "issue")]
    issue: String,
    #[tabled(rename = "modified")]
    modified: String,
}

impl ListArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let store = global.store()?;
        let categories: Vec<Category> = match self.category {
            Some(c) => vec![c],
            None => Category::all().to_vec(),
        };

        let mut docs = Vec::new();
        for category in categories {
            for entry in store
                .list(category)
                .with_context(|| format!("failed to list {category}"))?
            {
                let link = read_link(&store, &entry);
                let modified = store.modified(&entry.to_ref()).ok();
                docs.push((entry, link, modified));
            }
        }

        if self.json {
            let payload: Vec<DocumentJson> = docs
                .into_iter()
                .map(|(e, link, modified)| DocumentJson {
                    category: e.category,
                    id: e.id,
                    title: e.title,
                    done: e.completion.is_some(),
                    github_issue: link,
                    modified,
                    path: e.path.display().to_string(),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize list JSON")?
            );
            return Ok(());
        }

        if docs.is_empty() {
            println!("No documents.");
            return Ok(());
        }
        let rows: Vec<DocumentRow> = docs
            .into_iter()
            .map(|(e, link, modified)| DocumentRow {
                category: e.category.to_string(),
                id: if e.conforms_to_naming {
                    e.id.to_string()
                } else {
                    "-".to_string()
                },
                state: match e.completion {
                    Some(marker) => marker.as_str().green().to_string(),
                    None => "open".to_string(),
                },
                title: e.title,
                issue: link.map_or_else(|| "-".to_string(), |n| format!("#{n}")),
                modified: modified.map_or_else(
                    || "-".to_string(),
                    |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
                ),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn read_link(store: &Store, entry: &DocumentEntry) -> Option<u64> {
    let text = store.read(&entry.to_ref()).ok()?;
    frontmatter::parse(&text).0.github_issue()
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

/// Print a document.
#[derive(Args, Debug)]
pub struct ShowArgs {
    pub category: Category,
    pub id: DocumentId,
}

impl ShowArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let store = global.store()?;
        let doc = store.find_by_id(self.category, self.id)?;
        let text = store.read(&doc)?;
        print!("{text}");
        if !text.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// complete
// ---------------------------------------------------------------------------

/// Mark a document done.
#[derive(Args, Debug)]
pub struct CompleteArgs {
    pub category: Category,
    pub id: DocumentId,
}

impl CompleteArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let store = global.store()?;
        let doc = store
            .mark_complete(self.category, self.id)
            .with_context(|| format!("failed to complete {}/{}", self.category, self.id))?;
        println!("✓ Completed {doc}");
        println!("  {}", doc.path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

/// Delete a document.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub category: Category,
    pub id: DocumentId,

    /// Do not ask for confirmation.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl DeleteArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let store = global.store()?;
        let doc = store.find_by_id(self.category, self.id)?;
        if !self.yes {
            if !prompt::is_interactive() {
                bail!("refusing to delete {doc} without --yes");
            }
            if !prompt::confirm(&format!("Delete {}?", doc.path.display())) {
                println!("Aborted.");
                return Ok(());
            }
        }
        store.delete(&doc)?;
        println!("✓ Deleted {doc}");
        Ok(())
    }
}
