//! `cfs create <category> <title> [--content <text>]`

use anyhow::{Context, Result};
use clap::Args;

use cfs_core::Category;

use super::Global;

/// Create a new document.
#[derive(Args, Debug)]
pub struct CreateArgs {
    pub category: Category,

    pub title: String,

    /// Initial text of the Contents section.
    #[arg(long, short = 'c')]
    pub content: Option<String>,
}

impl CreateArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let store = global.store()?;
        let text = template(&self.title, self.content.as_deref());
        let doc = store
            .create(self.category, &self.title, &text)
            .with_context(|| format!("failed to create {} document", self.category))?;

        println!("✓ Created {doc}");
        println!("  {}", doc.path.display());
        Ok(())
    }
}

fn template(title: &str, content: Option<&str>) -> String {
    let title = title.trim();
    match content.map(str::trim).filter(|c| !c.is_empty()) {
        Some(content) => format!("# {title}\n\n## Contents\n\n{content}\n"),
        None => format!("# {title}\n\n## Contents\n\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_with_and_without_content() {
        assert_eq!(template("A", None), "# A\n\n## Contents\n\n");
        assert_eq!(template(" A ", Some(" x ")), "# A\n\n## Contents\n\nx\n");
        assert_eq!(template("A", Some("  ")), "# A\n\n## Contents\n\n");
    }
}
