//! CFS core library: domain types, document store, frontmatter, sections.
//!
//! Public API surface:
//! - [`types`]: categories, document ids and references
//! - [`frontmatter`]: `---` delimited key/value preamble codec
//! - [`sections`]: title / working directory / contents / acceptance criteria
//! - [`store`]: filesystem-backed [`Store`]
//! - [`config`]: `config.yaml` loading
//! - [`error`]: [`StoreError`], [`FrontmatterError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod sections;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, FrontmatterError, StoreError};
pub use frontmatter::{Frontmatter, FrontmatterValue, LINK_KEY};
pub use sections::Sections;
pub use store::Store;
pub use types::{
    kebab_case, sync_categories, Category, CompletionMarker, DocumentEntry, DocumentId,
    DocumentRef,
};
