//! Store error-message, naming-convention, and lifecycle integration tests.

use assert_fs::prelude::*;
use cfs_core::{
    frontmatter, Category, DocumentId, Store, StoreError, LINK_KEY,
};
use predicates::prelude::predicate;

fn init_store(dir: &assert_fs::TempDir) -> Store {
    Store::init(dir.path()).expect("init")
}

// ---------------------------------------------------------------------------
// 1. Error messages
// ---------------------------------------------------------------------------

#[test]
fn not_initialised_message_points_at_init() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = Store::open(dir.path()).unwrap_err();
    assert!(matches!(err, StoreError::NotInitialized { .. }), "got: {err}");
    assert!(err.to_string().contains("cfs init"));
}

#[test]
fn not_found_message_names_category_and_id() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let store = init_store(&dir);
    let err = store
        .find_by_id(Category::Features, DocumentId(5))
        .unwrap_err();
    assert_eq!(err.to_string(), "document features/5 not found");
}

#[test]
fn invalid_category_is_distinguishable() {
    let err = "widgets".parse::<Category>().unwrap_err();
    assert!(matches!(err, StoreError::InvalidCategory { ref name } if name == "widgets"));
}

// ---------------------------------------------------------------------------
// 2. Layout on disk
// ---------------------------------------------------------------------------

#[test]
fn create_writes_kebab_named_file() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let store = init_store(&dir);
    store
        .create(Category::Features, "Test Feature", "# Test Feature\n")
        .expect("create");

    dir.child(".cfs/features/1-test-feature.md")
        .assert(predicate::path::exists());
    dir.child(".cfs/features/1-test-feature.md")
        .assert(predicate::str::contains("# Test Feature"));
}

#[test]
fn completed_documents_keep_their_id() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let store = init_store(&dir);
    store.create(Category::Fixes, "One", "").unwrap();
    store.create(Category::Fixes, "Two", "").unwrap();
    store.mark_complete(Category::Fixes, DocumentId(2)).unwrap();

    dir.child(".cfs/fixes/2-DONE-two.md")
        .assert(predicate::path::exists());
    assert_eq!(store.next_id(Category::Fixes).unwrap(), DocumentId(3));

    let done = store.get(Category::Fixes, DocumentId(2)).unwrap().unwrap();
    assert!(done.is_done());
    assert_eq!(done.slug, "two");
}

#[test]
fn nonconforming_files_are_listed_with_id_zero() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let store = init_store(&dir);
    dir.child(".cfs/plans/roadmap.md").write_str("# Roadmap\n").unwrap();

    let list = store.list(Category::Plans).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, DocumentId::UNASSIGNED);
    assert!(!list[0].conforms_to_naming);
    assert_eq!(store.next_id(Category::Plans).unwrap(), DocumentId(1));
    assert!(store.get(Category::Plans, DocumentId(0)).unwrap().is_none());
}

// ---------------------------------------------------------------------------
// 3. Link stamping through the store
// ---------------------------------------------------------------------------

#[test]
fn link_stamp_survives_rewrite() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let store = init_store(&dir);
    let doc = store
        .create(Category::Issues, "Crash", "# Crash\n\n## Contents\n\nBoom.\n")
        .unwrap();

    let text = store.read(&doc).unwrap();
    let stamped = frontmatter::set_key(&text, LINK_KEY, 12i64);
    store.write(&doc, &stamped).unwrap();

    dir.child(".cfs/issues/1-crash.md")
        .assert(predicate::str::starts_with("---\ngithub_issue: 12\n---\n# Crash"));
    let (fm, _) = frontmatter::parse(&store.read(&doc).unwrap());
    assert_eq!(fm.github_issue(), Some(12));
}
