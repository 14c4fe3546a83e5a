//! End-to-end engine tests over synthetic on-disk repositories

mod common;

use common::RepoFixture;
use gitpage::areas::repository::Repository;
use gitpage::artifacts::log::pager::{DEFAULT_PAGE_STRIDE, Pager};
use pretty_assertions::assert_eq;

#[test]
fn open_materializes_history_from_loose_storage() {
    let fixture = RepoFixture::new();
    let oids = fixture.write_linear_history(20);
    fixture.write_index(&[("README.md", &oids[0]), ("src/lib.rs", &oids[0])]);

    let repository = Repository::open(fixture.path(), false).unwrap();

    assert_eq!(repository.commit_count(), 20);
    assert_eq!(repository.page_count(), 2);

    let head = repository.head().unwrap();
    assert_eq!(head.oid(), &oids[0]);
    assert_eq!(head.subject(), "commit 19");
    assert_eq!(head.author().name(), "Ada L");

    assert_eq!(
        repository.tracked_files(false),
        vec!["README.md", "src/lib.rs"]
    );
    assert_eq!(repository.tracked_files(true), vec!["README.md", "src"]);
}

#[test]
fn log_pages_walk_head_to_ancestor_and_pad_with_nulls() {
    let fixture = RepoFixture::new();
    let oids = fixture.write_linear_history(20);

    let repository = Repository::open(fixture.path(), false).unwrap();

    let first = repository.log(0);
    assert_eq!(first.len(), DEFAULT_PAGE_STRIDE);
    for (slot, expected) in first.iter().zip(&oids) {
        assert_eq!(slot.as_ref().unwrap().oid(), expected);
    }

    let second = repository.log(1);
    assert_eq!(second.len(), DEFAULT_PAGE_STRIDE);
    for (slot, expected) in second.iter().take(4).zip(&oids[16..]) {
        assert_eq!(slot.as_ref().unwrap().oid(), expected);
    }
    assert!(second.iter().skip(4).all(|slot| slot.is_none()));

    // out of range pages are a full window of nulls, never a panic
    let beyond = repository.log(42);
    assert_eq!(beyond.len(), DEFAULT_PAGE_STRIDE);
    assert!(beyond.iter().all(|slot| slot.is_none()));
}

#[test]
fn commit_lookup_returns_absence_for_unknown_digests() {
    let fixture = RepoFixture::new();
    let oids = fixture.write_linear_history(3);

    let repository = Repository::open(fixture.path(), false).unwrap();

    let found = repository.commit(oids[1].as_ref()).unwrap();
    assert_eq!(found.subject(), "commit 1");

    assert!(repository.commit(&"0".repeat(40)).is_none());
    assert!(repository.commit("HEAD").is_none());
}

#[test]
fn refresh_without_changes_is_stable_and_last_update_monotonic() {
    let fixture = RepoFixture::new();
    fixture.write_linear_history(8);
    fixture.write_index(&[]);

    let repository = Repository::open(fixture.path(), false).unwrap();
    let before = repository.snapshot();

    repository.refresh().unwrap();
    let after = repository.snapshot();

    assert_eq!(before.commits(), after.commits());
    assert_eq!(before.anchors(), after.anchors());
    assert_eq!(before.refs(), after.refs());
    assert!(after.last_update() >= before.last_update());
}

#[test]
fn refresh_picks_up_newly_written_commits() {
    let fixture = RepoFixture::new();
    let oids = fixture.write_linear_history(2);
    let repository = Repository::open(fixture.path(), false).unwrap();
    assert_eq!(repository.commit_count(), 2);

    let blob = fixture.write_blob(b"more\n");
    let tree = fixture.write_tree("more.txt", &blob);
    let new_head = fixture.write_commit(&tree, &[&oids[0]], 1_700_000_500, "commit 2");
    fixture.write_ref("heads/master", &new_head);

    repository.refresh().unwrap();

    assert_eq!(repository.commit_count(), 3);
    assert_eq!(repository.head().unwrap().oid(), &new_head);
}

#[test]
fn missing_index_loses_only_the_file_listing() {
    let fixture = RepoFixture::new();
    fixture.write_linear_history(4);
    // no index file at all

    let repository = Repository::open(fixture.path(), false).unwrap();

    assert!(repository.tracked_files(false).is_empty());
    assert_eq!(repository.commit_count(), 4);
    assert!(repository.head().is_some());
}

#[test]
fn corrupt_index_signature_keeps_refs_and_history_available() {
    let fixture = RepoFixture::new();
    fixture.write_linear_history(4);
    std::fs::write(fixture.git_dir().join("index"), b"XXXX not an index").unwrap();

    let repository = Repository::open(fixture.path(), false).unwrap();

    assert!(repository.tracked_files(false).is_empty());
    assert_eq!(repository.commit_count(), 4);
    assert!(repository.head_oid().is_some());
}

#[test]
fn unresolvable_head_serves_empty_pages_not_errors() {
    let fixture = RepoFixture::new();
    let blob = fixture.write_blob(b"x");
    let tree = fixture.write_tree("x.txt", &blob);
    fixture.write_commit(&tree, &[], 1_700_000_000, "orphan");
    // no refs at all: the anchor list must be empty

    let repository = Repository::open(fixture.path(), false).unwrap();

    assert_eq!(repository.commit_count(), 1);
    assert_eq!(repository.page_count(), 0);
    assert!(repository.head().is_none());
    assert!(repository.log(0).iter().all(|slot| slot.is_none()));
}

#[test]
fn blobs_are_acknowledged_but_never_materialized() {
    let fixture = RepoFixture::new();
    fixture.write_linear_history(2);
    fixture.write_blob(b"just some content");

    let repository = Repository::open(fixture.path(), false).unwrap();
    let snapshot = repository.snapshot();

    assert_eq!(snapshot.commit_count(), 2);
    assert_eq!(snapshot.blobs().len(), 2); // history blob + stray blob
    assert_eq!(snapshot.trees().len(), 1);
}

#[test]
fn default_branch_falls_back_to_main() {
    let fixture = RepoFixture::new();
    let oids = fixture.write_linear_history(3);
    std::fs::remove_file(fixture.git_dir().join("refs").join("heads").join("master")).unwrap();
    fixture.write_ref("heads/main", &oids[0]);

    let repository = Repository::open(fixture.path(), false).unwrap();
    assert_eq!(repository.head().unwrap().oid(), &oids[0]);
}

#[test]
fn custom_stride_changes_the_page_geometry() {
    let fixture = RepoFixture::new();
    fixture.write_linear_history(10);

    let repository =
        Repository::open_with_pager(fixture.path(), false, Pager::new(4, 100)).unwrap();

    assert_eq!(repository.page_count(), 3); // anchors at commits 0, 4, 8
    let last = repository.log(2);
    assert_eq!(last.len(), 4);
    assert_eq!(last.iter().flatten().count(), 2); // commits 8 and 9
}

#[test]
fn readers_see_complete_snapshots_during_refresh() {
    use std::sync::Arc;

    let fixture = RepoFixture::new();
    fixture.write_linear_history(6);
    let repository = Arc::new(Repository::open(fixture.path(), false).unwrap());

    let reader = {
        let repository = Arc::clone(&repository);
        std::thread::spawn(move || {
            for _ in 0..200 {
                let snapshot = repository.snapshot();
                // a snapshot is complete or not published at all
                assert_eq!(snapshot.commit_count(), 6);
                assert_eq!(snapshot.anchors().len(), 1);
            }
        })
    };

    for _ in 0..10 {
        repository.refresh().unwrap();
    }
    reader.join().unwrap();
}
