mod common;

use anyhow::Result;
use common::TestTree;
use rstest::rstest;
use std::fs;
use treemark::TrackError;
use treemark::commands::check::{self, CheckOutcome};
use treemark::commands::compare::{self, CompareOutcome};
use treemark::commands::init::{self, InitOptions, InitOutcome};
use treemark::commands::update::{self, UpdateOptions};
use treemark::tracking::TrackedDir;
use treemark::utils::hash::hash_bytes;

#[test]
fn test_init_records_identity_version_and_manifest() -> Result<()> {
    let tree = TestTree::tracked("proj1")?;
    let dir = TrackedDir::new(tree.path());

    assert_eq!(dir.read_identity()?, "proj1");
    assert_eq!(dir.read_version()?, 0);

    let manifest = dir.read_manifest()?;
    assert_eq!(manifest.len(), 2);
    assert_eq!(
        manifest.fingerprint_of("x.txt"),
        Some(hash_bytes(b"hello").as_str())
    );
    assert_eq!(
        manifest.fingerprint_of("sub/y.txt"),
        Some(hash_bytes(b"world").as_str())
    );
    Ok(())
}

#[test]
fn test_mutate_check_update_cycle() -> Result<()> {
    let tree = TestTree::tracked("proj1")?;
    tree.write("data/x.txt", "hello, again")?;

    let outcome = check::execute(&tree.ctx, tree.path())?;
    assert!(matches!(outcome, CheckOutcome::Mismatch(_)));

    update::execute(&tree.ctx, tree.path(), &UpdateOptions::default())?;
    let dir = TrackedDir::new(tree.path());
    assert_eq!(dir.read_version()?, 1);
    assert_eq!(
        dir.read_manifest()?.fingerprint_of("x.txt"),
        Some(hash_bytes(b"hello, again").as_str())
    );

    assert!(check::execute(&tree.ctx, tree.path())?.is_match());
    Ok(())
}

#[test]
fn test_single_bit_change_is_detected() -> Result<()> {
    let tree = TestTree::tracked("proj1")?;
    let path = tree.path().join("data/x.txt");
    let mut bytes = fs::read(&path)?;
    bytes[0] ^= 0b0000_0001;
    fs::write(&path, bytes)?;

    assert!(!check::execute(&tree.ctx, tree.path())?.is_match());
    Ok(())
}

#[test]
fn test_second_init_leaves_state_alone() -> Result<()> {
    let tree = TestTree::tracked("proj1")?;
    let dir = TrackedDir::new(tree.path());
    let manifest = fs::read(dir.manifest_path())?;

    let outcome = init::execute(&tree.ctx, tree.path(), "proj2", &InitOptions { yes: true })?;
    assert_eq!(outcome, InitOutcome::AlreadyInitialized);
    assert_eq!(dir.read_identity()?, "proj1");
    assert_eq!(dir.read_version()?, 0);
    assert_eq!(fs::read(dir.manifest_path())?, manifest);
    Ok(())
}

#[test]
fn test_update_is_monotonic() -> Result<()> {
    let tree = TestTree::tracked("proj1")?;
    let dir = TrackedDir::new(tree.path());

    for n in 1..=5u64 {
        let outcome = update::execute(&tree.ctx, tree.path(), &UpdateOptions::default())?;
        assert!(matches!(outcome, update::UpdateOutcome::Updated { from, to, .. } if to == from + 1));
        assert_eq!(dir.read_version()?, n);
    }
    Ok(())
}

#[test]
fn test_fresh_copies_compare_equal() -> Result<()> {
    let a = TestTree::tracked("proj1")?;
    let b = TestTree::tracked("proj1")?;

    assert!(compare::execute(a.path(), b.path())?.is_match());
    assert!(compare::execute(b.path(), a.path())?.is_match());
    Ok(())
}

#[test]
fn test_copies_stay_equal_when_updated_in_lockstep() -> Result<()> {
    let a = TestTree::tracked("proj1")?;
    let b = TestTree::tracked("proj1")?;

    update::execute(&a.ctx, a.path(), &UpdateOptions::default())?;
    assert!(matches!(
        compare::execute(a.path(), b.path())?,
        CompareOutcome::VersionMismatch { left: 1, right: 0 }
    ));

    update::execute(&b.ctx, b.path(), &UpdateOptions::default())?;
    assert!(compare::execute(a.path(), b.path())?.is_match());
    Ok(())
}

#[test]
fn test_identity_mismatch_reported_before_manifests() -> Result<()> {
    let a = TestTree::tracked("proj1")?;
    let b = TestTree::tracked("proj2")?;
    fs::remove_file(TrackedDir::new(a.path()).manifest_path())?;

    let outcome = compare::execute(a.path(), b.path())?;
    assert!(matches!(outcome, CompareOutcome::IdentityMismatch { .. }));
    Ok(())
}

#[rstest]
#[case("")]
#[case(".")]
#[case("..")]
#[case("a/b")]
#[case("a\\b")]
#[case("line\nbreak")]
#[case("nul\0byte")]
#[case(&"a".repeat(250))]
fn test_unusable_identities_are_rejected(#[case] identity: &str) -> Result<()> {
    let tree = TestTree::sample()?;

    let err = init::execute(&tree.ctx, tree.path(), identity, &InitOptions { yes: true })
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrackError>(),
        Some(TrackError::InvalidIdentity { .. })
    ));
    assert!(tree.path().join("x.txt").exists());
    assert!(!TrackedDir::new(tree.path()).is_tracked());
    Ok(())
}

#[rstest]
#[case("proj1")]
#[case("photos 2024")]
#[case("v1.2-final")]
fn test_usable_identities_round_trip(#[case] identity: &str) -> Result<()> {
    let tree = TestTree::sample()?;
    init::execute(&tree.ctx, tree.path(), identity, &InitOptions { yes: true })?;
    assert_eq!(TrackedDir::new(tree.path()).read_identity()?, identity);
    Ok(())
}
