//! `run` writes every unit that generates cleanly and reports the rest.

use std::path::Path;

use bnd_embed::Target;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../tests/fixtures")
        .join(name)
}

#[test]
fn failing_unit_does_not_block_the_others() {
    let out = tempfile::tempdir().expect("tempdir");
    let err = bnd_embed::run(&fixture("mixed.toml"), Some(out.path()), &[])
        .expect_err("ledger.dll must fail");
    let msg = format!("{err:#}");
    assert!(msg.contains("1 of 2 unit(s) failed"), "{msg}");
    assert!(msg.contains("ledger.dll"), "{msg}");
    assert!(msg.contains("System.Decimal"), "{msg}");

    assert!(out.path().join("shapes.h").exists());
    assert!(out.path().join("shapes.c").exists());
    assert!(out.path().join("shapes/shapes/Circle.java").exists());
    assert!(out.path().join("bnd_embed.h").exists());
    assert!(!out.path().join("ledger.h").exists());
    assert!(!out.path().join("ledger_native").exists());
    assert!(!out.path().join("ledger").exists());
}

#[test]
fn target_filter_limits_the_output_tree() {
    let out = tempfile::tempdir().expect("tempdir");
    let dir = bnd_embed::run(&fixture("shapes.toml"), Some(out.path()), &[Target::C])
        .expect("generate C only");
    assert_eq!(dir, out.path());
    assert!(dir.join("shapes.h").exists());
    assert!(dir.join("bnd_embed.h").exists());
    assert!(!dir.join("shapes").exists());
    assert!(!dir.join("bnd").exists());
}

#[test]
fn generate_fails_when_any_unit_fails() {
    let err = bnd_embed::generate(&fixture("mixed.toml")).expect_err("mixed must fail");
    assert!(format!("{err:#}").contains("ledger.dll"));
}
