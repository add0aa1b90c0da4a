use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn md5dir(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_md5dir"))
        .args(args)
        .output()
        .expect("failed to run md5dir")
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn hash_prints_listing_and_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("abc"), "abc").unwrap();

    let listing = md5dir(&["hash", arg(dir.path())]);
    assert_eq!(listing.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(listing.stdout).unwrap(),
        "900150983cd24fb0d6963f7d28e17f72  abc\n"
    );

    let aggregate = md5dir(&["hash", "-u", arg(dir.path())]);
    assert_eq!(aggregate.status.code(), Some(0));
    let line = String::from_utf8(aggregate.stdout).unwrap();
    assert_eq!(line.len(), 33);
    assert!(line.ends_with('\n'));
}

#[test]
fn compare_saved_listings() {
    let dir = tempfile::tempdir().unwrap();
    let tree = dir.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("a"), "1").unwrap();
    fs::write(tree.join("b"), "2").unwrap();
    let before = dir.path().join("before.md5");
    let after = dir.path().join("after.md5");

    let out = md5dir(&["hash", arg(&tree), "-o", arg(&before)]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());

    let same = md5dir(&["compare", arg(&before), arg(&before)]);
    assert_eq!(same.status.code(), Some(0));

    fs::write(tree.join("b"), "changed").unwrap();
    fs::remove_file(tree.join("a")).unwrap();
    fs::write(tree.join("c"), "3").unwrap();
    md5dir(&["hash", arg(&tree), "-o", arg(&after)]);

    let diff = md5dir(&["compare", arg(&before), arg(&after)]);
    assert_eq!(diff.status.code(), Some(1));
    assert_eq!(
        String::from_utf8(diff.stdout).unwrap(),
        "only in A:\n  a\nonly in B:\n  c\ndiffering:\n  b\n"
    );
}

#[test]
fn compare_directories_by_aggregate() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    fs::write(a.path().join("f"), "x").unwrap();
    fs::write(b.path().join("f"), "x").unwrap();

    let same = md5dir(&["compare", "--dirs", "-u", arg(a.path()), arg(b.path())]);
    assert_eq!(same.status.code(), Some(0));
    assert!(String::from_utf8(same.stdout).unwrap().ends_with("identical\n"));

    fs::write(b.path().join("g"), "y").unwrap();
    let different = md5dir(&["compare", "--dirs", arg(a.path()), arg(b.path())]);
    assert_eq!(different.status.code(), Some(1));
}

#[test]
fn errors_exit_with_two() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let out = md5dir(&["hash", arg(&missing)]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8(out.stderr).unwrap().contains("no such directory"));

    let bad = dir.path().join("bad.md5");
    fs::write(&bad, "not a listing\n").unwrap();
    let out = md5dir(&["compare", arg(&bad), arg(&bad)]);
    assert_eq!(out.status.code(), Some(2));
}
