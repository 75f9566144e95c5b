#![allow(deprecated)]

#[allow(unused_imports)]
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cmd(temp: &TempDir) -> assert_cmd::Command {
    let mut c = assert_cmd::Command::cargo_bin("pocket_notes").unwrap();
    c.env("POCKET_NOTES_DIR", temp.path())
        .env("NO_COLOR", "1")
        .env_remove("POCKET_NOTES_LOG");
    c
}

fn notes_dir(temp: &TempDir) -> PathBuf {
    temp.path().join("notes")
}

fn note_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect()
}

fn list_names(temp: &TempDir) -> Vec<String> {
    let out = cmd(temp)
        .args(["list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&out)
        .lines()
        .skip(2)
        .map(|l| l.split(" | ").next().unwrap().trim_end().to_string())
        .collect()
}

#[test]
fn path_and_help() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            temp.path().to_string_lossy().as_ref(),
        ));

    cmd(&temp)
        .args(["help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pocket Notes"));
}

#[test]
fn help_without_home() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .env_remove("POCKET_NOTES_DIR")
        .env_remove("HOME")
        .args(["help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pocket Notes"));
}

#[test]
fn empty_list_and_names_file() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes yet"));
    assert!(notes_dir(&temp).is_dir());
}

#[test]
fn write_show_and_overwrite() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["write", "Groceries", "milk,", "eggs"])
        .assert()
        .success();
    cmd(&temp)
        .args(["write", "Groceries", "milk, eggs, bread"])
        .assert()
        .success();
    cmd(&temp)
        .args(["show", "Groceries"])
        .assert()
        .success()
        .stdout("milk, eggs, bread");

    assert_eq!(list_names(&temp), vec!["Groceries"]);
    assert_eq!(note_files(&notes_dir(&temp)).len(), 1);
    let names = fs::read_to_string(temp.path().join("data.toml")).unwrap();
    assert!(names.contains("[NotesNames]"));
    assert!(names.contains("Groceries"));
}

#[test]
fn write_reads_stdin() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["write", "Piped"])
        .write_stdin("line one\nline two\n")
        .assert()
        .success();
    cmd(&temp)
        .args(["show", "Piped"])
        .assert()
        .success()
        .stdout("line one\nline two\n");
}

#[test]
fn list_is_sorted_case_insensitively() {
    let temp = TempDir::new().unwrap();
    for name in ["zeta", "Alpha", "beta"] {
        cmd(&temp).args(["write", name, "x"]).assert().success();
    }
    assert_eq!(list_names(&temp), vec!["Alpha", "beta", "zeta"]);
}

#[test]
fn rename_keeps_content_and_guards_collisions() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["write", "Draft", "first"]).assert().success();
    cmd(&temp).args(["write", "Other", "second"]).assert().success();

    cmd(&temp)
        .args(["rename", "Draft", "Final"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed Draft -> Final"));
    cmd(&temp)
        .args(["show", "Final"])
        .assert()
        .success()
        .stdout("first");
    cmd(&temp).args(["show", "Draft"]).assert().failure();

    cmd(&temp)
        .args(["rename", "Final", "Other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert_eq!(list_names(&temp), vec!["Final", "Other"]);

    cmd(&temp)
        .args(["rename", "Final", "Other", "--force"])
        .assert()
        .success();
    assert_eq!(list_names(&temp), vec!["Other"]);
    cmd(&temp)
        .args(["show", "Other"])
        .assert()
        .success()
        .stdout("first");
    assert_eq!(note_files(&notes_dir(&temp)).len(), 1);
}

#[test]
fn rename_missing_note_fails() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["rename", "Nope", "Other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn delete_requires_yes() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["write", "Old", "x"]).assert().success();

    cmd(&temp).args(["delete", "Old"]).assert().failure();
    cmd(&temp).args(["show", "Old"]).assert().success();

    cmd(&temp).args(["delete", "Old", "--yes"]).assert().success();
    cmd(&temp).args(["show", "Old"]).assert().failure();
    assert!(note_files(&notes_dir(&temp)).is_empty());

    cmd(&temp)
        .args(["delete", "Old", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn unnamed_file_gets_placeholder_name() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(notes_dir(&temp)).unwrap();
    fs::write(notes_dir(&temp).join("note_abc123"), "orphan body").unwrap();

    let names = list_names(&temp);
    assert_eq!(names.len(), 1);
    let name = &names[0];
    assert!(name.starts_with("unnamed_note_"), "{name}");
    assert_eq!(name.len(), "unnamed_note_".len() + 32);
    cmd(&temp)
        .args(["show", name])
        .assert()
        .success()
        .stdout("orphan body");
}

#[test]
fn corrupt_names_file_is_tolerated() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["write", "Kept", "body"]).assert().success();
    fs::write(temp.path().join("data.toml"), "[NotesNames\n= broken").unwrap();

    let names = list_names(&temp);
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("unnamed_note_"));
}

#[test]
fn edit_with_noop_editor() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["write", "Keep", "unchanged"]).assert().success();
    cmd(&temp)
        .env("EDITOR", "true")
        .args(["edit", "Keep"])
        .assert()
        .success();
    cmd(&temp)
        .args(["show", "Keep"])
        .assert()
        .success()
        .stdout("unchanged");

    cmd(&temp)
        .env("EDITOR", "true")
        .args(["edit", "Fresh"])
        .assert()
        .success();
    assert_eq!(list_names(&temp), vec!["Fresh", "Keep"]);

    cmd(&temp)
        .env("EDITOR", "false")
        .args(["edit", "Keep"])
        .assert()
        .failure();
}

#[test]
fn unknown_flag_is_rejected() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["delete", "x", "--nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown flag"));
}
