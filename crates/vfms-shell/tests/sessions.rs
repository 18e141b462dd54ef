#![allow(unused_crate_dependencies, reason = "These are tests, not the main crate.")]

use std::{env, fs, process};
use std::path::PathBuf;
use std::sync::Arc;

use vfms::VirtualFileSystem;
use vfms_shell::{Response, Session, SnapshotFile};


fn run(session: &Session, lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| match session.execute(line) {
            Response::Output(output) => Some(output),
            Response::Empty | Response::Exit => None,
        })
        .collect()
}

fn fresh_session() -> Session {
    Session::new(Arc::new(VirtualFileSystem::new()))
}

fn temp_snapshot_path(test_name: &str) -> PathBuf {
    env::temp_dir().join(format!("vfms-{test_name}-{}.json", process::id()))
}

#[test]
fn notes_walkthrough() {
    let session = fresh_session();
    let outputs = run(&session, &[
        "mkdir docs",
        "chdir docs",
        "create notes.txt",
        "open notes.txt w",
        "write_to_file notes.txt hello",
        "truncate notes.txt",
        "close notes.txt",
        "open notes.txt r",
        "read_from_file notes.txt",
        "read_from_file notes.txt 1 3",
    ]);

    assert_eq!(outputs, [
        "Directory created: docs",
        "Successfuly moved to directory: docs",
        "File created: notes.txt",
        "File notes.txt succesfully opened in w mode",
        "Successfuly written to file notes.txt",
        "File notes.txt is open",
        "File notes.txt succesfully closed",
        "File notes.txt succesfully opened in r mode",
        "hello",
        "ell",
    ]);
    assert_eq!(session.filesystem().get_file("notes.txt").unwrap().size(), 5);
}

#[test]
fn full_memory_rejects_write() {
    let session = Session::new(Arc::new(VirtualFileSystem::with_block_map_dimensions(1, 3)));
    let outputs = run(&session, &[
        "create f",
        "open f w",
        "write_to_file f abc",
        "write_to_file f x",
        "close f",
        "read_from_file f",
    ]);

    assert_eq!(outputs[3], "Cannot write to file as memory is full");
    assert_eq!(outputs[5], "abc");
}

#[test]
fn move_and_collisions() {
    let session = fresh_session();
    let outputs = run(&session, &[
        "mkdir a",
        "create f",
        "create f",
        "move f /a",
        "read_from_file f",
        "chdir a",
        "read_from_file f",
        "chdir ..",
        "chdir ..",
    ]);

    assert_eq!(outputs, [
        "Directory created: a",
        "File created: f",
        "f already exists in current directory",
        "f has been moved to /a",
        "No such file: f",
        "Successfuly moved to directory: a",
        "",
        "Successfuly moved to directory: root",
        "Successfuly moved to directory: root",
    ]);
}

#[test]
fn usage_leaves_state_unchanged() {
    let session = fresh_session();
    let outputs = run(&session, &["create", "mkdir a b", "write_to_file f", "ls"]);

    assert_eq!(outputs[0], "Usage: create <name>");
    assert_eq!(outputs[1], "Usage: mkdir <name>");
    assert_eq!(outputs[2], "Usage: write_to_file <name> <data> <offset>");
    assert_eq!(outputs[3].lines().count(), 1);
    assert!(session.filesystem().root().is_empty());
}

#[test]
fn snapshot_file_round_trip() {
    let path = temp_snapshot_path("round-trip");
    let snapshot_file = SnapshotFile::new(path.clone());

    let session = fresh_session();
    run(&session, &[
        "mkdir docs",
        "chdir docs",
        "create notes.txt",
        "open notes.txt w",
        "write_to_file notes.txt hello",
    ]);
    snapshot_file.save(session.filesystem()).unwrap();

    let restored = Session::new(Arc::new(snapshot_file.load().unwrap().unwrap()));
    assert_eq!(restored.prompt(), "docs$ ");
    assert_eq!(
        run(&restored, &["close notes.txt", "read_from_file notes.txt", "show_memory_map"])[..2],
        ["File notes.txt succesfully closed", "hello"],
    );
    assert_eq!(
        restored.filesystem().calc_free_memory(),
        session.filesystem().calc_free_memory(),
    );

    fs::remove_file(&path).unwrap();
}

#[test]
fn missing_or_corrupt_snapshot() {
    let path = temp_snapshot_path("corrupt");
    let snapshot_file = SnapshotFile::new(path.clone());

    assert!(snapshot_file.load().unwrap().is_none());

    fs::write(&path, "{ not json").unwrap();
    assert!(snapshot_file.load().is_err());
    assert!(snapshot_file.load_or_default().root().is_empty());

    fs::remove_file(&path).unwrap();
}

#[test]
fn shared_filesystem_between_sessions() {
    let vfs = Arc::new(VirtualFileSystem::new());
    let first = Session::new(Arc::clone(&vfs));
    let second = Session::new(vfs);

    run(&first, &["mkdir shared", "chdir shared", "create from_first"]);
    let outputs = run(&second, &["chdir /shared", "ls"]);

    assert!(outputs[1].contains("from_first"));
}

#[test]
fn dot_directory_can_be_entered() {
    let session = fresh_session();
    let outputs = run(&session, &["mkdir .", "chdir .", "create inside", "chdir ..", "mkdir .."]);

    assert_eq!(outputs, [
        "Directory created: .",
        "Successfuly moved to directory: .",
        "File created: inside",
        "Successfuly moved to directory: root",
        "Invalid name: \"..\"",
    ]);
    assert_eq!(session.filesystem().current_path(), "/");
}
