//! Integration tests for routing over host directories.
//!
//! Each test builds a `FileSystem` over one or more `TempDir`s and drives it
//! only through VFS paths.

use std::io::{Read, Seek, SeekFrom, Write};

use strata_vfs::{
    DirectoryMount, FileSystem, MemoryMount, MountPriority, OpenMode, VfsError, WriteMode,
};
use tempfile::TempDir;

// ============================================================================
// Shared test setup
// ============================================================================

fn dir_with(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, data) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, data).unwrap();
    }
    dir
}

fn read_string(fs: &FileSystem, path: &str) -> String {
    let mut stream = fs.open(path, OpenMode::Read, WriteMode::Ignore).unwrap();
    let mut out = String::new();
    stream.read_to_string(&mut out).unwrap();
    out
}

// ============================================================================
// Streams
// ============================================================================

#[test]
fn write_then_read_back() {
    let dir = TempDir::new().unwrap();
    let mut fs = FileSystem::new();
    fs.mount("/save", DirectoryMount::new(dir.path()).unwrap(), MountPriority::Normal).unwrap();

    let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let mut stream = fs.open("/save/slot1.dat", OpenMode::Write, WriteMode::Overwrite).unwrap();
    stream.write_all(&payload).unwrap();
    drop(stream);

    let mut stream = fs.open("/save/slot1.dat", OpenMode::Read, WriteMode::Ignore).unwrap();
    let mut back = Vec::new();
    stream.read_to_end(&mut back).unwrap();
    assert_eq!(back, payload);

    // The bytes really landed on the host.
    assert_eq!(std::fs::read(dir.path().join("slot1.dat")).unwrap(), payload);
}

#[test]
fn both_mode_reads_and_seeks() {
    let dir = dir_with(&[("f.txt", "")]);
    let mut fs = FileSystem::new();
    fs.mount("/", DirectoryMount::new(dir.path()).unwrap(), MountPriority::Normal).unwrap();

    let mut stream = fs.open("/f.txt", OpenMode::Both, WriteMode::Overwrite).unwrap();
    stream.write_all(b"hello world").unwrap();
    stream.seek(SeekFrom::Start(6)).unwrap();
    let mut word = String::new();
    stream.read_to_string(&mut word).unwrap();
    assert_eq!(word, "world");
}

#[test]
fn append_mode_extends() {
    let dir = dir_with(&[("log.txt", "one\n")]);
    let mut fs = FileSystem::new();
    fs.mount("/logs", DirectoryMount::new(dir.path()).unwrap(), MountPriority::Normal).unwrap();

    let mut stream = fs.open("/logs/log.txt", OpenMode::Write, WriteMode::Append).unwrap();
    stream.write_all(b"two\n").unwrap();
    drop(stream);

    assert_eq!(read_string(&fs, "/logs/log.txt"), "one\ntwo\n");
}

// ============================================================================
// Read-only policy
// ============================================================================

#[test]
fn read_only_mount_refuses_write_open() {
    let dir = dir_with(&[("pak0.cfg", "bind w +forward")]);
    let mut fs = FileSystem::new();
    fs.mount(
        "/base",
        DirectoryMount::new_read_only(dir.path()).unwrap(),
        MountPriority::Normal,
    )
    .unwrap();

    for mode in [OpenMode::Write, OpenMode::Both] {
        let err = fs.open("/base/pak0.cfg", mode, WriteMode::Overwrite).unwrap_err();
        assert!(matches!(err, VfsError::PermissionDenied(_)), "{err}");
    }
    // Creating a new file is refused just the same.
    let err = fs
        .open("/base/new.cfg", OpenMode::Write, WriteMode::Ignore)
        .unwrap_err();
    assert!(err.is_permission_denied());

    // Content is untouched.
    assert_eq!(read_string(&fs, "/base/pak0.cfg"), "bind w +forward");
}

#[test]
fn read_only_overlay_with_writable_fallback() {
    let base = dir_with(&[("autoexec.cfg", "base")]);
    let user = TempDir::new().unwrap();

    let mut fs = FileSystem::new();
    fs.mount(
        "/cfg",
        DirectoryMount::new_read_only(base.path()).unwrap(),
        MountPriority::Superior,
    )
    .unwrap();
    fs.mount("/cfg", DirectoryMount::new(user.path()).unwrap(), MountPriority::Normal).unwrap();

    // Reads come from the higher tier.
    assert_eq!(read_string(&fs, "/cfg/autoexec.cfg"), "base");

    // Writes are refused there and land on the lower tier instead.
    let mut stream = fs.open("/cfg/autoexec.cfg", OpenMode::Write, WriteMode::Overwrite).unwrap();
    stream.write_all(b"user").unwrap();
    drop(stream);

    assert_eq!(
        std::fs::read_to_string(user.path().join("autoexec.cfg")).unwrap(),
        "user"
    );
    assert_eq!(
        std::fs::read_to_string(base.path().join("autoexec.cfg")).unwrap(),
        "base"
    );
}

// ============================================================================
// Priority fallback
// ============================================================================

#[test]
fn higher_priority_not_found_falls_back() {
    let high = TempDir::new().unwrap();
    let low = dir_with(&[("maps/e1m1.map", "low map")]);

    let mut fs = FileSystem::new();
    fs.mount("/game", DirectoryMount::new(high.path()).unwrap(), MountPriority::Penetrant).unwrap();
    let low_id = fs
        .mount("/game", DirectoryMount::new(low.path()).unwrap(), MountPriority::Inferior)
        .unwrap();

    assert_eq!(read_string(&fs, "/game/maps/e1m1.map"), "low map");
    let stat = fs.stat("/game/maps/e1m1.map").unwrap();
    assert_eq!(stat.mount, Some(low_id));
    assert_eq!(stat.size, 7);
    assert!(stat.is_file());
}

#[test]
fn directory_and_memory_mounts_mix() {
    let dir = dir_with(&[("real.txt", "on disk")]);
    let memory = MemoryMount::new();
    memory.insert_file("virtual.txt", "in memory").unwrap();

    let mut fs = FileSystem::new();
    fs.mount("/", DirectoryMount::new(dir.path()).unwrap(), MountPriority::Normal).unwrap();
    fs.mount("/", memory, MountPriority::Normal).unwrap();

    assert_eq!(read_string(&fs, "/real.txt"), "on disk");
    assert_eq!(read_string(&fs, "/virtual.txt"), "in memory");
    assert!(fs.real_path("/real.txt").is_some());
    assert!(fs.real_path("/virtual.txt").is_none());
}

// ============================================================================
// listdir / stat
// ============================================================================

#[test]
fn listdir_through_mount() {
    let dir = dir_with(&[("b.txt", ""), ("a.txt", ""), ("sub/c.txt", "")]);
    let mut fs = FileSystem::new();
    fs.mount("/data", DirectoryMount::new(dir.path()).unwrap(), MountPriority::Normal).unwrap();

    assert_eq!(fs.listdir("/data").unwrap(), vec!["a.txt", "b.txt", "sub"]);
    assert_eq!(fs.listdir("/data/sub/").unwrap(), vec!["c.txt"]);
    assert!(fs.stat("/data/sub").unwrap().is_dir());
}

#[test]
fn listdir_without_mount_is_not_found() {
    let dir = TempDir::new().unwrap();
    let mut fs = FileSystem::new();
    fs.mount("/data", DirectoryMount::new(dir.path()).unwrap(), MountPriority::Normal).unwrap();

    assert!(fs.listdir("/elsewhere").unwrap_err().is_not_found());
    assert!(fs.listdir("/database").unwrap_err().is_not_found());
}

// ============================================================================
// file_readable / file_writable
// ============================================================================

#[test]
fn writable_checks() {
    let rw = dir_with(&[("existing.txt", "x")]);
    let ro = dir_with(&[("locked.txt", "x")]);

    let mut fs = FileSystem::new();
    fs.mount("/rw", DirectoryMount::new(rw.path()).unwrap(), MountPriority::Normal).unwrap();
    fs.mount("/ro", DirectoryMount::new_read_only(ro.path()).unwrap(), MountPriority::Normal)
        .unwrap();

    // Missing file in a writable directory: could be created.
    assert!(fs.file_writable("/rw/new.txt"));
    assert!(fs.file_writable("/rw/existing.txt"));

    // Existing file on a read-only mount: not writable, parent not consulted.
    assert!(fs.file_readable("/ro/locked.txt"));
    assert!(!fs.file_writable("/ro/locked.txt"));
    assert!(!fs.file_writable("/ro/new.txt"));
}
