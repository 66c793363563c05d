//! VFS path utilities.
//!
//! VFS paths are POSIX-style strings separated by `/`. They are not host
//! paths, so everything here works on `&str` rather than `std::path::Path`:
//! a Windows host still sees `/data/maps/e1m1.map` in the virtual namespace.
//!
//! Mount points and lookup paths must be *canonical*: absolute, no `.` or
//! `..` segments, no empty segments, no trailing slash. [`validate_vfs_path`]
//! enforces that; [`absolutify`] produces it.

use crate::error::{VfsError, VfsResult};

/// Turn `path` into a canonical absolute path.
///
/// Empty and `.` segments are dropped, `..` pops the previous segment.
/// Relative input is treated as relative to `/`. Fails if a `..` would
/// climb above the root.
pub fn absolutify(path: &str) -> VfsResult<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(VfsError::invalid_path(format!(
                        "{path}: leaves root scope"
                    )));
                }
            }
            s => segments.push(s),
        }
    }
    Ok(format!("/{}", segments.join("/")))
}

/// Final component of `path`. A path without `/` is returned unchanged.
pub fn basename(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((_, name)) => name,
        None => path,
    }
}

/// Everything before the final `/`.
///
/// A path without `/` has an empty dirname; a path whose only `/` is the
/// leading one (`/a`) has dirname `/`.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        None => "",
        Some(0) => "/",
        Some(idx) => &path[..idx],
    }
}

/// Join path segments left to right.
///
/// Each segment is absolutified on its own. An absolute segment discards
/// everything accumulated so far; empty segments are skipped.
///
/// ```
/// # use strata_vfs::path::join;
/// assert_eq!(join(["/some/test", "path"]).unwrap(), "/some/test/path");
/// assert_eq!(join(["garbage/path", "/some", "test"]).unwrap(), "/some/test");
/// ```
pub fn join<I, S>(segments: I) -> VfsResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = String::from("/");
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        let absolute = absolutify(segment)?;
        if segment.starts_with('/') {
            result = absolute;
        } else if absolute != "/" {
            result.truncate(result.trim_end_matches('/').len());
            result.push_str(&absolute);
        }
    }
    Ok(result)
}

/// Strip exactly one trailing slash, unless the path is the root.
pub fn normalize_vfs_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Split the final component at its last `.`.
///
/// Returns `(path_without_ext, ext)`; the directory prefix is kept as-is.
/// A leading dot counts too: `/home/.profile` splits into `/home/` and
/// `profile`.
pub fn splitext(path: &str) -> (&str, &str) {
    let name_start = path.rfind('/').map_or(0, |idx| idx + 1);
    match path[name_start..].rfind('.') {
        Some(dot) => {
            let split = name_start + dot;
            (&path[..split], &path[split + 1..])
        }
        None => (path, ""),
    }
}

/// Fail unless `path` is already canonical (`path == absolutify(path)`).
pub fn validate_vfs_path(path: &str) -> VfsResult<()> {
    let canonical = absolutify(path)?;
    if canonical != path {
        return Err(VfsError::invalid_path(format!(
            "{path}: not canonical (expected {canonical})"
        )));
    }
    Ok(())
}

/// Test whether `path` lies under `mount_point` and return the local path.
///
/// Matching respects segment boundaries: `/foo` claims `/foo` and
/// `/foo/bar` but not `/foobar`. The root mount point claims everything.
/// The returned local path has no leading slash (`""` for the mount point
/// itself).
pub fn strip_mount_point<'a>(mount_point: &str, path: &'a str) -> Option<&'a str> {
    if mount_point == "/" {
        return Some(path.strip_prefix('/').unwrap_or(path));
    }
    let rest = path.strip_prefix(mount_point)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutify() {
        assert_eq!(absolutify("/a/./b/../c").unwrap(), "/a/c");
        assert_eq!(absolutify("a.txt").unwrap(), "/a.txt");
        assert_eq!(absolutify("/").unwrap(), "/");
        assert_eq!(absolutify("").unwrap(), "/");
        assert_eq!(absolutify("//a///b/").unwrap(), "/a/b");
        assert_eq!(absolutify("/a/b/..").unwrap(), "/a");
    }

    #[test]
    fn test_absolutify_canonical_is_identity() {
        for p in ["/", "/a", "/a/b", "/some/deep/path/file.txt", "/.hidden/x"] {
            assert_eq!(absolutify(p).unwrap(), p);
        }
    }

    #[test]
    fn test_absolutify_leaves_root() {
        assert!(matches!(absolutify("/.."), Err(VfsError::InvalidPath(_))));
        assert!(matches!(absolutify("a/../.."), Err(VfsError::InvalidPath(_))));
    }

    #[test]
    fn test_basename_dirname() {
        assert_eq!(basename("/a/b/c.txt"), "c.txt");
        assert_eq!(dirname("/a/b/c.txt"), "/a/b");
        assert_eq!(basename("plain"), "plain");
        assert_eq!(dirname("plain"), "");
        assert_eq!(dirname("/top"), "/");
        assert_eq!(basename("/top"), "top");
        assert_eq!(basename("/a/"), "");
    }

    #[test]
    fn test_normalize_vfs_path() {
        assert_eq!(normalize_vfs_path("/a/b/"), "/a/b");
        assert_eq!(normalize_vfs_path("/a/b"), "/a/b");
        assert_eq!(normalize_vfs_path("/"), "/");
        for p in ["/a/b/", "/a", "/", "x/"] {
            let once = normalize_vfs_path(p);
            assert_eq!(normalize_vfs_path(once), once);
        }

        // Exactly one slash per call, so repeated trailing slashes take
        // more than one pass.
        assert_eq!(normalize_vfs_path("/a//"), "/a/");
        assert_eq!(normalize_vfs_path(normalize_vfs_path("/a//")), "/a");
    }

    #[test]
    fn test_join() {
        assert_eq!(join(["/some/test", "path"]).unwrap(), "/some/test/path");
        assert_eq!(join(["garbage/path", "/some", "test"]).unwrap(), "/some/test");
        assert_eq!(join(["/", "a", "", "b"]).unwrap(), "/a/b");
        assert_eq!(join(["a/./b", "c/"]).unwrap(), "/a/b/c");
        assert_eq!(join(Vec::<&str>::new()).unwrap(), "/");
        assert!(join(["/a", ".."]).is_err());
    }

    #[test]
    fn test_splitext() {
        assert_eq!(splitext("/root/path/test.txt"), ("/root/path/test", "txt"));
        assert_eq!(splitext("/root/path/test"), ("/root/path/test", ""));
        assert_eq!(splitext("archive.tar.gz"), ("archive.tar", "gz"));
        assert_eq!(splitext("/dir.d/file"), ("/dir.d/file", ""));
        assert_eq!(splitext("/home/.profile"), ("/home/", "profile"));
        assert_eq!(splitext(".bashrc"), ("", "bashrc"));
        assert_eq!(splitext("test.txt"), ("test", "txt"));
    }

    #[test]
    fn test_validate_vfs_path() {
        assert!(validate_vfs_path("/").is_ok());
        assert!(validate_vfs_path("/a/b").is_ok());
        assert!(validate_vfs_path("a/b").is_err());
        assert!(validate_vfs_path("/a/b/").is_err());
        assert!(validate_vfs_path("/a//b").is_err());
        assert!(validate_vfs_path("/a/./b").is_err());
        assert!(validate_vfs_path("/a/../b").is_err());
        assert!(validate_vfs_path("/..").is_err());
    }

    #[test]
    fn test_strip_mount_point() {
        assert_eq!(strip_mount_point("/", "/a/b"), Some("a/b"));
        assert_eq!(strip_mount_point("/", "/"), Some(""));
        assert_eq!(strip_mount_point("/foo", "/foo"), Some(""));
        assert_eq!(strip_mount_point("/foo", "/foo/bar/baz"), Some("bar/baz"));
        assert_eq!(strip_mount_point("/foo", "/foobar"), None);
        assert_eq!(strip_mount_point("/foo/bar", "/foo"), None);
    }
}
