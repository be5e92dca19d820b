//! Executable lookup and home directory helpers.
//!
//! # Resolution rules
//!
//! | Name | Lookup |
//! |------|--------|
//! | contains `/` | tested as given, returned verbatim |
//! | bare word | each `$PATH` entry in order, first match wins |
//!
//! A candidate matches when it exists, is not a directory, and the caller
//! may execute it (`access(X_OK)`). Empty `$PATH` entries are skipped rather
//! than treated as the current directory. No `$PATH` means no match.

use std::path::{Path, PathBuf};

use nix::unistd::{access, AccessFlags};

/// Get the user's home directory from `$HOME`.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Resolve a program name against the current process `$PATH`.
pub fn resolve_executable(name: &str) -> Option<PathBuf> {
    if name.contains('/') {
        let path = Path::new(name);
        return is_executable_file(path).then(|| path.to_path_buf());
    }

    let path_var = std::env::var("PATH").ok()?;
    resolve_in_path(name, &path_var)
}

/// Resolve a bare command name in a colon-separated search list.
pub fn resolve_in_path(name: &str, path_var: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    for dir in path_var.split(':') {
        if dir.is_empty() {
            continue;
        }

        let candidate = Path::new(dir).join(name);
        if is_executable_file(&candidate) {
            tracing::trace!(path = %candidate.display(), "resolved in PATH");
            return Some(candidate);
        }
    }

    None
}

/// Exists, is not a directory, and is executable by this process.
pub fn is_executable_file(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if !meta.is_dir() => access(path, AccessFlags::X_OK).is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn touch(path: &Path, mode: u32) {
        fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn first_match_in_path_order_wins() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        touch(&a.path().join("tool"), 0o755);
        touch(&b.path().join("tool"), 0o755);

        let path_var = format!("{}:{}", a.path().display(), b.path().display());
        assert_eq!(resolve_in_path("tool", &path_var), Some(a.path().join("tool")));
    }

    #[test]
    fn skips_directories_and_non_executables() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let c = tempfile::tempdir().unwrap();
        fs::create_dir(a.path().join("tool")).unwrap();
        touch(&b.path().join("tool"), 0o644);
        touch(&c.path().join("tool"), 0o755);

        let path_var = format!(
            "{}:{}:{}",
            a.path().display(),
            b.path().display(),
            c.path().display()
        );
        assert_eq!(resolve_in_path("tool", &path_var), Some(c.path().join("tool")));
    }

    #[test]
    fn empty_segments_are_skipped() {
        let a = tempfile::tempdir().unwrap();
        touch(&a.path().join("tool"), 0o755);

        let path_var = format!("::{}:", a.path().display());
        assert_eq!(resolve_in_path("tool", &path_var), Some(a.path().join("tool")));
        assert_eq!(resolve_in_path("tool", ""), None);
        assert_eq!(resolve_in_path("", &path_var), None);
    }

    #[test]
    fn slash_names_are_tested_directly() {
        let a = tempfile::tempdir().unwrap();
        let exe = a.path().join("run.sh");
        touch(&exe, 0o755);
        let plain = a.path().join("data.txt");
        touch(&plain, 0o600);

        let name = exe.to_str().unwrap();
        assert_eq!(resolve_executable(name), Some(exe.clone()));
        assert_eq!(resolve_executable(plain.to_str().unwrap()), None);
        assert_eq!(resolve_executable(a.path().to_str().unwrap()), None);
        assert_eq!(resolve_executable("/definitely/not/here"), None);
    }
}
