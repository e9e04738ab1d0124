//! In-memory record of destinations claimed during one run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no free name for {} after {attempts} attempts", path.display())]
pub struct CollisionExhausted {
    pub path: PathBuf,
    pub attempts: usize,
}

/// Destination paths written so far in this run.
///
/// Keys are lower-cased so names differing only by case collide, as they
/// would on case-insensitive filesystems. Files left on disk by earlier runs
/// are not consulted.
#[derive(Debug)]
pub struct WriteSet {
    claimed: HashSet<String>,
    retry_limit: usize,
}

impl WriteSet {
    pub fn new(retry_limit: usize) -> Self {
        Self { claimed: HashSet::new(), retry_limit }
    }

    /// Reserve `dir/file_name`, or the first free `stem_N.ext` variant.
    pub fn claim(&mut self, dir: &Path, file_name: &str) -> Result<PathBuf, CollisionExhausted> {
        let candidate = dir.join(file_name);
        if self.claimed.insert(key_for(&candidate)) {
            return Ok(candidate);
        }

        let (stem, ext) = split_extension(file_name);
        for n in 1..=self.retry_limit {
            let renamed = match ext {
                Some(ext) => format!("{stem}_{n}.{ext}"),
                None => format!("{stem}_{n}"),
            };
            let candidate = dir.join(renamed);
            if self.claimed.insert(key_for(&candidate)) {
                tracing::debug!("Renamed colliding file to {}", candidate.display());
                return Ok(candidate);
            }
        }

        Err(CollisionExhausted { path: dir.join(file_name), attempts: self.retry_limit })
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

fn key_for(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_claim_keeps_the_name() {
        let mut set = WriteSet::new(1000);
        let path = set.claim(Path::new("/out/PDF"), "a.pdf").expect("claim");
        assert_eq!(path, PathBuf::from("/out/PDF/a.pdf"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn collisions_get_incrementing_suffixes() {
        let mut set = WriteSet::new(1000);
        let dir = Path::new("/out/PDF");
        set.claim(dir, "[2020] Doe - X.pdf").expect("first");
        let second = set.claim(dir, "[2020] Doe - X.pdf").expect("second");
        let third = set.claim(dir, "[2020] Doe - X.pdf").expect("third");
        assert_eq!(second, dir.join("[2020] Doe - X_1.pdf"));
        assert_eq!(third, dir.join("[2020] Doe - X_2.pdf"));
    }

    #[test]
    fn collision_check_ignores_case() {
        let mut set = WriteSet::new(1000);
        let dir = Path::new("/out/Other");
        set.claim(dir, "Notes").expect("first");
        assert_eq!(set.claim(dir, "NOTES").expect("second"), dir.join("NOTES_1"));
    }

    #[test]
    fn same_name_in_other_directory_is_free() {
        let mut set = WriteSet::new(1000);
        set.claim(Path::new("/out/A/PDF"), "x.pdf").expect("a");
        let b = set.claim(Path::new("/out/B/PDF"), "x.pdf").expect("b");
        assert_eq!(b, PathBuf::from("/out/B/PDF/x.pdf"));
    }

    #[test]
    fn retries_are_capped() {
        let mut set = WriteSet::new(2);
        let dir = Path::new("/out");
        for _ in 0..3 {
            set.claim(dir, "x.pdf").expect("within limit");
        }
        let err = set.claim(dir, "x.pdf").expect_err("limit reached");
        assert_eq!(err.attempts, 2);
        assert_eq!(err.path, dir.join("x.pdf"));
    }
}
