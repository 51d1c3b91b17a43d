//! Discovery: recursively enumerate candidate image files under the scan root.
//!
//! Entries are visited in lexical file-name order within each directory, so
//! two runs over an unchanged tree see the same candidates in the same order
//! (dry-run counts are reproducible). Unreadable entries are logged and
//! skipped; only an invalid root is fatal.

use crate::error::OcrPrepError;
use crate::output::ImageCandidate;
use crate::pipeline::classify::FormatTable;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Lazily yield every file under `root` whose extension is in `table`.
///
/// # Errors
/// `RootNotFound` / `RootNotADirectory` when `root` is unusable. These are
/// checked eagerly, before the first item is produced.
pub fn discover<'a>(
    root: &Path,
    table: &'a FormatTable,
) -> Result<impl Iterator<Item = ImageCandidate> + 'a, OcrPrepError> {
    ensure_root(root)?;
    debug!("Discovering candidates under {}", root.display());

    let walker = WalkDir::new(root).sort_by_file_name().into_iter();
    Ok(walker.filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                return None;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            return None;
        }

        let candidate = ImageCandidate::from_path(path, entry.metadata().ok().map(|m| m.len()))?;
        table.is_supported(&candidate.extension).then_some(candidate)
    }))
}

/// Count every regular file under `root`, images or not.
pub fn count_files(root: &Path) -> Result<usize, OcrPrepError> {
    ensure_root(root)?;
    Ok(WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .count())
}

fn ensure_root(root: &Path) -> Result<(), OcrPrepError> {
    if !root.exists() {
        return Err(OcrPrepError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(OcrPrepError::RootNotADirectory {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"data").unwrap();
    }

    fn names(root: &Path) -> Vec<PathBuf> {
        let table = FormatTable::default();
        discover(root, &table)
            .unwrap()
            .map(|c| c.path.strip_prefix(root).unwrap().to_path_buf())
            .collect()
    }

    #[test]
    fn filters_by_supported_extension_recursively() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.PNG"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("anim.gif"));
        touch(&dir.path().join("nested/deeper/c.heic"));
        touch(&dir.path().join("nested/d.Tiff"));

        let found = names(dir.path());
        assert_eq!(
            found,
            vec![
                PathBuf::from("a.jpg"),
                PathBuf::from("b.PNG"),
                PathBuf::from("nested/d.Tiff"),
                PathBuf::from("nested/deeper/c.heic"),
            ]
        );
    }

    #[test]
    fn order_is_deterministic() {
        let dir = tempdir().unwrap();
        for name in ["z.jpg", "m.bmp", "a.webp", "sub/b.jpeg"] {
            touch(&dir.path().join(name));
        }
        assert_eq!(names(dir.path()), names(dir.path()));
    }

    #[test]
    fn candidates_carry_lowercase_extension_and_size() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("SCAN.JPEG"));
        let table = FormatTable::default();
        let c: Vec<_> = discover(dir.path(), &table).unwrap().collect();
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].extension, "jpeg");
        assert_eq!(c[0].size, Some(4));
    }

    #[test]
    fn directory_with_image_extension_is_ignored() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("album.jpg")).unwrap();
        assert!(names(dir.path()).is_empty());
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let table = FormatTable::default();
        let result = discover(&dir.path().join("missing"), &table);
        assert!(matches!(result, Err(OcrPrepError::RootNotFound { .. })));
    }

    #[test]
    fn count_files_includes_non_images() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.txt"));
        touch(&dir.path().join("sub/c.png"));
        assert_eq!(count_files(dir.path()).unwrap(), 3);
    }
}
