//! Destination naming: where a converted file goes.
//!
//! The output sits next to its source with the target extension
//! (`photo.jpg` → `photo.png`). If that name is taken, a disambiguator is
//! inserted before the extension: `photo (1).png`, `photo (2).png`, … The
//! first free index always wins, and the search is bounded so it terminates
//! even in a directory stuffed with pre-existing names.

use crate::config::OutputFormat;
use crate::error::FileError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Highest disambiguator tried before giving up with a `WriteError`.
pub const MAX_DISAMBIGUATOR: u32 = 9_999;

/// The undisambiguated destination: same directory and stem, new extension.
pub fn base_destination(source: &Path, format: OutputFormat) -> PathBuf {
    source.with_extension(format.extension())
}

/// The `index`-th alternative for `base`; index 0 is `base` itself.
pub fn disambiguated(base: &Path, index: u32) -> PathBuf {
    if index == 0 {
        return base.to_path_buf();
    }
    let mut name = base.file_stem().map(OsString::from).unwrap_or_default();
    name.push(format!(" ({index})"));
    if let Some(ext) = base.extension() {
        name.push(".");
        name.push(ext);
    }
    base.with_file_name(name)
}

/// First destination for `source` that does not exist yet.
///
/// The source path itself is never returned, even if it has the target
/// extension, because it exists. A name counts as taken if anything sits at
/// it, dangling symlinks included.
pub fn free_destination(source: &Path, format: OutputFormat) -> Result<PathBuf, FileError> {
    free_destination_with(source, format, |p| p.symlink_metadata().is_ok())
}

/// [`free_destination`] with an injectable existence check.
pub fn free_destination_with(
    source: &Path,
    format: OutputFormat,
    mut exists: impl FnMut(&Path) -> bool,
) -> Result<PathBuf, FileError> {
    let base = base_destination(source, format);
    (0..=MAX_DISAMBIGUATOR)
        .map(|i| disambiguated(&base, i))
        .find(|candidate| candidate != source && !exists(candidate))
        .ok_or_else(|| FileError::Write {
            path: source.to_path_buf(),
            detail: format!(
                "no free destination name: '{}' through '{}' all exist",
                base.display(),
                disambiguated(&base, MAX_DISAMBIGUATOR).display()
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashSet;

    #[test]
    fn base_swaps_extension() {
        assert_eq!(
            base_destination(Path::new("/s/photo.jpg"), OutputFormat::Png),
            PathBuf::from("/s/photo.png")
        );
        assert_eq!(
            base_destination(Path::new("/s/photo.jpg"), OutputFormat::Tiff),
            PathBuf::from("/s/photo.tiff")
        );
    }

    #[test]
    fn disambiguator_goes_before_extension() {
        let base = Path::new("/s/photo.png");
        assert_eq!(disambiguated(base, 0), PathBuf::from("/s/photo.png"));
        assert_eq!(disambiguated(base, 1), PathBuf::from("/s/photo (1).png"));
        assert_eq!(disambiguated(base, 12), PathBuf::from("/s/photo (12).png"));
    }

    #[test]
    fn multi_dot_stems_keep_their_dots() {
        assert_eq!(
            base_destination(Path::new("/s/scan.2024.01.jpeg"), OutputFormat::Png),
            PathBuf::from("/s/scan.2024.01.png")
        );
        assert_eq!(
            disambiguated(Path::new("/s/scan.2024.01.png"), 2),
            PathBuf::from("/s/scan.2024.01 (2).png")
        );
    }

    #[test]
    fn first_free_index_wins() {
        let taken: HashSet<PathBuf> = [
            "/s/photo.png",
            "/s/photo (1).png",
            "/s/photo (3).png",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        let dest =
            free_destination_with(Path::new("/s/photo.jpg"), OutputFormat::Png, |p| {
                taken.contains(p)
            })
            .unwrap();
        assert_eq!(dest, PathBuf::from("/s/photo (2).png"));
    }

    #[test]
    fn search_is_bounded() {
        let err = free_destination_with(Path::new("/s/photo.jpg"), OutputFormat::Png, |_| true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteError);
    }

    #[test]
    fn never_returns_the_source() {
        let dest = free_destination_with(Path::new("/s/photo.png"), OutputFormat::Png, |_| false)
            .unwrap();
        assert_eq!(dest, PathBuf::from("/s/photo (1).png"));
    }

    #[test]
    fn real_filesystem_collision() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.jpg");
        std::fs::write(&src, b"x").unwrap();
        std::fs::write(dir.path().join("a.png"), b"old").unwrap();
        assert_eq!(
            free_destination(&src, OutputFormat::Png).unwrap(),
            dir.path().join("a (1).png")
        );
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_counts_as_taken() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.jpg");
        std::fs::write(&src, b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("a.png"))
            .unwrap();
        assert_eq!(
            free_destination(&src, OutputFormat::Png).unwrap(),
            dir.path().join("a (1).png")
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_stem_survives_disambiguation() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = Path::new("/s");
        let base = dir.join(OsStr::from_bytes(b"scan\xFF.png"));
        let expected = dir.join(OsStr::from_bytes(b"scan\xFF (3).png"));
        assert_eq!(disambiguated(&base, 3), expected);
    }
}
