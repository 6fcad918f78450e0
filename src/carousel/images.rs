//! Rendered slide images on disk.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default file pattern for exported slide images.
pub const DEFAULT_IMAGE_PATTERN: &str = "slide_*.png";

/// One rendered source slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// 1-based slide number, from the file name when it carries one
    pub index: usize,
    pub path: PathBuf,
}

impl SourceImage {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// File name of the image exported for slide `index` (1-based).
pub fn slide_image_name(index: usize) -> String {
    format!("slide_{:03}.png", index)
}

/// Match a file name against a pattern with `*` and `?` wildcards.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match star {
                // let the last star swallow one more character
                Some((sp, sn)) => {
                    p = sp + 1;
                    n = sn + 1;
                    star = Some((sp, sn + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

fn number_in_stem(path: &Path) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    let digits: String = stem
        .chars()
        .rev()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok().filter(|&n| n > 0)
}

/// List images in `folder` whose names match `pattern`, sorted by name.
///
/// Only the folder itself is searched, not its subfolders.
pub fn list_slide_images(folder: impl AsRef<Path>, pattern: &str) -> Result<Vec<SourceImage>> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(Error::InvalidInput(format!(
            "images folder not found: {}",
            folder.display()
        )));
    }

    let paths: Vec<PathBuf> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(folder = %folder.display(), "skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| wildcard_match(pattern, &e.file_name().to_string_lossy()))
        .map(|e| e.into_path())
        .collect();

    tracing::debug!(folder = %folder.display(), pattern, count = paths.len(), "listed slide images");

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(position, path)| SourceImage {
            index: number_in_stem(&path).unwrap_or(position + 1),
            path,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("slide_*.png", "slide_001.png"));
        assert!(wildcard_match("slide_*.png", "slide_.png"));
        assert!(!wildcard_match("slide_*.png", "slide_001.jpg"));
        assert!(!wildcard_match("slide_*.png", "cover.png"));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("s?ide_*_*.png", "slide_1_b.png"));
        assert!(wildcard_match("*.png", "a.b.png"));
        assert!(!wildcard_match("?", ""));
    }

    #[test]
    fn test_slide_image_name() {
        assert_eq!(slide_image_name(7), "slide_007.png");
        assert_eq!(slide_image_name(1234), "slide_1234.png");
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["slide_010.png", "slide_002.png", "notes.txt", "slide_001.png"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("slide_999.png")).unwrap();

        let images = list_slide_images(dir.path(), DEFAULT_IMAGE_PATTERN).unwrap();
        let names: Vec<String> = images.iter().map(SourceImage::file_name).collect();
        assert_eq!(names, vec!["slide_001.png", "slide_002.png", "slide_010.png"]);
        assert_eq!(images[2].index, 10);
    }

    #[test]
    fn test_index_falls_back_to_position() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cover.png"), b"x").unwrap();
        fs::write(dir.path().join("end.png"), b"x").unwrap();
        let images = list_slide_images(dir.path(), "*.png").unwrap();
        assert_eq!(images[0].index, 1);
        assert_eq!(images[1].index, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_entry_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("slide_001.png"), b"x").unwrap();
        fs::write(dir.path().join("slide_003.png"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.png"), dir.path().join("slide_002.png"))
            .unwrap();

        let images = list_slide_images(dir.path(), DEFAULT_IMAGE_PATTERN).unwrap();
        let indices: Vec<usize> = images.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_missing_folder() {
        let err = list_slide_images("/nonexistent/images", DEFAULT_IMAGE_PATTERN).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
