use crate::constants::SUPPORTED_IMAGE_EXTENSIONS;
use crate::error::{ResizeError, Result};
use crate::formats::ImageKind;
use crate::processing::Budget;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// An image picked up by discovery, with its size at filter time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTask {
    pub path: PathBuf,
    pub original_size: u64,
    /// Codec implied by the extension. The decoded container may disagree.
    pub kind: ImageKind,
}

/// Images split by whether they already fit the budget.
#[derive(Debug, Default)]
pub struct SizePartition {
    pub within_budget: Vec<ImageTask>,
    pub oversized: Vec<ImageTask>,
}

impl SizePartition {
    pub fn total(&self) -> usize {
        self.within_budget.len() + self.oversized.len()
    }
}

/// Expands input paths into candidate files.
///
/// Every input is checked before anything is walked, so a missing path fails
/// the run up front. Directories are walked recursively, top-down, with
/// entries sorted by name so the order is stable for a given tree.
/// Entries that cannot be read are logged and left out of the walk.
///
/// # Example
/// ```
/// use std::path::PathBuf;
/// use img_fit::{collect_paths, ResizeError};
///
/// let result = collect_paths(&[PathBuf::from("does/not/exist")]);
/// assert!(matches!(result, Err(ResizeError::PathNotFound(_))));
/// ```
pub fn collect_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if let Some(missing) = inputs.iter().find(|input| !input.exists()) {
        return Err(ResizeError::PathNotFound(missing.clone()));
    }

    let mut paths = Vec::new();
    for input in inputs {
        if input.is_file() {
            paths.push(input.clone());
            continue;
        }

        for entry in WalkDir::new(input).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.path().is_file() => paths.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry: {}", e),
            }
        }
    }

    Ok(paths)
}

/// Lowercased text after the last '.' of the file name, or "" if there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

pub fn is_image_file(path: &Path) -> bool {
    SUPPORTED_IMAGE_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Keeps candidates with a supported image extension, in order.
pub fn filter_image_paths(candidates: Vec<PathBuf>) -> Vec<PathBuf> {
    candidates
        .into_iter()
        .filter(|path| is_image_file(path))
        .collect()
}

/// Splits image paths on their current on-disk size against `budget`.
pub fn partition_by_budget(image_paths: &[PathBuf], budget: Budget) -> Result<SizePartition> {
    let mut partition = SizePartition::default();

    for path in image_paths {
        let kind = ImageKind::from_path(path)
            .ok_or_else(|| ResizeError::UnsupportedFormat(extension_of(path)))?;
        let task = ImageTask {
            path: path.clone(),
            original_size: fs::metadata(path)?.len(),
            kind,
        };

        if budget.fits(task.original_size) {
            partition.within_budget.push(task);
        } else {
            partition.oversized.push(task);
        }
    }

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(path: &Path, len: usize) {
        File::create(path).unwrap().write_all(&vec![0u8; len]).unwrap();
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("test.jpg")));
        assert!(is_image_file(Path::new("test.jpeg")));
        assert!(is_image_file(Path::new("test.png")));

        assert!(!is_image_file(Path::new("test.gif")));
        assert!(!is_image_file(Path::new("test.bmp")));
        assert!(!is_image_file(Path::new("test.webp")));
        assert!(!is_image_file(Path::new("test.txt")));
        assert!(!is_image_file(Path::new("test")));
    }

    #[test]
    fn test_is_image_file_case_insensitive() {
        assert!(is_image_file(Path::new("test.JPG")));
        assert!(is_image_file(Path::new("test.PnG")));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/b/photo.tar.PNG")), "png");
        assert_eq!(extension_of(Path::new("Makefile")), "");
        assert_eq!(extension_of(Path::new(".png")), "");
    }

    #[test]
    fn test_collect_paths_missing_input_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().join("here.jpg");
        write_file(&existing, 1);
        let missing = temp_dir.path().join("gone");

        let result = collect_paths(&[existing, missing.clone()]);
        match result {
            Err(ResizeError::PathNotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected PathNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_paths_single_file_any_extension() {
        let temp_dir = TempDir::new().unwrap();
        let notes = temp_dir.path().join("notes.txt");
        write_file(&notes, 3);

        let paths = collect_paths(&[notes.clone()]).unwrap();
        assert_eq!(paths, vec![notes]);
    }

    #[test]
    fn test_collect_paths_recursive_and_ordered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let nested = root.join("b_dir").join("deeper");
        fs::create_dir_all(&nested).unwrap();

        write_file(&root.join("c.png"), 1);
        write_file(&root.join("a.txt"), 1);
        write_file(&nested.join("z.jpg"), 1);

        let paths = collect_paths(&[root.to_path_buf()]).unwrap();
        assert_eq!(
            paths,
            vec![root.join("a.txt"), nested.join("z.jpg"), root.join("c.png")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_paths_skips_unreadable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let locked = root.join("locked");
        fs::create_dir(&locked).unwrap();
        write_file(&locked.join("hidden.png"), 1);
        write_file(&root.join("open.png"), 1);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still list the directory.
        let listable = fs::read_dir(&locked).is_ok();
        let result = collect_paths(&[root.to_path_buf()]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let paths = result.unwrap();
        assert!(paths.contains(&root.join("open.png")));
        assert_eq!(paths.contains(&locked.join("hidden.png")), listable);
    }

    #[test]
    fn test_collect_paths_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let paths = collect_paths(&[temp_dir.path().to_path_buf()]).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_filter_image_paths_keeps_order() {
        let candidates = vec![
            PathBuf::from("b.PNG"),
            PathBuf::from("anim.gif"),
            PathBuf::from("a.jpeg"),
            PathBuf::from("scan.bmp"),
            PathBuf::from("c.jpg"),
        ];

        let images = filter_image_paths(candidates);
        assert_eq!(
            images,
            vec![
                PathBuf::from("b.PNG"),
                PathBuf::from("a.jpeg"),
                PathBuf::from("c.jpg")
            ]
        );
    }

    #[test]
    fn test_partition_by_budget() {
        let temp_dir = TempDir::new().unwrap();
        let small = temp_dir.path().join("small.jpg");
        let exact = temp_dir.path().join("exact.jpeg");
        let large = temp_dir.path().join("large.png");
        write_file(&small, 10);
        write_file(&exact, 100);
        write_file(&large, 101);

        let partition = partition_by_budget(
            &[small.clone(), exact.clone(), large.clone()],
            Budget::from_bytes(100),
        )
        .unwrap();

        assert_eq!(partition.total(), 3);
        let within: Vec<_> = partition.within_budget.iter().map(|t| &t.path).collect();
        assert_eq!(within, vec![&small, &exact]);
        assert_eq!(partition.oversized.len(), 1);
        assert_eq!(partition.oversized[0].path, large);
        assert_eq!(partition.oversized[0].original_size, 101);
        assert_eq!(partition.oversized[0].kind, ImageKind::Png);
    }
}
