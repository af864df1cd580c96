use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List floor plan images under `directory`, sorted by path.
pub fn discover_floor_plans(directory: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut plans = Vec::new();

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if path.is_file() && has_extension(path, extensions) {
            plans.push(path.to_path_buf());
        }
    }

    plans.sort();
    plans
}

/// Resolve a floor image name reported by the service to a file on disk.
///
/// A direct child of `directory` wins; otherwise the first match by file name
/// anywhere below it.
pub fn find_floor_plan(directory: &Path, image_name: &str, extensions: &[String]) -> Option<PathBuf> {
    // Names come from the service; never let them walk out of the directory.
    if image_name.is_empty() || Path::new(image_name).file_name().map(|n| n != image_name).unwrap_or(true) {
        return None;
    }

    let direct = directory.join(image_name);
    if direct.is_file() {
        return Some(direct);
    }

    discover_floor_plans(directory, extensions)
        .into_iter()
        .find(|p| p.file_name().map(|n| n == image_name).unwrap_or(false))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            extensions.iter().any(|e| e.to_lowercase() == ext)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn extensions() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string()]
    }

    #[test]
    fn test_discover_floor_plans() {
        let dir = tempdir().unwrap();

        File::create(dir.path().join("simfloor.jpg")).unwrap();
        File::create(dir.path().join("blankfloor.JPG")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        fs::create_dir(dir.path().join("building2")).unwrap();
        File::create(dir.path().join("building2/floor3.png")).unwrap();

        let plans = discover_floor_plans(dir.path(), &extensions());
        assert_eq!(plans.len(), 3);
    }

    #[test]
    fn test_find_floor_plan() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("campus")).unwrap();
        File::create(dir.path().join("campus/simfloor.jpg")).unwrap();
        File::create(dir.path().join("blankfloor.jpg")).unwrap();

        assert_eq!(
            find_floor_plan(dir.path(), "blankfloor.jpg", &extensions()),
            Some(dir.path().join("blankfloor.jpg"))
        );
        assert_eq!(
            find_floor_plan(dir.path(), "simfloor.jpg", &extensions()),
            Some(dir.path().join("campus/simfloor.jpg"))
        );
        assert_eq!(find_floor_plan(dir.path(), "unknownmap.jpg", &extensions()), None);
        assert_eq!(find_floor_plan(dir.path(), "", &extensions()), None);
    }
}
