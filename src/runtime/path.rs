//! Path helpers shared by the scanner and the link engine.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without touching the filesystem.
///
/// A `..` that cannot pop anything (e.g. above a relative start) is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// True when `path` equals `dir` or lives below it.
///
/// Comparison is per component after normalisation, so `/opt/kupler-extra`
/// is not under `/opt/kupler` and `/opt/kupler/../etc` is not either.
pub fn is_path_under(path: &Path, dir: &Path) -> bool {
    let path = normalize_path(path);
    let dir = normalize_path(dir);

    let mut path_components = path.components();
    dir.components()
        .all(|d| path_components.next().is_some_and(|p| p == d))
}

/// Join a module name onto a `node_modules`-style directory.
///
/// Scoped names (`@scope/pkg`) become two path components.
pub fn module_path(dir: &Path, module: &str) -> PathBuf {
    module
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(dir.to_path_buf(), |acc, segment| acc.join(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_collapses_dots() {
        assert_eq!(
            normalize_path(Path::new("/home/user/.kupler/./node_modules/../conf.json")),
            PathBuf::from("/home/user/.kupler/conf.json")
        );
    }

    #[test]
    fn test_normalize_path_keeps_leading_parent_of_relative() {
        assert_eq!(
            normalize_path(Path::new("../lib/node_modules")),
            PathBuf::from("../lib/node_modules")
        );
    }

    #[test]
    fn test_normalize_path_only_dots() {
        assert_eq!(normalize_path(Path::new("./.")), PathBuf::from(""));
    }

    #[test]
    fn test_is_path_under_nested_module() {
        assert!(is_path_under(
            Path::new("/home/user/.kupler/node_modules/react16"),
            Path::new("/home/user/.kupler")
        ));
    }

    #[test]
    fn test_is_path_under_same_path() {
        assert!(is_path_under(
            Path::new("/home/user/.kupler"),
            Path::new("/home/user/.kupler")
        ));
    }

    #[test]
    fn test_is_path_under_rejects_sibling_prefix() {
        assert!(!is_path_under(
            Path::new("/home/user/.kupler-old/node_modules/react"),
            Path::new("/home/user/.kupler")
        ));
    }

    #[test]
    fn test_is_path_under_rejects_traversal() {
        assert!(!is_path_under(
            Path::new("/home/user/.kupler/../projects/app"),
            Path::new("/home/user/.kupler")
        ));
    }

    #[test]
    fn test_is_path_under_shorter_path() {
        assert!(!is_path_under(
            Path::new("/home/user"),
            Path::new("/home/user/.kupler")
        ));
    }

    #[cfg(windows)]
    #[test]
    fn test_is_path_under_windows() {
        assert!(is_path_under(
            Path::new("C:\\Users\\user\\.kupler\\node_modules\\react"),
            Path::new("C:\\Users\\user\\.kupler")
        ));
        assert!(!is_path_under(
            Path::new("C:\\Users\\user\\.kuplerx\\node_modules"),
            Path::new("C:\\Users\\user\\.kupler")
        ));
    }

    #[test]
    fn test_module_path_plain_and_scoped() {
        let dir = Path::new("/project/node_modules");
        assert_eq!(module_path(dir, "react"), dir.join("react"));
        assert_eq!(
            module_path(dir, "@types/node"),
            dir.join("@types").join("node")
        );
    }
}
