use std::iter::repeat;
use std::path::{Path, PathBuf};

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

/// Trims surrounding whitespace and turns blank input into `None`.
pub fn non_blank(value: impl AsRef<str>) -> Option<String> {
    let trimmed = value.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_existing_subpath() {
        let found = find_first_subpath("/root", &["a", "b", "c"], |p| p.ends_with("b"));
        assert_eq!(found, Some(PathBuf::from("/root/b")));
    }

    #[test]
    fn blank_strings_are_none() {
        assert_eq!(non_blank("   "), None);
        assert_eq!(non_blank(" math "), Some("math".to_string()));
    }
}
