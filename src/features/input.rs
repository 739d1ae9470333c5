use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Read applicant JSON from a file, or from stdin when the path is `-`.
///
/// The document may be a single object or an array of objects; either way
/// the result is one JSON value per applicant.
pub fn read_applicants(path: &Path) -> Result<Vec<serde_json::Value>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read applicant JSON from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read applicant file at {}", path.display()))?
    };

    let document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse applicant JSON in {}", path.display()))?;

    Ok(match document {
        serde_json::Value::Array(items) => items,
        single => vec![single],
    })
}

/// Expand glob patterns into a sorted, de-duplicated list of files.
/// A pattern that matches nothing is an error.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let before = paths.len();
        for entry in
            glob::glob(pattern).with_context(|| format!("Invalid glob pattern '{}'", pattern))?
        {
            let path = entry.with_context(|| format!("Failed to read match for '{}'", pattern))?;
            if path.is_file() {
                paths.push(path);
            }
        }
        if paths.len() == before {
            anyhow::bail!("No applicant files match '{}'", pattern);
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_single_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.json");
        fs::write(&path, r#"{"Income": 1}"#).unwrap();

        let values = read_applicants(&path).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["Income"], 1);
    }

    #[test]
    fn test_read_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("many.json");
        fs::write(&path, r#"[{"Income": 1}, {"Income": 2}]"#).unwrap();

        assert_eq!(read_applicants(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_read_missing_file_has_context() {
        let err = read_applicants(Path::new("/nonexistent/applicant.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read applicant file"));
    }

    #[test]
    fn test_expand_patterns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let pattern = format!("{}/*.json", dir.path().display());
        let paths = expand_patterns(&[pattern.clone(), pattern]).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.json"));
    }

    #[test]
    fn test_expand_pattern_without_matches() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        assert!(expand_patterns(&[pattern]).is_err());
    }
}
