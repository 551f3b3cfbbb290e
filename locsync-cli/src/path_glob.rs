use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use locsync::infer_format_from_extension;
use rayon::prelude::*;
use tracing::debug;

fn has_glob_meta(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

/// Directory part of a pattern before its first glob meta-character.
fn static_prefix_dir(pattern: &str) -> PathBuf {
    let end = pattern
        .find(['*', '?', '[', '{'])
        .unwrap_or(pattern.len());
    let prefix = Path::new(&pattern[..end]);
    if prefix.is_dir() {
        prefix.to_path_buf()
    } else {
        match prefix.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

fn build_glob_set(patterns: &[&String]) -> Result<GlobSet, String> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        // `*` must not cross directory boundaries
        let glob = GlobBuilder::new(pat.trim_start_matches("./"))
            .literal_separator(true)
            .build()
            .map_err(|e| format!("Invalid glob pattern '{}': {}", pat, e))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| format!("Failed to build glob set: {}", e))
}

/// Expands glob patterns among `inputs` into translation files.
///
/// Plain paths are passed through untouched so missing files surface later
/// with a proper error. Glob matches are limited to files whose format can
/// be inferred from their extension, honour `.gitignore`, and come back
/// sorted and deduplicated.
pub fn expand_input_globs(inputs: &[String]) -> Result<Vec<PathBuf>, String> {
    let (patterns, literals): (Vec<&String>, Vec<&String>) =
        inputs.iter().partition(|s| has_glob_meta(s));

    let mut results: Vec<PathBuf> = literals.iter().map(PathBuf::from).collect();
    if patterns.is_empty() {
        return Ok(results);
    }

    let set = build_glob_set(&patterns)?;
    let mut roots: Vec<PathBuf> = patterns.iter().map(|p| static_prefix_dir(p)).collect();
    roots.sort();
    roots.dedup();

    let mut matched: Vec<PathBuf> = roots
        .par_iter()
        .flat_map_iter(|root| {
            WalkBuilder::new(root)
                .hidden(false)
                .parents(true)
                .build()
                .filter_map(Result::ok)
                .filter(|dent| dent.file_type().is_some_and(|t| t.is_file()))
                .map(|dent| dent.into_path())
                .filter(|path| {
                    let relative = path.strip_prefix("./").unwrap_or(path);
                    set.is_match(relative) && infer_format_from_extension(path).is_some()
                })
                .collect::<Vec<_>>()
        })
        .collect();
    matched.sort();
    debug!(patterns = patterns.len(), files = matched.len(), "expanded input globs");

    if matched.is_empty() {
        return Err(format!(
            "No translation files match: {}",
            patterns.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
        ));
    }

    let mut seen: HashSet<PathBuf> = results.iter().cloned().collect();
    results.extend(matched.into_iter().filter(|p| seen.insert(p.clone())));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_literal_inputs_pass_through() {
        let inputs = vec!["missing.json".to_string()];
        assert_eq!(expand_input_globs(&inputs).unwrap(), vec![PathBuf::from("missing.json")]);
    }

    #[test]
    fn test_glob_matches_known_formats_only() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::create_dir_all(dir.join("locales/nested")).unwrap();
        fs::write(dir.join("locales/en.json"), "{}").unwrap();
        fs::write(dir.join("locales/de.json"), "{}").unwrap();
        fs::write(dir.join("locales/notes.txt"), "").unwrap();
        fs::write(dir.join("locales/nested/fr.json"), "{}").unwrap();

        let pattern = format!("{}/locales/*", dir.display());
        let files = expand_input_globs(&[pattern]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["de.json", "en.json"]);
    }

    #[test]
    fn test_glob_without_matches_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.json", temp_dir.path().display());
        let err = expand_input_globs(&[pattern]).unwrap_err();
        assert!(err.contains("No translation files match"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = expand_input_globs(&["locales/[.json".to_string()]).unwrap_err();
        assert!(err.contains("Invalid glob pattern"));
    }
}
