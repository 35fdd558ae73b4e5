// src/services/catalog.rs

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::AppError;
use crate::models::question::Question;

/// Set labels used when no set-specific files exist for a (class, stream) pair.
const FALLBACK_SETS: [&str; 4] = ["a", "b", "c", "d"];

/// Known secondary spellings for class-level names in catalog filenames.
/// Kept as a declarative table rather than scattered string interpolation.
const CLASS_ALIASES: [(&str, &[&str]); 1] = [("dropper", &["dropper", "droppers"])];

fn class_aliases(class_level: &str) -> Vec<&str> {
    for (primary, aliases) in CLASS_ALIASES {
        if class_level == primary {
            return aliases.to_vec();
        }
    }
    vec![class_level]
}

fn stream_or_default(stream: &str) -> &str {
    if stream.is_empty() { "general" } else { stream }
}

/// Read-only resolver over the static question catalog files.
///
/// Files follow `questions_{classAlias}_{stream}_{set}.json` for set-specific
/// content and `questions_{classAlias}_{stream}.json` for shared content.
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    data_dir: PathBuf,
}

impl QuestionCatalog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Scans the data directory for set-specific files matching the
    /// (class, stream) pair and returns the sorted distinct set letters.
    /// Falls back to the fixed `a..d` universe when nothing matches.
    pub fn available_sets(&self, class_level: &str, stream: &str) -> Vec<String> {
        let stream = stream_or_default(stream);
        let mut found: Vec<String> = Vec::new();

        for alias in class_aliases(class_level) {
            let pattern = Regex::new(&format!(
                r"^questions_{}_{}_([a-z])\.json$",
                regex::escape(alias),
                regex::escape(stream)
            ))
            .expect("set filename pattern is valid");

            let Ok(entries) = fs::read_dir(&self.data_dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };
                if let Some(caps) = pattern.captures(name) {
                    let set = caps[1].to_string();
                    if !found.contains(&set) {
                        found.push(set);
                    }
                }
            }
        }

        if found.is_empty() {
            return FALLBACK_SETS.iter().map(|s| s.to_string()).collect();
        }
        found.sort();
        found
    }

    /// Loads the question list for a (class, stream, set) triple.
    ///
    /// Resolution order: set file for each class alias, shared file for each
    /// alias, then the first existing set file among all available sets. An
    /// empty result means "no content available", not an error; only an
    /// unreadable or malformed file is an error.
    pub fn load(
        &self,
        class_level: &str,
        stream: &str,
        set_label: &str,
    ) -> Result<Vec<Question>, AppError> {
        let stream = stream_or_default(stream);
        let aliases = class_aliases(class_level);

        for alias in &aliases {
            let path = self
                .data_dir
                .join(format!("questions_{}_{}_{}.json", alias, stream, set_label));
            if path.exists() {
                return read_question_file(&path);
            }
        }

        for alias in &aliases {
            let path = self.data_dir.join(format!("questions_{}_{}.json", alias, stream));
            if path.exists() {
                return read_question_file(&path);
            }
        }

        for fallback_set in self.available_sets(class_level, stream) {
            for alias in &aliases {
                let path = self
                    .data_dir
                    .join(format!("questions_{}_{}_{}.json", alias, stream, fallback_set));
                if path.exists() {
                    return read_question_file(&path);
                }
            }
        }

        Ok(Vec::new())
    }
}

fn read_question_file(path: &Path) -> Result<Vec<Question>, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Internal(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(format!("malformed catalog file {}: {}", path.display(), e)))
}
