use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error_handling::{Result, SurveyError};

/// GitHub search only returns the first 1000 results.
pub const PAGE_COUNT: usize = 10;
pub const PAGE_SIZE: usize = 100;

pub const TOKEN_ENV_VAR: &str = "GITHUB_AUTH";
pub const DEFAULT_CLONE_DELAY: Duration = Duration::from_millis(1000);

const SEARCH_RESULTS_DIR: &str = "github-search-results";
const CLONED_REPOSITORIES_DIR: &str = "cloned-repositories";

/// Where every artifact of a survey lives on disk.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn search_results_dir(&self) -> PathBuf {
        self.root.join(SEARCH_RESULTS_DIR)
    }

    pub fn search_results_page(&self, page: usize) -> PathBuf {
        self.search_results_dir().join(format!("{}.json", page))
    }

    pub fn cloned_repositories_dir(&self) -> PathBuf {
        self.root.join(CLONED_REPOSITORIES_DIR)
    }

    pub fn cloned_page_dir(&self, page: usize) -> PathBuf {
        self.cloned_repositories_dir().join(page.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub page_count: usize,
    pub page_size: usize,
    pub clone_delay: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            page_count: PAGE_COUNT,
            page_size: PAGE_SIZE,
            clone_delay: DEFAULT_CLONE_DELAY,
        }
    }
}

/// Reads the GitHub access token, failing before any I/O if it is absent.
pub fn access_token() -> Result<String> {
    token_from(std::env::var(TOKEN_ENV_VAR).ok())
}

fn token_from(value: Option<String>) -> Result<String> {
    match value {
        Some(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(SurveyError::Configuration(format!(
            "Missing `{}` environment variable containing GitHub access token with `public_repo` scope.",
            TOKEN_ENV_VAR
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("/tmp/survey");
        assert_eq!(
            layout.search_results_page(3),
            PathBuf::from("/tmp/survey/github-search-results/3.json")
        );
        assert_eq!(
            layout.cloned_page_dir(10),
            PathBuf::from("/tmp/survey/cloned-repositories/10")
        );
    }

    #[test]
    fn test_missing_token_names_variable_and_scope() {
        let err = token_from(None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("GITHUB_AUTH"));
        assert!(msg.contains("public_repo"));
    }

    #[test]
    fn test_blank_token_rejected() {
        assert!(token_from(Some("  ".to_string())).is_err());
        assert_eq!(token_from(Some("ghp_abc".to_string())).unwrap(), "ghp_abc");
    }
}
