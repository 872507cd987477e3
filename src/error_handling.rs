use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("GitHub API error: {0}")]
    GitHub(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Clone error: {0}")]
    Clone(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error at {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl SurveyError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SurveyError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        SurveyError::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<csv::Error> for SurveyError {
    fn from(e: csv::Error) -> Self {
        SurveyError::Persistence(format!("CSV: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, SurveyError>;

pub struct ErrorReporter;

impl ErrorReporter {
    pub fn report_error(error: &SurveyError) {
        let prefix = match error {
            SurveyError::Configuration(_) => "⚙️",
            SurveyError::GitHub(_) => "🐙",
            SurveyError::Network(_) => "🌐",
            SurveyError::Clone(_) => "📦",
            SurveyError::Io { .. } | SurveyError::Json { .. } => "📁",
            SurveyError::Persistence(_) => "💾",
        };

        eprintln!("{}", format!("{} {}", prefix, error).red().bold());
        error!("{}", error);
    }

    pub fn report_warning(message: &str) {
        println!("{}", format!("⚠️ {}", message).yellow());
    }

    pub fn report_info(message: &str) {
        println!("{}", format!("ℹ️ {}", message).cyan());
    }

    pub fn report_success(message: &str) {
        println!("{}", format!("✅ {}", message).green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = SurveyError::io(
            "output/github-search-results/3.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("output/github-search-results/3.json"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_configuration_error_display() {
        let err = SurveyError::Configuration("Missing `GITHUB_AUTH`".to_string());
        assert_eq!(err.to_string(), "Configuration error: Missing `GITHUB_AUTH`");
    }
}
