use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{error, info};

use crate::error_handling::{Result, SurveyError};

/// Materializes a remote repository at a local destination.
#[async_trait]
pub trait RepositoryFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()>;
}

/// Clones with the `git` executable, streaming its output to the terminal.
#[derive(Debug, Clone)]
pub struct GitCliFetcher {
    program: String,
}

impl GitCliFetcher {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    #[cfg(test)]
    fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for GitCliFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepositoryFetcher for GitCliFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
        info!("Cloning {} to {:?}", url, destination);

        let status = Command::new(&self.program)
            .arg("clone")
            .arg(url)
            .arg(destination)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| {
                SurveyError::Clone(format!("Failed to execute {} clone: {}", self.program, e))
            })?;

        if !status.success() {
            error!("Git clone failed for {}: status={:?}", url, status.code());
            return Err(SurveyError::Clone(format!(
                "git clone {} exited with {}",
                url, status
            )));
        }

        info!("Successfully cloned {} to {:?}", url, destination);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_program_is_clone_error() {
        let dir = TempDir::new().unwrap();
        let fetcher = GitCliFetcher::with_program("definitely-not-a-real-vcs-binary");
        let err = fetcher
            .fetch("https://example.invalid/repo.git", &dir.path().join("repo"))
            .await
            .unwrap_err();
        assert!(matches!(err, SurveyError::Clone(_)));
        assert!(!dir.path().join("repo").exists());
    }
}
