use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error_handling::{Result, SurveyError};

/// The fields of a GitHub search result item that the survey consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub full_name: String,
    pub clone_url: String,
    pub updated_at: DateTime<Utc>,
}

impl RepositoryRecord {
    /// `owner/repo` becomes `owner__repo`.
    pub fn directory_name(&self) -> String {
        self.full_name.replacen('/', "__", 1)
    }
}

/// A repository that has been cloned under a page directory.
#[derive(Debug, Clone)]
pub struct ClonedRepository {
    pub directory_name: String,
    pub local_path: PathBuf,
}

impl ClonedRepository {
    /// Finds the search record this clone was made from.
    pub fn find_record<'a>(
        &self,
        records: &'a [RepositoryRecord],
    ) -> Option<&'a RepositoryRecord> {
        records
            .iter()
            .find(|record| record.directory_name() == self.directory_name)
    }
}

/// Lists the cloned repositories of one page, sorted by directory name.
/// A page directory that was never created holds no repositories.
pub fn list_cloned_repositories(page_dir: &Path) -> Result<Vec<ClonedRepository>> {
    if !page_dir.exists() {
        return Ok(Vec::new());
    }

    Ok(list_directories(page_dir)?
        .into_iter()
        .map(|name| ClonedRepository {
            local_path: page_dir.join(&name),
            directory_name: name,
        })
        .collect())
}

pub fn list_directories(dir: &Path) -> Result<Vec<String>> {
    list_entries(dir, true)
}

pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    list_entries(dir, false)
}

fn list_entries(dir: &Path, directories: bool) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| SurveyError::io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SurveyError::io(dir, e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| SurveyError::io(entry.path(), e))?
            .is_dir();
        if is_dir == directories {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
