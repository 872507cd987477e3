use serde_json::Value;
use tracing::info;

use crate::config::{DownloadConfig, OutputLayout};
use crate::error_handling::{Result, SurveyError};
use crate::fetcher::RepositoryFetcher;
use crate::github::RepositorySearch;
use crate::persistence::ResultsPersistence;
use crate::repository::RepositoryRecord;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadStats {
    pub pages_searched: usize,
    pub pages_skipped: usize,
    pub repositories_cloned: usize,
    pub repositories_skipped: usize,
}

/// Searches GitHub page by page and clones every result, skipping anything
/// already on disk.
pub struct Downloader<S, F> {
    search: S,
    fetcher: F,
    layout: OutputLayout,
    config: DownloadConfig,
}

impl<S: RepositorySearch, F: RepositoryFetcher> Downloader<S, F> {
    pub fn new(search: S, fetcher: F, layout: OutputLayout, config: DownloadConfig) -> Self {
        Self {
            search,
            fetcher,
            layout,
            config,
        }
    }

    pub async fn run(&self) -> Result<DownloadStats> {
        info!(
            "Searching and cloning the top {} \"eslint-plugin\" GitHub repositories to {}",
            self.config.page_count * self.config.page_size,
            self.layout.root().display()
        );

        let results_dir = self.layout.search_results_dir();
        tokio::fs::create_dir_all(&results_dir)
            .await
            .map_err(|e| SurveyError::io(&results_dir, e))?;

        let mut stats = DownloadStats::default();
        for page in 1..=self.config.page_count {
            info!("Page {}", page);
            let records = self.page_records(page, &mut stats).await?;
            self.clone_page(page, &records, &mut stats).await?;
        }

        info!("Download finished: {:?}", stats);
        Ok(stats)
    }

    async fn page_records(
        &self,
        page: usize,
        stats: &mut DownloadStats,
    ) -> Result<Vec<RepositoryRecord>> {
        let path = self.layout.search_results_page(page);

        if path.exists() {
            info!("Skipping GitHub search for already-retrieved page {}", page);
            stats.pages_skipped += 1;
            return ResultsPersistence::load_search_page(&path);
        }

        let items = self.search.search_page(page, self.config.page_size).await?;
        let records = items
            .iter()
            .cloned()
            .map(serde_json::from_value::<RepositoryRecord>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                SurveyError::GitHub(format!("Unexpected search item on page {}: {}", page, e))
            })?;

        self.save_page(&items, page).await?;
        stats.pages_searched += 1;
        Ok(records)
    }

    async fn save_page(&self, items: &[Value], page: usize) -> Result<()> {
        ResultsPersistence::save_search_page(items, self.layout.search_results_page(page)).await
    }

    async fn clone_page(
        &self,
        page: usize,
        records: &[RepositoryRecord],
        stats: &mut DownloadStats,
    ) -> Result<()> {
        let page_dir = self.layout.cloned_page_dir(page);

        for (i, record) in records.iter().enumerate() {
            tokio::fs::create_dir_all(&page_dir)
                .await
                .map_err(|e| SurveyError::io(&page_dir, e))?;

            let destination = page_dir.join(record.directory_name());
            if destination.exists() {
                info!(
                    "Skipped git clone of already-cloned page {} repository {}",
                    page, record.full_name
                );
                stats.repositories_skipped += 1;
                continue;
            }

            info!(
                "Cloning repository {} of {} in page {}: {}",
                i + 1,
                records.len(),
                page,
                record.full_name
            );
            self.fetcher.fetch(&record.clone_url, &destination).await?;
            stats.repositories_cloned += 1;

            tokio::time::sleep(self.config.clone_delay).await;
        }

        Ok(())
    }
}
