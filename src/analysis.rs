use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{OutputLayout, PAGE_SIZE};
use crate::error_handling::Result;
use crate::persistence::ResultsPersistence;
use crate::repository::{list_cloned_repositories, list_directories, RepositoryRecord};
use crate::rules::RuleClassifier;

/// Counters for one dataset slice of a report run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetCounters {
    pub title: String,
    pub total_plugins: u64,
    pub plugins_with_some_rules: u64,
    pub total_rules: u64,
    pub rule_mentions_options: u64,
    pub rule_mentions_options_but_not_schema: u64,
    pub rule_type_function: u64,
    pub rule_type_object: u64,
}

impl DatasetCounters {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn rule_type_unknown(&self) -> i64 {
        self.total_rules as i64 - self.rule_type_function as i64 - self.rule_type_object as i64
    }
}

/// Decides which repositories a dataset counts.
#[derive(Debug, Clone, Copy)]
pub enum RepositoryFilter {
    All,
    UpdatedSince(DateTime<Utc>),
}

impl RepositoryFilter {
    /// Repositories updated after `now` minus `years` calendar years.
    pub fn updated_within_years(years: u32, now: DateTime<Utc>) -> Self {
        let cutoff = now
            .checked_sub_months(Months::new(years * 12))
            .unwrap_or_else(|| now - Duration::days(365 * i64::from(years)));
        RepositoryFilter::UpdatedSince(cutoff)
    }

    pub fn includes(&self, record: &RepositoryRecord) -> bool {
        match self {
            RepositoryFilter::All => true,
            RepositoryFilter::UpdatedSince(cutoff) => record.updated_at > *cutoff,
        }
    }
}

pub struct Analyzer {
    layout: OutputLayout,
    classifier: RuleClassifier,
}

impl Analyzer {
    pub fn new(layout: OutputLayout, classifier: RuleClassifier) -> Self {
        Self { layout, classifier }
    }

    /// Number of page directories present under the clone root.
    /// Nothing downloaded yet means no pages.
    pub fn pages_found(&self) -> Result<usize> {
        let cloned_dir = self.layout.cloned_repositories_dir();
        if !cloned_dir.exists() {
            return Ok(0);
        }
        Ok(list_directories(&cloned_dir)?.len())
    }

    pub fn analyze(
        &self,
        title: &str,
        page_count: usize,
        filter: RepositoryFilter,
    ) -> Result<DatasetCounters> {
        info!("Analyzing dataset '{}' over {} pages", title, page_count);
        let mut counts = DatasetCounters::new(title);

        for page in 1..=page_count {
            let records =
                ResultsPersistence::load_search_page(self.layout.search_results_page(page))?;
            let cloned = list_cloned_repositories(&self.layout.cloned_page_dir(page))?;

            for repository in cloned {
                // Renamed upstream between search and clone, or cloned by hand.
                let Some(record) = repository.find_record(&records) else {
                    warn!(
                        "No search result on page {} matches {}, excluding it",
                        page, repository.directory_name
                    );
                    continue;
                };
                if !filter.includes(record) {
                    continue;
                }

                counts.total_plugins += 1;

                let rules = self.classifier.classify_repository(&repository.local_path)?;
                debug!("{}: {} rules", record.full_name, rules.len());

                counts.total_rules += rules.len() as u64;
                if !rules.is_empty() {
                    counts.plugins_with_some_rules += 1;
                }

                for rule in &rules {
                    counts.rule_mentions_options += u64::from(rule.mentions_options);
                    counts.rule_mentions_options_but_not_schema +=
                        u64::from(rule.mentions_options_without_schema());
                    counts.rule_type_function += u64::from(rule.is_function_rule);
                    counts.rule_type_object += u64::from(rule.is_object_rule);
                }
            }
        }

        info!(
            "Dataset '{}': {} plugins, {} rules",
            counts.title, counts.total_plugins, counts.total_rules
        );
        Ok(counts)
    }

    /// The four standard slices: first page, updated within one and two
    /// years, and everything.
    pub fn standard_datasets(&self, now: DateTime<Utc>) -> Result<Vec<DatasetCounters>> {
        let pages = self.pages_found()?;
        let top = pages * PAGE_SIZE;

        Ok(vec![
            self.analyze(
                &format!("Top {} Plugins", PAGE_SIZE),
                pages.min(1),
                RepositoryFilter::All,
            )?,
            self.analyze(
                &format!("Top {} Plugins, Updated Last 1 Year", top),
                pages,
                RepositoryFilter::updated_within_years(1, now),
            )?,
            self.analyze(
                &format!("Top {} Plugins, Updated Last 2 Years", top),
                pages,
                RepositoryFilter::updated_within_years(2, now),
            )?,
            self.analyze(&format!("Top {} Plugins", top), pages, RepositoryFilter::All)?,
        ])
    }
}
