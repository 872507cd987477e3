use csv::Writer;
use serde_json::Value;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::analysis::DatasetCounters;
use crate::error_handling::{Result, SurveyError};
use crate::report::{percentage, ratio};
use crate::repository::RepositoryRecord;

pub struct ResultsPersistence;

impl ResultsPersistence {
    /// Writes the raw search items of one page. The file is the page's cache entry.
    pub async fn save_search_page<P: AsRef<Path>>(items: &[Value], path: P) -> Result<()> {
        let path = path.as_ref();
        let json_data = serde_json::to_string(items).map_err(|e| SurveyError::json(path, e))?;
        let mut file = File::create(path).await.map_err(|e| SurveyError::io(path, e))?;
        file.write_all(json_data.as_bytes())
            .await
            .map_err(|e| SurveyError::io(path, e))?;
        file.flush().await.map_err(|e| SurveyError::io(path, e))?;

        info!("Saved {} search results to {}", items.len(), path.display());
        Ok(())
    }

    pub fn load_search_page<P: AsRef<Path>>(path: P) -> Result<Vec<RepositoryRecord>> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| SurveyError::io(path, e))?;
        serde_json::from_str(&data).map_err(|e| SurveyError::json(path, e))
    }

    pub async fn save_summary<P: AsRef<Path>>(datasets: &[DatasetCounters], path: P) -> Result<()> {
        let path = path.as_ref();
        let summary = serde_json::json!({
            "datasets": datasets,
            "analysis_timestamp": chrono::Utc::now().to_rfc3339()
        });

        let summary_json =
            serde_json::to_string_pretty(&summary).map_err(|e| SurveyError::json(path, e))?;
        let mut file = File::create(path).await.map_err(|e| SurveyError::io(path, e))?;
        file.write_all(summary_json.as_bytes())
            .await
            .map_err(|e| SurveyError::io(path, e))?;
        file.flush().await.map_err(|e| SurveyError::io(path, e))?;

        info!("Saved analysis summary to {}", path.display());
        Ok(())
    }

    pub async fn save_to_csv<P: AsRef<Path>>(datasets: &[DatasetCounters], path: P) -> Result<()> {
        let mut wtr = Writer::from_path(path.as_ref())?;

        wtr.write_record([
            "title",
            "total_plugins",
            "plugins_with_some_rules",
            "total_rules",
            "rule_mentions_options",
            "rule_mentions_options_but_not_schema",
            "rule_type_function",
            "rule_type_object",
            "average_rules_per_plugin",
            "percent_object_rules",
            "percent_function_rules",
        ])?;

        for data in datasets {
            wtr.write_record([
                data.title.clone(),
                data.total_plugins.to_string(),
                data.plugins_with_some_rules.to_string(),
                data.total_rules.to_string(),
                data.rule_mentions_options.to_string(),
                data.rule_mentions_options_but_not_schema.to_string(),
                data.rule_type_function.to_string(),
                data.rule_type_object.to_string(),
                format!("{:.2}", ratio(data.total_rules, data.plugins_with_some_rules)),
                format!("{:.2}", percentage(data.rule_type_object, data.total_rules)),
                format!("{:.2}", percentage(data.rule_type_function, data.total_rules)),
            ])?;
        }

        wtr.flush().map_err(|e| SurveyError::io(path.as_ref(), e))?;
        info!("Saved {} datasets to {}", datasets.len(), path.as_ref().display());
        Ok(())
    }
}
