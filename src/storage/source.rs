use std::{future::Future, io::ErrorKind, marker::PhantomData, ops::Deref, path::PathBuf};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{debug, warn};

use crate::utils::time::key_to_date;

use super::DateKeyedRecords;

/// Interface for abstracting where usage data comes from. The aggregator never sees the source,
/// only the loaded dataset.
pub trait UsageSource {
    type Dataset;

    fn load(&self) -> impl Future<Output = Result<Self::Dataset>> + Send;
}

impl<T: Deref + Sync> UsageSource for T
where
    T::Target: UsageSource,
{
    type Dataset = <T::Target as UsageSource>::Dataset;

    fn load(&self) -> impl Future<Output = Result<Self::Dataset>> + Send {
        self.deref().load()
    }
}

/// Dataset stored as a single JSON object keyed by `YYYY-MM-DD`, e.g. `{"2024-06-10": 100}` for
/// a [super::dataset::UsageDataset].
pub struct JsonUsageFile<D> {
    path: PathBuf,
    dataset: PhantomData<fn() -> D>,
}

impl<D> JsonUsageFile<D> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            dataset: PhantomData,
        }
    }

    async fn read_locked(&self) -> std::result::Result<String, std::io::Error> {
        debug!("Reading usage from {:?}", self.path);
        let mut file = File::open(&self.path).await?;
        // The tracker may be rewriting the file while we read it.
        file.lock_shared()?;
        let mut content = String::new();
        let read = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        read?;
        Ok(content)
    }
}

impl<D: DateKeyedRecords> UsageSource for JsonUsageFile<D> {
    type Dataset = D;

    async fn load(&self) -> Result<D> {
        let content = match self.read_locked().await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No usage file at {:?}, treating it as empty", self.path);
                return Ok(D::default());
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", self.path))?,
        };

        let mut dataset: D = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse usage file {:?}", self.path))?;

        dataset.retain_keys(|key| {
            let valid = key_to_date(key).is_some();
            if !valid {
                // ignore illegal keys. The tracker only ever writes dates.
                warn!("Skipping entry with illegal date key {key:?} in {:?}", self.path);
            }
            valid
        });
        debug!("Loaded {} days of usage", dataset.days());
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::{tempdir, NamedTempFile};

    use super::{JsonUsageFile, UsageSource};
    use crate::{
        storage::{app_usage::AppUsageDataset, dataset::UsageDataset},
        utils::logging::TEST_LOGGING,
    };

    #[tokio::test]
    async fn loads_dataset_and_drops_illegal_keys() -> Result<()> {
        *TEST_LOGGING;

        let mut file = NamedTempFile::new()?;
        file.write_all(br#"{"2024-06-10": 100, "2024-06-09": 50, "not a date": 7}"#)?;

        let dataset = JsonUsageFile::<UsageDataset>::new(file.path().to_path_buf())
            .load()
            .await?;

        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.seconds_on(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
            100
        );
        assert_eq!(dataset.seconds_for("not a date"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let dataset = JsonUsageFile::<UsageDataset>::new(dir.path().join("usage.json"))
            .load()
            .await?;
        assert!(dataset.is_empty());

        let apps = JsonUsageFile::<AppUsageDataset>::new(dir.path().join("app_usage.json"))
            .load()
            .await?;
        assert!(apps.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"[1, 2, 3]")?;

        let result = JsonUsageFile::<UsageDataset>::new(file.path().to_path_buf())
            .load()
            .await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn loads_through_a_reference() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(br#"{"2024-01-01": 1}"#)?;

        let source = Box::new(JsonUsageFile::<UsageDataset>::new(
            file.path().to_path_buf(),
        ));
        assert_eq!(source.load().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn loads_app_usage() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(br#"{"2024-06-10": {"code": 300, "firefox": 100}, "bad": {"x": 1}}"#)?;

        let apps = JsonUsageFile::<AppUsageDataset>::new(file.path().to_path_buf())
            .load()
            .await?;
        let day = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(apps.daily_totals().seconds_on(day), 400);
        assert_eq!(apps.rows_between(day, day).len(), 2);
        Ok(())
    }
}
