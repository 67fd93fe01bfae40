use std::path::Path;
use std::sync::Arc;

use crate::client::{BigQueryClient, InnerClient};
use crate::job::ActiveJob;
use crate::resources::job::{
    CreateDisposition, Job, JobConfigurationLoad, JobReference, SourceFormat, WriteDisposition,
};
use crate::resources::{DatasetReference, TableReference};

/// Client scoped to a single table within a dataset. The table itself
/// doesn't need to exist yet, load jobs create their destination by default.
#[derive(Debug, Clone)]
pub struct TableClient<D, T> {
    dataset_id: D,
    table_id: T,
    inner: Arc<InnerClient>,
}

/// Options for [`TableClient::load_file`].
#[derive(Debug, Clone, Default)]
pub struct LoadFile {
    /// Pins the job to a location via its job reference. When left unset the
    /// service routes the job by the destination dataset instead.
    pub location: Option<Box<str>>,
    pub source_format: SourceFormat,
    pub write_disposition: WriteDisposition,
    pub create_disposition: CreateDisposition,
    /// Tolerate values that don't match the inferred schema instead of
    /// failing the whole job.
    pub ignore_unknown_values: bool,
    pub max_bad_records: Option<usize>,
}

impl<D, T> TableClient<D, T> {
    pub(crate) const fn from_parts(dataset_id: D, table_id: T, inner: Arc<InnerClient>) -> Self {
        Self {
            dataset_id,
            table_id,
            inner,
        }
    }

    /// Returns a handle to the project wide client.
    pub fn client(&self) -> BigQueryClient {
        BigQueryClient {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D, T> TableClient<D, T>
where
    D: AsRef<str>,
    T: AsRef<str>,
{
    #[inline]
    pub fn table_id(&self) -> &str {
        self.table_id.as_ref()
    }

    pub fn table_reference(&self) -> TableReference {
        let dataset_reference = DatasetReference {
            dataset_id: self.dataset_id.as_ref().into(),
            project_id: self.inner.project_id().into(),
        };

        dataset_reference.into_table(self.table_id.as_ref().into())
    }

    /// Starts a load job with the file at `path` as its source data, creating
    /// the destination table if needed.
    ///
    /// This only submits the job. Poll the returned [`ActiveJob`] to find out
    /// how the load went.
    pub async fn load_file(
        &self,
        path: impl AsRef<Path>,
        options: LoadFile,
    ) -> crate::Result<ActiveJob> {
        self.load_file_inner(path.as_ref(), options).await
    }

    async fn load_file_inner(&self, path: &Path, options: LoadFile) -> crate::Result<ActiveJob> {
        let LoadFile {
            location,
            source_format,
            write_disposition,
            create_disposition,
            ignore_unknown_values,
            max_bad_records,
        } = options;

        let mut config = JobConfigurationLoad::new(self.table_reference(), source_format);
        config.write_disposition = write_disposition;
        config.create_disposition = create_disposition;
        config.ignore_unknown_values = ignore_unknown_values;
        config.max_bad_records = max_bad_records;

        let mut job = Job::from(config);

        if let Some(location) = location {
            job.job_reference = Some(JobReference::generate(self.inner.project_id(), location));
        }

        self.client().start_load_job(job, path).await
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;
    use crate::auth::Scope;
    use crate::dataset::DeleteDataset;
    use crate::job::DEFAULT_POLL_FREQUENCY;
    use crate::resources::Dataset;

    const ROWS: &str = concat!(
        r#"{"name": "alice", "age": 34}"#,
        "\n",
        r#"{"name": "bob", "age": 40}"#,
        "\n",
        r#"{"name": "carol", "age": 29}"#,
        "\n",
    );

    #[tokio::test]
    #[ignore = "needs GCP credentials"]
    async fn load_append_and_truncate_cycle() -> crate::Result<()> {
        let client = BigQueryClient::new_detect_project(Scope::BigQueryAdmin).await?;
        let dataset_client = client.dataset("bigquery_rest_load_cycle_test");

        dataset_client
            .create(Dataset::new(dataset_client.dataset_reference()).location("US"))
            .await?;

        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(ROWS.as_bytes())?;
        file.flush()?;

        let table_client = dataset_client.table("people");

        let options = LoadFile {
            location: Some("US".into()),
            ..LoadFile::default()
        };

        let mut job = table_client.load_file(file.path(), options.clone()).await?;
        job.wait_until_done(DEFAULT_POLL_FREQUENCY, Duration::from_secs(120))
            .await?;
        assert_eq!(job.output_rows(), Some(3));

        // append: the job reports its own rows, not the table total
        let mut job = table_client.load_file(file.path(), options).await?;
        job.wait_until_done(DEFAULT_POLL_FREQUENCY, Duration::from_secs(120))
            .await?;
        assert_eq!(job.output_rows(), Some(3));

        let truncate = LoadFile {
            location: Some("US".into()),
            write_disposition: WriteDisposition::WriteTruncate,
            ..LoadFile::default()
        };

        let mut job = table_client.load_file(file.path(), truncate).await?;
        job.wait_until_done(DEFAULT_POLL_FREQUENCY, Duration::from_secs(120))
            .await?;
        assert_eq!(job.output_rows(), Some(3));

        dataset_client
            .delete(DeleteDataset {
                delete_contents: true,
                not_found_ok: false,
            })
            .await?;

        Ok(())
    }
}
