use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use http::Method;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Url;
use tokio_util::io::ReaderStream;

use crate::client::{BigQueryClient, deserialize_json};
use crate::error::validate_response;
use crate::multipart;
use crate::resources::job::{Job, JobReference, JobState, JobStatistics, JobStatus};

pub const DEFAULT_POLL_FREQUENCY: Duration = Duration::from_secs(2);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A job the service has accepted but likely not finished.
///
/// Holds the most recently seen [`Job`] resource, refreshed on every poll.
#[derive(Debug)]
pub struct ActiveJob {
    client: BigQueryClient,
    job: Job,
    job_ref: JobReference,
    status: JobStatus,
}

impl ActiveJob {
    /// Submits `job` as a `multipart/related` upload, with the contents of
    /// the file at `path` as the media part.
    pub(crate) async fn start(
        client: &BigQueryClient,
        job: Job,
        path: &Path,
    ) -> crate::Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        let metadata = file.metadata().await?;

        let (leading, trailing) = multipart::encode_framing(&job)?;

        // hyper won't use chunked transfer encoding if we set the length
        // ourselves, which we can since the file size is known
        let content_length = leading.len() as u64 + metadata.len() + trailing.len() as u64;

        let file_stream = ReaderStream::with_capacity(file, read_capacity(&metadata));

        let body = futures::stream::iter([Ok(leading)])
            .chain(file_stream)
            .chain(futures::stream::iter([Ok(trailing)]));

        let mut url = client.inner.make_upload_url(["jobs"]);
        url.query_pairs_mut()
            .append_pair("uploadType", "multipart")
            .finish();

        let response = client
            .inner
            .request(Method::POST, url)
            .await?
            .header(CONTENT_TYPE, multipart::CONTENT_TYPE)
            .header(CONTENT_LENGTH, content_length)
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await?;

        let response = validate_response(response).await?;
        let job = deserialize_json::<Job>(response).await?;

        Self::from_response(client.clone(), job)
    }

    /// Pulls out the pieces of the insert response that every later poll
    /// depends on.
    fn from_response(client: BigQueryClient, mut job: Job) -> crate::Result<Self> {
        let status = job.status.take().ok_or(crate::Error::MissingField {
            resource: "Job",
            field: "status",
        })?;

        let job_ref = job.job_reference.take().ok_or(crate::Error::MissingField {
            resource: "Job",
            field: "jobReference",
        })?;

        Ok(Self {
            client,
            job,
            job_ref,
            status,
        })
    }

    #[inline]
    pub fn job_id(&self) -> &str {
        &self.job_ref.job_id
    }

    /// The location the job actually landed in, as reported by the service.
    #[inline]
    pub fn location(&self) -> &str {
        &self.job_ref.location
    }

    #[inline]
    pub fn state(&self) -> JobState {
        self.status.state
    }

    pub fn statistics(&self) -> Option<&JobStatistics> {
        self.job.statistics.as_ref()
    }

    /// Rows the load job has written so far. Only meaningful once the job is
    /// [`JobState::Done`].
    pub fn output_rows(&self) -> Option<u64> {
        self.job.statistics.as_ref()?.load.as_ref()?.output_rows
    }

    fn poll_url(&self) -> Url {
        let mut url = self
            .client
            .inner
            .make_url(["jobs", &*self.job_ref.job_id]);

        // jobs.get 404s without the location for anything outside the US
        url.query_pairs_mut()
            .append_pair("location", &self.job_ref.location)
            .finish();

        url
    }

    /// Refetches the job once, returning the state it was last seen in.
    pub async fn poll_job(&mut self) -> crate::Result<JobState> {
        if self.status.state.is_done() {
            return Ok(JobState::Done);
        }

        let response = self.client.inner.get(self.poll_url()).await?;
        let mut job = deserialize_json::<Job>(response).await?;

        self.status = job.status.take().ok_or(crate::Error::MissingField {
            resource: "Job",
            field: "status",
        })?;
        self.job = job;

        tracing::debug!(
            job_id = self.job_id(),
            state = ?self.status.state,
            "polled job",
        );

        Ok(self.status.state)
    }

    async fn poll_until_done(&mut self, poll_frequency: Duration) -> crate::Result<()> {
        let mut interval = tokio::time::interval(poll_frequency);

        while !self.status.state.is_done() {
            interval.tick().await;
            self.poll_job().await?;
        }

        Ok(())
    }

    /// Polls every `poll_frequency` until the job finishes one way or the
    /// other, giving up after `timeout`. A job that finished by failing comes
    /// back as [`Error::Job`](crate::Error::Job).
    pub async fn wait_until_done(
        &mut self,
        poll_frequency: Duration,
        timeout: Duration,
    ) -> crate::Result<()> {
        match tokio::time::timeout(timeout, self.poll_until_done(poll_frequency)).await {
            Ok(poll_result) => poll_result?,
            Err(_elapsed) => {
                return Err(crate::Error::Timeout {
                    job_id: self.job_ref.job_id.clone(),
                    timeout,
                });
            }
        }

        self.status.take().into_result()
    }
}

fn read_capacity(metadata: &std::fs::Metadata) -> usize {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        metadata.blksize() as usize
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        4096
    }
}
