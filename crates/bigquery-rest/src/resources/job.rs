use std::collections::HashMap;

pub mod load;

pub use load::{CreateDisposition, JobConfigurationLoad, SourceFormat, WriteDisposition};

use super::ErrorProto;
use crate::util;

/// <https://cloud.google.com/bigquery/docs/reference/rest/v2/Job>
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job<S = Box<str>> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<S>,
    /// Snake case on the wire, unlike every other field in the API.
    #[serde(rename = "user_email", skip_serializing_if = "Option::is_none")]
    pub user_email: Option<S>,
    pub configuration: JobConfiguration<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReference<S>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<JobStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus<S>>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfiguration<S = Box<str>> {
    /// Output-only, the service fills this in from the configuration itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(default, skip_serializing_if = "util::is_false")]
    pub dry_run: bool,
    #[serde(
        default,
        rename = "jobTimeoutMs",
        skip_serializing_if = "Option::is_none",
        with = "util::int64::optional"
    )]
    pub job_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<Box<str>, S>>,
    pub load: JobConfigurationLoad<S>,
}

impl<S> JobConfiguration<S> {
    pub fn into_job(self) -> Job<S> {
        Job {
            kind: None,
            etag: None,
            id: None,
            self_link: None,
            user_email: None,
            configuration: self,
            job_reference: None,
            statistics: None,
            status: None,
        }
    }
}

impl<S> From<JobConfigurationLoad<S>> for JobConfiguration<S> {
    fn from(load: JobConfigurationLoad<S>) -> Self {
        Self {
            job_type: None,
            dry_run: false,
            job_timeout_ms: None,
            labels: None,
            load,
        }
    }
}

impl<S> From<JobConfigurationLoad<S>> for Job<S> {
    fn from(load: JobConfigurationLoad<S>) -> Self {
        JobConfiguration::from(load).into_job()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Query,
    Load,
    Extract,
    Copy,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference<S = Box<str>> {
    pub job_id: S,
    pub location: S,
    pub project_id: S,
}

impl JobReference {
    /// Builds a reference with a freshly generated job id, pinning the job to
    /// `location`. When no reference is sent at all, the service generates the
    /// id itself and routes by the referenced dataset instead.
    pub fn generate(project_id: impl Into<Box<str>>, location: impl Into<Box<str>>) -> Self {
        let job_id = format!("job_{}", uuid::Uuid::new_v4().simple());

        Self {
            job_id: job_id.into_boxed_str(),
            location: location.into(),
            project_id: project_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus<S = Box<str>> {
    /// Only present if the job has failed outright.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_result: Option<ErrorProto<S>>,
    /// Things encountered while running, fatal or not.
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorProto<S>>,
    pub state: JobState,
}

impl<S> JobStatus<S> {
    /// Takes the errors out of `self`, leaving the (copied) state behind.
    pub fn take(&mut self) -> Self {
        Self {
            error_result: self.error_result.take(),
            errors: std::mem::take(&mut self.errors),
            state: self.state,
        }
    }
}

impl JobStatus {
    /// Converts a final status into a [`Result`], pulling out the main error
    /// if one exists.
    pub fn into_result(self) -> crate::Result<()> {
        match (self.error_result, self.errors) {
            (None, errors) if errors.is_empty() => Ok(()),
            (Some(main), misc) => Err(crate::Error::Job { main, misc }),
            (None, mut errors) => {
                let main = errors.swap_remove(0);
                Err(crate::Error::Job {
                    main,
                    misc: errors,
                })
            }
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Running,
    Done,
}

impl JobState {
    #[inline]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Timestamps are epoch milliseconds, sizes are bytes. All of it is
/// output-only and string encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatistics {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "util::int64::optional"
    )]
    pub creation_time: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "util::int64::optional"
    )]
    pub start_time: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "util::int64::optional"
    )]
    pub end_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadStatistics>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStatistics {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "util::int64::optional"
    )]
    pub input_files: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "util::int64::optional"
    )]
    pub input_file_bytes: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "util::int64::optional"
    )]
    pub output_rows: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "util::int64::optional"
    )]
    pub output_bytes: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "util::int64::optional"
    )]
    pub bad_records: Option<u64>,
}
