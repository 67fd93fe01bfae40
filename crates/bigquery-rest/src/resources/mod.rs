//! Rust definitions for the BigQuery v2 REST resource types this crate
//! interacts with.
//!
//! Everything is generic over the inner string type, defaulting to
//! [`Box<str>`] since we rarely mutate anything in place.

use core::fmt;

pub mod dataset;
pub mod job;

pub use dataset::Dataset;
pub use job::Job;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "camelCase")]
pub struct TableReference<S = Box<str>> {
    pub dataset_id: S,
    pub project_id: S,
    pub table_id: S,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReference<S = Box<str>> {
    pub dataset_id: S,
    pub project_id: S,
}

impl<S> DatasetReference<S> {
    pub fn into_table(self, table_id: S) -> TableReference<S> {
        TableReference {
            dataset_id: self.dataset_id,
            project_id: self.project_id,
            table_id,
        }
    }
}

impl<S: fmt::Display> fmt::Display for DatasetReference<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.project_id, self.dataset_id)
    }
}

/// An error as reported within a [`Job`], as opposed to one in an HTTP error
/// response body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorProto<S = Box<str>> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<S>,
    pub message: S,
}

impl<S: fmt::Display> fmt::Display for ErrorProto<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason.as_ref() {
            Some(reason) => write!(f, "{}: {}", self.message, reason),
            None => write!(f, "{}", self.message),
        }
    }
}
