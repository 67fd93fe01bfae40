//! Hand rolled client for the parts of the BigQuery v2 REST API involved in
//! provisioning datasets and bulk loading newline delimited JSON files into
//! tables.
//!
//! ```no_run
//! use bigquery_rest::{BigQueryClient, LoadFile, Scope};
//!
//! # async fn wrapper() -> bigquery_rest::Result<()> {
//! let client = BigQueryClient::new("my-project", Scope::BigQueryAdmin).await?;
//!
//! let table = client.dataset("my_dataset").table("events");
//!
//! let mut job = table.load_file("./data/events.json", LoadFile::default()).await?;
//! job.wait_until_done(
//!     bigquery_rest::DEFAULT_POLL_FREQUENCY,
//!     bigquery_rest::DEFAULT_TIMEOUT,
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod dataset;
pub mod error;
mod job;
mod multipart;
pub mod resources;
mod table;
mod util;

pub use auth::{Auth, Scope};
pub use client::BigQueryClient;
pub use dataset::{DatasetClient, DeleteDataset};
pub use error::Error;
pub use job::{ActiveJob, DEFAULT_POLL_FREQUENCY, DEFAULT_TIMEOUT};
pub use table::{LoadFile, TableClient};

/// Type alias to [`core::result::Result<T, Error>`].
pub type Result<T> = core::result::Result<T, Error>;
