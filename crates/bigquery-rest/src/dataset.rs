use std::sync::Arc;

use reqwest::{Response, Url};

use crate::client::{BigQueryClient, InnerClient, deserialize_json};
use crate::resources::{Dataset, DatasetReference};
use crate::table::TableClient;

/// Client scoped to a single dataset within the project.
#[derive(Debug, Clone)]
pub struct DatasetClient<D> {
    dataset_id: D,
    inner: Arc<InnerClient>,
}

/// Options for [`DatasetClient::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteDataset {
    /// Also drop every table in the dataset. Without this, deleting a
    /// non-empty dataset fails with a bad request error.
    pub delete_contents: bool,
    /// Treat an already absent dataset as a successful delete.
    pub not_found_ok: bool,
}

impl<D> DatasetClient<D> {
    pub(crate) const fn from_parts(dataset_id: D, inner: Arc<InnerClient>) -> Self {
        Self { dataset_id, inner }
    }

    /// Returns a handle to the project wide client.
    pub fn client(&self) -> BigQueryClient {
        BigQueryClient {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn table<T>(&self, table_id: T) -> TableClient<D, T>
    where
        D: Clone,
    {
        TableClient::from_parts(
            self.dataset_id.clone(),
            table_id,
            Arc::clone(&self.inner),
        )
    }
}

impl<D: AsRef<str>> DatasetClient<D> {
    #[inline]
    pub fn dataset_id(&self) -> &str {
        self.dataset_id.as_ref()
    }

    pub fn dataset_reference(&self) -> DatasetReference {
        DatasetReference {
            dataset_id: self.dataset_id.as_ref().into(),
            project_id: self.inner.project_id().into(),
        }
    }

    /// Calls `datasets.insert`. The referenced dataset must not already
    /// exist, a conflict comes back as
    /// [`Error::AlreadyExists`](crate::Error::AlreadyExists).
    pub async fn create(&self, dataset: Dataset) -> crate::Result<Dataset> {
        let url = self.inner.make_url(["datasets"]);

        let response = self.inner.post(url, &dataset).await?;
        deserialize_json(response).await
    }

    /// Calls `datasets.get`.
    pub async fn get(&self) -> crate::Result<Dataset> {
        let url = self.inner.make_url(["datasets", self.dataset_id.as_ref()]);

        let response = self.inner.get(url).await?;
        deserialize_json(response).await
    }

    /// Calls `datasets.delete`, returning whether a dataset was actually
    /// there to delete.
    pub async fn delete(&self, options: DeleteDataset) -> crate::Result<bool> {
        let mut url = self.inner.make_url(["datasets", self.dataset_id.as_ref()]);
        apply_delete_options(&mut url, options);

        delete_outcome(self.inner.delete(url).await, options)
    }
}

fn apply_delete_options(url: &mut Url, options: DeleteDataset) {
    if options.delete_contents {
        url.query_pairs_mut()
            .append_pair("deleteContents", "true")
            .finish();
    }
}

/// Maps the raw `datasets.delete` outcome to "was there a dataset to
/// delete", absorbing a not found error when `options` allow it.
fn delete_outcome(
    result: crate::Result<Response>,
    options: DeleteDataset,
) -> crate::Result<bool> {
    match result {
        Ok(_response) => Ok(true),
        Err(crate::Error::NotFound(_)) if options.not_found_ok => Ok(false),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::auth::Scope;
    use crate::error::ErrorPayload;

    fn dataset_url() -> Url {
        Url::parse(
            "https://bigquery.googleapis.com/bigquery/v2/projects/test-project/datasets/sensor_readings",
        )
        .unwrap()
    }

    fn not_found() -> crate::Error {
        const BODY: &[u8] = br#"{
            "error": {
                "code": 404,
                "message": "Not found: Dataset test-project:sensor_readings",
                "errors": [
                    {
                        "message": "Not found: Dataset test-project:sensor_readings",
                        "domain": "global",
                        "reason": "notFound"
                    }
                ]
            }
        }"#;

        crate::Error::NotFound(ErrorPayload::from_raw_parts(
            StatusCode::NOT_FOUND,
            Bytes::from_static(BODY),
        ))
    }

    #[test]
    fn delete_contents_rides_the_query_string() {
        let mut url = dataset_url();
        apply_delete_options(
            &mut url,
            DeleteDataset {
                delete_contents: true,
                not_found_ok: false,
            },
        );

        assert_eq!(url.query(), Some("deleteContents=true"));
    }

    #[test]
    fn plain_deletes_carry_no_query() {
        let mut url = dataset_url();
        apply_delete_options(&mut url, DeleteDataset::default());

        assert_eq!(url.query(), None);
    }

    #[test]
    fn successful_deletes_report_true() {
        let response = Response::from(http::Response::builder().status(204).body("").unwrap());

        assert!(matches!(
            delete_outcome(Ok(response), DeleteDataset::default()),
            Ok(true)
        ));
    }

    #[test]
    fn absent_datasets_only_pass_with_not_found_ok() {
        let allow = DeleteDataset {
            delete_contents: false,
            not_found_ok: true,
        };
        assert!(matches!(delete_outcome(Err(not_found()), allow), Ok(false)));

        let strict = DeleteDataset::default();
        assert!(matches!(
            delete_outcome(Err(not_found()), strict),
            Err(crate::Error::NotFound(_))
        ));
    }

    #[tokio::test]
    #[ignore = "needs GCP credentials"]
    async fn dataset_create_get_delete_cycle() -> crate::Result<()> {
        let client = BigQueryClient::new_detect_project(Scope::BigQueryAdmin).await?;

        let dataset_client = client.dataset("bigquery_rest_dataset_cycle_test");

        let dataset = Dataset::new(dataset_client.dataset_reference())
            .location("US")
            .description("integration test dataset, safe to delete");

        let created = dataset_client.create(dataset).await?;
        assert_eq!(created.dataset_reference, dataset_client.dataset_reference());

        // creating again must conflict
        let conflict = dataset_client
            .create(
                Dataset::new(dataset_client.dataset_reference()).location("US"),
            )
            .await;
        assert!(matches!(conflict, Err(crate::Error::AlreadyExists(_))));

        let fetched = dataset_client.get().await?;
        assert_eq!(fetched.location.as_deref(), Some("US"));

        let deleted = dataset_client
            .delete(DeleteDataset {
                delete_contents: true,
                not_found_ok: false,
            })
            .await?;
        assert!(deleted);

        // and a second delete only passes with not_found_ok
        let deleted = dataset_client
            .delete(DeleteDataset {
                delete_contents: false,
                not_found_ok: true,
            })
            .await?;
        assert!(!deleted);

        Ok(())
    }
}
