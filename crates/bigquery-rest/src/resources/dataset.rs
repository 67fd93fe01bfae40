use std::collections::HashMap;

use super::DatasetReference;
use crate::util;

/// <https://cloud.google.com/bigquery/docs/reference/rest/v2/datasets#Dataset>
///
/// Only covers the fields this crate reads or writes, the service accepts
/// plenty more.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset<S = Box<str>> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<S>,
    pub dataset_reference: DatasetReference<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<S>,
    /// Geographic location of the dataset. The service only honors this on
    /// creation, afterwards it's output-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<Box<str>, S>>,
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
    pub last_modified_time: Option<u64>,
}

impl Dataset {
    pub fn new(dataset_reference: DatasetReference) -> Self {
        Self {
            kind: None,
            etag: None,
            id: None,
            self_link: None,
            dataset_reference,
            friendly_name: None,
            description: None,
            location: None,
            labels: None,
            creation_time: None,
            last_modified_time: None,
        }
    }

    pub fn location(mut self, location: impl Into<Box<str>>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn description(mut self, description: impl Into<Box<str>>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> DatasetReference {
        DatasetReference {
            dataset_id: "sensor_readings".into(),
            project_id: "test-project".into(),
        }
    }

    #[test]
    fn insert_body_only_carries_set_fields() {
        let dataset = Dataset::new(reference())
            .location("US")
            .description("raw sensor dumps");

        let encoded = serde_json::to_value(&dataset).unwrap();

        let expected = serde_json::json!({
            "datasetReference": {
                "datasetId": "sensor_readings",
                "projectId": "test-project",
            },
            "description": "raw sensor dumps",
            "location": "US",
        });

        assert_eq!(encoded, expected);
    }

    // response shape from a real `datasets.insert` call, trimmed down
    const INSERT_RESPONSE: &str = r#"{
        "kind": "bigquery#dataset",
        "etag": "Jtu6pAFsjhDzKot4KuUnzg==",
        "id": "test-project:sensor_readings",
        "selfLink": "https://bigquery.googleapis.com/bigquery/v2/projects/test-project/datasets/sensor_readings",
        "datasetReference": {
            "datasetId": "sensor_readings",
            "projectId": "test-project"
        },
        "description": "raw sensor dumps",
        "access": [
            {
                "role": "OWNER",
                "specialGroup": "projectOwners"
            }
        ],
        "creationTime": "1706751502132",
        "lastModifiedTime": "1706751502132",
        "location": "US",
        "type": "DEFAULT"
    }"#;

    #[test]
    fn deserializes_insert_response() {
        let dataset: Dataset = serde_json::from_str(INSERT_RESPONSE).unwrap();

        assert_eq!(dataset.dataset_reference, reference());
        assert_eq!(dataset.location.as_deref(), Some("US"));
        assert_eq!(dataset.creation_time, Some(1706751502132));
        assert_eq!(dataset.dataset_reference.to_string(), "test-project.sensor_readings");
    }
}
