use crate::resources::TableReference;
use crate::util;

/// <https://cloud.google.com/bigquery/docs/reference/rest/v2/Job#JobConfigurationLoad>
///
/// Source URIs are deliberately absent, jobs built from this always carry
/// their data inline via a media upload.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationLoad<S = Box<str>> {
    pub destination_table: TableReference<S>,
    #[serde(default)]
    pub create_disposition: CreateDisposition,
    #[serde(default)]
    pub write_disposition: WriteDisposition,
    #[serde(flatten)]
    pub source_format: SourceFormat,
    #[serde(default, skip_serializing_if = "util::is_false")]
    pub ignore_unknown_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bad_records: Option<usize>,
}

impl<S> JobConfigurationLoad<S> {
    pub fn new(destination_table: TableReference<S>, source_format: SourceFormat) -> Self {
        Self {
            destination_table,
            create_disposition: CreateDisposition::default(),
            write_disposition: WriteDisposition::default(),
            source_format,
            ignore_unknown_values: false,
            max_bad_records: None,
        }
    }

    /// Replaces the destination table contents instead of appending to them.
    pub fn write_truncate(mut self) -> Self {
        self.write_disposition = WriteDisposition::WriteTruncate;
        self
    }
}

/// The format of the uploaded bytes. Flattened into the load configuration,
/// so format specific options like `autodetect` end up as siblings of the
/// `sourceFormat` key itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "sourceFormat")]
pub enum SourceFormat {
    NewlineDelimitedJson {
        /// Have the service infer the table schema from the data itself.
        #[serde(default, skip_serializing_if = "util::is_false")]
        autodetect: bool,
    },
    Avro,
    Parquet,
    Orc,
}

impl Default for SourceFormat {
    fn default() -> Self {
        Self::NewlineDelimitedJson { autodetect: true }
    }
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteDisposition {
    /// Appends the loaded rows to whatever the table already holds.
    #[default]
    WriteAppend,
    /// Atomically replaces the table contents with the loaded rows.
    WriteTruncate,
    /// Fails the job unless the table is empty.
    WriteEmpty,
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateDisposition {
    /// Creates the destination table when it doesn't already exist.
    #[default]
    CreateIfNeeded,
    /// Requires the destination table to already exist.
    CreateNever,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination() -> TableReference {
        TableReference {
            dataset_id: "sensor_readings".into(),
            project_id: "test-project".into(),
            table_id: "visits".into(),
        }
    }

    #[test]
    fn source_format_flattens_next_to_its_options() {
        let config = JobConfigurationLoad::new(
            destination(),
            SourceFormat::NewlineDelimitedJson { autodetect: true },
        );

        let encoded = serde_json::to_value(&config).unwrap();

        assert_eq!(encoded["sourceFormat"], "NEWLINE_DELIMITED_JSON");
        assert_eq!(encoded["autodetect"], true);
        assert_eq!(encoded["writeDisposition"], "WRITE_APPEND");
        assert_eq!(encoded["createDisposition"], "CREATE_IF_NEEDED");
    }

    #[test]
    fn unit_formats_omit_autodetect() {
        let config = JobConfigurationLoad::new(destination(), SourceFormat::Avro);

        let encoded = serde_json::to_value(&config).unwrap();

        assert_eq!(encoded["sourceFormat"], "AVRO");
        assert!(encoded.get("autodetect").is_none());
    }

    #[test]
    fn missing_dispositions_deserialize_to_the_service_defaults() {
        const ECHOED: &str = r#"{
            "sourceFormat": "NEWLINE_DELIMITED_JSON",
            "destinationTable": {
                "projectId": "test-project",
                "datasetId": "sensor_readings",
                "tableId": "visits"
            },
            "autodetect": true
        }"#;

        let config: JobConfigurationLoad = serde_json::from_str(ECHOED).unwrap();

        assert_eq!(config.create_disposition, CreateDisposition::CreateIfNeeded);
        assert_eq!(config.write_disposition, WriteDisposition::WriteAppend);
        assert_eq!(
            config.source_format,
            SourceFormat::NewlineDelimitedJson { autodetect: true }
        );
    }
}
