//! CLI for standing up a BigQuery dataset and bulk loading local newline
//! delimited JSON files into its tables, one table per file.

use bigquery_rest::{BigQueryClient, Scope};
use clap::Parser;

mod load;
mod provision;

#[derive(Debug, Parser)]
#[command(
    name = "dataset-seed",
    version,
    about = "Provision a BigQuery dataset and bulk load NDJSON files into its tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Create the target dataset.
    CreateDataset(provision::CreateDatasetArgs),
    /// Load every .json file in a directory into a table named after it.
    LoadTables(load::LoadTablesArgs),
}

/// Flags every subcommand takes.
#[derive(Debug, clap::Args)]
struct GcpArgs {
    /// GCP project id. Defaults to the project the ambient credentials
    /// resolve to.
    #[arg(long, env = "BQ_PROJECT")]
    project: Option<String>,

    /// Dataset id to operate on.
    #[arg(long, env = "BQ_DATASET")]
    dataset: String,

    /// Geographic location datasets and load jobs are placed in.
    #[arg(long, env = "BQ_LOCATION", default_value = "US")]
    location: String,
}

async fn connect(gcp: &GcpArgs) -> anyhow::Result<BigQueryClient> {
    let client = match gcp.project.as_deref() {
        Some(project) => BigQueryClient::new(project, Scope::BigQueryAdmin).await?,
        None => BigQueryClient::new_detect_project(Scope::BigQueryAdmin).await?,
    };

    tracing::debug!(project = client.project_id(), "resolved BigQuery client");

    Ok(client)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::CreateDataset(args) => {
            let client = connect(&args.gcp).await?;
            provision::run(&client, args).await
        }
        Command::LoadTables(args) => {
            let client = connect(&args.gcp).await?;
            load::run(&client, args).await
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn load_tables_defaults() {
        let cli = Cli::try_parse_from([
            "dataset-seed",
            "load-tables",
            "--project",
            "test-project",
            "--dataset",
            "sensor_readings",
        ])
        .unwrap();

        match cli.command {
            Command::LoadTables(args) => {
                assert_eq!(args.gcp.location, "US");
                assert_eq!(args.timeout_secs, 300);
                assert_eq!(args.write_disposition, load::WriteMode::Append);
                assert_eq!(args.data_dir, std::path::PathBuf::from("./data"));
            }
            other => panic!("parsed into the wrong subcommand: {other:?}"),
        }
    }

    #[test]
    fn create_dataset_parses_every_flag() {
        let cli = Cli::try_parse_from([
            "dataset-seed",
            "create-dataset",
            "--dataset",
            "sensor_readings",
            "--location",
            "EU",
            "--description",
            "seeded from local dumps",
            "--if-exists",
            "skip",
        ])
        .unwrap();

        match cli.command {
            Command::CreateDataset(args) => {
                assert_eq!(args.gcp.dataset, "sensor_readings");
                assert_eq!(args.gcp.location, "EU");
                assert_eq!(args.description.as_deref(), Some("seeded from local dumps"));
                assert_eq!(args.if_exists, provision::IfExists::Skip);
            }
            other => panic!("parsed into the wrong subcommand: {other:?}"),
        }
    }
}
