use anyhow::Context;
use bigquery_rest::resources::Dataset;
use bigquery_rest::{BigQueryClient, Error};

use crate::GcpArgs;

#[derive(Debug, clap::Args)]
pub struct CreateDatasetArgs {
    #[command(flatten)]
    pub gcp: GcpArgs,

    /// Free text description attached to the dataset.
    #[arg(long)]
    pub description: Option<String>,

    /// What to do when the dataset already exists.
    #[arg(long, value_enum, default_value_t = IfExists::Error)]
    pub if_exists: IfExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IfExists {
    /// Fail with the service's conflict error.
    Error,
    /// Treat the conflict as success and report the existing dataset.
    Skip,
}

pub async fn run(client: &BigQueryClient, args: CreateDatasetArgs) -> anyhow::Result<()> {
    let dataset_client = client.dataset(args.gcp.dataset.as_str());

    let mut dataset = Dataset::new(dataset_client.dataset_reference())
        .location(args.gcp.location.as_str());

    if let Some(description) = args.description.as_deref() {
        dataset = dataset.description(description);
    }

    match dataset_client.create(dataset).await {
        Ok(created) => {
            println!("Created dataset {}", created.dataset_reference);
        }
        Err(Error::AlreadyExists(payload)) if args.if_exists == IfExists::Skip => {
            tracing::info!(%payload, "dataset already exists, skipping creation");

            let existing = dataset_client
                .get()
                .await
                .context("failed to fetch the existing dataset")?;

            println!("Dataset {} already exists", existing.dataset_reference);
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to create dataset '{}'", args.gcp.dataset));
        }
    }

    Ok(())
}
