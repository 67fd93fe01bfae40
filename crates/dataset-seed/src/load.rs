use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use bigquery_rest::resources::job::WriteDisposition;
use bigquery_rest::{BigQueryClient, DEFAULT_POLL_FREQUENCY, DEFAULT_TIMEOUT, LoadFile};

use crate::GcpArgs;

#[derive(Debug, clap::Args)]
pub struct LoadTablesArgs {
    #[command(flatten)]
    pub gcp: GcpArgs,

    /// Directory holding one newline delimited .json file per table.
    #[arg(long, env = "BQ_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Whether loaded rows append to or replace existing table contents.
    #[arg(long, value_enum, default_value_t = WriteMode::Append)]
    pub write_disposition: WriteMode,

    /// Upper bound, in seconds, on waiting for any single load job.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WriteMode {
    /// Add the rows to whatever the table already holds.
    Append,
    /// Replace the table contents with the loaded rows.
    Truncate,
}

impl From<WriteMode> for WriteDisposition {
    fn from(mode: WriteMode) -> Self {
        match mode {
            WriteMode::Append => WriteDisposition::WriteAppend,
            WriteMode::Truncate => WriteDisposition::WriteTruncate,
        }
    }
}

/// Loads every discovered file, sequentially, bailing on the first job that
/// fails or times out.
pub async fn run(client: &BigQueryClient, args: LoadTablesArgs) -> anyhow::Result<()> {
    let sources = discover_sources(&args.data_dir)
        .with_context(|| format!("failed to scan '{}'", args.data_dir.display()))?;

    if sources.is_empty() {
        tracing::warn!(data_dir = %args.data_dir.display(), "no .json files to load");
        return Ok(());
    }

    let dataset_client = client.dataset(args.gcp.dataset.as_str());
    let timeout = Duration::from_secs(args.timeout_secs);

    for source in &sources {
        let table_client = dataset_client.table(source.table_id.as_str());

        tracing::info!(
            file = %source.path.display(),
            table = %source.table_id,
            "starting load job",
        );

        let options = LoadFile {
            location: Some(args.gcp.location.as_str().into()),
            write_disposition: args.write_disposition.into(),
            ..LoadFile::default()
        };

        let mut job = table_client
            .load_file(&source.path, options)
            .await
            .with_context(|| {
                format!("failed to submit load job for '{}'", source.path.display())
            })?;

        tracing::debug!(job_id = job.job_id(), location = job.location(), "job submitted");

        job.wait_until_done(DEFAULT_POLL_FREQUENCY, timeout)
            .await
            .with_context(|| format!("load job for '{}' failed", source.path.display()))?;

        let rows = job.output_rows().unwrap_or(0);
        println!(
            "Loaded {rows} rows into {}:{}.",
            args.gcp.dataset, source.table_id
        );
    }

    Ok(())
}

/// A file worth loading, and the table it should land in.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableSource {
    path: PathBuf,
    table_id: String,
}

/// Scans `dir` (non-recursively) for `.json` files, one table per file. The
/// table name is the file name minus that final extension, so `visits.json`
/// loads into `visits` and `visits.v2.json` into `visits.v2`.
///
/// Anything else in the directory is skipped with a warning rather than
/// failing the batch. The result is sorted by file name so runs are
/// deterministic regardless of directory iteration order.
fn discover_sources(dir: &Path) -> std::io::Result<Vec<TableSource>> {
    let mut sources = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if !path.is_file() {
            tracing::warn!(path = %path.display(), "skipping non-file entry");
            continue;
        }

        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            tracing::warn!(path = %path.display(), "skipping non-json file");
            continue;
        }

        let Some(table_id) = path.file_stem().and_then(|stem| stem.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping file with a non-utf8 name");
            continue;
        };

        sources.push(TableSource {
            table_id: table_id.to_owned(),
            path,
        });
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(sources)
}
