use anyhow::Context;
use clap::Parser;
use pairsim::{JobConfig, LocalRunner, MissingValuePolicy, OutputFormat, OutputWriter, RunReport, Schema};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// All-pairs similarity over delimited records
#[derive(Parser, Debug)]
#[command(name = "pairsim")]
#[command(about = "Score every pair of same-type records against a field schema", long_about = None)]
struct Args {
    /// Field schema (JSON)
    #[arg(short, long)]
    schema: PathBuf,

    /// Input records, one per line; reads stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file; writes stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Job config (JSON); options given here take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of hash buckets (even)
    #[arg(long)]
    bucket_count: Option<usize>,

    /// Number of partitions for the group stage
    #[arg(long)]
    num_partitions: Option<usize>,

    /// Worker threads
    #[arg(long)]
    parallelism: Option<usize>,

    /// Field delimiter pattern
    #[arg(long)]
    field_delim: Option<String>,

    /// Sub-field delimiter pattern for structured attributes
    #[arg(long)]
    sub_field_delim: Option<String>,

    /// Output value separator
    #[arg(long)]
    output_delim: Option<String>,

    /// Score of maximally distant records
    #[arg(long)]
    scale: Option<u32>,

    /// Highest score written to the output
    #[arg(long)]
    dist_threshold: Option<u32>,

    /// Relative difference above which unranged numbers count as different
    #[arg(long)]
    numeric_diff_threshold: Option<f64>,

    /// Missing value handling: default or skip
    #[arg(long)]
    missing_value_policy: Option<MissingValuePolicy>,

    /// Comma-separated ordinals that take part in the distance
    #[arg(long, value_delimiter = ',')]
    faceted_fields: Option<Vec<usize>>,

    /// Append non-participating values to every output line
    #[arg(long)]
    include_passive_fields: bool,

    /// Write the id pair after the passive values
    #[arg(long)]
    ids_last: bool,

    /// Only pair the same entity across different source sets
    #[arg(long)]
    inter_set_matching: bool,

    /// Length of the source-set prefix of every id
    #[arg(long)]
    set_id_size: Option<usize>,

    /// Write JSON lines instead of delimited text
    #[arg(long)]
    json: bool,

    /// Write run counters as JSON to this file
    #[arg(long)]
    counters: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn job_config(&self) -> anyhow::Result<JobConfig> {
        let mut config = match &self.config {
            Some(path) => JobConfig::load(path)
                .with_context(|| format!("failed to load config {:?}", path))?,
            None => JobConfig::default(),
        };

        if let Some(v) = self.bucket_count {
            config.bucket_count = v;
        }
        if let Some(v) = self.num_partitions {
            config.num_partitions = v;
        }
        if let Some(v) = self.parallelism {
            config.parallelism = Some(v);
        }
        if let Some(v) = &self.field_delim {
            config.field_delim_regex = v.clone();
        }
        if let Some(v) = &self.sub_field_delim {
            config.sub_field_delim_regex = v.clone();
        }
        if let Some(v) = &self.output_delim {
            config.output_delim = v.clone();
        }
        if let Some(v) = self.scale {
            config.scale = v;
        }
        if let Some(v) = self.dist_threshold {
            config.dist_threshold = Some(v);
        }
        if let Some(v) = self.numeric_diff_threshold {
            config.numeric_diff_threshold = Some(v);
        }
        if let Some(v) = self.missing_value_policy {
            config.missing_value_policy = Some(v);
        }
        if let Some(v) = &self.faceted_fields {
            config.faceted_fields = Some(v.clone());
        }
        if let Some(v) = self.set_id_size {
            config.set_id_size = v;
        }
        config.include_passive_fields |= self.include_passive_fields;
        config.inter_set_matching |= self.inter_set_matching;
        if self.ids_last {
            config.output_id_first = false;
        }
        if self.json {
            config.output_format = OutputFormat::Json;
        }

        config.validate()?;
        Ok(config)
    }
}

fn write_outputs<W: Write>(inner: W, config: &JobConfig, report: &RunReport) -> io::Result<usize> {
    let mut writer = OutputWriter::new(
        inner,
        config.output_format,
        &config.output_delim,
        config.output_id_first,
    );
    writer.write_all(&report.outputs)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout may carry the output records
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting pairsim v{}", env!("CARGO_PKG_VERSION"));

    let config = args.job_config()?;
    let schema = Schema::load(&args.schema)
        .with_context(|| format!("failed to load schema {:?}", args.schema))?;
    info!(
        "Schema: {} fields, bucket count {}, threshold {}",
        schema.fields.len(),
        config.bucket_count,
        config.effective_dist_threshold()
    );

    let runner = LocalRunner::new(schema, &config)?;
    let cancel = runner.cancellation_token();

    let input = args.input.clone();
    let mut job = tokio::task::spawn_blocking(move || -> anyhow::Result<RunReport> {
        let report = match input {
            Some(path) => {
                let file = File::open(&path).with_context(|| format!("failed to open input {:?}", path))?;
                runner.run_reader(BufReader::new(file))?
            }
            None => runner.run_reader(io::stdin().lock())?,
        };
        Ok(report)
    });

    let report = tokio::select! {
        result = &mut job => result??,
        _ = tokio::signal::ctrl_c() => {
            warn!("Shutdown signal received, cancelling run");
            cancel.cancel();
            job.await??
        }
    };

    let written = match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create output {:?}", path))?;
            write_outputs(BufWriter::new(file), &config, &report)?
        }
        None => write_outputs(io::stdout().lock(), &config, &report)?,
    };

    if let Some(path) = &args.counters {
        let file = File::create(path).with_context(|| format!("failed to create counters file {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report.counters)?;
    }

    let counters = &report.counters;
    info!(
        "Wrote {} pairs from {} groups ({} evaluated, {} same-id skipped, {} vetoed, {} inter-set rejected, {} missing, {} malformed)",
        written,
        report.groups,
        counters.pairs_evaluated,
        counters.same_id_pairs,
        counters.threshold_vetoes,
        counters.inter_set_mismatches,
        counters.total_missing(),
        counters.total_malformed()
    );
    Ok(())
}
