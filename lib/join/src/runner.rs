//! Local execution of the pairwise join
//!
//! Runs the three stages in process: fan-out, routing and grouping, then
//! per-group comparison. Fan-out and comparison run on a dedicated rayon
//! pool; every group gets its own counters which are merged at the end.

use crate::comparator::PairwiseComparator;
use crate::config::JobConfig;
use crate::output::ComparisonOutput;
use pairsim_core::{
    BucketKeyAssigner, Counters, Error, FieldSplitter, PairGroup, PairGroupRouter, Record, Result,
    TaggedRecord,
};
use pairsim_similarity::{DistanceEngine, Schema};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Cooperative cancellation flag shared with the caller
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of one run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Qualifying pairs sorted by `(first_id, second_id)`
    pub outputs: Vec<ComparisonOutput>,
    pub counters: Counters,
    /// Number of pair groups formed
    pub groups: usize,
    /// Number of fan-out copies emitted
    pub copies: usize,
}

pub struct LocalRunner {
    assigner: BucketKeyAssigner,
    router: PairGroupRouter,
    comparator: PairwiseComparator,
    splitter: FieldSplitter,
    pool: ThreadPool,
    cancel: CancellationToken,
}

impl LocalRunner {
    /// Build a runner from a schema and a job config
    pub fn new(schema: Schema, config: &JobConfig) -> Result<Self> {
        config.validate()?;
        let schema = config.apply_to_schema(schema);
        let engine = DistanceEngine::new(Arc::new(schema), config.engine_options())?;
        Self::from_engine(Arc::new(engine), config)
    }

    /// Build a runner around an existing engine, e.g. one with custom
    /// text or structured-attribute collaborators
    pub fn from_engine(engine: Arc<DistanceEngine>, config: &JobConfig) -> Result<Self> {
        config.validate()?;

        let assigner = BucketKeyAssigner::new(config.bucket_count, engine.layout())?;
        let router = PairGroupRouter::new(config.num_partitions);
        let comparator = PairwiseComparator::new(
            engine,
            config.effective_dist_threshold(),
            config.inter_set_prefix(),
        );
        let splitter = FieldSplitter::new(&config.field_delim_regex)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.parallelism.unwrap_or(0))
            .thread_name(|i| format!("pairsim-group-{}", i))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to start worker pool: {}", e)))?;

        Ok(Self {
            assigner,
            router,
            comparator,
            splitter,
            pool,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn engine(&self) -> &Arc<DistanceEngine> {
        self.comparator.engine()
    }

    /// Split input lines into records, ignoring blank lines
    pub fn parse_records<R: BufRead>(&self, reader: R) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(self.splitter.record(&line));
        }
        Ok(records)
    }

    /// Replicate every record under its `bucket_count` pair keys
    pub fn fan_out(&self, records: Vec<Record>) -> Result<Vec<TaggedRecord>> {
        let per_record: Vec<Vec<TaggedRecord>> = self.pool.install(|| {
            records
                .into_par_iter()
                .map(|record| self.assigner.assign(Arc::new(record)))
                .collect::<Result<_>>()
        })?;
        Ok(per_record.into_iter().flatten().collect())
    }

    pub fn run_reader<R: BufRead>(&self, reader: R) -> Result<RunReport> {
        let records = self.parse_records(reader)?;
        self.run(records)
    }

    pub fn run(&self, records: Vec<Record>) -> Result<RunReport> {
        let started = Instant::now();
        let record_count = records.len();
        self.check_cancelled()?;

        let copies = self.fan_out(records)?;
        let copy_count = copies.len();
        debug!(records = record_count, copies = copy_count, "fan-out complete");

        let partitions = self.router.route(copies);
        let groups: Vec<PairGroup> = self.pool.install(|| {
            partitions
                .into_par_iter()
                .flat_map_iter(|partition| self.router.group(partition))
                .collect()
        });
        debug!(
            partitions = self.router.num_partitions(),
            groups = groups.len(),
            "grouping complete"
        );

        let results: Vec<(Vec<ComparisonOutput>, Counters)> = self.pool.install(|| {
            groups
                .par_iter()
                .map(|group| -> Result<(Vec<ComparisonOutput>, Counters)> {
                    self.check_cancelled()?;
                    let mut counters = Counters::new();
                    let outputs = self.comparator.compare_group(group, &mut counters)?;
                    Ok((outputs, counters))
                })
                .collect::<Result<_>>()
        })?;

        let mut report = RunReport {
            groups: groups.len(),
            copies: copy_count,
            ..RunReport::default()
        };
        for (outputs, counters) in results {
            report.outputs.extend(outputs);
            report.counters.merge(counters);
        }
        report
            .outputs
            .sort_by(|a, b| (&a.first_id, &a.second_id).cmp(&(&b.first_id, &b.second_id)));

        info!(
            records = record_count,
            groups = report.groups,
            evaluated = report.counters.pairs_evaluated,
            emitted = report.outputs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "run complete"
        );
        Ok(report)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            warn!("run cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}
