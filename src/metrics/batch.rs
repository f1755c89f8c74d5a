/// Batch processing of raw records
///
/// Records are independent, so they fan out over rayon workers. Each record
/// either becomes a `MetricRecord` or a `RecordFailure`; nothing a single
/// record does can abort the batch.
use super::assembler::MetricAssembler;
use super::types::{ MetricRecord, RawRecord };
use crate::arguments::is_debug_batch_enabled;
use crate::config::BatchConfig;
use crate::errors::RecordFailure;
use crate::logger::{ self, LogTag };
use rayon::prelude::*;
use std::time::Instant;

/// Outcome of one batch, successes and failures both sorted
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub records: Vec<MetricRecord>,
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    /// Percentage of records that assembled successfully (100 for an empty batch)
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 100.0;
        }
        ((self.records.len() as f64) / (total as f64)) * 100.0
    }
}

/// Process a batch on rayon's global pool
pub fn process_batch(assembler: &MetricAssembler, records: &[RawRecord]) -> BatchReport {
    let start = Instant::now();

    let outcomes: Vec<Result<MetricRecord, RecordFailure>> = records
        .par_iter()
        .map(|record| assembler.assemble(record))
        .collect();

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(record) => report.records.push(record),
            Err(failure) => report.failures.push(failure),
        }
    }

    report.records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    report.failures.sort_by(|a, b| {
        (&a.protocol_id, &a.market_id).cmp(&(&b.protocol_id, &b.market_id))
    });

    logger::info(
        LogTag::Batch,
        &format!(
            "Batch complete: {}/{} records assembled ({:.1}% success) in {}ms",
            report.records.len(),
            report.total(),
            report.success_rate(),
            start.elapsed().as_millis()
        )
    );

    if is_debug_batch_enabled() {
        for failure in &report.failures {
            logger::debug(
                LogTag::Batch,
                &format!("Failed [{}] {}", failure.error.kind(), failure)
            );
        }
    }

    report
}

/// Process a batch, on a dedicated pool when `worker_threads > 0`
///
/// Falls back to the global pool if the dedicated one cannot be built.
pub fn process_batch_with(
    assembler: &MetricAssembler,
    records: &[RawRecord],
    config: &BatchConfig
) -> BatchReport {
    if config.worker_threads == 0 {
        return process_batch(assembler, records);
    }

    match rayon::ThreadPoolBuilder::new().num_threads(config.worker_threads).build() {
        Ok(pool) => {
            if is_debug_batch_enabled() {
                logger::debug(
                    LogTag::Batch,
                    &format!("Using dedicated pool with {} workers", config.worker_threads)
                );
            }
            pool.install(|| process_batch(assembler, records))
        }
        Err(e) => {
            logger::warning(
                LogTag::Batch,
                &format!("Failed to build {}-thread pool, using global pool: {}", config.worker_threads, e)
            );
            process_batch(assembler, records)
        }
    }
}
