//! Ingestion counters, registered in the default prometheus registry

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Stream rows written by ingestion: inserted, updated, deleted, flushed
    pub static ref STREAMS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ingest_streams_total",
        "Stream rows written by ingestion",
        &["op"]
    )
    .unwrap();

    /// Entries skipped while ingesting: m3u, xtream, backup
    pub static ref SKIPPED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ingest_skipped_total",
        "Malformed entries skipped during ingestion",
        &["kind"]
    )
    .unwrap();

    /// Finished ingestion runs by source and result
    pub static ref RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ingest_runs_total",
        "Finished ingestion runs",
        &["source", "result"]
    )
    .unwrap();
}

pub fn record_run(source: &str, ok: bool) {
    RUNS_TOTAL
        .with_label_values(&[source, if ok { "ok" } else { "error" }])
        .inc();
}

pub fn record_skipped(kind: &str, count: usize) {
    if count > 0 {
        SKIPPED_TOTAL.with_label_values(&[kind]).inc_by(count as u64);
    }
}
