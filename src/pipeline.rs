//! Pipeline coordinator: streams the source CSV in fixed-size chunks
//! through a pool of worker threads into the result sink.
//!
//! Topology: the calling thread is the coordinator and reads the input;
//! N worker threads run the matcher cascade; one sink thread owns the
//! output file. Chunks travel over bounded channels (depth 2 × workers),
//! so a slow stage back-pressures the whole pipeline instead of buffering
//! unboundedly.
//!
//! Shutdown is by disconnect: when the coordinator finishes (or fails) it
//! drops the input sender, each worker drains and exits, their output
//! senders drop, and the sink sees end-of-stream. No worker ever holds
//! mutable state shared with another thread — the reference data is
//! immutable and the per-worker caches are private.

use std::path::Path;
use std::thread;

use anyhow::Context;
use chrono::NaiveDate;
use crossbeam_channel::{Sender, bounded};
use tracing::{debug, info, warn};

use crate::cascade::Resolver;
use crate::error::HsrError;
use crate::index::ReferenceData;
use crate::model::{AnnotatedRow, Chunk, House, SpeechRow};
use crate::sink::{ResultSink, RunStats};

/// Tuning knobs from the CLI.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Total cores to use; one is reserved for the sink.
    pub cores: usize,
    /// Rows per chunk.
    pub chunk_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            cores: 2,
            chunk_size: 1_000_000,
        }
    }
}

/// Run the full pipeline over `input`, writing annotated rows to `output`.
pub fn run(
    data: &ReferenceData,
    input: &Path,
    output: &Path,
    opts: &PipelineOptions,
) -> anyhow::Result<RunStats> {
    let workers = opts.cores.saturating_sub(1).max(1);
    info!(workers, chunk_size = opts.chunk_size, "starting pipeline");

    let (chunk_tx, chunk_rx) = bounded::<Chunk>(workers * 2);
    let (out_tx, out_rx) = bounded::<Vec<AnnotatedRow>>(workers * 2);

    thread::scope(|scope| -> anyhow::Result<RunStats> {
        for worker_id in 0..workers {
            let chunk_rx = chunk_rx.clone();
            let out_tx = out_tx.clone();
            scope.spawn(move || {
                let mut resolver = Resolver::new(data);
                for chunk in chunk_rx.iter() {
                    let annotated = annotate_chunk(&mut resolver, chunk);
                    if out_tx.send(annotated).is_err() {
                        // Sink is gone; nothing left to do.
                        break;
                    }
                }
                debug!(worker_id, "worker finished");
            });
        }
        drop(chunk_rx);
        drop(out_tx);

        let sink_handle = scope.spawn(move || -> anyhow::Result<RunStats> {
            let mut sink = ResultSink::create(output)?;
            for chunk in out_rx.iter() {
                sink.append(&chunk)?;
            }
            sink.finish()
        });

        let read_result = stream_chunks(input, opts.chunk_size, &chunk_tx);
        // Disconnect: each worker exits once the queue drains.
        drop(chunk_tx);

        let stats = sink_handle
            .join()
            .map_err(|_| anyhow::anyhow!("result sink thread panicked"))??;
        read_result?;
        Ok(stats)
    })
}

fn annotate_chunk(resolver: &mut Resolver<'_>, chunk: Chunk) -> Vec<AnnotatedRow> {
    chunk
        .into_iter()
        .map(|row| {
            let outcome = resolver.resolve(&row.speaker, row.speechdate, row.house, row.debate_id);
            AnnotatedRow {
                sentence_id: row.sentence_id,
                speaker: row.speaker,
                suggested_speaker: outcome.suggested_speaker,
                ambiguous: outcome.ambiguous.into(),
                fuzzy_matched: outcome.fuzzy_matched.into(),
                ignored: outcome.ignored.into(),
            }
        })
        .collect()
}

/// Read the source CSV and feed whole chunks to the input queue. Rows with
/// unparseable ids or dates are counted and skipped.
fn stream_chunks(input: &Path, chunk_size: usize, tx: &Sender<Chunk>) -> anyhow::Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(input)
        .with_context(|| format!("opening input file {}", input.display()))?;

    let headers = reader.headers().context("reading input header")?.clone();
    let col = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("input file missing column '{name}'"))
    };
    let sentence_col = col("sentence_id")?;
    let date_col = col("speechdate")?;
    let speaker_col = col("speaker")?;
    let debate_col = col("debate_id")?;
    let house_col = col("speaker_house")?;

    let mut chunk: Chunk = Vec::with_capacity(chunk_size.min(1 << 16));
    let mut total = 0u64;
    let mut malformed = 0u64;
    let mut chunks = 0u64;

    for record in reader.records() {
        let record = record.context("reading input row")?;
        let get = |idx: usize| record.get(idx).unwrap_or("").trim();

        let (Ok(sentence_id), Ok(debate_id)) = (
            get(sentence_col).parse::<i64>(),
            get(debate_col).parse::<i64>(),
        ) else {
            malformed += 1;
            continue;
        };
        let Ok(speechdate) = NaiveDate::parse_from_str(get(date_col), "%Y-%m-%d") else {
            malformed += 1;
            continue;
        };

        chunk.push(SpeechRow {
            sentence_id,
            speechdate,
            speaker: get(speaker_col).to_string(),
            debate_id,
            house: House::fold(get(house_col)),
        });
        total += 1;

        if chunk.len() >= chunk_size {
            chunks += 1;
            if tx.send(std::mem::take(&mut chunk)).is_err() {
                // Every worker is gone; the sink error will surface.
                return Err(HsrError::Pipeline {
                    detail: "input queue closed before the stream finished".to_string(),
                }
                .into());
            }
        }
    }
    if !chunk.is_empty() {
        chunks += 1;
        if tx.send(chunk).is_err() {
            return Err(HsrError::Pipeline {
                detail: "input queue closed before the stream finished".to_string(),
            }
            .into());
        }
    }

    if malformed > 0 {
        warn!(malformed, "input rows skipped");
    }
    info!(rows = total, chunks, "input stream complete");
    Ok(())
}
