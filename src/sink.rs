//! Result sink: appends annotated chunks to the output CSV and keeps the
//! running hit/ambiguity/miss/ignore counters.
//!
//! The sink runs on its own thread and is the only writer of the output
//! file. The header is emitted with the first chunk; chunks land in the
//! order they are pulled off the output queue, which is not necessarily
//! input order.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use serde_json::json;
use tracing::{debug, info};

use crate::model::AnnotatedRow;

/// Running counters over every row the sink has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub hits: u64,
    pub ambiguous: u64,
    pub missed: u64,
    pub ignored: u64,
    pub chunks: u64,
}

impl RunStats {
    /// Rows that were actually candidates for resolution; ignored rows are
    /// excluded.
    pub fn total(&self) -> u64 {
        self.hits + self.ambiguous + self.missed
    }

    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits, self.total())
    }

    pub fn ambiguous_ratio(&self) -> f64 {
        ratio(self.ambiguous, self.total())
    }

    pub fn missed_ratio(&self) -> f64 {
        ratio(self.missed, self.total())
    }

    pub fn observe(&mut self, row: &AnnotatedRow) {
        if row.ignored == 1 {
            self.ignored += 1;
        } else if row.ambiguous == 1 {
            self.ambiguous += 1;
        } else if row.suggested_speaker.is_empty() {
            self.missed += 1;
        } else {
            self.hits += 1;
        }
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// CSV writer plus counters.
pub struct ResultSink {
    writer: csv::Writer<File>,
    stats: RunStats,
}

impl ResultSink {
    /// Create (truncate) the output file. The header is written with the
    /// first serialized row.
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating output file {}", path.display()))?;
        Ok(Self {
            writer,
            stats: RunStats::default(),
        })
    }

    /// Append one annotated chunk.
    pub fn append(&mut self, rows: &[AnnotatedRow]) -> anyhow::Result<()> {
        for row in rows {
            self.writer.serialize(row).context("writing output row")?;
            self.stats.observe(row);
        }
        self.stats.chunks += 1;
        debug!(chunk = self.stats.chunks, rows = rows.len(), "chunk written");
        Ok(())
    }

    /// Flush and hand back the counters.
    pub fn finish(mut self) -> anyhow::Result<RunStats> {
        self.writer.flush().context("flushing output file")?;
        info!(
            hits = self.stats.hits,
            ambiguous = self.stats.ambiguous,
            missed = self.stats.missed,
            ignored = self.stats.ignored,
            "result sink complete"
        );
        Ok(self.stats)
    }
}

/// The completion-notification payload, in the block shape the webhook
/// consumer expects. Posting it is the caller's concern.
pub fn completion_payload(stats: &RunStats, duration_secs: f64) -> serde_json::Value {
    let total = stats.total();
    json!({
        "blocks": [
            header_block("Job completed"),
            section_block(&format!("Duration: {duration_secs:.2} seconds")),
            section_block(&format!(
                "Hit percentage: {:.2}% ({}/{} rows)",
                stats.hit_ratio() * 100.0,
                stats.hits,
                total
            )),
            section_block(&format!(
                "Ambiguous percentage: {:.2}%",
                stats.ambiguous_ratio() * 100.0
            )),
            section_block(&format!(
                "Missed percentage: {:.2}%",
                stats.missed_ratio() * 100.0
            )),
            section_block(&format!("{} rows ignored", stats.ignored)),
        ]
    })
}

fn header_block(text: &str) -> serde_json::Value {
    json!({"type": "header", "text": {"type": "plain_text", "text": text, "emoji": true}})
}

fn section_block(text: &str) -> serde_json::Value {
    json!({"type": "section", "text": {"type": "mrkdwn", "text": text}})
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(suggested: &str, ambiguous: u8, ignored: u8) -> AnnotatedRow {
        AnnotatedRow {
            sentence_id: 1,
            speaker: "x".into(),
            suggested_speaker: suggested.into(),
            ambiguous,
            fuzzy_matched: 0,
            ignored,
        }
    }

    #[test]
    fn counters_classify_rows() {
        let mut stats = RunStats::default();
        stats.observe(&row("2527", 0, 0));
        stats.observe(&row("2527|4264", 1, 0));
        stats.observe(&row("", 0, 0));
        stats.observe(&row("", 0, 1));

        assert_eq!(stats.hits, 1);
        assert_eq!(stats.ambiguous, 1);
        assert_eq!(stats.missed, 1);
        assert_eq!(stats.ignored, 1);
        assert_eq!(stats.total(), 3);
        assert!((stats.hit_ratio() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn payload_carries_the_ratio_sections() {
        let stats = RunStats {
            hits: 8,
            ambiguous: 1,
            missed: 1,
            ignored: 2,
            chunks: 1,
        };
        let payload = completion_payload(&stats, 1.5);
        let blocks = payload["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[0]["type"], "header");
        let hit_text = blocks[2]["text"]["text"].as_str().unwrap();
        assert!(hit_text.contains("80.00%"), "{hit_text}");
        assert!(hit_text.contains("(8/10 rows)"), "{hit_text}");
    }
}
