use crate::core::sequence::{ChunkSet, SegmentError, SequenceRecord, segment};
use crate::engine::config::SegmentationConfig;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument, warn};

/// Cuts every record into overlapping chunks.
///
/// All records are segmented before anything is returned, so a bad record
/// fails the whole run without partial output.
#[instrument(skip_all, name = "segmentation_workflow")]
pub fn run(
    records: &[SequenceRecord],
    config: &SegmentationConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<ChunkSet>, SegmentError> {
    reporter.report(Progress::PhaseStart { name: "Segmentation" });
    reporter.report(Progress::TaskStart {
        total_steps: records.len() as u64,
    });

    let mut sets = Vec::with_capacity(records.len());
    for record in records {
        let unknown = record.unknown_symbols();
        if let Some(&(position, symbol)) = unknown.first() {
            warn!(
                id = %record.id,
                count = unknown.len(),
                "Sequence contains symbols outside the residue alphabet (first '{}' at {}).",
                symbol,
                position
            );
        }

        let set = segment(record, config.segment_length, config.overlap_length)?;
        info!(
            id = %record.id,
            length = record.len(),
            chunks = set.len(),
            "Segmented sequence."
        );
        sets.push(set);
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(sets)
}
