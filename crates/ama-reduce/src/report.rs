use ama_core::{Complex, Geometry, ReductionProvenance};
use serde::{Deserialize, Serialize};

/// Averaged estimates at one timeslice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmaRow {
    /// Timeslice within the separation block.
    pub timeslice: usize,
    /// Exact estimate averaged over the exact sources.
    pub exact: Complex,
    /// Sloppy estimate averaged over the sloppy sources.
    pub sloppy: Complex,
    /// Residual (exact minus matched sloppy) averaged over the exact sources.
    pub residual: Complex,
    /// All-Mode-Averaging estimate, residual plus sloppy.
    pub ama: Complex,
}

/// Rows of one channel within a separation group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSeries {
    /// Channel index.
    pub channel: usize,
    /// Channel label (`C` for two-point data, `V_x` .. `S` for three-point data).
    pub label: String,
    /// One row per timeslice.
    pub rows: Vec<AmaRow>,
}

/// Reduction result for one source-sink separation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationGroup {
    /// Separation value; zero for two-point data.
    pub separation: i64,
    /// Exact blocks averaged into this group.
    pub exact_blocks: usize,
    /// Sloppy blocks averaged into this group.
    pub sloppy_blocks: usize,
    /// Sloppy blocks that found an exact counterpart.
    pub matched_blocks: usize,
    /// Per-channel series.
    pub channels: Vec<ChannelSeries>,
}

/// Stream level counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReductionStats {
    /// Records read from the exact stream.
    pub exact_records: usize,
    /// Records read from the sloppy stream.
    pub sloppy_records: usize,
    /// Source blocks in the exact stream.
    pub exact_blocks: usize,
    /// Source blocks in the sloppy stream.
    pub sloppy_blocks: usize,
    /// Sloppy blocks matched to an exact block.
    pub matched_blocks: usize,
    /// Sloppy blocks without an exact counterpart.
    pub unmatched_blocks: usize,
}

/// Complete output of one reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmaReport {
    /// Geometry the streams were validated against.
    pub geometry: Geometry,
    /// Stream counters.
    pub stats: ReductionStats,
    /// Groups in order of first appearance in the exact stream.
    pub groups: Vec<SeparationGroup>,
    /// Inputs the report was computed from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ReductionProvenance>,
    /// Stable hash over geometry and groups.
    pub report_hash: String,
}

/// One line of the flat output table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRow<'a> {
    /// Channel index.
    pub channel: usize,
    /// Running row index within the channel.
    pub index: usize,
    /// Separation value; zero for two-point data.
    pub separation: i64,
    /// Row values.
    pub row: &'a AmaRow,
}

impl AmaReport {
    /// Number of channels carried by every group.
    pub fn channel_count(&self) -> usize {
        self.geometry.arity.channels()
    }

    /// Flattens the report channel by channel, then group by group.
    ///
    /// Row indices run over `group * time_extent + timeslice`, matching the
    /// classic ten-column table.
    pub fn table_rows(&self) -> impl Iterator<Item = TableRow<'_>> + '_ {
        let width = self.geometry.time_extent;
        (0..self.channel_count()).flat_map(move |channel| {
            self.groups
                .iter()
                .enumerate()
                .flat_map(move |(position, group)| {
                    group
                        .channels
                        .get(channel)
                        .into_iter()
                        .flat_map(|series| series.rows.iter())
                        .map(move |row| TableRow {
                            channel,
                            index: position * width + row.timeslice,
                            separation: group.separation,
                            row,
                        })
                })
        })
    }
}
