#![deny(missing_docs)]
#![doc = "All-Mode-Averaging reduction: block averaging, exact/sloppy position matching and the parameterized two-point/three-point reducer."]

/// Unweighted block averaging.
pub mod average;
/// Source blocks grouped by source-sink separation.
pub mod buckets;
/// Growable and frozen per-channel series buffers.
pub mod buffers;
/// Canonical report hashing.
pub mod hash;
/// Exact source position index.
pub mod matcher;
/// Parameterized reducer.
pub mod reducer;
/// Report structures.
pub mod report;

pub use average::block_average;
pub use buckets::SeparationTable;
pub use matcher::{SourceIndex, SourceSinkIndex, SourceTimeIndex};
pub use reducer::{Reducer, ThreePointReducer, TwoPointReducer};
pub use report::{
    AmaReport, AmaRow, ChannelSeries, ReductionStats, SeparationGroup, TableRow,
};
