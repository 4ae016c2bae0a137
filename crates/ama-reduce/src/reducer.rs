use std::marker::PhantomData;

use ama_core::errors::{AmaError, ErrorInfo};
use ama_core::{Correlator, Geometry, ThreePointRecord, TwoPointRecord};

use crate::buckets::SeparationTable;
use crate::buffers::{ChannelMean, FrozenSeries, SeriesBuffer};
use crate::hash::hash_report;
use crate::matcher::SourceIndex;
use crate::report::{AmaReport, AmaRow, ChannelSeries, ReductionStats, SeparationGroup};

/// Reducer for two-point streams.
pub type TwoPointReducer = Reducer<TwoPointRecord>;

/// Reducer for three-point streams.
pub type ThreePointReducer = Reducer<ThreePointRecord>;

/// All-Mode-Averaging reducer parameterized by record layout.
///
/// One instance owns every buffer of one invocation; nothing survives
/// [`Reducer::reduce`].
#[derive(Debug, Clone)]
pub struct Reducer<R> {
    geometry: Geometry,
    _layout: PhantomData<fn() -> R>,
}

struct ExactStage<K> {
    index: SourceIndex<K>,
    table: SeparationTable,
    series: FrozenSeries,
    records: usize,
}

struct SloppyStage {
    table: SeparationTable,
    series: FrozenSeries,
    matched: Vec<bool>,
    records: usize,
}

struct GroupMeans {
    separation: i64,
    channels: Vec<ChannelMean>,
}

impl<R: Correlator> Reducer<R> {
    /// Creates a reducer after checking `geometry` against the record layout.
    pub fn new(geometry: Geometry) -> Result<Self, AmaError> {
        geometry.validate()?;
        if geometry.arity != R::ARITY {
            return Err(AmaError::Geometry(
                ErrorInfo::new(
                    "arity-mismatch",
                    "declared arity does not match the record layout",
                )
                .with_context("declared", geometry.arity)
                .with_context("layout", R::ARITY),
            ));
        }
        Ok(Self {
            geometry,
            _layout: PhantomData,
        })
    }

    /// Geometry the reducer validates against.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Consumes both streams and produces the AMA report.
    pub fn reduce<E, S>(&self, exact: E, sloppy: S) -> Result<AmaReport, AmaError>
    where
        E: IntoIterator<Item = Result<R, AmaError>>,
        S: IntoIterator<Item = Result<R, AmaError>>,
    {
        let mut exact = self.ingest_exact(exact)?;
        let exact_means = self.average_exact(&exact)?;
        let sloppy = self.ingest_sloppy(sloppy, &mut exact)?;
        let groups = self.combine(&exact, &sloppy, exact_means)?;

        let matched_blocks = sloppy.matched.iter().filter(|hit| **hit).count();
        let stats = ReductionStats {
            exact_records: exact.records,
            sloppy_records: sloppy.records,
            exact_blocks: exact.index.block_count(),
            sloppy_blocks: sloppy.matched.len(),
            matched_blocks,
            unmatched_blocks: sloppy.matched.len() - matched_blocks,
        };
        log::info!(
            "{} reduction: {} exact blocks, {} sloppy blocks ({} matched, {} unmatched), {} separations",
            self.geometry.arity,
            stats.exact_blocks,
            stats.sloppy_blocks,
            stats.matched_blocks,
            stats.unmatched_blocks,
            groups.len()
        );

        let report_hash = hash_report(&self.geometry, &groups)?;
        Ok(AmaReport {
            geometry: self.geometry,
            stats,
            groups,
            provenance: None,
            report_hash,
        })
    }

    fn checked_timeslice(&self, record: &R, ordinal: usize) -> Result<usize, AmaError> {
        let timeslice = record.timeslice();
        match usize::try_from(timeslice) {
            Ok(t) if t < self.geometry.time_extent => Ok(t),
            _ => Err(AmaError::Geometry(
                ErrorInfo::new("timeslice-range", "timeslice outside the time extent")
                    .with_context("record", ordinal)
                    .with_context("timeslice", timeslice)
                    .with_context("time_extent", self.geometry.time_extent),
            )),
        }
    }

    fn checked_separation(&self, record: &R, ordinal: usize) -> Result<i64, AmaError> {
        let separation = record.separation();
        let in_range = usize::try_from(separation)
            .map(|value| value < self.geometry.time_extent)
            .unwrap_or(false);
        if !in_range {
            return Err(AmaError::Geometry(
                ErrorInfo::new("separation-range", "separation outside the time extent")
                    .with_context("record", ordinal)
                    .with_context("separation", separation)
                    .with_context("time_extent", self.geometry.time_extent),
            ));
        }
        Ok(separation)
    }

    fn checked_sink(&self, record: &R, ordinal: usize) -> Result<(), AmaError> {
        let Some(sink) = record.sink() else {
            return Ok(());
        };
        let in_range = usize::try_from(sink)
            .map(|value| value < self.geometry.time_extent)
            .unwrap_or(false);
        if !in_range {
            return Err(AmaError::Geometry(
                ErrorInfo::new("sink-range", "sink outside the time extent")
                    .with_context("record", ordinal)
                    .with_context("sink", sink)
                    .with_context("time_extent", self.geometry.time_extent),
            ));
        }
        Ok(())
    }

    /// Checks a record sitting on a block boundary and returns its separation.
    fn block_start(&self, record: &R, ordinal: usize, timeslice: usize) -> Result<i64, AmaError> {
        if timeslice != 0 {
            return Err(AmaError::Geometry(
                ErrorInfo::new(
                    "block-boundary",
                    "source block does not start at timeslice 0",
                )
                .with_context("record", ordinal)
                .with_context("timeslice", timeslice)
                .with_hint("check the declared time extent"),
            ));
        }
        self.checked_sink(record, ordinal)?;
        self.checked_separation(record, ordinal)
    }

    fn check_complete_blocks(&self, stream: &str, records: usize) -> Result<(), AmaError> {
        if records % self.geometry.time_extent != 0 {
            return Err(AmaError::Geometry(
                ErrorInfo::new("partial-block", "stream ends inside a source block")
                    .with_context("stream", stream)
                    .with_context("records", records)
                    .with_context("time_extent", self.geometry.time_extent),
            ));
        }
        Ok(())
    }

    fn ingest_exact<E>(&self, exact: E) -> Result<ExactStage<R::Key>, AmaError>
    where
        E: IntoIterator<Item = Result<R, AmaError>>,
    {
        let width = self.geometry.time_extent;
        let mut index = SourceIndex::new();
        let mut table = SeparationTable::new();
        let mut buffer = SeriesBuffer::new(R::ARITY.channels(), self.geometry.exact_records());
        let mut records = 0usize;

        for item in exact {
            let record = item?;
            let timeslice = self.checked_timeslice(&record, records)?;
            if records % width == 0 {
                let separation = self.block_start(&record, records, timeslice)?;
                let ordinal = index.record(record.key());
                table.record(separation, ordinal);
            }
            buffer.push(&record);
            records += 1;
        }

        self.check_complete_blocks("exact", records)?;
        if index.block_count() != self.geometry.exact_blocks() {
            return Err(AmaError::geometry_mismatch(
                "exact-block-count",
                "exact stream block count disagrees with sources x separations",
                self.geometry.exact_blocks(),
                index.block_count(),
            ));
        }
        if table.len() != self.geometry.separations {
            return Err(AmaError::geometry_mismatch(
                "separation-count",
                "exact stream carries a different number of separations",
                self.geometry.separations,
                table.len(),
            ));
        }
        debug_assert_eq!(table.total(), index.block_count());

        Ok(ExactStage {
            index,
            table,
            series: buffer.finalize(),
            records,
        })
    }

    fn average_exact(&self, exact: &ExactStage<R::Key>) -> Result<Vec<GroupMeans>, AmaError> {
        exact
            .table
            .separations()
            .map(|separation| -> Result<GroupMeans, AmaError> {
                let blocks = exact.table.blocks(separation).unwrap_or_default();
                Ok(GroupMeans {
                    separation,
                    channels: exact
                        .series
                        .average_blocks(blocks, self.geometry.time_extent)?,
                })
            })
            .collect()
    }

    fn ingest_sloppy<S>(
        &self,
        sloppy: S,
        exact: &mut ExactStage<R::Key>,
    ) -> Result<SloppyStage, AmaError>
    where
        S: IntoIterator<Item = Result<R, AmaError>>,
    {
        let width = self.geometry.time_extent;
        let capacity = self.geometry.sloppy_records();
        let mut table = SeparationTable::new();
        let mut buffer = SeriesBuffer::new(R::ARITY.channels(), capacity);
        let mut matched = Vec::new();
        let mut exact_hits = vec![0usize; exact.index.block_count()];
        // No correction until the first block boundary has been seen.
        let mut current: Option<usize> = None;
        let mut records = 0usize;

        for item in sloppy {
            let record = item?;
            let timeslice = self.checked_timeslice(&record, records)?;
            if records % width == 0 {
                let separation = self.block_start(&record, records, timeslice)?;
                let ordinal = matched.len();
                table.record(separation, ordinal);
                current = exact.index.find(&record.key());
                match current {
                    Some(block) => {
                        exact_hits[block] += 1;
                        if exact_hits[block] == 2 {
                            log::warn!(
                                "exact block {} ({:?}) matched by more than one sloppy block",
                                block,
                                record.key()
                            );
                        }
                    }
                    None => log::debug!(
                        "sloppy block {} ({:?}) has no exact counterpart",
                        ordinal,
                        record.key()
                    ),
                }
                matched.push(current.is_some());
            }
            buffer.push(&record);
            if let Some(block) = current {
                exact.series.subtract(block * width + timeslice, &record);
            }
            records += 1;
        }

        self.check_complete_blocks("sloppy", records)?;
        Ok(SloppyStage {
            table,
            series: buffer.finalize(),
            matched,
            records,
        })
    }

    fn combine(
        &self,
        exact: &ExactStage<R::Key>,
        sloppy: &SloppyStage,
        exact_means: Vec<GroupMeans>,
    ) -> Result<Vec<SeparationGroup>, AmaError> {
        let width = self.geometry.time_extent;
        for separation in sloppy.table.separations() {
            if exact.table.multiplicity(separation) == 0 {
                log::warn!(
                    "ignoring {} sloppy blocks at separation {} without exact data",
                    sloppy.table.multiplicity(separation),
                    separation
                );
            }
        }

        let mut groups = Vec::with_capacity(exact_means.len());
        for means in exact_means {
            let separation = means.separation;
            let exact_blocks = exact.table.blocks(separation).unwrap_or_default();
            let sloppy_blocks = sloppy.table.blocks(separation).unwrap_or_default();
            if sloppy_blocks.len() != self.geometry.sloppy_blocks() {
                return Err(AmaError::Geometry(
                    ErrorInfo::new(
                        "sloppy-block-count",
                        "sloppy block count at separation disagrees with declared sloppy sources",
                    )
                    .with_context("separation", separation)
                    .with_context("expected", self.geometry.sloppy_blocks())
                    .with_context("observed", sloppy_blocks.len()),
                ));
            }

            let residual_means = exact.series.average_blocks(exact_blocks, width)?;
            let sloppy_means = sloppy.series.average_blocks(sloppy_blocks, width)?;
            let matched_blocks = sloppy_blocks
                .iter()
                .filter(|ordinal| sloppy.matched[**ordinal])
                .count();

            let channels = means
                .channels
                .iter()
                .zip(&residual_means)
                .zip(&sloppy_means)
                .enumerate()
                .map(|(channel, ((exact_mean, residual_mean), sloppy_mean))| ChannelSeries {
                    channel,
                    label: R::ARITY.channel_label(channel).to_string(),
                    rows: (0..width)
                        .map(|timeslice| {
                            let residual = residual_mean.at(timeslice);
                            let sloppy = sloppy_mean.at(timeslice);
                            AmaRow {
                                timeslice,
                                exact: exact_mean.at(timeslice),
                                sloppy,
                                residual,
                                ama: residual + sloppy,
                            }
                        })
                        .collect(),
                })
                .collect();

            groups.push(SeparationGroup {
                separation,
                exact_blocks: exact_blocks.len(),
                sloppy_blocks: sloppy_blocks.len(),
                matched_blocks,
                channels,
            });
        }
        Ok(groups)
    }
}
