use ama_core::errors::AmaError;
use ama_core::{Complex, Correlator};

use crate::average::block_average;

#[derive(Debug, Clone, Default)]
struct ChannelBuffer {
    re: Vec<f64>,
    im: Vec<f64>,
}

/// Upper bound on the records reserved up front; longer streams grow by append.
const PREALLOC_RECORDS: usize = 1 << 16;

/// Growable per-channel buffer filled while a stream is ingested.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    channels: Vec<ChannelBuffer>,
}

impl SeriesBuffer {
    /// Creates a buffer for `channels` channels.
    ///
    /// `capacity` is a hint taken from the declared geometry and is capped, so
    /// an oversized declaration cannot reserve memory the stream never fills.
    pub fn new(channels: usize, capacity: usize) -> Self {
        let capacity = capacity.min(PREALLOC_RECORDS);
        let channels = (0..channels)
            .map(|_| ChannelBuffer {
                re: Vec::with_capacity(capacity),
                im: Vec::with_capacity(capacity),
            })
            .collect();
        Self { channels }
    }

    /// Appends every channel value of `record`.
    pub fn push<R: Correlator>(&mut self, record: &R) {
        for (channel, buffer) in self.channels.iter_mut().enumerate() {
            let value = record.value(channel);
            buffer.re.push(value.re);
            buffer.im.push(value.im);
        }
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, |buffer| buffer.re.len())
    }

    /// Whether nothing was appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixes the length once the owning stream is exhausted.
    pub fn finalize(self) -> FrozenSeries {
        let channels = self
            .channels
            .into_iter()
            .map(|buffer| FrozenChannel {
                re: buffer.re.into_boxed_slice(),
                im: buffer.im.into_boxed_slice(),
            })
            .collect();
        FrozenSeries { channels }
    }
}

#[derive(Debug, Clone)]
struct FrozenChannel {
    re: Box<[f64]>,
    im: Box<[f64]>,
}

/// Fixed-length series; values may still be corrected in place.
#[derive(Debug, Clone)]
pub struct FrozenSeries {
    channels: Vec<FrozenChannel>,
}

/// Block-averaged values of one channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelMean {
    /// Averaged real parts.
    pub re: Vec<f64>,
    /// Averaged imaginary parts.
    pub im: Vec<f64>,
}

impl ChannelMean {
    /// Averaged value at `timeslice`.
    pub fn at(&self, timeslice: usize) -> Complex {
        Complex::new(self.re[timeslice], self.im[timeslice])
    }
}

impl FrozenSeries {
    /// Number of records held.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, |channel| channel.re.len())
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subtracts every channel value of `record` at flat position `offset`.
    pub fn subtract<R: Correlator>(&mut self, offset: usize, record: &R) {
        for (channel, buffer) in self.channels.iter_mut().enumerate() {
            let value = record.value(channel);
            buffer.re[offset] -= value.re;
            buffer.im[offset] -= value.im;
        }
    }

    /// Averages the listed blocks of width `width` for every channel.
    pub fn average_blocks(
        &self,
        blocks: &[usize],
        width: usize,
    ) -> Result<Vec<ChannelMean>, AmaError> {
        self.channels
            .iter()
            .map(|buffer| -> Result<ChannelMean, AmaError> {
                let re = gather(&buffer.re, blocks, width);
                let im = gather(&buffer.im, blocks, width);
                Ok(ChannelMean {
                    re: block_average(&re, blocks.len())?,
                    im: block_average(&im, blocks.len())?,
                })
            })
            .collect()
    }
}

fn gather(values: &[f64], blocks: &[usize], width: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(blocks.len() * width);
    for &block in blocks {
        out.extend_from_slice(&values[block * width..(block + 1) * width]);
    }
    out
}
