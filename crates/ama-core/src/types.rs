use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::geometry::Arity;

/// Complex correlator value with real and imaginary parts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// The additive identity.
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    /// Creates a value from its parts.
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl Add for Complex {
    type Output = Complex;

    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;

    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

/// One line of a two-point stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoPointRecord {
    /// Source timeslice.
    pub source: i64,
    /// Timeslice relative to the source.
    pub timeslice: i64,
    /// Correlator value.
    pub value: Complex,
}

/// One line of a three-point stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreePointRecord {
    /// Source-sink separation.
    pub separation: i64,
    /// Sink timeslice.
    pub sink: i64,
    /// Operator insertion timeslice.
    pub timeslice: i64,
    /// Values for V_x, V_y, V_z, V_t and S in that order.
    pub values: [Complex; 5],
}

impl ThreePointRecord {
    /// Source timeslice reconstructed from separation and sink.
    ///
    /// Saturates instead of overflowing; the reducer bounds both terms by the
    /// time extent before building keys.
    pub fn source(&self) -> i64 {
        self.separation.saturating_add(self.sink)
    }
}

/// Uniform view over record layouts consumed by the reducer.
pub trait Correlator {
    /// Key identifying a source block in the exact index.
    type Key: Copy + Eq + Hash + Debug;

    /// Layout of the record.
    const ARITY: Arity;

    /// Source key of the block this record belongs to.
    fn key(&self) -> Self::Key;

    /// Source-sink separation used for bucketing; zero for two-point data.
    fn separation(&self) -> i64;

    /// Timeslice within the source block.
    fn timeslice(&self) -> i64;

    /// Sink timeslice, for layouts that carry one.
    fn sink(&self) -> Option<i64> {
        None
    }

    /// Value carried on `channel`, which is below `ARITY.channels()`.
    fn value(&self, channel: usize) -> Complex;
}

impl Correlator for TwoPointRecord {
    type Key = i64;

    const ARITY: Arity = Arity::TwoPoint;

    fn key(&self) -> i64 {
        self.source
    }

    fn separation(&self) -> i64 {
        0
    }

    fn timeslice(&self) -> i64 {
        self.timeslice
    }

    fn value(&self, _channel: usize) -> Complex {
        self.value
    }
}

impl Correlator for ThreePointRecord {
    type Key = (i64, i64);

    const ARITY: Arity = Arity::ThreePoint;

    fn key(&self) -> (i64, i64) {
        (self.source(), self.sink)
    }

    fn separation(&self) -> i64 {
        self.separation
    }

    fn sink(&self) -> Option<i64> {
        Some(self.sink)
    }

    fn timeslice(&self) -> i64 {
        self.timeslice
    }

    fn value(&self, channel: usize) -> Complex {
        self.values[channel]
    }
}
