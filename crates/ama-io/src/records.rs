use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ama_core::errors::{AmaError, ErrorInfo};
use ama_core::{Complex, ThreePointRecord, TwoPointRecord};

/// Record layout that can be assembled from parsed text fields.
///
/// Every record starts with `INT_FIELDS` integer columns followed by
/// `FLOAT_FIELDS` floating point columns holding (re, im) pairs.
pub trait StreamRecord: Sized {
    /// Leading integer columns.
    const INT_FIELDS: usize;
    /// Trailing floating point columns.
    const FLOAT_FIELDS: usize;

    /// Builds a record from exactly `INT_FIELDS` integers and `FLOAT_FIELDS` floats.
    fn assemble(ints: &[i64], floats: &[f64]) -> Self;
}

impl StreamRecord for TwoPointRecord {
    const INT_FIELDS: usize = 2;
    const FLOAT_FIELDS: usize = 2;

    fn assemble(ints: &[i64], floats: &[f64]) -> Self {
        TwoPointRecord {
            source: ints[0],
            timeslice: ints[1],
            value: Complex::new(floats[0], floats[1]),
        }
    }
}

impl StreamRecord for ThreePointRecord {
    const INT_FIELDS: usize = 3;
    const FLOAT_FIELDS: usize = 10;

    fn assemble(ints: &[i64], floats: &[f64]) -> Self {
        let mut values = [Complex::ZERO; 5];
        for (slot, pair) in values.iter_mut().zip(floats.chunks_exact(2)) {
            *slot = Complex::new(pair[0], pair[1]);
        }
        ThreePointRecord {
            separation: ints[0],
            sink: ints[1],
            timeslice: ints[2],
            values,
        }
    }
}

/// Lazily parsed stream of records.
///
/// Records may span or share lines; only the field count matters. The stream
/// stops after the first error it yields.
pub struct RecordStream<B, T> {
    reader: B,
    line: String,
    line_number: usize,
    ints: Vec<i64>,
    floats: Vec<f64>,
    ready: VecDeque<T>,
    finished: bool,
}

impl<B: BufRead, T: StreamRecord> RecordStream<B, T> {
    /// Wraps a buffered reader.
    pub fn new(reader: B) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
            ints: Vec::with_capacity(T::INT_FIELDS),
            floats: Vec::with_capacity(T::FLOAT_FIELDS),
            ready: VecDeque::new(),
            finished: false,
        }
    }

    fn pending_fields(&self) -> usize {
        self.ints.len() + self.floats.len()
    }

    fn consume_line(&mut self) -> Result<(), AmaError> {
        let line = std::mem::take(&mut self.line);
        for token in line.split_whitespace() {
            if self.ints.len() < T::INT_FIELDS {
                let value = parse_int(token).ok_or_else(|| self.field_error(token, "integer"))?;
                self.ints.push(value);
            } else {
                let value = token
                    .parse::<f64>()
                    .map_err(|_| self.field_error(token, "float"))?;
                self.floats.push(value);
                if self.floats.len() == T::FLOAT_FIELDS {
                    self.ready.push_back(T::assemble(&self.ints, &self.floats));
                    self.ints.clear();
                    self.floats.clear();
                }
            }
        }
        self.line = line;
        Ok(())
    }

    fn field_error(&self, token: &str, expected: &str) -> AmaError {
        AmaError::Parse(
            ErrorInfo::new("bad-field", format!("expected {expected} field"))
                .with_context("line", self.line_number)
                .with_context("token", token)
                .with_context("field", self.pending_fields()),
        )
    }
}

impl<B: BufRead, T: StreamRecord> Iterator for RecordStream<B, T> {
    type Item = Result<T, AmaError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.ready.pop_front() {
                return Some(Ok(record));
            }
            if self.finished {
                return None;
            }
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.finished = true;
                    if self.pending_fields() > 0 {
                        return Some(Err(AmaError::Parse(
                            ErrorInfo::new("truncated-record", "stream ends inside a record")
                                .with_context("line", self.line_number)
                                .with_context("fields", self.pending_fields())
                                .with_context("expected", T::INT_FIELDS + T::FLOAT_FIELDS),
                        )));
                    }
                    return None;
                }
                Ok(_) => {
                    self.line_number += 1;
                    if let Err(err) = self.consume_line() {
                        self.finished = true;
                        self.ready.clear();
                        return Some(Err(err));
                    }
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(AmaError::Io(
                        ErrorInfo::new("stream-read", err.to_string())
                            .with_context("line", self.line_number + 1),
                    )));
                }
            }
        }
    }
}

/// Accepts plain integers and integral floats such as `3.0`.
fn parse_int(token: &str) -> Option<i64> {
    if let Ok(value) = token.parse::<i64>() {
        return Some(value);
    }
    let value = token.parse::<f64>().ok()?;
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

/// Opens `path` as a buffered record stream.
pub fn open_stream<T: StreamRecord>(
    path: &Path,
) -> Result<RecordStream<BufReader<File>, T>, AmaError> {
    let file = File::open(path).map_err(|err| {
        AmaError::Io(
            ErrorInfo::new("stream-open", err.to_string())
                .with_context("path", path.display()),
        )
    })?;
    Ok(RecordStream::new(BufReader::new(file)))
}
