use ama_core::errors::{AmaError, ErrorInfo};

/// Averages `input`, cut into `blocks` contiguous pieces of equal width, into a
/// single piece of that width.
///
/// Element `j` of the result is the unweighted mean of element `j` across all
/// blocks. An uneven split means the caller bucketed records incorrectly and
/// is reported as [`AmaError::Average`].
pub fn block_average(input: &[f64], blocks: usize) -> Result<Vec<f64>, AmaError> {
    if blocks == 0 {
        return Err(AmaError::Average(
            ErrorInfo::new("zero-blocks", "cannot average over zero blocks")
                .with_context("len", input.len()),
        ));
    }
    if input.len() % blocks != 0 {
        return Err(AmaError::Average(
            ErrorInfo::new(
                "uneven-blocks",
                format!("N={} not divisible by n={}", input.len(), blocks),
            )
            .with_context("len", input.len())
            .with_context("blocks", blocks)
            .with_hint("stream bucketing does not match the declared geometry"),
        ));
    }
    let width = input.len() / blocks;
    let mut out = vec![0.0; width];
    if width == 0 {
        return Ok(out);
    }
    for block in input.chunks_exact(width) {
        for (acc, value) in out.iter_mut().zip(block) {
            *acc += value;
        }
    }
    let norm = blocks as f64;
    for value in out.iter_mut() {
        *value /= norm;
    }
    Ok(out)
}
