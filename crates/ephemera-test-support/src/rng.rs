//! Test random sources — deterministic `RandomSource` implementations.

use ephemera_core::rng::RandomSource;

/// A no-op source that always returns `0.0` and index `0`. Suitable for tests
/// that do not depend on specific placements.
#[derive(Debug)]
pub struct MockRng;

impl RandomSource for MockRng {
    fn next_f64(&mut self) -> f64 {
        0.0
    }

    fn next_index(&mut self, _len: usize) -> usize {
        0
    }
}

/// A source that returns values from a predetermined sequence. `next_index`
/// scales the next value into `[0, len)`. Panics if the sequence is
/// exhausted.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<f64>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values in `[0.0, 1.0)`.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, index: 0 }
    }
}

impl RandomSource for SequenceRng {
    fn next_f64(&mut self) -> f64 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let scaled = (self.next_f64() * len as f64) as usize;
        scaled.min(len - 1)
    }
}
