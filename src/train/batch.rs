//! Deciding when accumulated gradients are applied.

/// Counts processed training pairs and signals when the accumulated gradients should be learned.
///
/// - A batch size of `0` learns once per epoch (pure batch)
/// - A batch size of `1` learns after every pair (online)
/// - A larger batch size learns after every `batch_size` pairs, and once more at the end of the
///   epoch for a final partial batch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchController {
    batch_size: usize,
    pending: usize,
}

impl BatchController {
    /// Returns a controller for the given batch size.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            pending: 0,
        }
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Sets the batch size, dropping the count of the batch in progress.
    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.batch_size = batch_size;
        self.pending = 0;
    }

    /// Records that one pair was processed. Returns whether its batch is complete and should be
    /// learned now.
    pub fn pair_processed(&mut self) -> bool {
        self.pending += 1;

        if self.batch_size > 0 && self.pending >= self.batch_size {
            self.pending = 0;
            true
        } else {
            false
        }
    }

    /// Ends the epoch. Returns whether pairs processed since the last learn remain to be learned.
    pub fn finish_epoch(&mut self) -> bool {
        let flush = self.pending > 0;
        self.pending = 0;
        flush
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Returns the number of learns triggered over one epoch of `pairs` pairs
    fn learns(batch_size: usize, pairs: usize) -> usize {
        let mut batch = BatchController::new(batch_size);
        let during = (0..pairs).filter(|_| batch.pair_processed()).count();
        during + usize::from(batch.finish_epoch())
    }

    #[test]
    fn test_modes() {
        assert_eq!(1, learns(0, 10));
        assert_eq!(10, learns(1, 10));
        assert_eq!(5, learns(2, 10));
        // 3 full batches plus the final flush
        assert_eq!(4, learns(3, 10));
        assert_eq!(1, learns(50, 10));
    }

    #[test]
    fn test_empty_epoch() {
        assert_eq!(0, learns(0, 0));
        assert_eq!(0, learns(4, 0));
    }

    #[test]
    fn test_epochs_are_independent() {
        let mut batch = BatchController::new(3);
        batch.pair_processed();
        batch.pair_processed();
        assert!(batch.finish_epoch());

        // The partial batch does not carry into the next epoch
        assert!(!batch.pair_processed());
        assert!(!batch.pair_processed());
        assert!(batch.pair_processed());
        assert!(!batch.finish_epoch());
    }
}
