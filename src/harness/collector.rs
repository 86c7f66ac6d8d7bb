use std::time::{Duration, Instant};

/// Handle passed to a benchmark's run callback.
///
/// The run callback decides which part of its work is measured by holding a
/// [`CollectionScope`] from [`Harness::start_collection`].
#[derive(Debug, Default)]
pub struct Harness {
    iteration: usize,
    warmup: bool,
    collected: Duration,
    windows: usize,
}

impl Harness {
    pub(crate) fn begin_iteration(&mut self, iteration: usize, warmup: bool) {
        self.iteration = iteration;
        self.warmup = warmup;
        self.collected = Duration::ZERO;
        self.windows = 0;
    }

    /// Index of the current iteration, warmups included
    #[must_use]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    #[must_use]
    pub fn is_warmup(&self) -> bool {
        self.warmup
    }

    /// Time collected so far in this iteration
    #[must_use]
    pub fn collected(&self) -> Duration {
        self.collected
    }

    /// Number of collection windows closed so far in this iteration
    #[must_use]
    pub fn windows(&self) -> usize {
        self.windows
    }

    /// Open a measurement window.
    ///
    /// Timing stops and is added to the iteration's sample when the returned
    /// scope is dropped, whether the callback returns normally, bails out with
    /// `?` or unwinds.
    pub fn start_collection(&mut self) -> CollectionScope<'_> {
        CollectionScope {
            harness: self,
            started: Instant::now(),
        }
    }

    fn commit(&mut self, elapsed: Duration) {
        self.collected += elapsed;
        self.windows += 1;
    }
}

/// Active measurement window. Must be bound to a named variable (`_collection`),
/// since `_` drops it immediately.
#[must_use = "the collection window closes as soon as the scope is dropped"]
#[derive(Debug)]
pub struct CollectionScope<'h> {
    harness: &'h mut Harness,
    started: Instant,
}

impl CollectionScope<'_> {
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for CollectionScope<'_> {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        self.harness.commit(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_commits_on_drop() {
        let mut harness = Harness::default();
        harness.begin_iteration(0, false);
        {
            let _collection = harness.start_collection();
            std::thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(harness.windows(), 1);
        assert!(harness.collected() >= Duration::from_millis(2));
    }

    #[test]
    fn test_windows_accumulate_within_iteration() {
        let mut harness = Harness::default();
        harness.begin_iteration(3, true);
        drop(harness.start_collection());
        drop(harness.start_collection());
        assert_eq!(harness.windows(), 2);
        assert_eq!(harness.iteration(), 3);
        assert!(harness.is_warmup());

        harness.begin_iteration(4, false);
        assert_eq!(harness.windows(), 0);
        assert_eq!(harness.collected(), Duration::ZERO);
    }

    #[test]
    fn test_scope_commits_on_early_return() {
        fn measured(harness: &mut Harness) -> Result<(), &'static str> {
            let _collection = harness.start_collection();
            Err("bail")
        }

        let mut harness = Harness::default();
        assert!(measured(&mut harness).is_err());
        assert_eq!(harness.windows(), 1);
    }
}
