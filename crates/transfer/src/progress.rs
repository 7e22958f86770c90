/// Callback invoked with a percentage in `0..=100`.
pub type ProgressCallback = Box<dyn FnMut(u8) + Send>;

/// Percent complete once chunk `index` of `total` has concluded.
///
/// Rounds half up. Intermediate chunks are capped at 99 so that 100 is only
/// ever reported for the final chunk.
pub fn chunk_percent(index: u32, total: u32) -> u8 {
    if total == 0 || index >= total {
        return 100;
    }
    let done = u64::from(index) + 1;
    let total = u64::from(total);
    let rounded = (done * 200 + total) / (total * 2);
    if done < total {
        rounded.min(99) as u8
    } else {
        100
    }
}

/// Per-task progress reporter.
///
/// Granularity is one report per concluded chunk, regardless of how many
/// attempts the chunk needed. Reported values never decrease.
pub struct ProgressReporter {
    total_chunks: u32,
    last: u8,
    callback: ProgressCallback,
}

impl ProgressReporter {
    pub fn new(total_chunks: u32, callback: ProgressCallback) -> Self {
        Self {
            total_chunks,
            last: 0,
            callback,
        }
    }

    /// Reports that chunk `index` concluded and returns the percent sent.
    pub fn chunk_concluded(&mut self, index: u32) -> u8 {
        let percent = chunk_percent(index, self.total_chunks).max(self.last);
        self.last = percent;
        (self.callback)(percent);
        percent
    }

    /// Last percentage reported (0 before the first chunk).
    pub fn last_reported(&self) -> u8 {
        self.last
    }
}
