//! Sliding window of recent control errors.
//!
//! Samples are kept oldest-first. Once the configured capacity is reached
//! every new sample evicts the oldest one.
//!
//! Without `std` the samples live in a stack allocated ring of
//! [`MAX_WINDOW_SIZE`] entries. With `std` the ring is on the heap and grows
//! up to whatever capacity the configuration asks for.

/// Upper bound on any estimator window, in samples.
#[cfg(not(feature = "std"))]
pub const MAX_WINDOW_SIZE: usize = 64;
#[cfg(feature = "std")]
pub const MAX_WINDOW_SIZE: usize = u32::MAX as usize;

#[cfg(not(feature = "std"))]
type Samples = heapless::Deque<f32, MAX_WINDOW_SIZE>;
#[cfg(feature = "std")]
type Samples = std::collections::VecDeque<f32>;

#[derive(Debug, Clone)]
pub struct ErrorHistory {
    samples: Samples,
    capacity: usize,
}

impl ErrorHistory {
    /// Create an empty history holding at most `capacity` samples.
    ///
    /// `capacity` is clamped to `1..=MAX_WINDOW_SIZE`; the configuration
    /// layer rejects anything outside that range before it gets here.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Samples::new(),
            capacity: capacity.clamp(1, MAX_WINDOW_SIZE),
        }
    }

    /// Append `error`, evicting the oldest sample when full.
    pub fn record(&mut self, error: f32) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        #[cfg(feature = "std")]
        self.samples.push_back(error);
        // Cannot fail: capacity <= MAX_WINDOW_SIZE and we just made room.
        #[cfg(not(feature = "std"))]
        let _ = self.samples.push_back(error);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    /// Samples, oldest first.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
