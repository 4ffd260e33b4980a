//! Integral and derivative estimators over the error history.
//!
//! Both estimators look at the newest `min(len, window)` samples only, so
//! early in a run (history not yet full) they use whatever is available
//! instead of padding with zeros.

use crate::config::DerivativeMode;
use crate::history::ErrorHistory;

/// `(1 / integral_time) * sum(newest N samples)`, `N = min(len, window)`.
pub fn integral_term(history: &ErrorHistory, window: usize, integral_time: f32) -> f32 {
    let n = history.len().min(window);
    let sum: f32 = history.values().rev().take(n).sum();
    1.0 / integral_time * sum
}

/// Finite difference between the newest sample and the oldest sample
/// inside the derivative window, scaled according to `mode`.
///
/// With `N = min(len, window)` the oldest sample in the window sits at
/// offset `len - N` from the start of the history. A history of length 1
/// (or an empty one) yields 0.
pub fn derivative_term(
    history: &ErrorHistory,
    window: usize,
    derivative_time: f32,
    sample_interval: f32,
    mode: DerivativeMode,
) -> f32 {
    let len = history.len();
    let n = len.min(window);
    let (Some(newest), Some(oldest)) = (history.latest(), history.values().nth(len - n)) else {
        return 0.0;
    };
    let difference = newest - oldest;

    match mode {
        DerivativeMode::Literal => derivative_time * difference,
        DerivativeMode::RateScaled => {
            if n <= 1 {
                return 0.0;
            }
            let span = (n - 1) as f32 * sample_interval;
            derivative_time * difference / span
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(capacity: usize, samples: &[f32]) -> ErrorHistory {
        let mut history = ErrorHistory::new(capacity);
        for &e in samples {
            history.record(e);
        }
        history
    }

    #[test]
    fn integral_of_empty_history_is_zero() {
        let history = ErrorHistory::new(10);
        assert_eq!(integral_term(&history, 10, 5.0), 0.0);
    }

    #[test]
    fn integral_uses_only_available_samples() {
        // 3 samples in a window of 10: no implicit zero padding, the sum
        // is over exactly the three recorded errors.
        let history = history_of(10, &[1.0, 2.0, 3.0]);
        assert_eq!(integral_term(&history, 10, 2.0), 3.0);
    }

    #[test]
    fn integral_uses_newest_window_only() {
        // Capacity 5, integral window 2: only 4.0 and 5.0 count.
        let history = history_of(5, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(integral_term(&history, 2, 1.0), 9.0);
    }

    #[test]
    fn integral_scales_by_inverse_time_constant() {
        let history = history_of(10, &[5.0]);
        assert_eq!(integral_term(&history, 10, 5.0), 1.0);
    }

    #[test]
    fn derivative_of_single_sample_is_zero() {
        let history = history_of(10, &[7.5]);
        let d = derivative_term(&history, 2, 1.0, 0.5, DerivativeMode::Literal);
        assert_eq!(d, 0.0);
        let d = derivative_term(&history, 2, 1.0, 0.5, DerivativeMode::RateScaled);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn derivative_of_empty_history_is_zero() {
        let history = ErrorHistory::new(4);
        let d = derivative_term(&history, 2, 1.0, 0.5, DerivativeMode::Literal);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn derivative_spans_the_window() {
        // len 5, window 3: newest (8.0) minus sample at offset 2 (4.0).
        let history = history_of(10, &[1.0, 2.0, 4.0, 6.0, 8.0]);
        let d = derivative_term(&history, 3, 1.0, 0.5, DerivativeMode::Literal);
        assert_eq!(d, 4.0);
    }

    #[test]
    fn derivative_window_larger_than_history() {
        // len 2, window 5: newest minus the very first sample.
        let history = history_of(10, &[1.0, 3.0]);
        let d = derivative_term(&history, 5, 1.0, 0.5, DerivativeMode::Literal);
        assert_eq!(d, 2.0);
    }

    #[test]
    fn literal_derivative_grows_with_time_constant() {
        let history = history_of(10, &[1.0, 3.0]);
        let short = derivative_term(&history, 2, 1.0, 0.5, DerivativeMode::Literal);
        let long = derivative_term(&history, 2, 4.0, 0.5, DerivativeMode::Literal);
        assert_eq!(short, 2.0);
        assert_eq!(long, 8.0);
    }

    #[test]
    fn rate_scaled_derivative_divides_by_window_span() {
        // window 3 over 0.5 s samples spans 1.0 s: (8 - 4) / 1.0 * 2.0
        let history = history_of(10, &[1.0, 2.0, 4.0, 6.0, 8.0]);
        let d = derivative_term(&history, 3, 2.0, 0.5, DerivativeMode::RateScaled);
        assert_eq!(d, 8.0);
    }
}
