//! Persisted batch state.

use serde::{Deserialize, Serialize};

/// The persisted batch singleton: next sequence index and last reset time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchState {
    /// Next index to allocate (always ≥ 1)
    pub counter: u64,
    /// Epoch seconds of the last reset (0 before the first reset)
    pub last_reset: f64,
}

impl Default for BatchState {
    fn default() -> Self {
        // Counter starts at 1; last_reset of 0 keeps pre-existing files
        // visible until the first reset.
        Self {
            counter: 1,
            last_reset: 0.0,
        }
    }
}

impl BatchState {
    /// Clamp out-of-range values read from disk back into the valid domain.
    pub fn sanitized(mut self) -> Self {
        if self.counter < 1 {
            self.counter = 1;
        }
        if !self.last_reset.is_finite() || self.last_reset < 0.0 {
            self.last_reset = 0.0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let st = BatchState::default();
        assert_eq!(st.counter, 1);
        assert_eq!(st.last_reset, 0.0);
    }

    #[test]
    fn test_sanitized_clamps() {
        let st = BatchState {
            counter: 0,
            last_reset: -5.0,
        }
        .sanitized();
        assert_eq!(st.counter, 1);
        assert_eq!(st.last_reset, 0.0);

        let st = BatchState {
            counter: 7,
            last_reset: f64::NAN,
        }
        .sanitized();
        assert_eq!(st.counter, 7);
        assert_eq!(st.last_reset, 0.0);
    }

    #[test]
    fn test_roundtrip_layout() {
        let st = BatchState {
            counter: 12,
            last_reset: 1700000000.5,
        };
        let json = serde_json::to_string(&st).unwrap();
        assert!(json.contains("\"counter\":12"));
        let back: BatchState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, st);
    }
}
