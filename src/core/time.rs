//! Fixed sub-step timing utilities

/// Iterator splitting a frame interval into capped sub-steps
///
/// Every yielded step is at most `max_step` seconds; the final step carries
/// the remainder. The yielded steps sum to the frame interval.
#[derive(Debug, Clone)]
pub struct Substeps {
    remaining: f32,
    max_step: f32,
}

/// Split `frame_dt` seconds into steps no longer than `max_step`
///
/// A non-positive `max_step` yields the whole frame as a single step.
pub fn substeps(frame_dt: f32, max_step: f32) -> Substeps {
    let max_step = if max_step > 0.0 { max_step } else { frame_dt.max(0.0) };
    Substeps {
        remaining: frame_dt.max(0.0),
        max_step,
    }
}

impl Iterator for Substeps {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        // Sub-microsecond slivers come from float accumulation, not real time
        if self.remaining <= 1e-6 {
            return None;
        }
        let step = self.remaining.min(self.max_step);
        self.remaining -= step;
        Some(step)
    }
}

impl Substeps {
    /// Number of steps left
    pub fn count_hint(&self) -> usize {
        if self.remaining <= 1e-6 {
            0
        } else {
            (self.remaining / self.max_step).ceil() as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substeps_sum_to_frame() {
        let steps: Vec<f32> = substeps(0.1, 1.0 / 30.0).collect();
        assert_eq!(steps.len(), 3);
        let total: f32 = steps.iter().sum();
        assert!((total - 0.1).abs() < 1e-5);
        assert!(steps.iter().all(|s| *s <= 1.0 / 30.0 + 1e-6));
    }

    #[test]
    fn test_substeps_remainder_last() {
        let steps: Vec<f32> = substeps(0.05, 0.02).collect();
        assert_eq!(steps.len(), 3);
        assert!((steps[2] - 0.01).abs() < 1e-5);
    }

    #[test]
    fn test_substeps_zero_frame() {
        assert_eq!(substeps(0.0, 0.01).count(), 0);
        assert_eq!(substeps(-1.0, 0.01).count(), 0);
    }

    #[test]
    fn test_substeps_non_positive_step() {
        let steps: Vec<f32> = substeps(0.25, 0.0).collect();
        assert_eq!(steps, vec![0.25]);
    }

    #[test]
    fn test_count_hint() {
        let steps = substeps(0.1, 0.03);
        assert_eq!(steps.count_hint(), 4);
    }
}
