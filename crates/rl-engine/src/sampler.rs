//! Weighted sampling by cumulative sum over a single uniform draw.

use rand::Rng;

/// Index of the first entry whose running sum reaches a uniform draw.
///
/// If rounding leaves the total short of the draw, the last index is
/// returned. `None` only for an empty slice.
pub fn choose_index<R: Rng + ?Sized>(probabilities: &[f64], rng: &mut R) -> Option<usize> {
    if probabilities.is_empty() {
        return None;
    }
    let r = rng.gen::<f64>();
    let mut sum = 0.0;
    for (i, p) in probabilities.iter().enumerate() {
        sum += p;
        if sum >= r {
            return Some(i);
        }
    }
    Some(probabilities.len() - 1)
}

/// Pick one of `items`, weighted by the parallel `probabilities`.
///
/// `None` when `items` is empty or the two slices differ in length.
pub fn choose<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    probabilities: &[f64],
    rng: &mut R,
) -> Option<&'a T> {
    if items.len() != probabilities.len() {
        tracing::warn!(
            items = items.len(),
            probabilities = probabilities.len(),
            "Probability vector does not match item count"
        );
        return None;
    }
    choose_index(probabilities, rng).map(|i| &items[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::tests::fixed_draw;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_choose_by_cumulative_sum() {
        let items = ["a", "b"];
        assert_eq!(choose(&items, &[0.3, 0.7], &mut fixed_draw(0.5)), Some(&"b"));
        assert_eq!(choose(&items, &[0.3, 0.7], &mut fixed_draw(0.25)), Some(&"a"));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let items = ["a", "b"];
        assert_eq!(choose(&items, &[0.5, 0.5], &mut fixed_draw(0.5)), Some(&"a"));
    }

    #[test]
    fn test_zero_draw_hits_first_item() {
        let items = ["a", "b", "c"];
        assert_eq!(
            choose(&items, &[0.0, 1.0, 0.0], &mut fixed_draw(0.0)),
            Some(&"a"),
            "a zero draw is reached by the first running sum"
        );
        assert_eq!(choose(&items, &[0.0, 1.0, 0.0], &mut fixed_draw(0.3)), Some(&"b"));
    }

    #[test]
    fn test_short_total_falls_back_to_last() {
        let probabilities = [0.25, 0.25, 0.5 - 1e-12];
        let items = ["a", "b", "c"];
        // Largest value `gen::<f64>()` can produce: 1 - 2^-53.
        let mut rng = StepRng::new(u64::MAX, 0);
        assert!(probabilities.iter().sum::<f64>() < 1.0 - f64::EPSILON);
        assert_eq!(choose(&items, &probabilities, &mut rng), Some(&"c"));
        assert_eq!(choose(&items[..2], &probabilities[..2], &mut rng), Some(&"b"));
    }

    #[test]
    fn test_empty_items() {
        let items: [&str; 0] = [];
        assert_eq!(choose(&items, &[], &mut fixed_draw(0.5)), None);
    }

    #[test]
    fn test_length_mismatch_is_none() {
        let items = ["a", "b", "c"];
        assert_eq!(choose(&items, &[0.5, 0.5], &mut fixed_draw(0.5)), None);
        assert_eq!(choose(&items[..1], &[0.5, 0.5], &mut fixed_draw(0.5)), None);
        assert_eq!(choose(&items[..2], &[0.5, 0.5], &mut fixed_draw(0.5)), Some(&"a"));
    }

    #[test]
    fn test_frequencies_follow_probabilities() {
        let mut rng = StdRng::seed_from_u64(42);
        let probabilities = [0.2, 0.5, 0.3];
        let mut counts = [0usize; 3];
        let n = 20_000;
        for _ in 0..n {
            let i = choose_index(&probabilities, &mut rng).unwrap();
            counts[i] += 1;
        }
        for (count, p) in counts.iter().zip(probabilities) {
            let observed = *count as f64 / n as f64;
            assert!((observed - p).abs() < 0.02, "observed {observed}, expected {p}");
        }
    }
}
