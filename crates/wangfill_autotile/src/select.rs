//! Weighted random tile selection
//!
//! The random source is always supplied by the caller. For reproducible,
//! order-independent results each cell gets its own generator seeded by
//! [`cell_seed`].

use crate::wang::Candidate;
use rand::Rng;

/// Pick one candidate with probability `weight / total weight`
///
/// Candidates are walked in the order given (ascending tile id from
/// [`WangIndex::candidates`](crate::WangIndex::candidates)), which makes the
/// choice reproducible for a given generator state. Returns `None` if no
/// candidate has a positive weight.
pub fn pick_weighted(candidates: &[Candidate], rng: &mut impl Rng) -> Option<u32> {
    let eligible = || candidates.iter().filter(|c| c.weight > 0.0);

    let total: f64 = eligible().map(|c| f64::from(c.weight)).sum();
    if total <= 0.0 {
        return None;
    }

    let mut pick = rng.gen::<f64>() * total;
    for candidate in eligible() {
        let weight = f64::from(candidate.weight);
        if pick < weight {
            return Some(candidate.tile_id);
        }
        pick -= weight;
    }

    // Rounding can leave `pick` just past the last bucket
    eligible().last().map(|c| c.tile_id)
}

/// Derive a per-cell seed from a global seed and cell coordinates
///
/// Uses the SplitMix64 finalizer so neighboring cells get unrelated streams.
pub fn cell_seed(seed: u64, x: u32, y: u32) -> u64 {
    let mut z = seed ^ ((u64::from(x) << 32) | u64::from(y));
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn seeded_rng() -> SmallRng {
        SmallRng::seed_from_u64(0)
    }

    fn candidates(weights: &[(u32, f32)]) -> Vec<Candidate> {
        weights
            .iter()
            .map(|&(tile_id, weight)| Candidate { tile_id, weight })
            .collect()
    }

    #[test]
    fn test_empty_returns_none() {
        let mut rng = seeded_rng();
        assert_eq!(pick_weighted(&[], &mut rng), None);
    }

    #[test]
    fn test_all_zero_weight_returns_none() {
        let mut rng = seeded_rng();
        assert_eq!(pick_weighted(&candidates(&[(1, 0.0), (2, 0.0)]), &mut rng), None);
    }

    #[test]
    fn test_single_candidate_always_chosen() {
        let mut rng = seeded_rng();
        for _ in 0..100 {
            assert_eq!(pick_weighted(&candidates(&[(9, 0.3)]), &mut rng), Some(9));
        }
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let mut rng = seeded_rng();
        let set = candidates(&[(1, 0.0), (2, 1.0), (3, 0.0)]);
        for _ in 0..1000 {
            assert_eq!(pick_weighted(&set, &mut rng), Some(2));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let set = candidates(&[(1, 1.0), (2, 2.0), (3, 0.5)]);
        let mut a = SmallRng::seed_from_u64(42);
        let mut b = SmallRng::seed_from_u64(42);
        let first: Vec<_> = (0..50).map(|_| pick_weighted(&set, &mut a)).collect();
        let second: Vec<_> = (0..50).map(|_| pick_weighted(&set, &mut b)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_uniform_weights_converge() {
        let set = candidates(&[(101, 1.0), (102, 1.0), (103, 1.0)]);
        let trials = 30_000;
        let mut counts = [0usize; 3];
        for seed in 0..trials {
            let mut rng = SmallRng::seed_from_u64(cell_seed(seed, 0, 0));
            let tile = pick_weighted(&set, &mut rng).unwrap();
            counts[(tile - 101) as usize] += 1;
        }
        for count in counts {
            let freq = count as f64 / trials as f64;
            assert!((freq - 1.0 / 3.0).abs() < 0.02, "frequency {freq}");
        }
    }

    #[test]
    fn test_weights_converge() {
        let set = candidates(&[(10, 1.0), (11, 0.2), (14, 0.3), (15, 0.1)]);
        let trials = 40_000;
        let mut hits_10 = 0;
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..trials {
            if pick_weighted(&set, &mut rng) == Some(10) {
                hits_10 += 1;
            }
        }
        let freq = hits_10 as f64 / trials as f64;
        assert!((freq - 1.0 / 1.6).abs() < 0.02, "frequency {freq}");
    }

    #[test]
    fn test_cell_seed_varies_by_coordinate() {
        assert_ne!(cell_seed(1, 0, 0), cell_seed(1, 1, 0));
        assert_ne!(cell_seed(1, 1, 0), cell_seed(1, 0, 1));
        assert_ne!(cell_seed(1, 0, 0), cell_seed(2, 0, 0));
        assert_eq!(cell_seed(5, 3, 4), cell_seed(5, 3, 4));
    }
}
