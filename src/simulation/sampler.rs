//! Uniform sampling of fixed-size multisets from an ordered list of groups.
//!
//! A multiset of size `k` over `n` groups is described by how many copies of
//! each group it holds. Counting them follows the recurrence
//! `count(n, k) = sum(count(n - 1, i) for i in 0..=k)`, which is memoized per
//! sampler. Drawing picks the copy count of the first group by inverse-CDF
//! over that partition and continues with the remaining groups.
//!
//! Counts are exact `u128` values; a pool whose multiset count does not fit
//! reports `None` instead of wrapping.

use crate::rng::GameRng;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MultisetSampler {
    cache: HashMap<(usize, usize), u128>,
}

impl MultisetSampler {
    pub fn new() -> Self {
        MultisetSampler { cache: HashMap::new() }
    }

    /// Number of distinct multisets of `size` items drawn from `groups` groups,
    /// or `None` if it overflows `u128`
    pub fn count(&mut self, groups: usize, size: usize) -> Option<u128> {
        if groups == 0 {
            return Some(if size == 0 { 1 } else { 0 });
        }
        if groups == 1 {
            return Some(1);
        }
        if size == 1 {
            return Some(groups as u128);
        }
        if let Some(&cached) = self.cache.get(&(groups, size)) {
            return Some(cached);
        }

        let total = (0..=size).try_fold(0u128, |acc, i| acc.checked_add(self.count(groups - 1, i)?))?;
        self.cache.insert((groups, size), total);
        Some(total)
    }

    /// Draw a multiset of `size` items uniformly at random, grouped in input order.
    ///
    /// Returns `None` when the number of possible multisets overflows `u128`.
    pub fn draw<T: Clone>(&mut self, groups: &[T], size: usize, rng: &mut GameRng) -> Option<Vec<T>> {
        let mut result = Vec::with_capacity(size);
        let mut remaining = size;
        let mut groups = groups;

        while remaining > 0 && !groups.is_empty() {
            if groups.len() == 1 {
                result.extend(std::iter::repeat(groups[0].clone()).take(remaining));
                break;
            }

            let total = self.count(groups.len(), remaining)?;
            let mut pick = rng.random_below(total);
            let mut copies = 0;
            loop {
                // Bounded by `total`, so never overflows once `total` fits
                let weight = self.count(groups.len() - 1, remaining - copies)?;
                if pick < weight {
                    break;
                }
                pick -= weight;
                copies += 1;
            }

            result.extend(std::iter::repeat(groups[0].clone()).take(copies));
            remaining -= copies;
            groups = &groups[1..];
        }

        Some(result)
    }

    /// Memoized (groups, size) entries
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn binomial(n: u128, k: u128) -> u128 {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    /// Every copy-count vector over `groups` summing to `size`
    fn enumerate(groups: usize, size: usize) -> Vec<Vec<usize>> {
        if groups == 1 {
            return vec![vec![size]];
        }
        let mut out = Vec::new();
        for first in 0..=size {
            for mut rest in enumerate(groups - 1, size - first) {
                rest.insert(0, first);
                out.push(rest);
            }
        }
        out
    }

    #[test]
    fn test_count_matches_closed_form() {
        let mut sampler = MultisetSampler::new();
        for n in 1..=4u128 {
            for k in 0..=6u128 {
                let expected = binomial(n + k - 1, k);
                assert_eq!(sampler.count(n as usize, k as usize), Some(expected), "n={} k={}", n, k);
                assert_eq!(enumerate(n as usize, k as usize).len() as u128, expected);
            }
        }
    }

    #[test]
    fn test_count_reference_pool() {
        let mut sampler = MultisetSampler::new();
        assert_eq!(sampler.count(12, 12), Some(binomial(23, 12)));
        assert!(sampler.cached_entries() > 0);

        // Large pools stay exact
        assert_eq!(sampler.count(40, 60), Some(binomial(99, 60)));
    }

    #[test]
    fn test_count_overflow_is_reported() {
        let mut sampler = MultisetSampler::new();
        // C(139, 70) is far beyond u128::MAX
        assert_eq!(sampler.count(70, 70), None);
        // Smaller entries memoized along the way remain usable
        assert_eq!(sampler.count(12, 12), Some(binomial(23, 12)));

        let mut rng = GameRng::new(Some(4));
        let items: Vec<usize> = (0..70).collect();
        assert!(sampler.draw(&items, 70, &mut rng).is_none());
        assert_eq!(sampler.draw(&items, 12, &mut rng).map(|d| d.len()), Some(12));
    }

    #[test]
    fn test_draw_has_requested_size() {
        let mut sampler = MultisetSampler::new();
        let mut rng = GameRng::new(Some(3));
        let items = ['a', 'b', 'c', 'd', 'e'];

        for size in 0..10 {
            let drawn = sampler.draw(&items, size, &mut rng).expect("small pool");
            assert_eq!(drawn.len(), size);
            assert!(drawn.iter().all(|c| items.contains(c)));
        }
        assert_eq!(sampler.draw(&['x'], 4, &mut rng), Some(vec!['x'; 4]));
        assert_eq!(sampler.draw::<char>(&[], 0, &mut rng), Some(Vec::new()));
    }

    #[test]
    fn test_draw_is_grouped_in_input_order() {
        let mut sampler = MultisetSampler::new();
        let mut rng = GameRng::new(Some(8));
        let items = [0usize, 1, 2, 3];

        for _ in 0..200 {
            let drawn = sampler.draw(&items, 6, &mut rng).expect("small pool");
            assert!(drawn.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_draw_is_uniform() {
        let mut sampler = MultisetSampler::new();
        let mut rng = GameRng::new(Some(2024));
        let items = [0usize, 1, 2];
        let trials = 100_000;

        let mut seen: HashMap<Vec<usize>, usize> = HashMap::new();
        for _ in 0..trials {
            let drawn = sampler.draw(&items, 3, &mut rng).expect("small pool");
            let mut counts = vec![0; items.len()];
            for item in drawn {
                counts[item] += 1;
            }
            *seen.entry(counts).or_insert(0) += 1;
        }

        let possible = sampler.count(3, 3).expect("small pool") as usize;
        assert_eq!(possible, 10);
        assert_eq!(seen.len(), possible, "every multiset should appear");

        let expected = trials / possible;
        for (multiset, hits) in &seen {
            let deviation = (*hits as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.05, "{:?} drawn {} times, expected about {}", multiset, hits, expected);
        }
    }
}
