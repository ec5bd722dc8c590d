use alloc::vec::Vec;
use core::cmp;

/// Binary indexed tree over non-negative `f64` heights.
///
/// `tree[i]` holds the sum of the last `lsb(i)` values ending at `i` (1-indexed). The running
/// `total` is adjusted by the delta of every update instead of being re-derived.
#[derive(Clone, Debug)]
pub(crate) struct Fenwick {
    tree: Vec<f64>, // 1-indexed
    total: f64,
    max_bit: usize,
}

impl Fenwick {
    pub(crate) fn from_heights(heights: impl ExactSizeIterator<Item = f64>) -> Self {
        let n = heights.len();
        let mut tree = alloc::vec![0.0f64; n + 1];
        let mut total = 0.0f64;
        for (i, h) in (1..=n).zip(heights) {
            total += h;
            tree[i] += h;
            let j = i + lsb(i);
            if j <= n {
                tree[j] += tree[i];
            }
        }
        Self {
            tree,
            total,
            max_bit: highest_power_of_two_leq(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    pub(crate) fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len() {
            return;
        }
        // Nodes up to `new_len` only cover values at or before their own index.
        self.total = self.prefix_sum(new_len);
        self.tree.truncate(new_len + 1);
        self.max_bit = highest_power_of_two_leq(new_len);
    }

    /// Appends one value in `O(log n)`.
    pub(crate) fn push(&mut self, value: f64) {
        let new_len = self.len() + 1;
        let start_exclusive = new_len - lsb(new_len);
        let covered = self.prefix_sum(new_len - 1) - self.prefix_sum(start_exclusive);
        self.tree.push(covered.max(0.0) + value);
        self.total += value;
        self.max_bit = highest_power_of_two_leq(new_len);
    }

    pub(crate) fn add(&mut self, index: usize, delta: f64) {
        let n = self.len();
        if index >= n || delta == 0.0 {
            return;
        }
        self.total = (self.total + delta).max(0.0);
        let mut i = index + 1;
        while i <= n {
            self.tree[i] += delta;
            i += lsb(i);
        }
    }

    /// Sum of the first `count` values.
    pub(crate) fn prefix_sum(&self, count: usize) -> f64 {
        let mut i = cmp::min(count, self.len());
        let mut sum = 0.0f64;
        while i > 0 {
            sum += self.tree[i];
            i &= i - 1;
        }
        sum.max(0.0)
    }

    pub(crate) fn total(&self) -> f64 {
        self.total
    }

    /// Returns the number of leading values whose prefix sum is `<= target`.
    ///
    /// With non-negative values this is the index of the first item whose end lies strictly
    /// past `target`, i.e. the item covering offset `target`.
    pub(crate) fn count_ending_at_or_before(&self, target: f64) -> usize {
        self.descend(|node, remaining| node <= remaining, target)
    }

    /// Returns the number of leading values whose prefix sum is `< target`.
    pub(crate) fn count_ending_before(&self, target: f64) -> usize {
        self.descend(|node, remaining| node < remaining, target)
    }

    fn descend(&self, take: impl Fn(f64, f64) -> bool, mut remaining: f64) -> usize {
        let n = self.len();
        let mut idx = 0usize;
        let mut bit = self.max_bit;
        while bit != 0 {
            let next = idx + bit;
            if next <= n && take(self.tree[next], remaining) {
                remaining -= self.tree[next];
                idx = next;
            }
            bit >>= 1;
        }
        idx
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn highest_power_of_two_leq(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut p = 1usize;
    while p <= n / 2 {
        p <<= 1;
    }
    p
}
