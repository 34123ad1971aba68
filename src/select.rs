//! Partial sorting for `ORDER BY ... LIMIT k`.
//!
//! Quickselect places the k-th element at its final position in O(N) on
//! average, after which only the first k elements need a real sort. This beats
//! a full sort whenever k is small relative to N.

use std::cmp::Ordering;

struct QuickSelect {}

impl QuickSelect {
    /// Three-way partition of `data` around the value at `pivot`.
    ///
    /// Returns `(lt, gt)` such that `data[..lt] < p`, `data[lt..gt] == p` and
    /// `data[gt..] > p`. The middle band always contains the pivot, so every
    /// round makes progress even when all keys are equal.
    fn partition<T, F>(data: &mut [T], pivot: usize, cmp: &mut F) -> (usize, usize)
    where
        T: Copy,
        F: FnMut(&T, &T) -> Ordering,
    {
        let p = data[pivot];
        let mut lt = 0;
        let mut i = 0;
        let mut gt = data.len();

        while i < gt {
            match cmp(&data[i], &p) {
                Ordering::Less => {
                    data.swap(lt, i);
                    lt += 1;
                    i += 1;
                }
                Ordering::Greater => {
                    gt -= 1;
                    data.swap(i, gt);
                }
                Ordering::Equal => i += 1,
            }
        }

        (lt, gt)
    }

    /// Index of the median of the first, middle and last element.
    fn median_of_three<T, F>(data: &[T], cmp: &mut F) -> usize
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let (a, b, c) = (0, data.len() / 2, data.len() - 1);
        let ab = cmp(&data[a], &data[b]) == Ordering::Less;
        let bc = cmp(&data[b], &data[c]) == Ordering::Less;
        let ac = cmp(&data[a], &data[c]) == Ordering::Less;

        if ab == bc {
            b
        } else if ab == ac {
            c
        } else {
            a
        }
    }

    /// Moves the k-th smallest element of `data` to index `k`, with everything
    /// before it not greater and everything after it not smaller.
    fn select<T, F>(data: &mut [T], k: usize, cmp: &mut F)
    where
        T: Copy,
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut left = 0;
        let mut right = data.len();
        // Adversarial inputs can defeat median-of-three; past this many rounds
        // hand the remaining window to the std introselect.
        let mut budget = 2 * (usize::BITS - data.len().leading_zeros());

        while right - left > 1 {
            let window = &mut data[left..right];
            if budget == 0 {
                window.select_nth_unstable_by(k - left, |a, b| cmp(a, b));
                return;
            }
            budget -= 1;

            let pivot = Self::median_of_three(window, cmp);
            let (lt, gt) = Self::partition(window, pivot, cmp);
            let (lt, gt) = (left + lt, left + gt);

            if k < lt {
                right = lt;
            } else if k >= gt {
                left = gt;
            } else {
                return;
            }
        }
    }
}

/// Reorders `data` so that `data[..limit]` holds the `limit` smallest elements
/// under `cmp`, sorted. The order of `data[limit..]` is unspecified.
pub(crate) fn partial_sort_by<T, F>(data: &mut [T], limit: usize, mut cmp: F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    if limit == 0 || data.is_empty() {
        return;
    }
    if limit >= data.len() {
        data.sort_unstable_by(cmp);
        return;
    }

    QuickSelect::select(data, limit - 1, &mut cmp);
    data[..limit].sort_unstable_by(cmp);
}
