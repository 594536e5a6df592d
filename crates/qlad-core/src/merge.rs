use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Merges `n` ascending sequences (total length `m`) into one ascending
/// sequence in `O(m log n)` time and `O(n)` auxiliary space, via a binary
/// heap of `(key, input index, position)` entries. Ties on `key` are broken
/// by input index, then position within that input, giving the same
/// stability a tournament tree provides without requiring power-of-two
/// leaf padding.
///
/// Used by the engine to union the disjoint member sets of its anomalous
/// sketches into one sorted identifier sequence.
pub fn merge_union<T, K, F>(inputs: &[Vec<T>], key: F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    #[derive(Eq, PartialEq)]
    struct Entry<K: Eq> {
        key: K,
        input: usize,
        pos: usize,
    }
    impl<K: Ord> Ord for Entry<K> {
        fn cmp(&self, other: &Self) -> Ordering {
            // reverse for a min-heap; tie-break by (input, pos) ascending
            // for stability, also reversed to keep BinaryHeap a min-heap.
            other
                .key
                .cmp(&self.key)
                .then_with(|| other.input.cmp(&self.input))
                .then_with(|| other.pos.cmp(&self.pos))
        }
    }
    impl<K: Ord> PartialOrd for Entry<K> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    let total: usize = inputs.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);
    let mut heap = BinaryHeap::with_capacity(inputs.len());
    for (input, seq) in inputs.iter().enumerate() {
        if let Some(first) = seq.first() {
            heap.push(Entry { key: key(first), input, pos: 0 });
        }
    }
    while let Some(Entry { input, pos, .. }) = heap.pop() {
        out.push(inputs[input][pos].clone());
        if let Some(next) = inputs[input].get(pos + 1) {
            heap.push(Entry { key: key(next), input, pos: pos + 1 });
        }
    }
    out
}

/// Intersection of `n` ascending, duplicate-free sequences: elements
/// present in every input, in ascending order. Uses the same binary-heap
/// machinery as [`merge_union`]: one entry per input's current cursor, the
/// smallest key popped (along with every other input currently sitting on
/// that same key) each round. A key survives into the output only when the
/// popped group spans all `n` inputs. Every cursor advances at most once per
/// position in its own input, so total heap operations are `O(m)`, each
/// `O(log n)`, for `O(m log n)` overall, within the required budget.
///
/// Used by the detector to keep only identifiers every engine flagged as
/// anomalous.
pub fn intersect<T: Ord + Clone>(inputs: &[Vec<T>]) -> Vec<T> {
    if inputs.is_empty() || inputs.iter().any(Vec::is_empty) {
        return Vec::new();
    }

    #[derive(Eq, PartialEq)]
    struct Entry<T: Eq> {
        key: T,
        input: usize,
        pos: usize,
    }
    impl<T: Ord> Ord for Entry<T> {
        fn cmp(&self, other: &Self) -> Ordering {
            other
                .key
                .cmp(&self.key)
                .then_with(|| other.input.cmp(&self.input))
                .then_with(|| other.pos.cmp(&self.pos))
        }
    }
    impl<T: Ord> PartialOrd for Entry<T> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    let n = inputs.len();
    let mut heap = BinaryHeap::with_capacity(n);
    for (input, seq) in inputs.iter().enumerate() {
        heap.push(Entry { key: seq[0].clone(), input, pos: 0 });
    }

    let mut out = Vec::new();
    let mut active = n;
    while active == n {
        let Some(top) = heap.peek() else { break };
        let min_key = top.key.clone();

        let mut group = Vec::with_capacity(n);
        while let Some(top) = heap.peek() {
            if top.key == min_key {
                group.push(heap.pop().expect("just peeked"));
            } else {
                break;
            }
        }

        if group.len() == n {
            out.push(min_key);
        }
        for Entry { input, pos, .. } in group {
            match inputs[input].get(pos + 1) {
                Some(next) => heap.push(Entry { key: next.clone(), input, pos: pos + 1 }),
                None => active -= 1,
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Tagged(u32, &'static str);

    #[test]
    fn union_merge_is_stable_across_ties() {
        // scenario 6
        let a = vec![Tagged(1, "a"), Tagged(3, "a")];
        let b = vec![Tagged(1, "b"), Tagged(2, "a")];
        let c = vec![Tagged(2, "b"), Tagged(3, "b")];
        let merged = merge_union(&[a, b, c], |t| t.0);
        let tags: Vec<&str> = merged.iter().map(|t| t.1).collect();
        let keys: Vec<u32> = merged.iter().map(|t| t.0).collect();
        assert_eq!(keys, vec![1, 1, 2, 2, 3, 3]);
        assert_eq!(tags, vec!["a", "b", "a", "b", "a", "b"]);
    }

    #[test]
    fn intersection_keeps_only_common_elements() {
        let a = vec![1, 2, 3, 4];
        let b = vec![2, 3, 5];
        let c = vec![2, 3, 4];
        assert_eq!(intersect(&[a, b, c]), vec![2, 3]);
    }

    #[test]
    fn intersection_with_empty_input_is_empty() {
        let a = vec![1, 2, 3];
        let b: Vec<i32> = vec![];
        assert_eq!(intersect(&[a, b]), Vec::<i32>::new());
    }
}
