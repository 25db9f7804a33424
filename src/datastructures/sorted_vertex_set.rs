use std::fmt;
use std::fmt::{Debug, Formatter};
use std::iter::FromIterator;

const MAXIMUM_BLOCK_SIZE: usize = 64;
const MINIMUM_BLOCK_SIZE: usize = MAXIMUM_BLOCK_SIZE / 4;

#[derive(Clone, Default)]
struct Block {
    values: Vec<usize>,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Block {
    #[inline]
    fn first(&self) -> usize {
        self.values[0]
    }
}

/// An ordered set of vertex ids, stored as a doubly linked sequence of sorted blocks.
///
/// Blocks live in a slab and reference each other by index. The block touched last is
/// remembered as a cursor, so runs of inserts or erases of nearby values (as they occur
/// when neighborhoods are merged during elimination) only walk a few links.
#[derive(Clone, Default)]
pub struct SortedVertexSet {
    blocks: Vec<Block>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    cursor: Option<usize>,
    len: usize,
}

impl SortedVertexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from an ascending, duplicate free slice without per-value searches.
    pub fn from_sorted(values: &[usize]) -> Self {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        let mut set = Self::new();
        let mut prev: Option<usize> = None;
        for chunk in values.chunks(MAXIMUM_BLOCK_SIZE / 2) {
            let idx = set.allocate(chunk.to_vec());
            set.link_after(prev, idx);
            prev = Some(idx);
        }
        set.len = values.len();
        set
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.cursor = None;
        self.len = 0;
    }

    pub fn first(&self) -> Option<usize> {
        self.head.map(|idx| self.blocks[idx].first())
    }

    pub fn last(&self) -> Option<usize> {
        self.tail
            .and_then(|idx| self.blocks[idx].values.last().copied())
    }

    pub fn contains(&self, vertex: usize) -> bool {
        match self.find_block(vertex) {
            Some(idx) => self.blocks[idx].values.binary_search(&vertex).is_ok(),
            None => false,
        }
    }

    /// Inserts `vertex`, returns `false` if it was already present.
    pub fn insert(&mut self, vertex: usize) -> bool {
        let idx = match self.find_block(vertex) {
            Some(idx) => idx,
            None => {
                let idx = self.allocate(vec![vertex]);
                self.link_after(None, idx);
                self.cursor = Some(idx);
                self.len += 1;
                return true;
            }
        };
        self.cursor = Some(idx);
        match self.blocks[idx].values.binary_search(&vertex) {
            Ok(_) => false,
            Err(pos) => {
                self.blocks[idx].values.insert(pos, vertex);
                self.len += 1;
                if self.blocks[idx].values.len() > MAXIMUM_BLOCK_SIZE {
                    self.split(idx);
                }
                true
            }
        }
    }

    /// Erases `vertex`, returns `false` if it was not present.
    pub fn erase(&mut self, vertex: usize) -> bool {
        let idx = match self.find_block(vertex) {
            Some(idx) => idx,
            None => return false,
        };
        self.cursor = Some(idx);
        match self.blocks[idx].values.binary_search(&vertex) {
            Err(_) => false,
            Ok(pos) => {
                self.blocks[idx].values.remove(pos);
                self.len -= 1;
                if self.blocks[idx].values.is_empty() {
                    self.release(idx);
                } else if self.blocks[idx].values.len() < MINIMUM_BLOCK_SIZE {
                    self.merge_with_next(idx);
                }
                true
            }
        }
    }

    /// Inserts all values of an ascending slice.
    pub fn merge(&mut self, values: &[usize]) {
        debug_assert!(values.windows(2).all(|w| w[0] <= w[1]));
        for v in values.iter().copied() {
            self.insert(v);
        }
    }

    /// Erases all values of an ascending slice.
    pub fn erase_all(&mut self, values: &[usize]) {
        debug_assert!(values.windows(2).all(|w| w[0] <= w[1]));
        for v in values.iter().copied() {
            self.erase(v);
        }
    }

    pub fn iter(&self) -> SortedVertexSetIterator {
        SortedVertexSetIterator {
            set: self,
            block: self.head,
            position: 0,
        }
    }

    pub fn to_vec(&self) -> Vec<usize> {
        let mut result = Vec::with_capacity(self.len);
        result.extend(self.iter());
        result
    }

    /// Finds the last block whose first value is not larger than `vertex` (or the head),
    /// starting from the cursor.
    fn find_block(&self, vertex: usize) -> Option<usize> {
        let mut current = self.cursor.or(self.head)?;
        if vertex < self.blocks[current].first() {
            while let Some(prev) = self.blocks[current].prev {
                current = prev;
                if self.blocks[current].first() <= vertex {
                    break;
                }
            }
        } else {
            while let Some(next) = self.blocks[current].next {
                if self.blocks[next].first() > vertex {
                    break;
                }
                current = next;
            }
        }
        Some(current)
    }

    fn allocate(&mut self, values: Vec<usize>) -> usize {
        let block = Block {
            values,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(idx) => {
                self.blocks[idx] = block;
                idx
            }
            None => {
                self.blocks.push(block);
                self.blocks.len() - 1
            }
        }
    }

    fn link_after(&mut self, prev: Option<usize>, idx: usize) {
        let next = match prev {
            Some(p) => self.blocks[p].next,
            None => self.head,
        };
        self.blocks[idx].prev = prev;
        self.blocks[idx].next = next;
        match prev {
            Some(p) => self.blocks[p].next = Some(idx),
            None => self.head = Some(idx),
        }
        match next {
            Some(n) => self.blocks[n].prev = Some(idx),
            None => self.tail = Some(idx),
        }
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.blocks[idx].prev;
        let next = self.blocks[idx].next;
        match prev {
            Some(p) => self.blocks[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.blocks[n].prev = prev,
            None => self.tail = prev,
        }
        if self.cursor == Some(idx) {
            self.cursor = prev.or(next);
        }
    }

    fn release(&mut self, idx: usize) {
        self.unlink(idx);
        self.blocks[idx] = Block::default();
        self.free.push(idx);
    }

    fn split(&mut self, idx: usize) {
        let half = self.blocks[idx].values.len() / 2;
        let upper = self.blocks[idx].values.split_off(half);
        let new_idx = self.allocate(upper);
        self.link_after(Some(idx), new_idx);
    }

    fn merge_with_next(&mut self, idx: usize) {
        if let Some(next) = self.blocks[idx].next {
            if self.blocks[idx].values.len() + self.blocks[next].values.len() <= MAXIMUM_BLOCK_SIZE
            {
                let moved = std::mem::take(&mut self.blocks[next].values);
                self.blocks[idx].values.extend(moved);
                if self.cursor == Some(next) {
                    self.cursor = Some(idx);
                }
                self.release(next);
            }
        }
    }

    #[cfg(test)]
    fn block_count(&self) -> usize {
        let mut count = 0;
        let mut current = self.head;
        while let Some(idx) = current {
            count += 1;
            current = self.blocks[idx].next;
        }
        count
    }
}

impl Debug for SortedVertexSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl PartialEq for SortedVertexSet {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for SortedVertexSet {}

impl FromIterator<usize> for SortedVertexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut values: Vec<usize> = iter.into_iter().collect();
        values.sort_unstable();
        values.dedup();
        Self::from_sorted(&values)
    }
}

impl<'a> IntoIterator for &'a SortedVertexSet {
    type Item = usize;
    type IntoIter = SortedVertexSetIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct SortedVertexSetIterator<'a> {
    set: &'a SortedVertexSet,
    block: Option<usize>,
    position: usize,
}

impl<'a> Iterator for SortedVertexSetIterator<'a> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let block = &self.set.blocks[self.block?];
            if self.position < block.values.len() {
                self.position += 1;
                return Some(block.values[self.position - 1]);
            }
            self.block = block.next;
            self.position = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::datastructures::sorted_vertex_set::{SortedVertexSet, MAXIMUM_BLOCK_SIZE};
    use rand::prelude::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;

    #[test]
    fn insert_is_idempotent() {
        let mut set = SortedVertexSet::new();
        assert!(set.insert(5));
        assert!(set.insert(1));
        assert!(!set.insert(5));
        assert!(set.insert(3));
        assert_eq!(set.len(), 3);
        assert_eq!(set.to_vec(), vec![1, 3, 5]);
    }

    #[test]
    fn erase_missing_is_noop() {
        let mut set: SortedVertexSet = vec![4, 2, 9].into_iter().collect();
        assert!(!set.erase(3));
        assert!(set.erase(4));
        assert!(!set.erase(4));
        assert_eq!(set.to_vec(), vec![2, 9]);
        assert!(set.erase(2));
        assert!(set.erase(9));
        assert!(set.is_empty());
        assert_eq!(set.iter().next(), None);
        assert!(set.insert(7));
        assert_eq!(set.to_vec(), vec![7]);
    }

    #[test]
    fn splits_and_merges_blocks() {
        let mut set = SortedVertexSet::new();
        let values: Vec<usize> = (0..4 * MAXIMUM_BLOCK_SIZE).rev().collect();
        for v in &values {
            set.insert(*v);
        }
        assert!(set.block_count() > 1);
        assert_eq!(set.to_vec(), (0..4 * MAXIMUM_BLOCK_SIZE).collect::<Vec<_>>());

        let odd: Vec<usize> = (0..4 * MAXIMUM_BLOCK_SIZE).filter(|v| v % 2 == 1).collect();
        set.erase_all(&odd);
        assert_eq!(set.len(), 2 * MAXIMUM_BLOCK_SIZE);
        assert!(set.iter().all(|v| v % 2 == 0));

        let even: Vec<usize> = (0..4 * MAXIMUM_BLOCK_SIZE).filter(|v| v % 2 == 0).collect();
        set.erase_all(&even);
        assert!(set.is_empty());
        assert_eq!(set.block_count(), 0);
    }

    #[test]
    fn merge_sorted() {
        let mut set = SortedVertexSet::from_sorted(&[1, 4, 8]);
        set.merge(&[0, 4, 5, 9]);
        assert_eq!(set.to_vec(), vec![0, 1, 4, 5, 8, 9]);
        assert_eq!(set.first(), Some(0));
        assert_eq!(set.last(), Some(9));
        assert!(set.contains(5));
        assert!(!set.contains(6));
    }

    #[test]
    fn random_operations_match_btree_set() {
        let mut rng = StdRng::seed_from_u64(1337);
        let mut set = SortedVertexSet::new();
        let mut reference = BTreeSet::new();
        for _ in 0..20_000 {
            let v = rng.gen_range(0..1_000);
            match rng.gen_range(0..4) {
                0 | 1 => assert_eq!(set.insert(v), reference.insert(v)),
                2 => assert_eq!(set.erase(v), reference.remove(&v)),
                _ => {
                    let mut chunk: Vec<usize> = (0..8).map(|_| rng.gen_range(0..1_000)).collect();
                    chunk.sort_unstable();
                    if rng.gen_bool(0.5) {
                        set.merge(&chunk);
                        reference.extend(chunk.iter().copied());
                    } else {
                        set.erase_all(&chunk);
                        chunk.iter().for_each(|x| {
                            reference.remove(x);
                        });
                    }
                }
            }
            assert_eq!(set.len(), reference.len());
            assert_eq!(set.contains(v), reference.contains(&v));
        }
        assert_eq!(set.to_vec(), reference.into_iter().collect::<Vec<_>>());
    }
}
