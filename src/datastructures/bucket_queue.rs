use fxhash::FxHashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

struct Bucket<T, P> {
    priority: P,
    values: Vec<T>,
    heap_index: usize,
}

enum ChildType {
    First,
    Second,
}

/// Min priority queue that groups all values sharing a priority into one bucket.
///
/// The heap only orders distinct priorities, so restructuring costs O(log #priorities).
/// Values are located through a side map and removed from their bucket by swap-remove.
pub struct BucketQueue<T, P> {
    heap: Vec<usize>,
    buckets: Vec<Bucket<T, P>>,
    free_buckets: Vec<usize>,
    bucket_of: FxHashMap<P, usize>,
    entries: FxHashMap<T, (P, usize)>,
}

impl<T, P> Default for BucketQueue<T, P>
where
    T: Copy + Eq + Hash,
    P: Copy + Ord + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> BucketQueue<T, P>
where
    T: Copy + Eq + Hash,
    P: Copy + Ord + Hash,
{
    pub fn new() -> Self {
        Self {
            heap: Vec::default(),
            buckets: Vec::default(),
            free_buckets: Vec::default(),
            bucket_of: FxHashMap::default(),
            entries: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        self.entries.contains_key(&value)
    }

    pub fn priority(&self, value: T) -> Option<P> {
        self.entries.get(&value).map(|(priority, _)| *priority)
    }

    /// Inserts `value`, or moves it to `priority` if it is already queued.
    pub fn push(&mut self, value: T, priority: P) {
        match self.entries.get(&value).copied() {
            Some((old, _)) => {
                self.update_priority(value, old, priority);
            }
            None => self.insert_into_bucket(value, priority),
        }
    }

    pub fn pop(&mut self) -> Option<(T, P)> {
        let bucket = *self.heap.first()?;
        let priority = self.buckets[bucket].priority;
        let value = *self.buckets[bucket].values.last()?;
        self.remove_from_bucket(value);
        Some((value, priority))
    }

    pub fn top(&self) -> Option<(T, P)> {
        let bucket = &self.buckets[*self.heap.first()?];
        bucket.values.last().map(|v| (*v, bucket.priority))
    }

    pub fn top_priority(&self) -> Option<P> {
        self.heap.first().map(|b| self.buckets[*b].priority)
    }

    /// All values sharing the currently lowest priority.
    pub fn top_collection(&self) -> &[T] {
        match self.heap.first() {
            Some(bucket) => &self.buckets[*bucket].values,
            None => &[],
        }
    }

    pub fn erase(&mut self, value: T) -> Option<P> {
        if self.entries.contains_key(&value) {
            self.remove_from_bucket(value)
        } else {
            None
        }
    }

    /// Erases `value` only if it is queued with exactly `priority`.
    pub fn erase_with_priority(&mut self, value: T, priority: P) -> bool {
        match self.entries.get(&value) {
            Some((current, _)) if *current == priority => {
                self.remove_from_bucket(value);
                true
            }
            _ => false,
        }
    }

    /// Moves `value` from `old_priority` to `new_priority`. Returns `false` (and changes
    /// nothing) if the value is not queued with `old_priority`.
    pub fn update_priority(&mut self, value: T, old_priority: P, new_priority: P) -> bool {
        match self.entries.get(&value) {
            Some((current, _)) if *current == old_priority => {
                if old_priority != new_priority {
                    self.remove_from_bucket(value);
                    self.insert_into_bucket(value, new_priority);
                }
                true
            }
            _ => false,
        }
    }

    fn insert_into_bucket(&mut self, value: T, priority: P) {
        let bucket = match self.bucket_of.entry(priority) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let bucket = Bucket {
                    priority,
                    values: Vec::new(),
                    heap_index: self.heap.len(),
                };
                let idx = match self.free_buckets.pop() {
                    Some(idx) => {
                        self.buckets[idx] = bucket;
                        idx
                    }
                    None => {
                        self.buckets.push(bucket);
                        self.buckets.len() - 1
                    }
                };
                entry.insert(idx);
                self.heap.push(idx);
                self.up(self.heap.len() - 1);
                idx
            }
        };
        let position = self.buckets[bucket].values.len();
        self.buckets[bucket].values.push(value);
        self.entries.insert(value, (priority, position));
    }

    fn remove_from_bucket(&mut self, value: T) -> Option<P> {
        let (priority, position) = self.entries.remove(&value)?;
        let bucket = *self.bucket_of.get(&priority)?;
        let values = &mut self.buckets[bucket].values;
        values.swap_remove(position);
        if let Some(moved) = values.get(position).copied() {
            if let Some(entry) = self.entries.get_mut(&moved) {
                entry.1 = position;
            }
        }
        if self.buckets[bucket].values.is_empty() {
            self.remove_bucket(bucket);
        }
        Some(priority)
    }

    fn remove_bucket(&mut self, bucket: usize) {
        let priority = self.buckets[bucket].priority;
        self.bucket_of.remove(&priority);
        let idx = self.buckets[bucket].heap_index;
        let last = self.heap.len() - 1;
        self.heap.swap(idx, last);
        self.heap.pop();
        if idx < self.heap.len() {
            let moved = self.heap[idx];
            self.buckets[moved].heap_index = idx;
            self.up(idx);
            self.down(self.buckets[moved].heap_index);
        }
        self.free_buckets.push(bucket);
    }

    #[inline]
    fn priority_at(&self, heap_index: usize) -> P {
        self.buckets[self.heap[heap_index]].priority
    }

    fn up(&mut self, mut idx: usize) {
        let x = self.heap[idx];
        let priority = self.buckets[x].priority;
        while let Some(parent) = self.parent(idx) {
            if priority < self.priority_at(parent) {
                self.heap[idx] = self.heap[parent];
                self.buckets[self.heap[idx]].heap_index = idx;
                idx = parent;
            } else {
                break;
            }
        }
        self.heap[idx] = x;
        self.buckets[x].heap_index = idx;
    }

    fn down(&mut self, idx: usize) {
        let mut current = idx;
        let value = self.heap[current];
        let priority = self.buckets[value].priority;

        while let Some(mut first) = self.child(current, ChildType::First) {
            if let Some(second) = self.child(current, ChildType::Second) {
                if self.priority_at(second) < self.priority_at(first) {
                    first = second;
                }
            }
            if self.priority_at(first) < priority {
                self.heap[current] = self.heap[first];
                self.buckets[self.heap[current]].heap_index = current;
                current = first
            } else {
                break;
            }
        }
        self.heap[current] = value;
        self.buckets[value].heap_index = current;
    }

    fn parent(&self, idx: usize) -> Option<usize> {
        if idx == 0 {
            None
        } else {
            Some((idx - 1) / 2)
        }
    }

    fn child(&self, idx: usize, child_type: ChildType) -> Option<usize> {
        let off = match child_type {
            ChildType::First => 1,
            ChildType::Second => 2,
        };
        let idx = idx * 2 + off;
        if idx >= self.heap.len() {
            None
        } else {
            Some(idx)
        }
    }
}
