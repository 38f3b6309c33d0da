// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Binary min-heap ordered by a caller-supplied `leq`. The overlap collapse
// pass drives its events through one of these; which end of the alpha range
// comes out first is decided entirely by the comparator.
//
// Entries are never deleted. Callers cancel an entry by marking whatever it
// refers to and skipping it when it surfaces.

pub struct PriorityQ<T: Copy> {
    /// nodes[1..=size] are live; nodes[0] is unused so parent = i / 2.
    nodes: Vec<T>,
    size: usize,
    /// Returns true iff `a` must come out no later than `b`.
    leq: fn(&T, &T) -> bool,
}

impl<T: Copy> PriorityQ<T> {
    pub fn new(leq: fn(&T, &T) -> bool) -> Self {
        PriorityQ {
            nodes: Vec::new(),
            size: 0,
            leq,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn insert(&mut self, item: T) {
        if self.nodes.is_empty() {
            // Slot 0 is never read; any value fills it.
            self.nodes.push(item);
        }
        self.size += 1;
        if self.nodes.len() <= self.size {
            self.nodes.push(item);
        } else {
            self.nodes[self.size] = item;
        }
        self.float_up(self.size);
    }

    pub fn minimum(&self) -> Option<T> {
        if self.size == 0 {
            None
        } else {
            Some(self.nodes[1])
        }
    }

    pub fn extract_min(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        let min = self.nodes[1];
        self.nodes[1] = self.nodes[self.size];
        self.size -= 1;
        if self.size > 0 {
            self.float_down(1);
        }
        Some(min)
    }

    fn float_down(&mut self, mut curr: usize) {
        let item = self.nodes[curr];
        loop {
            let mut child = curr << 1;
            if child > self.size {
                break;
            }
            if child < self.size && (self.leq)(&self.nodes[child + 1], &self.nodes[child]) {
                child += 1;
            }
            if (self.leq)(&item, &self.nodes[child]) {
                break;
            }
            self.nodes[curr] = self.nodes[child];
            curr = child;
        }
        self.nodes[curr] = item;
    }

    fn float_up(&mut self, mut curr: usize) {
        let item = self.nodes[curr];
        loop {
            let parent = curr >> 1;
            if parent == 0 || (self.leq)(&self.nodes[parent], &item) {
                break;
            }
            self.nodes[curr] = self.nodes[parent];
            curr = parent;
        }
        self.nodes[curr] = item;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leq_u32(a: &u32, b: &u32) -> bool {
        a <= b
    }

    fn geq_alpha(a: &(u8, u32), b: &(u8, u32)) -> bool {
        a.0 >= b.0
    }

    #[test]
    fn extracts_in_order() {
        let mut pq = PriorityQ::new(leq_u32);
        for k in [5, 2, 8, 1, 9, 3] {
            pq.insert(k);
        }
        assert_eq!(pq.len(), 6);
        assert_eq!(pq.minimum(), Some(1));
        let out: Vec<u32> = std::iter::from_fn(|| pq.extract_min()).collect();
        assert_eq!(out, vec![1, 2, 3, 5, 8, 9]);
        assert!(pq.is_empty());
        assert_eq!(pq.extract_min(), None);
    }

    #[test]
    fn interleaved_inserts() {
        let mut pq = PriorityQ::new(leq_u32);
        pq.insert(3);
        pq.insert(7);
        assert_eq!(pq.extract_min(), Some(3));
        pq.insert(1);
        pq.insert(4);
        assert_eq!(pq.extract_min(), Some(1));
        assert_eq!(pq.extract_min(), Some(4));
        assert_eq!(pq.extract_min(), Some(7));
    }

    #[test]
    fn reversed_comparator_pops_largest_first() {
        let mut pq = PriorityQ::new(geq_alpha);
        pq.insert((10, 0));
        pq.insert((250, 1));
        pq.insert((128, 2));
        assert_eq!(pq.extract_min().map(|e| e.1), Some(1));
        assert_eq!(pq.extract_min().map(|e| e.1), Some(2));
        assert_eq!(pq.extract_min().map(|e| e.1), Some(0));
    }
}
