// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Intrusive doubly-linked lists over index arenas.
//
// A node can sit in several lists at once (an edge is simultaneously in the
// active edge list and in the above/below lists of its endpoints), so each
// list role gets its own `Link` field and the helpers take an accessor that
// selects which one to follow. INVALID plays the role of a null pointer.

pub const INVALID: u32 = u32::MAX;

/// Neighbours of a node within one list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub prev: u32,
    pub next: u32,
}

impl Default for Link {
    fn default() -> Self {
        Link {
            prev: INVALID,
            next: INVALID,
        }
    }
}

impl Link {
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.prev != INVALID || self.next != INVALID
    }
}

/// Head and tail of one list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct List {
    pub head: u32,
    pub tail: u32,
}

impl Default for List {
    fn default() -> Self {
        List {
            head: INVALID,
            tail: INVALID,
        }
    }
}

impl List {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == INVALID
    }

    pub fn clear(&mut self) {
        *self = List::default();
    }
}

/// Selects which `Link` of a node a list operation follows.
pub type LinkFn<T> = fn(&mut T) -> &mut Link;

/// Links `t` between `prev` and `next`, updating the list ends when either
/// neighbour is INVALID.
pub fn list_insert<T>(nodes: &mut [T], link: LinkFn<T>, t: u32, prev: u32, next: u32, list: &mut List) {
    {
        let l = link(&mut nodes[t as usize]);
        l.prev = prev;
        l.next = next;
    }
    if prev != INVALID {
        link(&mut nodes[prev as usize]).next = t;
    } else {
        list.head = t;
    }
    if next != INVALID {
        link(&mut nodes[next as usize]).prev = t;
    } else {
        list.tail = t;
    }
}

/// Unlinks `t` and clears its links.
pub fn list_remove<T>(nodes: &mut [T], link: LinkFn<T>, t: u32, list: &mut List) {
    let Link { prev, next } = *link(&mut nodes[t as usize]);
    if prev != INVALID {
        link(&mut nodes[prev as usize]).next = next;
    } else {
        list.head = next;
    }
    if next != INVALID {
        link(&mut nodes[next as usize]).prev = prev;
    } else {
        list.tail = prev;
    }
    *link(&mut nodes[t as usize]) = Link::default();
}

#[inline]
pub fn list_append<T>(nodes: &mut [T], link: LinkFn<T>, t: u32, list: &mut List) {
    let tail = list.tail;
    list_insert(nodes, link, t, tail, INVALID, list);
}

/// Moves every node of `other` to the end of `list`, leaving `other` empty.
pub fn list_concat<T>(nodes: &mut [T], link: LinkFn<T>, list: &mut List, other: &mut List) {
    if other.is_empty() {
        return;
    }
    if list.tail != INVALID {
        link(&mut nodes[list.tail as usize]).next = other.head;
        link(&mut nodes[other.head as usize]).prev = list.tail;
    } else {
        list.head = other.head;
    }
    list.tail = other.tail;
    other.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Node {
        link: Link,
    }

    fn node_link(n: &mut Node) -> &mut Link {
        &mut n.link
    }

    fn collect(nodes: &[Node], list: &List) -> Vec<u32> {
        let mut out = Vec::new();
        let mut n = list.head;
        while n != INVALID {
            out.push(n);
            n = nodes[n as usize].link.next;
        }
        out
    }

    #[test]
    fn insert_and_remove_maintain_ends() {
        let mut nodes: Vec<Node> = (0..4).map(|_| Node::default()).collect();
        let mut list = List::default();
        list_append(&mut nodes, node_link, 0, &mut list);
        list_append(&mut nodes, node_link, 2, &mut list);
        list_insert(&mut nodes, node_link, 1, 0, 2, &mut list);
        list_insert(&mut nodes, node_link, 3, INVALID, 0, &mut list);
        assert_eq!(collect(&nodes, &list), vec![3, 0, 1, 2]);

        list_remove(&mut nodes, node_link, 3, &mut list);
        list_remove(&mut nodes, node_link, 2, &mut list);
        assert_eq!(collect(&nodes, &list), vec![0, 1]);
        assert_eq!(list.tail, 1);
        assert!(!nodes[2].link.is_linked());

        list_remove(&mut nodes, node_link, 0, &mut list);
        list_remove(&mut nodes, node_link, 1, &mut list);
        assert!(list.is_empty());
        assert_eq!(list.tail, INVALID);
    }

    #[test]
    fn concat_moves_all_nodes() {
        let mut nodes: Vec<Node> = (0..4).map(|_| Node::default()).collect();
        let mut a = List::default();
        let mut b = List::default();
        list_append(&mut nodes, node_link, 0, &mut a);
        list_append(&mut nodes, node_link, 1, &mut b);
        list_append(&mut nodes, node_link, 2, &mut b);
        list_concat(&mut nodes, node_link, &mut a, &mut b);
        assert_eq!(collect(&nodes, &a), vec![0, 1, 2]);
        assert!(b.is_empty());

        let mut empty = List::default();
        list_concat(&mut nodes, node_link, &mut empty, &mut a);
        assert_eq!(collect(&nodes, &empty), vec![0, 1, 2]);
    }
}
