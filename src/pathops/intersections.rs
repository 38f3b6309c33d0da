// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Result set shared by every intersection routine.

use smallvec::SmallVec;

use super::types::{more_roughly_equal, DPoint};
use crate::consts::{MAX_INTERSECTIONS, T_PIN_EPSILON};

/// One meeting point: the parameter on each curve and the shared point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub t: [f64; 2],
    pub pt: DPoint,
}

/// Up to nine intersections ordered by the first curve's parameter.
#[derive(Clone, Debug, Default)]
pub struct Intersections {
    entries: SmallVec<[Intersection; MAX_INTERSECTIONS]>,
    coincident: bool,
    allow_near: bool,
}

fn pin_t(t: f64) -> f64 {
    if t.abs() < T_PIN_EPSILON {
        0.0
    } else if (t - 1.0).abs() < T_PIN_EPSILON {
        1.0
    } else {
        t
    }
}

#[inline]
fn is_exact_end(t: f64) -> bool {
    t == 0.0 || t == 1.0
}

impl Intersections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report endpoints that only nearly touch the other curve.
    pub fn allowing_near() -> Self {
        Intersections {
            allow_near: true,
            ..Self::default()
        }
    }

    #[inline]
    pub fn allow_near(&self) -> bool {
        self.allow_near
    }

    pub fn set_allow_near(&mut self, allow: bool) {
        self.allow_near = allow;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intersection> {
        self.entries.iter()
    }

    pub fn get(&self, i: usize) -> Option<&Intersection> {
        self.entries.get(i)
    }

    /// Whether the curves share a stretch rather than isolated points.
    #[inline]
    pub fn is_coincident(&self) -> bool {
        self.coincident
    }

    pub(crate) fn set_coincident(&mut self) {
        self.coincident = true;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.coincident = false;
    }

    /// Records an intersection, merging it into an existing entry whose
    /// parameters are within the rough tolerance. Exact 0 or 1 parameters
    /// win over interior ones. Returns the entry's index, or `None` when the
    /// set is full or the parameters fall outside [0, 1].
    pub fn insert(&mut self, t0: f64, t1: f64, pt: DPoint) -> Option<usize> {
        let (t0, t1) = (pin_t(t0), pin_t(t1));
        if !(0.0..=1.0).contains(&t0) || !(0.0..=1.0).contains(&t1) || !pt.is_finite() {
            return None;
        }
        if let Some(i) = self
            .entries
            .iter()
            .position(|e| more_roughly_equal(e.t[0], t0) && more_roughly_equal(e.t[1], t1))
        {
            let e = &mut self.entries[i];
            let mut exact = false;
            if is_exact_end(t0) && !is_exact_end(e.t[0]) {
                e.t[0] = t0;
                exact = true;
            }
            if is_exact_end(t1) && !is_exact_end(e.t[1]) {
                e.t[1] = t1;
                exact = true;
            }
            if exact {
                e.pt = pt;
            }
            return Some(i);
        }
        if self.entries.len() >= MAX_INTERSECTIONS {
            return None;
        }
        let at = self.entries.iter().position(|e| t0 < e.t[0]).unwrap_or(self.entries.len());
        self.entries.insert(at, Intersection { t: [t0, t1], pt });
        Some(at)
    }

    /// Exchanges the roles of the two curves and restores the ordering.
    pub fn swap_sides(&mut self) {
        for e in self.entries.iter_mut() {
            e.t.swap(0, 1);
        }
        self.entries.sort_by(|a, b| a.t[0].total_cmp(&b.t[0]).then(a.t[1].total_cmp(&b.t[1])));
    }

    /// Replaces the parameters on one side, keeping entries that map and
    /// dropping the rest.
    pub(crate) fn remap(&mut self, side: usize, mut f: impl FnMut(&Intersection) -> Option<f64>) {
        let old = std::mem::take(&mut self.entries);
        for mut e in old {
            if let Some(t) = f(&e) {
                e.t[side] = t;
                self.insert(e.t[0], e.t[1], e.pt);
            }
        }
    }

    /// Maps the second curve's parameters through `1 - t`.
    pub(crate) fn flip_second(&mut self) {
        for e in self.entries.iter_mut() {
            e.t[1] = 1.0 - e.t[1];
        }
    }
}
