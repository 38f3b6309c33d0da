// Copyright 2025 The path-tessellator Authors
// Symmetry, exactness and reduction properties of the curve kernel.

use path_tessellator::pathops::{intersect, reduce, Curve, DPoint, Intersections};

fn pt(x: f64, y: f64) -> DPoint {
    DPoint::new(x, y)
}

fn sample_curves() -> Vec<Curve> {
    vec![
        Curve::Line([pt(0.0, 0.0), pt(10.0, 10.0)]),
        Curve::Line([pt(0.0, 10.0), pt(10.0, 0.0)]),
        Curve::Line([pt(-2.0, 5.0), pt(12.0, 5.0)]),
        Curve::Quad([pt(0.0, 0.0), pt(5.0, 12.0), pt(10.0, 0.0)]),
        Curve::Quad([pt(0.0, 8.0), pt(5.0, -4.0), pt(10.0, 8.0)]),
        Curve::Conic([pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)], std::f64::consts::FRAC_1_SQRT_2),
        Curve::Conic([pt(0.0, 2.0), pt(5.0, 9.0), pt(10.0, 2.0)], 2.0),
        Curve::Cubic([pt(0.0, 0.0), pt(10.0, 0.0), pt(0.0, 10.0), pt(10.0, 10.0)]),
        Curve::Cubic([pt(0.0, 5.0), pt(3.0, -5.0), pt(7.0, 15.0), pt(10.0, 5.0)]),
    ]
}

fn params(i: &Intersections) -> Vec<[f64; 2]> {
    i.iter().map(|e| e.t).collect()
}

#[test]
fn every_pair_is_symmetric() {
    let curves = sample_curves();
    for (i, a) in curves.iter().enumerate() {
        for b in &curves[i + 1..] {
            let ab = intersect(a, b);
            let mut ba = intersect(b, a);
            ba.swap_sides();
            assert_eq!(params(&ab), params(&ba), "{:?} / {:?}", a, b);
            assert_eq!(ab.is_coincident(), ba.is_coincident());
        }
    }
}

#[test]
fn every_hit_lies_on_both_curves() {
    let curves = sample_curves();
    for (i, a) in curves.iter().enumerate() {
        for b in &curves[i + 1..] {
            let hits = intersect(a, b);
            assert!(hits.len() <= 9);
            for e in hits.iter() {
                let (p, q) = (a.point_at(e.t[0]), b.point_at(e.t[1]));
                assert!(p.roughly_equal(e.pt), "{:?} vs {:?} for {:?} / {:?}", p, e.pt, a, b);
                assert!(q.roughly_equal(e.pt), "{:?} vs {:?} for {:?} / {:?}", q, e.pt, a, b);
            }
            let ts: Vec<f64> = hits.iter().map(|e| e.t[0]).collect();
            assert!(ts.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}

#[test]
fn connected_chain_meets_at_exact_ends() {
    let chain = [
        Curve::Line([pt(0.0, 0.0), pt(3.0, 1.0)]),
        Curve::Quad([pt(3.0, 1.0), pt(6.0, 7.0), pt(9.0, 2.0)]),
        Curve::Conic([pt(9.0, 2.0), pt(12.0, -3.0), pt(15.0, 4.0)], 0.6),
        Curve::Cubic([pt(15.0, 4.0), pt(17.0, 9.0), pt(20.0, -1.0), pt(22.0, 3.0)]),
    ];
    for w in chain.windows(2) {
        let hits = intersect(&w[0], &w[1]);
        let joint = w[0].end();
        assert!(
            hits.iter().any(|e| e.t == [1.0, 0.0] && e.pt == joint),
            "{:?} / {:?}: {:?}",
            w[0],
            w[1],
            params(&hits)
        );
    }
}

#[test]
fn reduction_is_idempotent_and_keeps_ends() {
    let mut curves = sample_curves();
    curves.extend([
        Curve::Quad([pt(1.0, 1.0), pt(2.0, 2.0), pt(4.0, 4.0)]),
        Curve::Cubic([pt(0.0, 0.0), pt(2.0, 4.0), pt(4.0, 4.0), pt(6.0, 0.0)]),
        Curve::Cubic([pt(3.0, 3.0); 4]),
        Curve::Conic([pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 2.0)], 3.0),
    ]);
    for c in &curves {
        let once = reduce(c);
        assert_eq!(reduce(&once.to_curve()), once, "{:?}", c);
        let r = once.to_curve();
        assert!(r.start().approximately_equal(c.start()), "{:?}", c);
        assert!(r.end().approximately_equal(c.end()), "{:?}", c);
        assert!(once.order() <= c.degree());
    }
}

#[test]
fn overlapping_lines_are_coincident() {
    let a = Curve::Line([pt(0.0, 0.0), pt(8.0, 4.0)]);
    let b = Curve::Line([pt(4.0, 2.0), pt(12.0, 6.0)]);
    let hits = intersect(&a, &b);
    assert!(hits.is_coincident());
    assert_eq!(params(&hits), vec![[0.5, 0.0], [1.0, 0.5]]);
}
