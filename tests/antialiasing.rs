// Copyright 2025 The path-tessellator Authors
// Coverage fringe geometry for antialiased triangulation.

mod helpers;

use helpers::*;
use path_tessellator::tess::COVERAGE_STRIDE;
use path_tessellator::{FillType, Path, TessOption, Triangulator, VecVertexAllocator};

fn aa_triangles(path: &Path) -> VecVertexAllocator {
    init_logging();
    let mut t = Triangulator::default();
    t.set_option(TessOption::Antialias, true);
    let mut alloc = VecVertexAllocator::new();
    let out = t
        .path_to_triangles(path, 0.25, &clip(100.0), &mut alloc)
        .expect("triangulation");
    assert_eq!(alloc.stride, COVERAGE_STRIDE);
    assert_eq!(out.vertex_count % 3, 0);
    assert_eq!(out.vertex_count, alloc.count);
    for i in 0..alloc.count {
        assert!((0.0..=1.0).contains(&alloc.coverage(i)));
        assert!(alloc.point(i).is_finite());
    }
    alloc
}

fn split_area(alloc: &VecVertexAllocator) -> (f32, f32) {
    let (mut opaque, mut fringe) = (0.0, 0.0);
    for (i, tri) in alloc.triangles().enumerate() {
        let full = (0..3).all(|k| alloc.coverage(i * 3 + k) == 1.0);
        if full {
            opaque += triangle_area(&tri);
        } else {
            fringe += triangle_area(&tri);
        }
    }
    (opaque, fringe)
}

#[test]
fn square_gets_half_pixel_ramp_on_both_sides() {
    let sq = square(0.0, 0.0, 10.0);
    let alloc = aa_triangles(&polygon_path(&[&sq], FillType::Winding));
    let (opaque, fringe) = split_area(&alloc);
    // Core shrinks by half a pixel on each side, the fringe reaches half a
    // pixel past the edge.
    assert!((opaque - 81.0).abs() < 0.5, "opaque {}", opaque);
    assert!(fringe > 38.0 && fringe < 41.0, "fringe {}", fringe);
    for i in 0..alloc.count {
        let p = alloc.point(i);
        assert!(p.x >= -0.5 - 1e-3 && p.x <= 10.5 + 1e-3, "{:?}", p);
        assert!(p.y >= -0.5 - 1e-3 && p.y <= 10.5 + 1e-3, "{:?}", p);
        if alloc.coverage(i) == 0.0 {
            let inside = p.x > 0.0 && p.x < 10.0 && p.y > 0.0 && p.y < 10.0;
            assert!(!inside, "{:?}", p);
        }
    }
}

#[test]
fn self_intersecting_outline_takes_the_slow_path() {
    let bowtie = [(0.0, 0.0), (20.0, 20.0), (20.0, 0.0), (0.0, 20.0)];
    let alloc = aa_triangles(&polygon_path(&[&bowtie], FillType::Winding));
    assert!(alloc.count > 0);
    let (opaque, _) = split_area(&alloc);
    assert!(opaque > 0.0 && opaque < 200.0, "opaque {}", opaque);
}

#[test]
fn overlapping_contours_keep_coverage_in_range() {
    let a = square(0.0, 0.0, 10.0);
    let b = square(5.0, 5.0, 10.0);
    let alloc = aa_triangles(&polygon_path(&[&a, &b], FillType::Winding));
    let (opaque, fringe) = split_area(&alloc);
    assert!(opaque > 100.0, "opaque {}", opaque);
    assert!(fringe > 0.0);
}

#[test]
fn thin_shapes_do_not_invert() {
    let sliver = [(0.0, 0.0), (40.0, 0.0), (40.0, 0.5), (0.0, 0.5)];
    let alloc = aa_triangles(&polygon_path(&[&sliver], FillType::Winding));
    for i in 0..alloc.count {
        let p = alloc.point(i);
        assert!(p.y > -1.0 && p.y < 1.5, "{:?}", p);
    }
}
