// Copyright 2025 The path-tessellator Authors
// Fill rule coverage and winding conservation.

mod helpers;

use helpers::*;
use path_tessellator::{path_to_vertices, FillType, Triangulator, VecVertexAllocator};

const STAR: [(f32, f32); 5] = [(0.0, -10.0), (5.9, 8.1), (-9.5, -3.1), (9.5, -3.1), (-5.9, 8.1)];

fn area_for(contours: &[&[(f32, f32)]], fill: FillType, clip_half: f32) -> f32 {
    init_logging();
    let path = polygon_path(contours, fill);
    let mut alloc = VecVertexAllocator::new();
    Triangulator::default()
        .path_to_triangles(&path, 0.25, &clip(clip_half), &mut alloc)
        .expect("triangulation");
    total_area(&alloc)
}

fn assert_area(actual: f32, expected: f32, label: &str) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "{}: expected area ~{}, got {}",
        label,
        expected,
        actual
    );
}

#[test]
fn nested_squares_same_direction() {
    let outer = square(-3.0, -3.0, 6.0);
    let middle = square(-2.0, -2.0, 4.0);
    let inner = square(-1.0, -1.0, 2.0);
    let c: [&[(f32, f32)]; 3] = [&outer, &middle, &inner];
    assert_area(area_for(&c, FillType::Winding, 5.0), 36.0, "winding");
    assert_area(area_for(&c, FillType::EvenOdd, 5.0), 24.0, "even-odd");
    assert_area(area_for(&c, FillType::InverseWinding, 5.0), 100.0 - 36.0, "inverse winding");
    assert_area(area_for(&c, FillType::InverseEvenOdd, 5.0), 100.0 - 24.0, "inverse even-odd");
}

#[test]
fn nested_squares_alternating_direction() {
    let outer = square(-3.0, -3.0, 6.0);
    let middle = reversed(&square(-2.0, -2.0, 4.0));
    let inner = square(-1.0, -1.0, 2.0);
    let c: [&[(f32, f32)]; 3] = [&outer, &middle, &inner];
    assert_area(area_for(&c, FillType::Winding, 5.0), 24.0, "winding");
    assert_area(area_for(&c, FillType::EvenOdd, 5.0), 24.0, "even-odd");
}

#[test]
fn pentagram_center_depends_on_rule() {
    let c: [&[(f32, f32)]; 1] = [&STAR];
    let winding = area_for(&c, FillType::Winding, 50.0);
    let even_odd = area_for(&c, FillType::EvenOdd, 50.0);
    assert!(winding > even_odd + 1.0, "{} vs {}", winding, even_odd);
}

#[test]
fn emitted_windings_match_ray_casting() {
    init_logging();
    let outer = square(0.0, 0.0, 8.0);
    let overlap = square(4.0, 4.0, 8.0);
    let cases: [(&str, Vec<&[(f32, f32)]>); 2] =
        [("star", vec![&STAR[..]]), ("overlapping squares", vec![&outer[..], &overlap[..]])];
    for (label, contours) in &cases {
        let path = polygon_path(contours, FillType::Winding);
        let verts = path_to_vertices(&path, 0.25, &clip(50.0));
        assert!(!verts.is_empty(), "{}", label);
        assert_eq!(verts.len() % 3, 0);
        for tri in verts.chunks(3) {
            assert!(tri.iter().all(|v| v.winding == tri[0].winding), "{}", label);
            let t = [tri[0].pos, tri[1].pos, tri[2].pos];
            if triangle_area(&t) < 1e-4 {
                continue;
            }
            let expected = winding_at(contours, centroid(&t));
            assert_eq!(tri[0].winding.abs(), expected.abs(), "{} at {:?}", label, centroid(&t));
        }
    }
}

#[test]
fn even_odd_never_emits_even_regions() {
    init_logging();
    let c: [&[(f32, f32)]; 1] = [&STAR];
    let path = polygon_path(&c, FillType::EvenOdd);
    let verts = path_to_vertices(&path, 0.25, &clip(50.0));
    assert!(!verts.is_empty());
    assert!(verts.iter().all(|v| v.winding & 1 == 1));
}

#[test]
fn degenerate_paths_emit_nothing() {
    init_logging();
    let line: [(f32, f32); 3] = [(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)];
    let dot: [(f32, f32); 3] = [(1.0, 1.0); 3];
    for c in [&line[..], &dot[..]] {
        let path = polygon_path(&[c], FillType::Winding);
        let mut alloc = VecVertexAllocator::new();
        let t = Triangulator::default()
            .path_to_triangles(&path, 0.25, &clip(50.0), &mut alloc)
            .expect("triangulation");
        assert_eq!(t.vertex_count, 0);
        assert_eq!(alloc.lock_calls, 0);
    }
}
