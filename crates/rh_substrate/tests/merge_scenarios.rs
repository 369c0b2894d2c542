// crates/rh_substrate/tests/merge_scenarios.rs

//! 水力/底质合并场景

use rh_config::DominantCase;
use rh_foundation::{Diagnostic, Point2D};
use rh_mesh::{clip_wet_area, TriMesh};
use rh_substrate::{
    dominant_to_percentage, percentage_to_dominant, Dominant, HydroTimestep, SubstrateCode,
    SubstrateMerger, SubstrateMesh, SubstrateOrigin,
};

/// 3 x 1 的四边形条带拆成 6 个三角形，x ∈ [0, 3]
fn hydraulic_strip() -> TriMesh {
    let mut points = Vec::new();
    for i in 0..=3 {
        points.push(Point2D::new(i as f64, 0.0));
        points.push(Point2D::new(i as f64, 1.0));
    }
    let mut ikle = Vec::new();
    for i in 0..3 {
        let (a, b, c, d) = (2 * i, 2 * i + 2, 2 * i + 3, 2 * i + 1);
        ikle.push([a, b, c]);
        ikle.push([a, c, d]);
    }
    TriMesh::new(points, ikle).unwrap()
}

/// 覆盖 x ∈ [-1, 2] 的底质：两个矩形，编码 6 与 3
fn substrate() -> SubstrateMesh {
    let points = vec![
        Point2D::new(-1.0, -1.0),
        Point2D::new(0.5, -1.0),
        Point2D::new(2.0, -1.0),
        Point2D::new(2.0, 2.0),
        Point2D::new(0.5, 2.0),
        Point2D::new(-1.0, 2.0),
    ];
    SubstrateMesh::from_dominant(points, vec![vec![0, 1, 4, 5], vec![1, 2, 3, 4]], &[6, 3]).unwrap()
}

#[test]
fn test_four_inside_two_outside() {
    let mesh = hydraulic_strip();
    let n = mesh.n_nodes();
    let hydro = HydroTimestep::new(mesh.clone(), vec![0.4; n], vec![1.2; n]).unwrap();

    let merger = SubstrateMerger::new(substrate(), 2).unwrap();
    let merged = merger.merge(hydro).unwrap();

    assert_eq!(merged.mesh, mesh);
    assert_eq!(merged.dominant.len(), 6);

    let matched = merged
        .origin
        .iter()
        .filter(|o| matches!(o, SubstrateOrigin::Matched(_)))
        .count();
    assert_eq!(matched, 4);
    assert_eq!(merged.n_defaulted(), 2);
    assert_eq!(merged.diagnostics.unmatched(), 2);

    // 最后一个方格（x ∈ [2, 3]）的两个单元使用默认底质
    for cell in [4, 5] {
        assert_eq!(merged.origin[cell], SubstrateOrigin::Default);
        assert_eq!(merged.dominant[cell], Dominant::Class(2));
        assert!((merged.percentages[cell][1] - 100.0).abs() < 1e-12);
        assert!(merged
            .diagnostics
            .iter()
            .any(|d| *d == Diagnostic::UnmatchedSubstrate { cell }));
    }
    // 第一个方格的两个单元重心 x 分别为 2/3 与 1/3，分属两个多边形
    assert_eq!(merged.origin[0], SubstrateOrigin::Matched(1));
    assert_eq!(merged.origin[1], SubstrateOrigin::Matched(0));
    assert_eq!(merged.dominant[0], Dominant::Class(3));
    assert_eq!(merged.dominant[1], Dominant::Class(6));
}

#[test]
fn test_merge_after_clip() {
    let mesh = hydraulic_strip();
    let depth: Vec<f64> = mesh.points.iter().map(|p| 3.0 - p.x).collect();
    let velocity = vec![0.5; mesh.n_nodes()];
    let wet = clip_wet_area(&mesh, &depth, &velocity, 1.5).unwrap();
    assert_eq!(wet.n_cells(), 2);

    let merger = SubstrateMerger::new(substrate(), 1).unwrap();
    let merged = merger.merge(HydroTimestep::from(wet)).unwrap();
    assert_eq!(merged.n_defaulted(), 0);
    assert_eq!(merged.dominant.len(), 2);
}

#[test]
fn test_empty_substrate_rejected() {
    assert!(SubstrateMesh::from_dominant(vec![], vec![], &[]).is_err());
}

#[test]
fn test_substrate_round_trip() {
    for class in 1..=8u8 {
        let pct = dominant_to_percentage(class).unwrap();
        for case in [DominantCase::Finest, DominantCase::Undetermined, DominantCase::Coarsest] {
            assert_eq!(percentage_to_dominant(&pct, case), Dominant::Class(class));
        }
        let sandre = SubstrateCode::Sandre.from_cemagref(class).unwrap();
        assert_eq!(SubstrateCode::Sandre.to_cemagref(sandre).unwrap(), class);
    }
}
