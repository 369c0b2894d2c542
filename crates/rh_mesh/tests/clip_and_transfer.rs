// crates/rh_mesh/tests/clip_and_transfer.rs

//! 湿区裁剪与单元/节点传递的整体性质

use rh_config::TransferMethod;
use rh_foundation::Point2D;
use rh_mesh::{clip_wet_area, CellNodeTransfer, RawMesh, TriMesh};

/// 带扰动的四边形网格，拆分为三角形
fn perturbed_grid(nx: usize, ny: usize) -> TriMesh {
    let mut points = Vec::new();
    for j in 0..=ny {
        for i in 0..=nx {
            let wobble = if i > 0 && i < nx && j > 0 && j < ny {
                0.15 * ((i * 7 + j * 3) as f64).sin()
            } else {
                0.0
            };
            points.push(Point2D::new(i as f64 + wobble, j as f64 - wobble));
        }
    }
    let id = |i: usize, j: usize| j * (nx + 1) + i;
    let mut cells = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            cells.push(vec![id(i, j), id(i + 1, j), id(i + 1, j + 1), id(i, j + 1)]);
        }
    }
    RawMesh::new(points, cells).split().unwrap().mesh
}

#[test]
fn test_all_wet_is_identity() {
    let mesh = perturbed_grid(6, 4);
    let depth: Vec<f64> = (0..mesh.n_nodes()).map(|i| 0.5 + 0.01 * i as f64).collect();
    let velocity: Vec<f64> = (0..mesh.n_nodes()).map(|i| i as f64).collect();

    let wet = clip_wet_area(&mesh, &depth, &velocity, 0.5).unwrap();
    assert_eq!(wet.mesh, mesh);
    assert_eq!(wet.depth, depth);
    assert_eq!(wet.velocity, velocity);
    assert_eq!(wet.cell_origin, (0..mesh.n_cells()).collect::<Vec<_>>());
}

#[test]
fn test_all_dry_is_empty() {
    let mesh = perturbed_grid(3, 3);
    let depth = vec![0.0; mesh.n_nodes()];
    let wet = clip_wet_area(&mesh, &depth, &depth, 1e-3).unwrap();
    assert!(wet.is_dry());
    assert_eq!(wet.n_cells(), 0);
    assert_eq!(wet.n_nodes(), 0);
}

#[test]
fn test_clip_never_leaves_orphans() {
    let mesh = perturbed_grid(5, 5);
    let depth: Vec<f64> = mesh.points.iter().map(|p| 2.5 - p.x).collect();
    let velocity = vec![1.0; mesh.n_nodes()];
    let wet = clip_wet_area(&mesh, &depth, &velocity, 0.0).unwrap();

    assert!(!wet.is_dry());
    assert!(wet.n_cells() < mesh.n_cells());
    assert!(wet.mesh.validate().is_ok());
    assert!(wet.depth.iter().all(|&h| h >= 0.0));
}

#[test]
fn test_transfer_then_clip() {
    let mesh = perturbed_grid(4, 4);
    let cell_depth: Vec<f64> = mesh.cell_centers().iter().map(|c| 0.2 * c.y).collect();
    let cell_velocity = vec![0.8; mesh.n_cells()];

    let mut transfer = CellNodeTransfer::new();
    let depth = transfer
        .cell_to_node(&mesh, &cell_depth, TransferMethod::Linear)
        .unwrap();
    let velocity = transfer
        .cell_to_node(&mesh, &cell_velocity, TransferMethod::Linear)
        .unwrap();
    // 几何不变，两次传递共用一组权重
    assert_eq!(transfer.cached_len(), 1);
    assert_eq!(depth.len(), mesh.n_nodes());
    assert!(velocity.iter().all(|v| (v - 0.8).abs() < 1e-12));

    let wet = clip_wet_area(&mesh, &depth, &velocity, 0.3).unwrap();
    assert!(wet.mesh.validate().is_ok());
    assert_eq!(wet.depth.len(), wet.n_nodes());
    assert_eq!(wet.velocity.len(), wet.n_nodes());
}
