// crates/rh_mesh/src/transfer.rs

//! 单元值与节点值之间的传递
//!
//! # 单元 → 节点
//!
//! - `Linear`: 节点相邻单元的中心按极角排序成环，耳切三角化后取包含节点的子三角形，
//!   得到 3 个单元编号 (`vtx`) 和重心坐标权重 (`wts`)。相邻单元少于 3 个，
//!   或节点不在中心环内时，取最近单元中心的值。
//!   插值只在节点自身的相邻单元环内进行，不对全部单元中心做整体三角剖分：
//!   凹边界处节点可能落在所有中心的凸包内却不在自身环内，此时同样取最近值，
//!   而整体剖分会在这里做线性插值。
//! - `Nearest`: 最近单元中心，等距时取编号最小者。
//!
//! 权重只依赖网格几何，按 [`GeometryKey`] 缓存在 [`CellNodeTransfer`] 中，
//! 几何不变的时间步直接复用。
//!
//! # 节点 → 单元
//!
//! [`node_to_cell`]: 单元三个节点值的算术平均。

use crate::geometry_key::GeometryKey;
use crate::mesh::TriMesh;
use crate::spatial_index::PointIndex;
use crate::triangulate::ear_clip;
use rayon::prelude::*;
use rh_config::TransferMethod;
use rh_foundation::geometry::{barycentric, point_in_polygon};
use rh_foundation::{Diagnostic, Diagnostics, Point2D, RhError, RhResult, GEOMETRY_EPS};
use std::collections::HashMap;
use std::sync::Arc;

/// 重心坐标的负值容差
const WEIGHT_TOL: f64 = 1e-9;

/// 插值权重
///
/// 节点 i 的值为 `Σ_k wts[i][k] * cell_values[vtx[i][k]]`。
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationWeights {
    /// 每个节点的 3 个单元编号
    pub vtx: Vec<[usize; 3]>,
    /// 每个节点的 3 个权重（和为 1）
    pub wts: Vec<[f64; 3]>,
    /// 计算权重时的诊断（边界回退节点）
    pub diagnostics: Diagnostics,
    n_cells: usize,
}

impl InterpolationWeights {
    /// 计算网格的插值权重
    pub fn compute(mesh: &TriMesh, method: TransferMethod) -> RhResult<Self> {
        if mesh.is_empty() {
            return Err(RhError::empty_data("单元到节点传递: 网格没有单元"));
        }
        mesh.check_connectivity()?;

        let centers = mesh.cell_centers();
        let index = PointIndex::new(&centers);
        let node_cells = mesh.node_cells();

        let per_node: Vec<(usize, Option<([usize; 3], [f64; 3])>)> = mesh
            .points
            .par_iter()
            .enumerate()
            .map(|(node, &p)| {
                let weights = match method {
                    TransferMethod::Linear => ring_weights(p, &node_cells[node], &centers),
                    TransferMethod::Nearest => None,
                };
                (node, weights)
            })
            .collect();

        let mut vtx = Vec::with_capacity(per_node.len());
        let mut wts = Vec::with_capacity(per_node.len());
        let mut diagnostics = Diagnostics::new();
        for (node, weights) in per_node {
            match weights {
                Some((v, w)) => {
                    vtx.push(v);
                    wts.push(w);
                }
                None => {
                    let nearest = index
                        .nearest(mesh.points[node])
                        .ok_or_else(|| RhError::internal("单元中心索引为空"))?;
                    vtx.push([nearest; 3]);
                    wts.push([1.0, 0.0, 0.0]);
                    if method == TransferMethod::Linear {
                        diagnostics.push(Diagnostic::BoundaryFallback { node });
                    }
                }
            }
        }

        log::debug!(
            "插值权重 ({}): {} 个节点, {} 个边界回退",
            method,
            vtx.len(),
            diagnostics.len()
        );

        Ok(Self {
            vtx,
            wts,
            diagnostics,
            n_cells: mesh.n_cells(),
        })
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.vtx.len()
    }

    /// 将单元值插值到节点
    pub fn apply(&self, cell_values: &[f64]) -> RhResult<Vec<f64>> {
        RhError::check_size("cell_values", self.n_cells, cell_values.len())?;
        Ok(self
            .vtx
            .iter()
            .zip(&self.wts)
            .map(|(v, w)| {
                w[0] * cell_values[v[0]] + w[1] * cell_values[v[1]] + w[2] * cell_values[v[2]]
            })
            .collect())
    }
}

/// 节点在相邻单元中心环内的插值权重
fn ring_weights(p: Point2D, cells: &[usize], centers: &[Point2D]) -> Option<([usize; 3], [f64; 3])> {
    if cells.len() < 3 {
        return None;
    }

    let mut ring: Vec<(f64, usize)> = cells
        .iter()
        .map(|&c| {
            let d = centers[c] - p;
            (d.y.atan2(d.x), c)
        })
        .collect();
    ring.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let polygon: Vec<Point2D> = ring.iter().map(|&(_, c)| centers[c]).collect();
    if !point_in_polygon(p, &polygon) {
        return None;
    }

    ear_clip(&polygon).into_iter().find_map(|[i, j, k]| {
        let lambda = barycentric(p, polygon[i], polygon[j], polygon[k], GEOMETRY_EPS)?;
        if lambda.iter().any(|&l| l < -WEIGHT_TOL) {
            return None;
        }
        let clamped = lambda.map(|l| l.max(0.0));
        let sum: f64 = clamped.iter().sum();
        Some((
            [ring[i].1, ring[j].1, ring[k].1],
            clamped.map(|l| l / sum),
        ))
    })
}

/// 单元 ↔ 节点传递器，持有按几何缓存的权重
#[derive(Debug, Default)]
pub struct CellNodeTransfer {
    cache: HashMap<(GeometryKey, TransferMethod), Arc<InterpolationWeights>>,
}

impl CellNodeTransfer {
    /// 创建空缓存的传递器
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取（必要时计算）网格的插值权重
    pub fn weights(
        &mut self,
        mesh: &TriMesh,
        method: TransferMethod,
    ) -> RhResult<Arc<InterpolationWeights>> {
        let key = (GeometryKey::of(mesh), method);
        if let Some(weights) = self.cache.get(&key) {
            log::trace!("复用插值权重 {}", key.0);
            return Ok(Arc::clone(weights));
        }
        let weights = Arc::new(InterpolationWeights::compute(mesh, method)?);
        self.cache.insert(key, Arc::clone(&weights));
        Ok(weights)
    }

    /// 单元值插值到节点
    pub fn cell_to_node(
        &mut self,
        mesh: &TriMesh,
        cell_values: &[f64],
        method: TransferMethod,
    ) -> RhResult<Vec<f64>> {
        mesh.check_cell_field("cell_values", cell_values)?;
        self.weights(mesh, method)?.apply(cell_values)
    }

    /// 缓存的权重组数
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// 清空缓存
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// 节点值平均到单元
pub fn node_to_cell(mesh: &TriMesh, node_values: &[f64]) -> RhResult<Vec<f64>> {
    mesh.check_node_field("node_values", node_values)?;
    Ok(mesh
        .ikle
        .iter()
        .map(|&[a, b, c]| (node_values[a] + node_values[b] + node_values[c]) / 3.0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::RawMesh;

    /// nx × ny 个单位正方形，每个沿 0-2 对角线拆成两个三角形
    fn grid(nx: usize, ny: usize) -> TriMesh {
        let mut points = Vec::new();
        for j in 0..=ny {
            for i in 0..=nx {
                points.push(Point2D::new(i as f64, j as f64));
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

    fn linear(p: Point2D) -> f64 {
        2.0 + 0.5 * p.x - 1.5 * p.y
    }

    #[test]
    fn test_linear_exact_on_interior_nodes() {
        let mesh = grid(3, 3);
        let values: Vec<f64> = mesh.cell_centers().into_iter().map(linear).collect();
        let mut transfer = CellNodeTransfer::new();
        let nodes = transfer
            .cell_to_node(&mesh, &values, TransferMethod::Linear)
            .unwrap();
        assert_eq!(nodes.len(), mesh.n_nodes());

        for (i, p) in mesh.points.iter().enumerate() {
            let interior = p.x > 0.5 && p.x < 2.5 && p.y > 0.5 && p.y < 2.5;
            if interior {
                assert!((nodes[i] - linear(*p)).abs() < 1e-10, "节点 {}", i);
            }
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let mesh = grid(4, 2);
        let weights = InterpolationWeights::compute(&mesh, TransferMethod::Linear).unwrap();
        for w in &weights.wts {
            assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            assert!(w.iter().all(|&x| x >= 0.0));
        }
        // 4 × 2 网格共 15 个节点，其中 3 个内部节点
        assert_eq!(weights.n_nodes(), 15);
        assert_eq!(weights.diagnostics.len(), 12);
    }

    #[test]
    fn test_constant_field_preserved() {
        let mesh = grid(3, 2);
        let values = vec![4.2; mesh.n_cells()];
        let mut transfer = CellNodeTransfer::new();
        for method in [TransferMethod::Linear, TransferMethod::Nearest] {
            let nodes = transfer.cell_to_node(&mesh, &values, method).unwrap();
            assert!(nodes.iter().all(|v| (v - 4.2).abs() < 1e-12));
        }
    }

    #[test]
    fn test_nearest_boundary_value() {
        let mesh = grid(1, 1);
        // 单元 0 中心 (2/3, 1/3)，单元 1 中心 (1/3, 2/3)
        let values = vec![10.0, 20.0];
        let mut transfer = CellNodeTransfer::new();
        let nodes = transfer
            .cell_to_node(&mesh, &values, TransferMethod::Nearest)
            .unwrap();
        // 节点 0 与节点 2 到两个中心等距，取编号较小的单元 0
        assert_eq!(nodes, vec![10.0, 10.0, 10.0, 20.0]);
    }

    #[test]
    fn test_linear_falls_back_without_ring() {
        // 每个节点至多两个相邻单元，无法成环，全部取最近中心
        let mesh = grid(1, 1);
        let values = vec![10.0, 20.0];
        let mut transfer = CellNodeTransfer::new();
        let linear = transfer
            .cell_to_node(&mesh, &values, TransferMethod::Linear)
            .unwrap();
        let nearest = transfer
            .cell_to_node(&mesh, &values, TransferMethod::Nearest)
            .unwrap();
        assert_eq!(linear, nearest);
    }

    #[test]
    fn test_size_mismatch() {
        let mesh = grid(1, 1);
        let mut transfer = CellNodeTransfer::new();
        let result = transfer.cell_to_node(&mesh, &[1.0], TransferMethod::Linear);
        assert!(matches!(result, Err(RhError::SizeMismatch { .. })));
    }

    #[test]
    fn test_cache_reuse_and_new_geometry() {
        let mesh = grid(2, 2);
        let mut transfer = CellNodeTransfer::new();
        let a = transfer.weights(&mesh, TransferMethod::Linear).unwrap();
        let b = transfer.weights(&mesh, TransferMethod::Linear).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(transfer.cached_len(), 1);

        let mut moved = mesh.clone();
        moved.points[4].x += 0.1;
        let c = transfer.weights(&moved, TransferMethod::Linear).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(transfer.cached_len(), 2);

        transfer.clear();
        assert_eq!(transfer.cached_len(), 0);
    }

    #[test]
    fn test_empty_mesh_is_error() {
        let mut transfer = CellNodeTransfer::new();
        let result = transfer.cell_to_node(&TriMesh::empty(), &[], TransferMethod::Linear);
        assert!(matches!(result, Err(RhError::EmptyData { .. })));
    }

    #[test]
    fn test_node_to_cell() {
        let mesh = grid(1, 1);
        let cells = node_to_cell(&mesh, &[0.0, 3.0, 6.0, 9.0]).unwrap();
        assert!((cells[0] - 4.0).abs() < 1e-12);
        assert!((cells[1] - 5.0).abs() < 1e-12);
        assert!(node_to_cell(&mesh, &[1.0]).is_err());
    }
}
