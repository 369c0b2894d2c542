// crates/rh_mesh/src/spatial_index.rs

//! 空间索引
//!
//! 基于 R-Tree 的空间索引，使用 rstar crate 实现。
//!
//! - [`MeshSpatialIndex`]: 多边形单元索引，查找点所在单元
//! - [`PointIndex`]: 点集索引，查找最近点
//!
//! 两者在结果不唯一时（共享边界上的点、等距的最近点）都返回编号最小者，
//! 保证结果与 R-Tree 内部遍历顺序无关。

use crate::mesh::TriMesh;
use rh_foundation::geometry::point_in_polygon;
use rh_foundation::Point2D;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

/// 边界判定的相对容差
const BOUNDARY_EPS: f64 = 1e-12;

/// 单元包围盒
///
/// 存储单元的轴对齐包围盒（AABB），用于 R-Tree 索引。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellEnvelope {
    /// 单元索引
    pub cell_index: usize,
    /// 最小 x 坐标
    pub min_x: f64,
    /// 最小 y 坐标
    pub min_y: f64,
    /// 最大 x 坐标
    pub max_x: f64,
    /// 最大 y 坐标
    pub max_y: f64,
}

impl CellEnvelope {
    /// 由单元顶点创建包围盒，顶点为空时返回 None
    pub fn new(cell_index: usize, vertices: &[Point2D]) -> Option<Self> {
        let first = vertices.first()?;
        let (mut min, mut max) = (*first, *first);
        for v in &vertices[1..] {
            min = min.min(v);
            max = max.max(v);
        }
        Some(Self {
            cell_index,
            min_x: min.x,
            min_y: min.y,
            max_x: max.x,
            max_y: max.y,
        })
    }

    /// 退化为单点的包围盒
    pub fn point(cell_index: usize, p: Point2D) -> Self {
        Self {
            cell_index,
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }
}

impl RTreeObject for CellEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

impl PointDistance for CellEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        // 点到 AABB 最短距离的平方
        let dx = if point[0] < self.min_x {
            self.min_x - point[0]
        } else if point[0] > self.max_x {
            point[0] - self.max_x
        } else {
            0.0
        };

        let dy = if point[1] < self.min_y {
            self.min_y - point[1]
        } else if point[1] > self.max_y {
            point[1] - self.max_y
        } else {
            0.0
        };

        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        point[0] >= self.min_x
            && point[0] <= self.max_x
            && point[1] >= self.min_y
            && point[1] <= self.max_y
    }
}

// ============================================================
// 多边形单元索引
// ============================================================

/// 多边形单元空间索引
pub struct MeshSpatialIndex {
    tree: RTree<CellEnvelope>,
    cell_vertices: Vec<Vec<Point2D>>,
}

impl MeshSpatialIndex {
    /// 从单元顶点构建空间索引
    ///
    /// `get_cell_vertices` 输入单元索引，返回该单元的顶点列表。
    pub fn build<F>(n_cells: usize, get_cell_vertices: F) -> Self
    where
        F: Fn(usize) -> Vec<Point2D>,
    {
        let mut envelopes = Vec::with_capacity(n_cells);
        let mut cell_vertices = Vec::with_capacity(n_cells);

        for i in 0..n_cells {
            let vertices = get_cell_vertices(i);
            if let Some(env) = CellEnvelope::new(i, &vertices) {
                envelopes.push(env);
            }
            cell_vertices.push(vertices);
        }

        Self {
            tree: RTree::bulk_load(envelopes),
            cell_vertices,
        }
    }

    /// 从三角网格构建
    pub fn from_mesh(mesh: &TriMesh) -> Self {
        Self::build(mesh.n_cells(), |i| mesh.cell_points(i).to_vec())
    }

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cell_vertices.len()
    }

    /// 查找包含指定点的单元
    ///
    /// 先用 R-Tree 筛选候选单元，再做射线法与边界测试。
    /// 多个单元包含该点时返回编号最小者。
    pub fn locate_point(&self, p: Point2D) -> Option<usize> {
        self.tree
            .locate_all_at_point(&[p.x, p.y])
            .map(|env| env.cell_index)
            .filter(|&i| {
                let poly = &self.cell_vertices[i];
                point_in_polygon(p, poly) || on_polygon_boundary(p, poly)
            })
            .min()
    }
}

/// 点是否落在多边形某条边上
fn on_polygon_boundary(p: Point2D, vertices: &[Point2D]) -> bool {
    let n = vertices.len();
    (0..n).any(|i| {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let ab = b - a;
        let len2 = ab.dot(&ab);
        if len2 <= 0.0 {
            return p.distance_squared_to(&a) <= BOUNDARY_EPS * BOUNDARY_EPS;
        }
        let ap = p - a;
        let cross = ab.cross(&ap);
        if cross.abs() > BOUNDARY_EPS * len2.max(1.0) {
            return false;
        }
        let t = ab.dot(&ap) / len2;
        (-BOUNDARY_EPS..=1.0 + BOUNDARY_EPS).contains(&t)
    })
}

// ============================================================
// 点集索引
// ============================================================

/// 点集空间索引（最近点查询）
pub struct PointIndex {
    tree: RTree<CellEnvelope>,
}

impl PointIndex {
    /// 构建点集索引，点的编号即其在切片中的位置
    pub fn new(points: &[Point2D]) -> Self {
        let envelopes = points
            .iter()
            .enumerate()
            .map(|(i, p)| CellEnvelope::point(i, *p))
            .collect();
        Self {
            tree: RTree::bulk_load(envelopes),
        }
    }

    /// 点数量
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// 最近点编号，等距时取编号最小者
    pub fn nearest(&self, p: Point2D) -> Option<usize> {
        let query = [p.x, p.y];
        let mut iter = self.tree.nearest_neighbor_iter(&query);
        let first = iter.next()?;
        let best_d2 = first.distance_2(&query);
        let mut best = first.cell_index;
        for env in iter {
            if env.distance_2(&query) > best_d2 {
                break;
            }
            best = best.min(env.cell_index);
        }
        Some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> TriMesh {
        TriMesh::new(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(1.0, 0.0),
                Point2D::new(1.0, 1.0),
                Point2D::new(0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_locate_point() {
        let index = MeshSpatialIndex::from_mesh(&two_triangles());
        assert_eq!(index.n_cells(), 2);
        assert_eq!(index.locate_point(Point2D::new(0.8, 0.2)), Some(0));
        assert_eq!(index.locate_point(Point2D::new(0.2, 0.8)), Some(1));
        assert_eq!(index.locate_point(Point2D::new(2.0, 2.0)), None);
    }

    #[test]
    fn test_shared_edge_lowest_index() {
        let index = MeshSpatialIndex::from_mesh(&two_triangles());
        // 位于公共对角线上
        assert_eq!(index.locate_point(Point2D::new(0.5, 0.5)), Some(0));
    }

    #[test]
    fn test_point_index_tie_break() {
        let points = vec![
            Point2D::new(1.0, 0.0),
            Point2D::new(-1.0, 0.0),
            Point2D::new(0.0, 5.0),
        ];
        let index = PointIndex::new(&points);
        assert_eq!(index.len(), 3);
        assert_eq!(index.nearest(Point2D::new(0.0, 0.0)), Some(0));
        assert_eq!(index.nearest(Point2D::new(-0.9, 0.1)), Some(1));
        assert_eq!(index.nearest(Point2D::new(0.0, 4.0)), Some(2));
    }

    #[test]
    fn test_empty_point_index() {
        let index = PointIndex::new(&[]);
        assert!(index.is_empty());
        assert_eq!(index.nearest(Point2D::ZERO), None);
    }
}
