// crates/rh_mesh/src/mesh.rs

//! 三角网格
//!
//! [`TriMesh`] 是各模型输出统一后的网格表示：节点坐标 + IKLE 连接表。
//! [`RawMesh`] 承载三角形/四边形混合单元，通过 [`RawMesh::split`]
//! 沿 0-2 对角线拆分为三角网格，单元值随拆分复制到两半。

use crate::error::{MeshError, MeshResult};
use rh_foundation::geometry::{signed_area, triangle_centroid};
use rh_foundation::{Point2D, RhError, RhResult};
use serde::{Deserialize, Serialize};

/// 三角网格
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriMesh {
    /// 节点坐标
    pub points: Vec<Point2D>,
    /// 单元连接表，每个单元三个节点编号
    pub ikle: Vec<[usize; 3]>,
}

impl TriMesh {
    /// 创建网格并检查连接表
    pub fn new(points: Vec<Point2D>, ikle: Vec<[usize; 3]>) -> RhResult<Self> {
        let mesh = Self { points, ikle };
        mesh.check_connectivity()?;
        Ok(mesh)
    }

    /// 空网格（全干结果）
    pub fn empty() -> Self {
        Self::default()
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.points.len()
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.ikle.len()
    }

    /// 是否没有单元
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ikle.is_empty()
    }

    /// 检查坐标有限且所有节点编号有效
    pub fn check_connectivity(&self) -> MeshResult<()> {
        if let Some(node) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFinitePoint { node });
        }
        let n_nodes = self.points.len();
        for (cell, tri) in self.ikle.iter().enumerate() {
            if let Some(&node) = tri.iter().find(|&&v| v >= n_nodes) {
                return Err(MeshError::NodeIndexOutOfRange {
                    cell,
                    node,
                    n_nodes,
                });
            }
        }
        Ok(())
    }

    /// 未被任何单元引用的节点
    pub fn orphan_nodes(&self) -> Vec<usize> {
        let mut used = vec![false; self.points.len()];
        for tri in &self.ikle {
            for &v in tri {
                if let Some(flag) = used.get_mut(v) {
                    *flag = true;
                }
            }
        }
        used.iter()
            .enumerate()
            .filter_map(|(i, &u)| (!u).then_some(i))
            .collect()
    }

    /// 完整验证：连接表有效且无孤立节点
    pub fn validate(&self) -> RhResult<()> {
        self.check_connectivity()?;
        if let Some(&node) = self.orphan_nodes().first() {
            return Err(MeshError::OrphanNode { node }.into());
        }
        Ok(())
    }

    /// 单元三个顶点坐标
    #[inline]
    pub fn cell_points(&self, cell: usize) -> [Point2D; 3] {
        let [a, b, c] = self.ikle[cell];
        [self.points[a], self.points[b], self.points[c]]
    }

    /// 单元有向面积（逆时针为正）
    pub fn cell_area(&self, cell: usize) -> f64 {
        let [a, b, c] = self.cell_points(cell);
        signed_area(a, b, c)
    }

    /// 所有单元的重心
    pub fn cell_centers(&self) -> Vec<Point2D> {
        (0..self.n_cells())
            .map(|i| {
                let [a, b, c] = self.cell_points(i);
                triangle_centroid(a, b, c)
            })
            .collect()
    }

    /// 网格总面积（绝对值之和）
    pub fn total_area(&self) -> f64 {
        (0..self.n_cells()).map(|i| self.cell_area(i).abs()).sum()
    }

    /// 每个节点相邻的单元（按单元编号升序）
    pub fn node_cells(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.points.len()];
        for (cell, tri) in self.ikle.iter().enumerate() {
            for &v in tri {
                adjacency[v].push(cell);
            }
        }
        adjacency
    }

    /// 检查节点场长度
    pub fn check_node_field(&self, name: &'static str, values: &[f64]) -> RhResult<()> {
        RhError::check_size(name, self.n_nodes(), values.len())
    }

    /// 检查单元场长度
    pub fn check_cell_field(&self, name: &'static str, values: &[f64]) -> RhResult<()> {
        RhError::check_size(name, self.n_cells(), values.len())
    }
}

// ============================================================================
// 混合网格
// ============================================================================

/// 三角形/四边形混合网格
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMesh {
    /// 节点坐标
    pub points: Vec<Point2D>,
    /// 单元顶点列表（3 或 4 个节点）
    pub cells: Vec<Vec<usize>>,
}

/// 拆分后的三角网格及其来源映射
#[derive(Debug, Clone, PartialEq)]
pub struct SplitMesh {
    /// 三角网格
    pub mesh: TriMesh,
    /// 每个三角形对应的原始单元编号
    pub origin: Vec<usize>,
    n_raw_cells: usize,
}

impl RawMesh {
    /// 创建混合网格
    pub fn new(points: Vec<Point2D>, cells: Vec<Vec<usize>>) -> Self {
        Self { points, cells }
    }

    /// 原始单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// 四边形单元数
    pub fn n_quads(&self) -> usize {
        self.cells.iter().filter(|c| c.len() == 4).count()
    }

    /// 拆分为三角网格
    ///
    /// 四边形 `[a, b, c, d]` 拆为 `[a, b, c]` 与 `[a, c, d]`。
    pub fn split(&self) -> RhResult<SplitMesh> {
        let mut ikle = Vec::with_capacity(self.cells.len() + self.n_quads());
        let mut origin = Vec::with_capacity(ikle.capacity());

        for (i, cell) in self.cells.iter().enumerate() {
            match cell.as_slice() {
                &[a, b, c] => {
                    ikle.push([a, b, c]);
                    origin.push(i);
                }
                &[a, b, c, d] => {
                    ikle.push([a, b, c]);
                    ikle.push([a, c, d]);
                    origin.push(i);
                    origin.push(i);
                }
                other => {
                    return Err(MeshError::UnsupportedCell {
                        cell: i,
                        n_vertices: other.len(),
                    }
                    .into())
                }
            }
        }

        let mesh = TriMesh::new(self.points.clone(), ikle)?;
        log::debug!(
            "混合网格拆分: {} 个单元 ({} 个四边形) -> {} 个三角形",
            self.cells.len(),
            self.n_quads(),
            mesh.n_cells()
        );
        Ok(SplitMesh {
            mesh,
            origin,
            n_raw_cells: self.cells.len(),
        })
    }
}

impl SplitMesh {
    /// 将原始单元场复制到拆分后的三角形
    pub fn expand<T: Clone>(&self, values: &[T]) -> RhResult<Vec<T>> {
        RhError::check_size("raw_cell_field", self.n_raw_cells, values.len())?;
        Ok(self.origin.iter().map(|&i| values[i].clone()).collect())
    }
}
