// crates/rh_mesh/src/clip.rs

//! 湿区裁剪
//!
//! 单元的所有节点水深都不小于 `min_depth` 时保留该单元。保留的节点按原编号升序
//! 重新连续编号，节点场按同一映射切片。全干结果是合法的空网格，不是错误。

use crate::mesh::TriMesh;
use rh_foundation::{RhError, RhResult};

/// 湿区网格
#[derive(Debug, Clone, PartialEq)]
pub struct WetMesh {
    /// 裁剪后的网格
    pub mesh: TriMesh,
    /// 节点水深
    pub depth: Vec<f64>,
    /// 节点流速
    pub velocity: Vec<f64>,
    /// 每个新节点对应的原节点编号
    pub node_origin: Vec<usize>,
    /// 每个新单元对应的原单元编号
    pub cell_origin: Vec<usize>,
}

impl WetMesh {
    /// 是否全干（没有单元）
    #[inline]
    pub fn is_dry(&self) -> bool {
        self.mesh.is_empty()
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.mesh.n_nodes()
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.mesh.n_cells()
    }

    /// 按节点映射切片原网格上的节点场
    pub fn slice_nodes<T: Clone>(&self, source: &[T]) -> Vec<T> {
        self.node_origin.iter().map(|&i| source[i].clone()).collect()
    }

    /// 按单元映射切片原网格上的单元场
    pub fn slice_cells<T: Clone>(&self, source: &[T]) -> Vec<T> {
        self.cell_origin.iter().map(|&i| source[i].clone()).collect()
    }
}

/// 裁剪湿区
///
/// `depth` 与 `velocity` 为节点场。网格没有单元视为缺少数据，返回错误。
pub fn clip_wet_area(
    mesh: &TriMesh,
    depth: &[f64],
    velocity: &[f64],
    min_depth: f64,
) -> RhResult<WetMesh> {
    if !min_depth.is_finite() || min_depth < 0.0 {
        return Err(RhError::out_of_range("min_depth", min_depth, 0.0, f64::MAX));
    }
    if mesh.is_empty() {
        return Err(RhError::empty_data("湿区裁剪: 网格没有单元"));
    }
    mesh.check_connectivity()?;
    mesh.check_node_field("depth", depth)?;
    mesh.check_node_field("velocity", velocity)?;

    let is_wet = |v: usize| depth[v] >= min_depth;

    let mut cell_origin = Vec::new();
    let mut keep_node = vec![false; mesh.n_nodes()];
    for (cell, tri) in mesh.ikle.iter().enumerate() {
        if tri.iter().all(|&v| is_wet(v)) {
            cell_origin.push(cell);
            for &v in tri {
                keep_node[v] = true;
            }
        }
    }

    const UNUSED: usize = usize::MAX;
    let mut new_index = vec![UNUSED; mesh.n_nodes()];
    let mut node_origin = Vec::new();
    for (old, &keep) in keep_node.iter().enumerate() {
        if keep {
            new_index[old] = node_origin.len();
            node_origin.push(old);
        }
    }

    let ikle = cell_origin
        .iter()
        .map(|&c| mesh.ikle[c].map(|v| new_index[v]))
        .collect();
    let points = node_origin.iter().map(|&i| mesh.points[i]).collect();

    let wet = WetMesh {
        mesh: TriMesh { points, ikle },
        depth: node_origin.iter().map(|&i| depth[i]).collect(),
        velocity: node_origin.iter().map(|&i| velocity[i]).collect(),
        node_origin,
        cell_origin,
    };

    if wet.is_dry() {
        log::debug!("湿区裁剪: 全部单元低于最小水深 {}", min_depth);
    } else {
        log::debug!(
            "湿区裁剪: 保留 {}/{} 个单元, {}/{} 个节点",
            wet.n_cells(),
            mesh.n_cells(),
            wet.n_nodes(),
            mesh.n_nodes()
        );
    }
    Ok(wet)
}
