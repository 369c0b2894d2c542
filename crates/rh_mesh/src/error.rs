// crates/rh_mesh/src/error.rs
//! 网格错误类型
//!
//! 所有错误可转换为 `rh_foundation::RhError` 向上传播

use rh_foundation::RhError;
use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// 单元引用了不存在的节点
    #[error("单元 {cell} 引用节点 {node}, 节点总数 {n_nodes}")]
    NodeIndexOutOfRange {
        /// 单元编号
        cell: usize,
        /// 节点编号
        node: usize,
        /// 节点总数
        n_nodes: usize,
    },

    /// 节点未被任何单元引用
    #[error("节点 {node} 未被任何单元引用")]
    OrphanNode {
        /// 节点编号
        node: usize,
    },

    /// 节点坐标非有限值
    #[error("节点 {node} 坐标非有限值")]
    NonFinitePoint {
        /// 节点编号
        node: usize,
    },

    /// 单元顶点数不受支持
    #[error("单元 {cell} 有 {n_vertices} 个顶点, 仅支持三角形和四边形")]
    UnsupportedCell {
        /// 单元编号
        cell: usize,
        /// 顶点数
        n_vertices: usize,
    },
}

/// 转换到基础层错误
impl From<MeshError> for RhError {
    fn from(err: MeshError) -> Self {
        RhError::invalid_mesh(err.to_string())
    }
}
