// crates/rh_mesh/src/lib.rs

//! RiverHab Mesh Layer
//!
//! 统一的三角网格表示及其上的通用操作。
//!
//! # 模块概览
//!
//! - [`mesh`]: `TriMesh` 三角网格与 `RawMesh` 混合网格（四边形按 0-2 对角线拆分）
//! - [`geometry_key`]: 网格几何指纹，用作插值权重缓存键
//! - [`spatial_index`]: 基于 R-Tree 的单元定位与最近点查询
//! - [`triangulate`]: 耳切法多边形三角化
//! - [`transfer`]: 单元值与节点值之间的传递（带权重缓存）
//! - [`clip`]: 按最小水深裁剪湿区网格
//!
//! # 示例
//!
//! ```
//! use rh_foundation::Point2D;
//! use rh_mesh::{clip_wet_area, TriMesh};
//!
//! let mesh = TriMesh::new(
//!     vec![
//!         Point2D::new(0.0, 0.0),
//!         Point2D::new(1.0, 0.0),
//!         Point2D::new(1.0, 1.0),
//!         Point2D::new(0.0, 1.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! )
//! .unwrap();
//!
//! let depth = vec![0.5, 0.5, 0.5, 0.0];
//! let velocity = vec![1.0; 4];
//! let wet = clip_wet_area(&mesh, &depth, &velocity, 0.1).unwrap();
//! assert_eq!(wet.n_cells(), 1);
//! assert_eq!(wet.n_nodes(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clip;
pub mod error;
pub mod geometry_key;
pub mod mesh;
pub mod spatial_index;
pub mod transfer;
pub mod triangulate;

pub use clip::{clip_wet_area, WetMesh};
pub use error::{MeshError, MeshResult};
pub use geometry_key::GeometryKey;
pub use mesh::{RawMesh, SplitMesh, TriMesh};
pub use spatial_index::{CellEnvelope, MeshSpatialIndex, PointIndex};
pub use transfer::{node_to_cell, CellNodeTransfer, InterpolationWeights};
