// crates/rh_substrate/src/lib.rs

//! RiverHab Substrate Layer
//!
//! 底质编码、主导类计算与水力/底质网格合并。
//!
//! # 模块概览
//!
//! - [`code`]: Cemagref / Sandre / EDF 编码转换
//! - [`classify`]: 百分比与主导类互转，百分比之和检查
//! - [`mesh`]: 底质多边形网格
//! - [`merge`]: 以水力单元重心定位底质多边形
//!
//! # 示例
//!
//! ```
//! use rh_foundation::{Bounds2D, Point2D};
//! use rh_mesh::TriMesh;
//! use rh_substrate::{HydroTimestep, SubstrateMerger, SubstrateMesh, SubstrateOrigin};
//!
//! let bounds = Bounds2D::from_points(&[Point2D::new(0.0, 0.0), Point2D::new(2.0, 2.0)]).unwrap();
//! let merger = SubstrateMerger::new(SubstrateMesh::constant(bounds, 5).unwrap(), 1).unwrap();
//!
//! let mesh = TriMesh::new(
//!     vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0)],
//!     vec![[0, 1, 2]],
//! )
//! .unwrap();
//! let hydro = HydroTimestep::new(mesh, vec![0.3; 3], vec![1.0; 3]).unwrap();
//! let merged = merger.merge(hydro).unwrap();
//! assert_eq!(merged.origin, vec![SubstrateOrigin::Matched(0)]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod code;
pub mod error;
pub mod merge;
pub mod mesh;

pub use classify::{
    check_percentage_sums, dominant_to_percentage, percentage_sum_ok, percentage_to_dominant,
    percentage_to_dominant_coarse, Dominant,
};
pub use code::{Percentages, SubstrateCode, N_CEMAGREF};
pub use error::SubstrateError;
pub use merge::{HydroTimestep, MergedTimestep, SubstrateMerger, SubstrateOrigin};
pub use mesh::SubstrateMesh;
