// crates/rh_foundation/src/lib.rs

//! RiverHab Foundation Layer
//!
//! 基础层，为网格构建、插值与底质合并提供共用抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `RhError` / `RhResult`
//! - [`geometry`]: 二维点与平面几何工具（面积、重心坐标、点在多边形内）
//! - [`diagnostics`]: 非致命几何诊断（空洞、重叠、退化三角形等）
//!
//! # 设计原则
//!
//! 1. **少依赖**: 仅依赖 serde 和 thiserror
//! 2. **显式失败**: 所有失败以 `RhResult` 返回，不使用哨兵值
//! 3. **诊断即数据**: 几何问题记录为 [`Diagnostic`]，不中断构建
//!
//! # 示例
//!
//! ```
//! use rh_foundation::{Point2D, RhError, RhResult};
//! use rh_foundation::geometry::signed_area;
//!
//! fn area() -> RhResult<f64> {
//!     let a = Point2D::new(0.0, 0.0);
//!     let b = Point2D::new(1.0, 0.0);
//!     let c = Point2D::new(0.0, 1.0);
//!     let s = signed_area(a, b, c);
//!     if s <= 0.0 {
//!         return Err(RhError::invalid_mesh("三角形方向错误"));
//!     }
//!     Ok(s)
//! }
//! assert!((area().unwrap() - 0.5).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostics;
pub mod error;
pub mod geometry;

// 重导出常用类型
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{RhError, RhResult};
pub use geometry::{Bounds2D, Point2D};

/// 几何判断默认容差（面积、长度）
pub const GEOMETRY_EPS: f64 = 1e-12;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::diagnostics::{Diagnostic, Diagnostics};
    pub use crate::error::{RhError, RhResult};
    pub use crate::geometry::{Bounds2D, Point2D};
    pub use crate::GEOMETRY_EPS;
}
