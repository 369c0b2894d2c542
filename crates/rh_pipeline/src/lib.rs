// crates/rh_pipeline/src/lib.rs

//! RiverHab Pipeline
//!
//! 把各模型输出统一为逐时间步的三角网格 + 节点流速/水深，
//! 可选地与底质网格合并。
//!
//! # 处理规则
//!
//! - 配置无效、糙率表无法读取、底质网格为空等文件级错误中止整个运行
//! - 单个时间步失败记入 [`RunReport::failures`]，其余时间步照常处理
//! - 全干时间步是合法结果，输出空网格
//!
//! # 示例
//!
//! ```
//! use rh_config::PipelineConfig;
//! use rh_pipeline::{Pipeline, ProfileInput, ProfileTimestep};
//! use rh_profile::{Profile, ProfileHydro, ReachLayout};
//!
//! let profiles: Vec<Profile> = (0..3)
//!     .map(|i| Profile::transect(10.0 * i as f64, &[0.0, 1.0, 2.0], &[0.0; 3]).unwrap())
//!     .collect();
//! let wet = ProfileHydro::new(vec![0.4; 3], vec![1.0; 3]);
//! let input = ProfileInput {
//!     profiles,
//!     layout: ReachLayout::single(3),
//!     hydro_per_timestep: vec![ProfileTimestep::Observed(vec![wet; 3])],
//! };
//!
//! let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let report = pipeline.run_profiles(&input).unwrap();
//! assert!(report.is_complete());
//! assert_eq!(report.outputs[0].mesh.n_cells(), 8);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;

pub use error::{PipelineError, PipelineResult};
pub use input::{LammiInput, ProfileInput, ProfileTimestep, RawMeshInput};
pub use output::{CellSubstrate, RunReport, TimestepFailure, TimestepOutput};
pub use pipeline::Pipeline;
