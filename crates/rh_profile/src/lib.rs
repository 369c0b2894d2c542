// crates/rh_profile/src/lib.rs

//! RiverHab Profile Layer
//!
//! 一维/一维半模型的剖面数据处理：由横断面序列构建二维三角网格，
//! 按曼宁公式分配流速，以及 LAMMI 断面数据的转换。
//!
//! # 模块概览
//!
//! - [`profile`]: 剖面、剖面水力数据、河段划分
//! - [`grid`]: 剖面网格构建（Block / Linear / Nearest）
//! - [`manning`]: 糙率表与曼宁流速分布
//! - [`lammi`]: LAMMI 断面转换与底质携带
//!
//! # 示例
//!
//! ```
//! use rh_profile::{Profile, Roughness, VelocityDistributor, VelocitySampling};
//!
//! let profile = Profile::transect(0.0, &[0.0, 2.0, 4.0, 6.0], &[1.0, 0.0, 0.0, 1.0]).unwrap();
//! let result = VelocityDistributor::new(VelocitySampling::OnProfile)
//!     .distribute(0, &profile, 1.0, 3.0, &Roughness::Constant(0.03))
//!     .unwrap();
//! assert!((result.discharge() - 3.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod grid;
pub mod lammi;
pub mod manning;
pub mod profile;

pub use error::ProfileError;
pub use grid::{ProfileGrid, ProfileGridBuilder, ReachFailure, SampleRef};
pub use lammi::{
    LammiAdapter, LammiCell, LammiFacies, LammiGrid, LammiProfiles, LammiTransect, SubstrateRow,
    REACH_GAP,
};
pub use manning::{
    DistributedProfile, ManningRow, ManningTable, Roughness, VelocityDistributor, VelocitySampling,
};
pub use profile::{Profile, ProfileHydro, ProfileSample, ReachLayout};
