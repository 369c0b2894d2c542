// crates/rh_pipeline/src/input.rs

//! 流程输入
//!
//! 各模型的读取器把数据整理成以下三种形式之一交给流程。

use rh_mesh::RawMesh;
use rh_profile::{LammiFacies, Profile, ProfileHydro, ReachLayout};

/// 剖面模型单一时间步的水力数据
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileTimestep {
    /// 每条剖面已有逐点流速与水深
    Observed(Vec<ProfileHydro>),
    /// 只有每条剖面的水位与流量，按曼宁公式分配流速
    Discharge {
        /// 每条剖面的水位
        water_level: Vec<f64>,
        /// 每条剖面的流量
        discharge: Vec<f64>,
    },
}

/// 一维/一维半模型输入
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInput {
    /// 剖面（几何不随时间变化）
    pub profiles: Vec<Profile>,
    /// 河段划分
    pub layout: ReachLayout,
    /// 逐时间步水力数据
    pub hydro_per_timestep: Vec<ProfileTimestep>,
}

/// 二维模型输入（单元值）
#[derive(Debug, Clone, PartialEq)]
pub struct RawMeshInput {
    /// 三角形/四边形混合网格
    pub mesh: RawMesh,
    /// 逐时间步单元流速
    pub velocity: Vec<Vec<f64>>,
    /// 逐时间步单元水深
    pub depth: Vec<Vec<f64>>,
}

/// LAMMI 输入，每个流量步的断面数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LammiInput {
    /// 逐流量步的相态数据
    pub facies_per_timestep: Vec<Vec<LammiFacies>>,
}
