// crates/rh_pipeline/src/output.rs

//! 流程输出

use rh_foundation::{Diagnostics, RhError};
use rh_mesh::TriMesh;
use rh_profile::ReachFailure;
use rh_substrate::{Dominant, Percentages};

/// 单元底质
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellSubstrate {
    /// 主导类 (Cemagref)
    pub dominant: Vec<Dominant>,
    /// 百分比 (Cemagref)
    pub percentages: Vec<Percentages>,
    /// 最粗类，仅 LAMMI 数据提供
    pub coarse: Option<Vec<Dominant>>,
    /// 使用默认底质的单元数
    pub n_defaulted: usize,
}

/// 单一时间步的结果
#[derive(Debug)]
pub struct TimestepOutput {
    /// 时间步编号
    pub index: usize,
    /// 湿区网格
    pub mesh: TriMesh,
    /// 节点流速
    pub velocity: Vec<f64>,
    /// 节点水深
    pub depth: Vec<f64>,
    /// 单元底质
    pub substrate: Option<CellSubstrate>,
    /// 每个河段在湿区网格中的累计单元数
    pub reach_cells: Vec<usize>,
    /// 几何与数据诊断
    pub diagnostics: Diagnostics,
    /// 构建失败的河段
    pub reach_failures: Vec<ReachFailure>,
}

impl TimestepOutput {
    /// 是否全干
    pub fn is_dry(&self) -> bool {
        self.mesh.is_empty()
    }
}

/// 失败的时间步
#[derive(Debug)]
pub struct TimestepFailure {
    /// 时间步编号
    pub index: usize,
    /// 错误
    pub error: RhError,
}

/// 一次运行的结果
#[derive(Debug, Default)]
pub struct RunReport {
    /// 成功的时间步（按编号升序）
    pub outputs: Vec<TimestepOutput>,
    /// 失败的时间步（按编号升序）
    pub failures: Vec<TimestepFailure>,
}

impl RunReport {
    /// 时间步总数
    pub fn n_timesteps(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }

    /// 是否全部成功
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// 按编号查找结果
    pub fn output(&self, index: usize) -> Option<&TimestepOutput> {
        self.outputs.iter().find(|o| o.index == index)
    }
}
