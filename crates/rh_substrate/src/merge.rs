// crates/rh_substrate/src/merge.rs

//! 水力网格与底质网格合并
//!
//! 以水力单元重心在底质网格中定位：R-Tree 筛选候选多边形后做射线法判断，
//! 共享边界上取编号最小的多边形。未落入任何多边形的单元使用默认底质，
//! 并标记为 [`SubstrateOrigin::Default`]。
//!
//! 输出网格与输入水力网格一致，只追加每个单元的底质数据。

use crate::classify::{dominant_to_percentage, Dominant};
use crate::code::{Percentages, SubstrateCode};
use crate::mesh::SubstrateMesh;
use rh_config::SubstrateConfig;
use rh_foundation::{Diagnostic, Diagnostics, RhError, RhResult};
use rh_mesh::{MeshSpatialIndex, TriMesh, WetMesh};

/// 单元底质来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstrateOrigin {
    /// 落入该编号的底质多边形
    Matched(usize),
    /// 使用默认底质
    Default,
}

/// 单一时间步的水力数据（节点场）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydroTimestep {
    /// 水力网格
    pub mesh: TriMesh,
    /// 节点流速
    pub velocity: Vec<f64>,
    /// 节点水深
    pub depth: Vec<f64>,
}

impl HydroTimestep {
    /// 创建并检查场长度
    pub fn new(mesh: TriMesh, velocity: Vec<f64>, depth: Vec<f64>) -> RhResult<Self> {
        mesh.check_node_field("velocity", &velocity)?;
        mesh.check_node_field("depth", &depth)?;
        Ok(Self {
            mesh,
            velocity,
            depth,
        })
    }
}

impl From<WetMesh> for HydroTimestep {
    fn from(wet: WetMesh) -> Self {
        Self {
            mesh: wet.mesh,
            velocity: wet.velocity,
            depth: wet.depth,
        }
    }
}

/// 合并结果
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTimestep {
    /// 水力网格
    pub mesh: TriMesh,
    /// 节点流速
    pub velocity: Vec<f64>,
    /// 节点水深
    pub depth: Vec<f64>,
    /// 单元主导类
    pub dominant: Vec<Dominant>,
    /// 单元百分比
    pub percentages: Vec<Percentages>,
    /// 单元底质来源
    pub origin: Vec<SubstrateOrigin>,
    /// 未匹配单元等诊断
    pub diagnostics: Diagnostics,
}

impl MergedTimestep {
    /// 使用默认底质的单元数
    pub fn n_defaulted(&self) -> usize {
        self.origin
            .iter()
            .filter(|o| **o == SubstrateOrigin::Default)
            .count()
    }
}

/// 底质合并器
pub struct SubstrateMerger {
    substrate: SubstrateMesh,
    index: MeshSpatialIndex,
    default_code: u8,
    default_percentages: Percentages,
}

impl SubstrateMerger {
    /// 创建合并器
    ///
    /// 空底质网格为错误；`default_code` 必须是 1..=8 的 Cemagref 编码。
    pub fn new(substrate: SubstrateMesh, default_code: u8) -> RhResult<Self> {
        if substrate.n_polygons() == 0 {
            return Err(RhError::empty_data("底质网格没有多边形"));
        }
        substrate.validate()?;
        let default_code = SubstrateCode::Cemagref.check(default_code)?;
        let default_percentages = dominant_to_percentage(default_code)?;

        let sums = substrate.check_sums();
        if !sums.is_empty() {
            log::warn!("底质网格中 {} 个多边形百分比之和不为 100", sums.len());
        }

        let index = MeshSpatialIndex::build(substrate.n_polygons(), |i| substrate.polygon_points(i));
        log::debug!(
            "底质合并器: {} 个多边形, 默认底质 {}",
            substrate.n_polygons(),
            default_code
        );
        Ok(Self {
            substrate,
            index,
            default_code,
            default_percentages,
        })
    }

    /// 从配置创建
    pub fn from_config(substrate: SubstrateMesh, config: &SubstrateConfig) -> RhResult<Self> {
        Self::new(substrate, config.default_code)
    }

    /// 合并单一时间步
    pub fn merge(&self, hydro: HydroTimestep) -> RhResult<MergedTimestep> {
        hydro.mesh.check_node_field("velocity", &hydro.velocity)?;
        hydro.mesh.check_node_field("depth", &hydro.depth)?;

        let centers = hydro.mesh.cell_centers();
        let mut dominant = Vec::with_capacity(centers.len());
        let mut percentages = Vec::with_capacity(centers.len());
        let mut origin = Vec::with_capacity(centers.len());
        let mut diagnostics = Diagnostics::new();

        for (cell, &c) in centers.iter().enumerate() {
            match self.index.locate_point(c) {
                Some(poly) => {
                    dominant.push(self.substrate.dominant[poly]);
                    percentages.push(self.substrate.percentages[poly]);
                    origin.push(SubstrateOrigin::Matched(poly));
                }
                None => {
                    dominant.push(Dominant::Class(self.default_code));
                    percentages.push(self.default_percentages);
                    origin.push(SubstrateOrigin::Default);
                    diagnostics.push(Diagnostic::UnmatchedSubstrate { cell });
                }
            }
        }

        let unmatched = diagnostics.unmatched();
        if unmatched > 0 {
            log::warn!(
                "{} / {} 个水力单元不在底质网格内, 使用默认底质 {}",
                unmatched,
                centers.len(),
                self.default_code
            );
        }

        Ok(MergedTimestep {
            mesh: hydro.mesh,
            velocity: hydro.velocity,
            depth: hydro.depth,
            dominant,
            percentages,
            origin,
            diagnostics,
        })
    }

    /// 逐时间步合并
    pub fn merge_series(&self, series: Vec<HydroTimestep>) -> RhResult<Vec<MergedTimestep>> {
        series.into_iter().map(|h| self.merge(h)).collect()
    }
}
