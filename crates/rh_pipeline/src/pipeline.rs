// crates/rh_pipeline/src/pipeline.rs

//! 逐时间步处理流程
//!
//! ```text
//! 剖面输入 ──► 剖面网格 ──┐
//! 二维输入 ──► 拆分 + 单元→节点 ──┼──► 湿区裁剪 ──► (底质合并) ──► TimestepOutput
//! LAMMI 输入 ──► 剖面网格 + 底质 ──┘
//! ```
//!
//! 时间步之间相互独立，`parallel = true` 时用 rayon 并行处理。
//! 二维网格的插值权重在并行段之前计算一次，各时间步共享同一份 `Arc`。

use crate::error::{PipelineError, PipelineResult};
use crate::input::{LammiInput, ProfileInput, ProfileTimestep, RawMeshInput};
use crate::output::{CellSubstrate, RunReport, TimestepFailure, TimestepOutput};
use rayon::prelude::*;
use rh_config::PipelineConfig;
use rh_foundation::{Diagnostics, RhError, RhResult};
use rh_mesh::{clip_wet_area, CellNodeTransfer, TriMesh, WetMesh};
use rh_profile::{
    DistributedProfile, LammiAdapter, Profile, ProfileGrid, ProfileGridBuilder, ProfileHydro,
    ReachFailure, ReachLayout, Roughness, VelocityDistributor, VelocitySampling,
};
use rh_substrate::{HydroTimestep, SubstrateMerger, SubstrateMesh};

/// 处理流程
pub struct Pipeline {
    config: PipelineConfig,
    builder: ProfileGridBuilder,
    roughness: Roughness,
    distributor: VelocityDistributor,
    lammi: LammiAdapter,
    transfer: CellNodeTransfer,
    merger: Option<SubstrateMerger>,
}

impl Pipeline {
    /// 由配置创建流程
    ///
    /// 配置无效或糙率表无法读取时返回错误。
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let builder = ProfileGridBuilder::from_config(&config.grid)?;
        let roughness = Roughness::from_config(&config.manning)?;
        let distributor = VelocityDistributor::new(VelocitySampling::from_config(&config.manning));
        let lammi = LammiAdapter::from_config(&config.substrate);

        tracing::info!(
            "流程配置: 插值 {}, 传递 {}, 最小水深 {}, 并行 {}",
            config.grid.mode,
            config.transfer.method,
            config.wet.min_depth,
            config.parallel
        );
        Ok(Self {
            config,
            builder,
            roughness,
            distributor,
            lammi,
            transfer: CellNodeTransfer::new(),
            merger: None,
        })
    }

    /// 设置底质网格，之后每个时间步都与之合并
    pub fn with_substrate(mut self, substrate: SubstrateMesh) -> PipelineResult<Self> {
        self.merger = Some(SubstrateMerger::from_config(substrate, &self.config.substrate)?);
        Ok(self)
    }

    /// 配置
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 已缓存的插值权重组数
    pub fn cached_weights(&self) -> usize {
        self.transfer.cached_len()
    }

    /// 处理剖面模型输入
    pub fn run_profiles(&self, input: &ProfileInput) -> PipelineResult<RunReport> {
        RhError::check_size("profiles", input.layout.n_profiles(), input.profiles.len())?;
        tracing::info!(
            "剖面输入: {} 条剖面, {} 个河段, {} 个时间步",
            input.profiles.len(),
            input.layout.n_reaches(),
            input.hydro_per_timestep.len()
        );

        let results = self.map_timesteps(&input.hydro_per_timestep, |_, step| {
            self.profile_timestep(&input.profiles, &input.layout, step)
        });
        Ok(collect(results))
    }

    /// 处理二维模型输入
    pub fn run_raw_mesh(&mut self, input: &RawMeshInput) -> PipelineResult<RunReport> {
        if input.depth.len() != input.velocity.len() {
            return Err(PipelineError::TimestepCount {
                what: "depth",
                expected: input.velocity.len(),
                actual: input.depth.len(),
            });
        }

        let split = input.mesh.split()?;
        let weights = self.transfer.weights(&split.mesh, self.config.transfer.method)?;
        tracing::info!(
            "二维输入: {} 个原始单元 ({} 个四边形), {} 个三角形, {} 个时间步",
            input.mesh.n_cells(),
            input.mesh.n_quads(),
            split.mesh.n_cells(),
            input.velocity.len()
        );

        let steps: Vec<(&Vec<f64>, &Vec<f64>)> = input.velocity.iter().zip(&input.depth).collect();
        let results = self.map_timesteps(&steps, |_, (velocity, depth)| {
            let velocity = weights.apply(&split.expand(velocity.as_slice())?)?;
            let depth = weights.apply(&split.expand(depth.as_slice())?)?;
            let mut diagnostics = weights.diagnostics.clone();
            let n_cells = split.mesh.n_cells();
            let wet = clip_wet_area(&split.mesh, &depth, &velocity, self.config.wet.min_depth)?;
            let reach_cells = remap_reach_cells(&[0, n_cells], &wet);
            let (output, merged) = self.finish(wet, reach_cells)?;
            diagnostics.merge(merged);
            Ok(TimestepOutput {
                diagnostics,
                ..output
            })
        });
        Ok(collect(results))
    }

    /// 处理 LAMMI 输入
    ///
    /// LAMMI 自带底质，不与流程的底质网格合并。
    pub fn run_lammi(&self, input: &LammiInput) -> PipelineResult<RunReport> {
        tracing::info!("LAMMI 输入: {} 个流量步", input.facies_per_timestep.len());

        let results = self.map_timesteps(&input.facies_per_timestep, |_, facies| {
            let lammi = self.lammi.build_grid(facies)?;
            let mut diagnostics = lammi.substrate_diagnostics;
            let grid = lammi.grid;
            diagnostics.merge(grid.diagnostics.clone());

            let (wet, reach_cells) = match clip_grid(&grid, self.config.wet.min_depth)? {
                Some(wet) => {
                    let cells = remap_reach_cells(&grid.reach_cells, &wet);
                    (wet, cells)
                }
                None => return Ok(empty_output(grid, diagnostics)),
            };
            let substrate = CellSubstrate {
                dominant: wet.slice_cells(&lammi.dominant),
                percentages: wet.slice_cells(&lammi.percentages),
                coarse: Some(wet.slice_cells(&lammi.coarse)),
                n_defaulted: 0,
            };
            Ok(TimestepOutput {
                index: 0,
                mesh: wet.mesh,
                velocity: wet.velocity,
                depth: wet.depth,
                substrate: Some(substrate),
                reach_cells,
                diagnostics,
                reach_failures: grid.failures,
            })
        });
        Ok(collect(results))
    }

    /// 剖面模型的单一时间步
    fn profile_timestep(
        &self,
        profiles: &[Profile],
        layout: &ReachLayout,
        step: &ProfileTimestep,
    ) -> RhResult<TimestepOutput> {
        let grid = match step {
            ProfileTimestep::Observed(hydro) => self.builder.build(profiles, layout, hydro)?,
            ProfileTimestep::Discharge {
                water_level,
                discharge,
            } => {
                let (profiles, hydro, failed) =
                    self.distribute(profiles, layout, water_level, discharge)?;
                self.builder.build_excluding(&profiles, layout, &hydro, failed)?
            }
        };

        let mut diagnostics = grid.diagnostics.clone();
        let wet = match clip_grid(&grid, self.config.wet.min_depth)? {
            Some(wet) => wet,
            None => return Ok(empty_output(grid, diagnostics)),
        };
        let reach_cells = remap_reach_cells(&grid.reach_cells, &wet);
        let (output, merged) = self.finish(wet, reach_cells)?;
        diagnostics.merge(merged);
        Ok(TimestepOutput {
            diagnostics,
            reach_failures: grid.failures,
            ..output
        })
    }

    /// 按曼宁公式为每条剖面分配流速
    ///
    /// 逐河段处理；河段内任一剖面失败时整个河段记为失败，
    /// 其剖面保持原样、水力数据置为全干。
    fn distribute(
        &self,
        profiles: &[Profile],
        layout: &ReachLayout,
        water_level: &[f64],
        discharge: &[f64],
    ) -> RhResult<(Vec<Profile>, Vec<ProfileHydro>, Vec<ReachFailure>)> {
        RhError::check_size("water_level", profiles.len(), water_level.len())?;
        RhError::check_size("discharge", profiles.len(), discharge.len())?;

        let mut out_profiles = profiles.to_vec();
        let mut out_hydro: Vec<ProfileHydro> =
            profiles.iter().map(|p| ProfileHydro::dry(p.len())).collect();
        let mut failed = Vec::new();
        for reach in 0..layout.n_reaches() {
            let range = layout.range(reach);
            let distributed = range
                .clone()
                .map(|i| {
                    self.distributor
                        .distribute(i, &profiles[i], water_level[i], discharge[i], &self.roughness)
                })
                .collect::<RhResult<Vec<DistributedProfile>>>();

            match distributed {
                Ok(distributed) => {
                    for (i, d) in range.zip(distributed) {
                        tracing::trace!("剖面 {}: sqrt(S) = {:.4e}", i, d.slope_sqrt);
                        out_profiles[i] = d.profile;
                        out_hydro[i] = d.hydro;
                    }
                }
                Err(error) => {
                    tracing::warn!("河段 {} 流速分配失败: {}", reach, error);
                    failed.push(ReachFailure { reach, error });
                }
            }
        }
        Ok((out_profiles, out_hydro, failed))
    }

    /// 湿区结果与底质合并
    fn finish(&self, wet: WetMesh, reach_cells: Vec<usize>) -> RhResult<(TimestepOutput, Diagnostics)> {
        let Some(merger) = &self.merger else {
            let output = TimestepOutput {
                index: 0,
                mesh: wet.mesh,
                velocity: wet.velocity,
                depth: wet.depth,
                substrate: None,
                reach_cells,
                diagnostics: Diagnostics::new(),
                reach_failures: Vec::new(),
            };
            return Ok((output, Diagnostics::new()));
        };

        let merged = merger.merge(HydroTimestep::from(wet))?;
        let n_defaulted = merged.n_defaulted();
        let output = TimestepOutput {
            index: 0,
            mesh: merged.mesh,
            velocity: merged.velocity,
            depth: merged.depth,
            substrate: Some(CellSubstrate {
                dominant: merged.dominant,
                percentages: merged.percentages,
                coarse: None,
                n_defaulted,
            }),
            reach_cells,
            diagnostics: Diagnostics::new(),
            reach_failures: Vec::new(),
        };
        Ok((output, merged.diagnostics))
    }

    /// 逐时间步执行，结果按编号排列
    fn map_timesteps<T, F>(&self, steps: &[T], f: F) -> Vec<(usize, RhResult<TimestepOutput>)>
    where
        T: Sync,
        F: Fn(usize, &T) -> RhResult<TimestepOutput> + Sync + Send,
    {
        let run = |(index, step): (usize, &T)| {
            let _span = tracing::debug_span!("timestep", index).entered();
            let result = f(index, step).map(|output| TimestepOutput { index, ..output });
            if let Ok(output) = &result {
                tracing::debug!(
                    "时间步 {}: {} 个节点, {} 个单元, {} 条诊断",
                    index,
                    output.mesh.n_nodes(),
                    output.mesh.n_cells(),
                    output.diagnostics.len()
                );
            }
            (index, result)
        };

        if self.config.parallel {
            steps.par_iter().enumerate().map(run).collect()
        } else {
            steps.iter().enumerate().map(run).collect()
        }
    }
}

/// 裁剪剖面网格；网格没有单元时返回 None
fn clip_grid(grid: &ProfileGrid, min_depth: f64) -> RhResult<Option<WetMesh>> {
    if grid.mesh.is_empty() {
        return Ok(None);
    }
    clip_wet_area(&grid.mesh, &grid.depth, &grid.velocity, min_depth).map(Some)
}

/// 没有单元的剖面网格对应的空结果
fn empty_output(grid: ProfileGrid, diagnostics: Diagnostics) -> TimestepOutput {
    TimestepOutput {
        index: 0,
        mesh: TriMesh::empty(),
        velocity: Vec::new(),
        depth: Vec::new(),
        substrate: None,
        reach_cells: vec![0; grid.reach_cells.len()],
        diagnostics,
        reach_failures: grid.failures,
    }
}

/// 累计单元数映射到裁剪后的网格
///
/// 裁剪保持单元顺序，`cell_origin` 升序。
fn remap_reach_cells(reach_cells: &[usize], wet: &WetMesh) -> Vec<usize> {
    reach_cells
        .iter()
        .map(|&bound| wet.cell_origin.partition_point(|&c| c < bound))
        .collect()
}

/// 汇总时间步结果
fn collect(results: Vec<(usize, RhResult<TimestepOutput>)>) -> RunReport {
    let mut report = RunReport::default();
    for (index, result) in results {
        match result {
            Ok(output) => report.outputs.push(output),
            Err(error) => {
                tracing::error!("时间步 {} 失败: {}", index, error);
                report.failures.push(TimestepFailure { index, error });
            }
        }
    }
    tracing::info!(
        "完成: {} 个时间步成功, {} 个失败",
        report.outputs.len(),
        report.failures.len()
    );
    report
}
