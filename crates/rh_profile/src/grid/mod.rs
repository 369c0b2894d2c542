// crates/rh_profile/src/grid/mod.rs

//! 剖面网格构建
//!
//! 将有序横断面剖面按河段连接成三角网格（单一时间步）。
//!
//! # 插值方式
//!
//! - `Block`: 相邻观测剖面直接连接，不生成新点
//! - `Linear`: 剖面间插入 `nb_add_profile` 条剖面，位置与数值线性插值
//! - `Nearest`: 几何同 `Linear`，数值取最近观测采样点
//!
//! # 诊断
//!
//! 空洞、重叠、退化三角形、跳过的河段以 [`Diagnostics`] 随结果返回。
//! 单个河段输入有误时记录 [`ReachFailure`]，其余河段照常构建。
//!
//! # 示例
//!
//! ```
//! use rh_profile::{Profile, ProfileGridBuilder, ProfileHydro, ReachLayout};
//!
//! let profiles: Vec<Profile> = [0.0, 10.0, 20.0]
//!     .iter()
//!     .map(|&x| Profile::transect(x, &[-2.0, 0.0, 2.0], &[1.0, 0.0, 1.0]).unwrap())
//!     .collect();
//! let hydro = vec![ProfileHydro::dry(3); 3];
//! let layout = ReachLayout::single(3);
//!
//! let grid = ProfileGridBuilder::block().build(&profiles, &layout, &hydro).unwrap();
//! assert_eq!(grid.n_cells(), 8);
//! assert!(grid.diagnostics.is_clean());
//! ```

mod rows;
mod strip;

use crate::profile::{Profile, ProfileHydro, ReachLayout};
use rh_config::{GridConfig, InterpolationMode, MAX_ADD_PROFILE, MIN_ADD_PROFILE};
use rh_foundation::geometry::signed_area;
use rh_foundation::{Diagnostic, Diagnostics, Point2D, RhError, RhResult, GEOMETRY_EPS};
use rh_mesh::TriMesh;
use rows::{build_rows, Observed, ReachNodes};
use serde::{Deserialize, Serialize};

/// 节点对应的观测采样点
///
/// `Block` 模式下即节点本身；插值模式下为最近的观测采样点。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRef {
    /// 全局剖面编号
    pub profile: usize,
    /// 剖面内采样点编号
    pub sample: usize,
}

/// 河段构建失败
#[derive(Debug)]
pub struct ReachFailure {
    /// 河段编号
    pub reach: usize,
    /// 失败原因
    pub error: RhError,
}

/// 剖面网格（单一时间步）
#[derive(Debug, Default)]
pub struct ProfileGrid {
    /// 三角网格（所有三角形逆时针）
    pub mesh: TriMesh,
    /// 单元重心
    pub cell_centers: Vec<Point2D>,
    /// 节点河床高程
    pub z: Vec<f64>,
    /// 节点流速
    pub velocity: Vec<f64>,
    /// 节点水深
    pub depth: Vec<f64>,
    /// 节点对应的观测采样点
    pub node_sample: Vec<SampleRef>,
    /// 各河段累计单元数，从 0 开始，每个河段一项（跳过或失败的河段不增加）
    pub reach_cells: Vec<usize>,
    /// 几何诊断
    pub diagnostics: Diagnostics,
    /// 失败的河段
    pub failures: Vec<ReachFailure>,
}

impl ProfileGrid {
    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.mesh.n_nodes()
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.mesh.n_cells()
    }

    /// 河段 r 的单元范围
    pub fn reach_cell_range(&self, reach: usize) -> std::ops::Range<usize> {
        self.reach_cells[reach]..self.reach_cells[reach + 1]
    }

    /// 追加一个河段的结果
    fn append(&mut self, reach: ReachMesh) {
        let node_offset = self.mesh.n_nodes();
        let cell_offset = self.mesh.n_cells();

        self.mesh.points.extend(reach.nodes.xy);
        self.z.extend(reach.nodes.z);
        self.velocity.extend(reach.nodes.velocity);
        self.depth.extend(reach.nodes.depth);
        self.node_sample.extend(reach.nodes.sample);
        self.mesh
            .ikle
            .extend(reach.ikle.iter().map(|t| t.map(|v| v + node_offset)));

        for diagnostic in reach.diagnostics.items {
            self.diagnostics.push(match diagnostic {
                Diagnostic::Overlap { reach, band, cell } => Diagnostic::Overlap {
                    reach,
                    band,
                    cell: cell + cell_offset,
                },
                other => other,
            });
        }
        self.reach_cells.push(self.mesh.n_cells());
    }
}

/// 单个河段的构建结果（局部编号）
struct ReachMesh {
    nodes: ReachNodes,
    ikle: Vec<[usize; 3]>,
    diagnostics: Diagnostics,
}

/// 剖面网格构建器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileGridBuilder {
    mode: InterpolationMode,
    nb_add_profile: usize,
}

impl ProfileGridBuilder {
    /// 创建构建器
    ///
    /// 插值模式下 `nb_add_profile` 必须在 `[1, 500]` 内，`Block` 模式忽略该值。
    pub fn new(mode: InterpolationMode, nb_add_profile: usize) -> RhResult<Self> {
        if mode.adds_profiles() {
            RhError::check_range(
                "nb_add_profile",
                nb_add_profile as f64,
                MIN_ADD_PROFILE as f64,
                MAX_ADD_PROFILE as f64,
            )?;
        }
        Ok(Self {
            mode,
            nb_add_profile,
        })
    }

    /// 从配置创建
    pub fn from_config(config: &GridConfig) -> RhResult<Self> {
        Self::new(config.mode, config.nb_add_profile)
    }

    /// `Block` 模式构建器
    pub fn block() -> Self {
        Self {
            mode: InterpolationMode::Block,
            nb_add_profile: 0,
        }
    }

    /// 构建网格
    ///
    /// 剖面数、水力数据数与河段划分不一致时整体返回错误；
    /// 单个河段内的数据错误记录在 [`ProfileGrid::failures`] 中。
    pub fn build(
        &self,
        profiles: &[Profile],
        layout: &ReachLayout,
        hydro: &[ProfileHydro],
    ) -> RhResult<ProfileGrid> {
        self.build_excluding(profiles, layout, hydro, Vec::new())
    }

    /// 构建网格，`excluded` 中的河段在准备数据时已失败
    ///
    /// 这些河段不生成单元，失败原因按河段顺序并入 [`ProfileGrid::failures`]，
    /// 其剖面与水力数据只用于长度检查。
    pub fn build_excluding(
        &self,
        profiles: &[Profile],
        layout: &ReachLayout,
        hydro: &[ProfileHydro],
        mut excluded: Vec<ReachFailure>,
    ) -> RhResult<ProfileGrid> {
        RhError::check_size("profiles", layout.n_profiles(), profiles.len())?;
        RhError::check_size("hydro", profiles.len(), hydro.len())?;
        if let Some(f) = excluded.iter().find(|f| f.reach >= layout.n_reaches()) {
            return Err(RhError::invalid_input(format!(
                "失败河段 {} 超出河段数 {}",
                f.reach,
                layout.n_reaches()
            )));
        }

        let mut grid = ProfileGrid {
            reach_cells: vec![0],
            ..Default::default()
        };

        for reach in 0..layout.n_reaches() {
            if let Some(pos) = excluded.iter().position(|f| f.reach == reach) {
                grid.failures.push(excluded.swap_remove(pos));
                grid.reach_cells.push(grid.n_cells());
                continue;
            }

            let range = layout.range(reach);
            if range.len() < 2 {
                log::warn!("河段 {} 仅有 {} 个剖面, 跳过", reach, range.len());
                grid.diagnostics.push(Diagnostic::ReachSkipped {
                    reach,
                    n_profiles: range.len(),
                });
                grid.reach_cells.push(grid.n_cells());
                continue;
            }

            match self.build_reach(reach, range.start, &profiles[range.clone()], &hydro[range]) {
                Ok(mesh) => grid.append(mesh),
                Err(error) => {
                    log::warn!("河段 {} 构建失败: {}", reach, error);
                    grid.failures.push(ReachFailure { reach, error });
                    grid.reach_cells.push(grid.n_cells());
                }
            }
        }

        grid.cell_centers = grid.mesh.cell_centers();
        log::debug!(
            "剖面网格 ({}): {} 个河段, {} 个节点, {} 个单元, {} 条诊断, {} 个失败河段",
            self.mode,
            layout.n_reaches(),
            grid.n_nodes(),
            grid.n_cells(),
            grid.diagnostics.len(),
            grid.failures.len()
        );
        Ok(grid)
    }

    fn build_reach(
        &self,
        reach: usize,
        first_profile: usize,
        profiles: &[Profile],
        hydro: &[ProfileHydro],
    ) -> RhResult<ReachMesh> {
        let mut observed = Vec::with_capacity(profiles.len());
        for (k, (profile, h)) in profiles.iter().zip(hydro).enumerate() {
            let index = first_profile + k;
            profile.validate()?;
            h.check(index, profile)?;
            observed.push(Observed {
                index,
                profile,
                hydro: h,
            });
        }

        let rows = build_rows(&observed, self.mode, self.nb_add_profile);
        let mut diagnostics = Diagnostics::new();
        for &band in &rows.holes {
            log::warn!("河段 {}: 条带 {} 无法连接", reach, band);
            diagnostics.push(Diagnostic::Hole { reach, band });
        }

        let mut ikle = Vec::new();
        for (band, up, down) in &rows.bands {
            let triangles = strip::walk(up, down);
            log::trace!("河段 {} 条带 {}: {} 个三角形", reach, band, triangles.len());
            emit_band(reach, *band, &triangles, &rows.nodes.xy, &mut ikle, &mut diagnostics);
        }

        let nodes = compact(rows.nodes, &mut ikle);
        Ok(ReachMesh {
            nodes,
            ikle,
            diagnostics,
        })
    }
}

/// 输出一个条带的三角形
///
/// 退化三角形丢弃；方向与条带主方向相反的记为重叠；全部调整为逆时针。
fn emit_band(
    reach: usize,
    band: usize,
    triangles: &[[usize; 3]],
    xy: &[Point2D],
    ikle: &mut Vec<[usize; 3]>,
    diagnostics: &mut Diagnostics,
) {
    let areas: Vec<f64> = triangles
        .iter()
        .map(|&[a, b, c]| signed_area(xy[a], xy[b], xy[c]))
        .collect();
    let dominant = areas
        .iter()
        .filter(|a| a.abs() > GEOMETRY_EPS)
        .sum::<f64>()
        .signum();

    for (&[a, b, c], &area) in triangles.iter().zip(&areas) {
        if area.abs() <= GEOMETRY_EPS {
            diagnostics.push(Diagnostic::DegenerateTriangle { reach, band });
            continue;
        }
        if area.signum() != dominant {
            diagnostics.push(Diagnostic::Overlap {
                reach,
                band,
                cell: ikle.len(),
            });
        }
        ikle.push(if area > 0.0 { [a, b, c] } else { [a, c, b] });
    }
}

/// 删除未被引用的节点并重新编号
fn compact(nodes: ReachNodes, ikle: &mut [[usize; 3]]) -> ReachNodes {
    let mut used = vec![false; nodes.len()];
    for tri in ikle.iter() {
        for &v in tri {
            used[v] = true;
        }
    }
    if used.iter().all(|&u| u) {
        return nodes;
    }

    let mut new_index = vec![0; nodes.len()];
    let mut out = ReachNodes::default();
    let mut next = 0;
    for (old, &keep) in used.iter().enumerate() {
        if keep {
            new_index[old] = next;
            next += 1;
        }
    }
    let keep = |v: &Vec<f64>| -> Vec<f64> {
        v.iter()
            .zip(&used)
            .filter_map(|(&x, &u)| u.then_some(x))
            .collect()
    };
    out.z = keep(&nodes.z);
    out.velocity = keep(&nodes.velocity);
    out.depth = keep(&nodes.depth);
    out.xy = nodes
        .xy
        .iter()
        .zip(&used)
        .filter_map(|(&p, &u)| u.then_some(p))
        .collect();
    out.sample = nodes
        .sample
        .iter()
        .zip(&used)
        .filter_map(|(&s, &u)| u.then_some(s))
        .collect();

    for tri in ikle.iter_mut() {
        *tri = tri.map(|v| new_index[v]);
    }
    out
}
