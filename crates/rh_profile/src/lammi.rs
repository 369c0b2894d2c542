// crates/rh_profile/src/lammi.rs

//! LAMMI 断面数据转换
//!
//! LAMMI 以单元形式记录断面：每个单元有宽度、水深、流速和 8 类 EDF 底质百分比。
//! 转换为剖面时假设河道为直线且经过各断面最深处：
//!
//! - 单元中心成为采样点，两端各补一个水深为零的点
//! - 横向原点设在最深单元的中心
//! - 断面 x 坐标按断面间距累加，每个相态（河段）末尾复制最后一个断面
//! - 相邻相态之间相隔 [`REACH_GAP`]
//!
//! 网格按 Block 方式构建，每个输出单元取其第一个顶点所属剖面上
//! 最近的有水单元的底质，再转换为 Cemagref 编码。水深不大于零的单元
//! 不提供底质；剖面上没有有水单元时，该剖面所属单元的主导类为
//! [`Dominant::Undetermined`]，百分比全零。
//!
//! 某个相态的断面数据无效时，该相态记为失败河段，不生成单元，其余相态照常转换。

use crate::grid::{ProfileGrid, ProfileGridBuilder, ReachFailure};
use crate::profile::{Profile, ProfileHydro, ProfileSample, ReachLayout};
use rh_config::{DominantCase, SubstrateConfig};
use rh_foundation::{Diagnostic, Diagnostics, Point2D, RhError, RhResult};
use rh_substrate::{percentage_sum_ok, percentage_to_dominant_coarse, Dominant, Percentages, SubstrateCode};

/// 相邻相态之间的间隔 (m)
pub const REACH_GAP: f64 = 5.0;

/// LAMMI 断面单元
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LammiCell {
    /// 单元宽度
    pub width: f64,
    /// 水深
    pub depth: f64,
    /// 流速
    pub velocity: f64,
    /// EDF 8 类底质百分比
    pub substrate: [f64; 8],
}

/// LAMMI 断面
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LammiTransect {
    /// 单元，沿断面排列
    pub cells: Vec<LammiCell>,
    /// 到下一断面的距离
    pub length: f64,
}

/// LAMMI 相态（一个河段）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LammiFacies {
    /// 断面
    pub transects: Vec<LammiTransect>,
}

/// 剖面上的一行底质数据（仅有水单元）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubstrateRow {
    /// 单元中心的横向距离
    pub lateral: f64,
    /// EDF 百分比
    pub percentages: [f64; 8],
}

/// 转换后的剖面数据
#[derive(Debug)]
pub struct LammiProfiles {
    /// 剖面
    pub profiles: Vec<Profile>,
    /// 剖面水力数据
    pub hydro: Vec<ProfileHydro>,
    /// 河段划分
    pub layout: ReachLayout,
    /// 每条剖面的底质行
    pub substrate: Vec<Vec<SubstrateRow>>,
    /// 转换失败的相态（河段）
    pub failures: Vec<ReachFailure>,
}

/// 带底质的 LAMMI 网格
#[derive(Debug)]
pub struct LammiGrid {
    /// 剖面网格
    pub grid: ProfileGrid,
    /// 单元主导类 (Cemagref)
    pub dominant: Vec<Dominant>,
    /// 单元最粗类 (Cemagref)
    pub coarse: Vec<Dominant>,
    /// 单元百分比 (Cemagref)
    pub percentages: Vec<Percentages>,
    /// 底质诊断
    pub substrate_diagnostics: Diagnostics,
}

/// LAMMI 转换器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LammiAdapter {
    dominant_case: DominantCase,
}

impl LammiAdapter {
    /// 创建转换器
    pub fn new(dominant_case: DominantCase) -> Self {
        Self { dominant_case }
    }

    /// 从配置创建
    pub fn from_config(config: &SubstrateConfig) -> Self {
        Self::new(config.dominant_case)
    }

    /// 断面数据转换为剖面
    pub fn to_profiles(&self, facies: &[LammiFacies]) -> RhResult<LammiProfiles> {
        let mut profiles = Vec::new();
        let mut hydro = Vec::new();
        let mut substrate = Vec::new();
        let mut failures = Vec::new();
        let mut bounds = vec![0];
        let mut x = 0.0;

        for (f, fac) in facies.iter().enumerate() {
            let mut start = x;
            let converted = fac
                .transects
                .iter()
                .enumerate()
                .map(|(t, transect)| {
                    let out = convert_transect(f, t, transect, start);
                    start += transect.length;
                    out
                })
                .collect::<RhResult<Vec<_>>>();

            match converted {
                Ok(converted) => {
                    x = start;
                    // 复制最后一个断面，保证单断面相态也能成带
                    let closing = converted
                        .last()
                        .map(|(profile, h, rows)| (shift_to(profile, x), h.clone(), rows.clone()));
                    for (profile, h, rows) in converted.into_iter().chain(closing) {
                        profiles.push(profile);
                        hydro.push(h);
                        substrate.push(rows);
                    }
                }
                Err(error) => {
                    log::warn!("LAMMI 相态 {} 转换失败: {}", f, error);
                    failures.push(ReachFailure { reach: f, error });
                }
            }
            bounds.push(profiles.len());
            x += REACH_GAP;
        }

        let layout = ReachLayout::new(bounds, profiles.len())?;
        log::debug!(
            "LAMMI: {} 个相态, {} 条剖面, {} 个失败相态",
            layout.n_reaches(),
            profiles.len(),
            failures.len()
        );
        Ok(LammiProfiles {
            profiles,
            hydro,
            layout,
            substrate,
            failures,
        })
    }

    /// 构建带底质的网格
    pub fn build_grid(&self, facies: &[LammiFacies]) -> RhResult<LammiGrid> {
        let data = self.to_profiles(facies)?;
        let grid = ProfileGridBuilder::block().build_excluding(
            &data.profiles,
            &data.layout,
            &data.hydro,
            data.failures,
        )?;

        // 每行底质只转换一次
        let mut substrate_diagnostics = Diagnostics::new();
        let mut converted = Vec::with_capacity(data.substrate.len());
        let mut element = 0;
        for rows in &data.substrate {
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                if !percentage_sum_ok(&row.percentages) {
                    let sum: f64 = row.percentages.iter().sum();
                    log::warn!("LAMMI 底质行 {} 百分比之和为 {:.2}", element, sum);
                    substrate_diagnostics.push(Diagnostic::PercentageSum { element, sum });
                }
                out.push(self.convert_row(row)?);
                element += 1;
            }
            converted.push(out);
        }

        let n_cells = grid.n_cells();
        let mut dominant = Vec::with_capacity(n_cells);
        let mut coarse = Vec::with_capacity(n_cells);
        let mut percentages = Vec::with_capacity(n_cells);
        for cell in &grid.mesh.ikle {
            let owner = grid.node_sample[cell[0]];
            let lateral = data.profiles[owner.profile].samples[owner.sample].lateral;
            let (d, c, p) = match nearest_row(&data.substrate[owner.profile], lateral) {
                Some(row) => converted[owner.profile][row],
                None => (Dominant::Undetermined, Dominant::Undetermined, [0.0; 8]),
            };
            dominant.push(d);
            coarse.push(c);
            percentages.push(p);
        }

        Ok(LammiGrid {
            grid,
            dominant,
            coarse,
            percentages,
            substrate_diagnostics,
        })
    }

    fn convert_row(&self, row: &SubstrateRow) -> RhResult<(Dominant, Dominant, Percentages)> {
        let edf = SubstrateCode::Edf;
        let (dom, coarse) = percentage_to_dominant_coarse(&row.percentages, self.dominant_case);
        let dom = dom.try_map(|c| edf.to_cemagref(c))?;
        let coarse = coarse.try_map(|c| edf.to_cemagref(c))?;
        let pct = edf.percentages_to_cemagref(&row.percentages)?;
        Ok((dom, coarse, pct))
    }
}

/// 单个断面转换为 `(剖面, 水力数据, 底质行)`
fn convert_transect(
    facies: usize,
    transect: usize,
    data: &LammiTransect,
    x: f64,
) -> RhResult<(Profile, ProfileHydro, Vec<SubstrateRow>)> {
    if data.cells.is_empty() {
        return Err(RhError::invalid_input(format!(
            "LAMMI 相态 {} 断面 {} 没有单元",
            facies, transect
        )));
    }
    for (i, c) in data.cells.iter().enumerate() {
        if !(c.width.is_finite() && c.width >= 0.0 && c.depth.is_finite() && c.velocity.is_finite()) {
            return Err(RhError::invalid_input(format!(
                "LAMMI 相态 {} 断面 {} 单元 {} 数据无效",
                facies, transect, i
            )));
        }
    }
    if !data.length.is_finite() {
        return Err(RhError::invalid_input(format!(
            "LAMMI 相态 {} 断面 {} 间距非有限值",
            facies, transect
        )));
    }

    // 单元中心距离，首尾补端点
    let n = data.cells.len();
    let mut dist = Vec::with_capacity(n + 2);
    dist.push(0.0);
    let mut acc = 0.0;
    for (i, c) in data.cells.iter().enumerate() {
        acc += if i == 0 {
            c.width / 2.0
        } else {
            (data.cells[i - 1].width + c.width) / 2.0
        };
        dist.push(acc);
    }
    dist.push(acc + data.cells[n - 1].width / 2.0);

    // 最深单元（并列取第一个）
    let deepest = data
        .cells
        .iter()
        .enumerate()
        .fold(0, |best, (i, c)| if c.depth > data.cells[best].depth { i } else { best });
    let origin = dist[deepest + 1];

    let depth: Vec<f64> = std::iter::once(0.0)
        .chain(data.cells.iter().map(|c| c.depth))
        .chain(std::iter::once(0.0))
        .collect();
    let velocity: Vec<f64> = std::iter::once(0.0)
        .chain(data.cells.iter().map(|c| c.velocity))
        .chain(std::iter::once(0.0))
        .collect();

    let samples = dist
        .iter()
        .zip(&depth)
        .map(|(&d, &h)| {
            let lateral = d - origin;
            ProfileSample::new(Point2D::new(x, lateral), lateral, -h)
        })
        .collect();
    let profile = Profile::new(samples)?;

    let rows = data
        .cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.depth > 0.0)
        .map(|(i, c)| SubstrateRow {
            lateral: dist[i + 1] - origin,
            percentages: c.substrate,
        })
        .collect();

    Ok((profile, ProfileHydro::new(velocity, depth), rows))
}

/// 平移剖面到新的 x
fn shift_to(profile: &Profile, x: f64) -> Profile {
    Profile {
        samples: profile
            .samples
            .iter()
            .map(|s| ProfileSample::new(Point2D::new(x, s.xy.y), s.lateral, s.z))
            .collect(),
    }
}

/// 最近的底质行，距离相等取编号小者
fn nearest_row(rows: &[SubstrateRow], lateral: f64) -> Option<usize> {
    rows.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, r)| {
            let d = (r.lateral - lateral).abs();
            match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            }
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(width: f64, depth: f64, velocity: f64, class: usize) -> LammiCell {
        let mut substrate = [0.0; 8];
        substrate[class - 1] = 100.0;
        LammiCell {
            width,
            depth,
            velocity,
            substrate,
        }
    }

    fn transect(length: f64) -> LammiTransect {
        LammiTransect {
            cells: vec![
                cell(2.0, 0.5, 0.2, 1),
                cell(2.0, 1.5, 0.8, 5),
                cell(4.0, 1.0, 0.4, 7),
            ],
            length,
        }
    }

    #[test]
    fn test_transect_coordinates() {
        let (profile, hydro, rows) = convert_transect(0, 0, &transect(10.0), 3.0).unwrap();
        // 中心距离 [0, 1, 3, 6, 8]，最深单元中心为 3
        assert_eq!(profile.laterals(), vec![-3.0, -2.0, 0.0, 3.0, 5.0]);
        assert!(profile.samples.iter().all(|s| s.xy.x == 3.0));
        assert_eq!(hydro.depth, vec![0.0, 0.5, 1.5, 1.0, 0.0]);
        assert_eq!(hydro.velocity, vec![0.0, 0.2, 0.8, 0.4, 0.0]);
        assert!((profile.samples[2].z + 1.5).abs() < 1e-12);
        assert_eq!(rows.len(), 3);
        assert!((rows[2].lateral - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_profiles_and_layout() {
        let facies = vec![
            LammiFacies {
                transects: vec![transect(10.0), transect(20.0)],
            },
            LammiFacies {
                transects: vec![transect(7.0)],
            },
        ];
        let data = LammiAdapter::default().to_profiles(&facies).unwrap();
        assert_eq!(data.layout.as_slice(), &[0, 3, 5]);

        let xs: Vec<f64> = data.profiles.iter().map(|p| p.samples[0].xy.x).collect();
        assert_eq!(xs, vec![0.0, 10.0, 30.0, 35.0, 42.0]);
        assert_eq!(data.hydro[2], data.hydro[1]);
    }

    #[test]
    fn test_empty_transect_fails_only_its_facies() {
        let facies = vec![
            LammiFacies {
                transects: vec![transect(10.0), LammiTransect::default()],
            },
            LammiFacies {
                transects: vec![transect(7.0)],
            },
        ];
        let data = LammiAdapter::default().to_profiles(&facies).unwrap();
        assert_eq!(data.failures.len(), 1);
        assert_eq!(data.failures[0].reach, 0);
        assert_eq!(data.layout.as_slice(), &[0, 0, 2]);
        // 失败相态不推进 x，只保留间隔
        assert_eq!(data.profiles[0].samples[0].xy.x, REACH_GAP);

        let lammi = LammiAdapter::default().build_grid(&facies).unwrap();
        assert_eq!(lammi.grid.n_cells(), 8);
        assert_eq!(lammi.grid.reach_cells, vec![0, 0, 8]);
        assert_eq!(lammi.grid.failures.len(), 1);
        assert_eq!(lammi.grid.failures[0].reach, 0);
        assert_eq!(lammi.dominant.len(), 8);
    }

    #[test]
    fn test_dry_rows_dropped() {
        let mut data = transect(10.0);
        data.cells[0].depth = 0.0;
        let (_, _, rows) = convert_transect(0, 0, &data, 0.0).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].percentages, data.cells[1].substrate);

        // 左端点离第一个单元最近，但该单元干，取第二个单元
        assert_eq!(nearest_row(&rows, -3.0), Some(0));
        assert_eq!(nearest_row(&[], 0.0), None);
    }

    #[test]
    fn test_all_dry_profile_undetermined() {
        let mut dry = transect(10.0);
        for c in &mut dry.cells {
            c.depth = 0.0;
        }
        let facies = vec![LammiFacies {
            transects: vec![dry],
        }];
        let lammi = LammiAdapter::default().build_grid(&facies).unwrap();
        assert_eq!(lammi.grid.n_cells(), 8);
        assert!(lammi.dominant.iter().all(|d| *d == Dominant::Undetermined));
        assert!(lammi.coarse.iter().all(|d| *d == Dominant::Undetermined));
        assert!(lammi.percentages.iter().all(|p| p.iter().all(|&v| v == 0.0)));
    }

    #[test]
    fn test_build_grid_carries_substrate() {
        let facies = vec![LammiFacies {
            transects: vec![transect(10.0)],
        }];
        let lammi = LammiAdapter::new(DominantCase::Coarsest).build_grid(&facies).unwrap();
        // 两条 5 点剖面 → 8 个三角形
        assert_eq!(lammi.grid.n_cells(), 8);
        assert_eq!(lammi.dominant.len(), 8);
        assert!(lammi.substrate_diagnostics.is_empty());

        // EDF 1/5/7 → Cemagref 2/6/7
        for d in &lammi.dominant {
            assert!(matches!(d, Dominant::Class(2) | Dominant::Class(6) | Dominant::Class(7)));
        }
        // 左端点（第一个顶点在 lateral = -3）取第一个单元
        assert_eq!(lammi.dominant[0], Dominant::Class(2));
        assert!((lammi.percentages[0][1] - 100.0).abs() < 1e-12);
        assert_eq!(lammi.coarse[0], Dominant::Class(2));
    }
}
