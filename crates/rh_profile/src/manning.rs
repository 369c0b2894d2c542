// crates/rh_profile/src/manning.rs

//! 曼宁公式流速分布
//!
//! 一维模型只给出水位和流量时，按曼宁公式把流量分配到剖面各点：
//!
//! ```text
//! h_i = max(WSE - z_i, 0)
//! v_i = K · h_i^{2/3} / n_i,   K = Q / Σ(h_i^{5/3} · w_i / n_i)
//! ```
//!
//! `w_i` 为采样点控制宽度（相邻点间距的一半之和），于是 `Σ v_i·h_i·w_i = Q`。
//! `K` 相当于能坡的平方根。
//!
//! 糙率可以是常数，也可以来自糙率表文件，每行 `剖面编号, 距离, n`，
//! 按剖面编号升序，`#` 开头为注释。

use crate::error::ProfileError;
use crate::profile::{Profile, ProfileHydro};
use rh_config::ManningConfig;
use rh_foundation::{RhError, RhResult};
use std::path::{Path, PathBuf};

/// 糙率表的一行
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManningRow {
    /// 剖面编号
    pub profile: usize,
    /// 沿剖面距离
    pub distance: f64,
    /// 糙率
    pub n: f64,
}

/// 糙率表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManningTable {
    rows: Vec<ManningRow>,
}

impl ManningTable {
    /// 从文件读取
    pub fn from_file<P: AsRef<Path>>(path: P) -> RhResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RhError::io_with_source(format!("无法读取糙率表 {}", path.display()), e)
        })?;
        Self::parse_named(&text, path)
    }

    /// 解析文本
    pub fn parse(text: &str) -> RhResult<Self> {
        Self::parse_named(text, Path::new("<manning>"))
    }

    fn parse_named(text: &str, source: &Path) -> RhResult<Self> {
        let err = |line: usize, message: String| RhError::parse(PathBuf::from(source), line, message);

        let mut rows: Vec<ManningRow> = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let cols: Vec<&str> = line.split(',').map(str::trim).collect();
            if cols.len() != 3 {
                return Err(err(
                    line_no,
                    format!("应为 3 列 (剖面, 距离, n), 实际 {} 列", cols.len()),
                ));
            }

            let number = |s: &str, what: &str| -> RhResult<f64> {
                s.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| err(line_no, format!("{} 不是有效数值: '{}'", what, s)))
            };
            let profile = number(cols[0], "剖面编号")?;
            let distance = number(cols[1], "距离")?;
            let n = number(cols[2], "糙率")?;

            if profile < 0.0 || profile.fract() != 0.0 {
                return Err(err(line_no, format!("剖面编号应为非负整数: {}", cols[0])));
            }
            if n <= 0.0 {
                return Err(err(line_no, format!("糙率必须为正: {}", n)));
            }
            let profile = profile as usize;
            if let Some(last) = rows.last() {
                if profile < last.profile {
                    return Err(err(
                        line_no,
                        format!("剖面编号未按升序排列: {} < {}", profile, last.profile),
                    ));
                }
            }
            rows.push(ManningRow {
                profile,
                distance,
                n,
            });
        }

        if rows.is_empty() {
            return Err(RhError::empty_data(format!("糙率表 {} 没有数据行", source.display())));
        }
        log::debug!("糙率表 {}: {} 行", source.display(), rows.len());
        Ok(Self { rows })
    }

    /// 所有行
    pub fn rows(&self) -> &[ManningRow] {
        &self.rows
    }

    /// 查询剖面 `profile` 距离 `distance` 处的糙率
    ///
    /// 阶梯函数：取距离不大于 `distance` 的最后一行，`distance` 小于首行距离时取首行。
    /// 没有该剖面的行时沿用编号更小的最近剖面。
    pub fn lookup(&self, profile: usize, distance: f64) -> RhResult<f64> {
        let end = self.rows.partition_point(|r| r.profile <= profile);
        let owner = self.rows[..end]
            .last()
            .map(|r| r.profile)
            .ok_or(ProfileError::MissingRoughness { profile })?;
        let start = self.rows[..end].partition_point(|r| r.profile < owner);
        let rows = &self.rows[start..end];

        let n = rows
            .iter()
            .take_while(|r| r.distance <= distance)
            .last()
            .unwrap_or(&rows[0])
            .n;
        Ok(n)
    }
}

/// 糙率来源
#[derive(Debug, Clone, PartialEq)]
pub enum Roughness {
    /// 全局常数
    Constant(f64),
    /// 糙率表
    Table(ManningTable),
}

impl Roughness {
    /// 从配置创建：给出糙率表文件时读取文件，否则使用常数
    pub fn from_config(config: &ManningConfig) -> RhResult<Self> {
        match &config.table {
            Some(path) => Ok(Self::Table(ManningTable::from_file(path)?)),
            None => Ok(Self::Constant(config.coefficient)),
        }
    }

    /// 查询糙率
    pub fn n_at(&self, profile: usize, distance: f64) -> RhResult<f64> {
        let n = match self {
            Self::Constant(n) => *n,
            Self::Table(table) => table.lookup(profile, distance)?,
        };
        if !n.is_finite() || n <= 0.0 {
            return Err(ProfileError::InvalidRoughness {
                profile,
                distance,
                n,
            }
            .into());
        }
        Ok(n)
    }
}

/// 流速计算点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocitySampling {
    /// 剖面原有采样点
    OnProfile,
    /// 剖面范围内等距的 n 个点
    Regular(usize),
}

impl VelocitySampling {
    /// 从配置创建
    pub fn from_config(config: &ManningConfig) -> Self {
        config
            .nb_point_vel
            .map_or(Self::OnProfile, Self::Regular)
    }
}

impl Default for VelocitySampling {
    fn default() -> Self {
        Self::Regular(70)
    }
}

/// 流速分布结果
#[derive(Debug, Clone, PartialEq)]
pub struct DistributedProfile {
    /// 计算所在的剖面（等距采样时为重采样后的剖面）
    pub profile: Profile,
    /// 各点流速与水深
    pub hydro: ProfileHydro,
    /// 各点控制宽度
    pub widths: Vec<f64>,
    /// 比例常数 K（能坡平方根）
    pub slope_sqrt: f64,
}

impl DistributedProfile {
    /// 积分流量 `Σ v·h·w`
    pub fn discharge(&self) -> f64 {
        self.hydro
            .velocity
            .iter()
            .zip(&self.hydro.depth)
            .zip(&self.widths)
            .map(|((v, h), w)| v * h * w)
            .sum()
    }
}

/// 曼宁流速分布器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VelocityDistributor {
    sampling: VelocitySampling,
}

impl VelocityDistributor {
    /// 创建分布器
    pub fn new(sampling: VelocitySampling) -> Self {
        Self { sampling }
    }

    /// 把流量分配到剖面
    pub fn distribute(
        &self,
        profile_index: usize,
        profile: &Profile,
        water_level: f64,
        discharge: f64,
        roughness: &Roughness,
    ) -> RhResult<DistributedProfile> {
        if !discharge.is_finite() || discharge < 0.0 {
            return Err(RhError::out_of_range("discharge", discharge, 0.0, f64::MAX));
        }
        if !water_level.is_finite() {
            return Err(RhError::invalid_input(format!(
                "剖面 {} 水位非有限值",
                profile_index
            )));
        }
        if profile.is_empty() {
            return Err(RhError::empty_data(format!("剖面 {} 没有采样点", profile_index)));
        }
        profile.validate()?;

        let profile = match self.sampling {
            VelocitySampling::Regular(n) if n >= 2 && profile.len() >= 2 => {
                let (lo, hi) = profile.lateral_range().unwrap_or((0.0, 0.0));
                let step = (hi - lo) / (n - 1) as f64;
                let laterals: Vec<f64> = (0..n).map(|i| lo + step * i as f64).collect();
                profile
                    .resample(&laterals)
                    .ok_or_else(|| RhError::internal("剖面重采样失败"))?
            }
            _ => profile.clone(),
        };

        let laterals = profile.laterals();
        let widths = half_interval_widths(&laterals);
        let depth: Vec<f64> = profile
            .samples
            .iter()
            .map(|s| (water_level - s.z).max(0.0))
            .collect();
        let n: Vec<f64> = laterals
            .iter()
            .map(|&d| roughness.n_at(profile_index, d))
            .collect::<RhResult<_>>()?;

        let conveyance: f64 = depth
            .iter()
            .zip(&widths)
            .zip(&n)
            .map(|((h, w), n)| h.powf(5.0 / 3.0) * w / n)
            .sum();

        let slope_sqrt = if discharge == 0.0 {
            0.0
        } else if conveyance > 0.0 {
            discharge / conveyance
        } else {
            return Err(ProfileError::DryProfile {
                profile: profile_index,
                water_level,
                discharge,
            }
            .into());
        };

        let velocity = depth
            .iter()
            .zip(&n)
            .map(|(h, n)| slope_sqrt * h.powf(2.0 / 3.0) / n)
            .collect();

        Ok(DistributedProfile {
            profile,
            hydro: ProfileHydro { velocity, depth },
            widths,
            slope_sqrt,
        })
    }
}

/// 半区间规则控制宽度
fn half_interval_widths(laterals: &[f64]) -> Vec<f64> {
    let n = laterals.len();
    (0..n)
        .map(|i| {
            let left = if i > 0 { laterals[i] - laterals[i - 1] } else { 0.0 };
            let right = if i + 1 < n { laterals[i + 1] - laterals[i] } else { 0.0 };
            0.5 * (left + right)
        })
        .collect()
}
