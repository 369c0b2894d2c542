// crates/rh_profile/src/profile.rs

//! 剖面与河段
//!
//! - [`Profile`]: 一条横断面，采样点按横向距离非递减排列
//! - [`ProfileHydro`]: 某一时间步剖面上的流速、水深（与采样点对齐）
//! - [`ReachLayout`]: 河段划分，即累计剖面数序列 `nb_profile_per_reach`

use crate::error::ProfileError;
use rh_foundation::{Point2D, RhError, RhResult};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// 剖面采样点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSample {
    /// 平面坐标
    pub xy: Point2D,
    /// 沿剖面的横向距离
    pub lateral: f64,
    /// 河床高程
    pub z: f64,
}

impl ProfileSample {
    /// 创建采样点
    pub fn new(xy: Point2D, lateral: f64, z: f64) -> Self {
        Self { xy, lateral, z }
    }
}

/// 横断面剖面
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// 采样点
    pub samples: Vec<ProfileSample>,
}

impl Profile {
    /// 创建剖面并验证
    pub fn new(samples: Vec<ProfileSample>) -> RhResult<Self> {
        let profile = Self { samples };
        profile.validate()?;
        Ok(profile)
    }

    /// 垂直于 x 轴的直剖面：所有点 x 相同，y 等于横向距离
    pub fn transect(x: f64, laterals: &[f64], z: &[f64]) -> RhResult<Self> {
        RhError::check_size("z", laterals.len(), z.len())?;
        Self::new(
            laterals
                .iter()
                .zip(z)
                .map(|(&l, &zi)| ProfileSample::new(Point2D::new(x, l), l, zi))
                .collect(),
        )
    }

    /// 验证采样值有限且横向距离非递减
    pub fn validate(&self) -> Result<(), ProfileError> {
        for (i, s) in self.samples.iter().enumerate() {
            if !(s.xy.is_finite() && s.lateral.is_finite() && s.z.is_finite()) {
                return Err(ProfileError::NonFiniteSample { sample: i });
            }
        }
        for (i, pair) in self.samples.windows(2).enumerate() {
            if pair[1].lateral < pair[0].lateral {
                return Err(ProfileError::NonMonotonicLateral {
                    sample: i + 1,
                    value: pair[1].lateral,
                    previous: pair[0].lateral,
                });
            }
        }
        Ok(())
    }

    /// 采样点数
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// 是否没有采样点
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 横向距离列表
    pub fn laterals(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.lateral).collect()
    }

    /// 横向距离范围 `(min, max)`，空剖面返回 None
    pub fn lateral_range(&self) -> Option<(f64, f64)> {
        Some((self.samples.first()?.lateral, self.samples.last()?.lateral))
    }

    /// 剖面宽度
    pub fn width(&self) -> f64 {
        self.lateral_range().map_or(0.0, |(lo, hi)| hi - lo)
    }

    /// 能否与相邻剖面连接成条带（至少两点且宽度为正）
    pub fn is_joinable(&self) -> bool {
        self.len() >= 2 && self.width() > 0.0
    }

    /// 归一化桩号 `(lateral - min) / width`
    pub fn stations(&self) -> Vec<f64> {
        let (lo, width) = match self.lateral_range() {
            Some((lo, hi)) if hi > lo => (lo, hi - lo),
            _ => return vec![0.0; self.len()],
        };
        self.samples
            .iter()
            .map(|s| (s.lateral - lo) / width)
            .collect()
    }

    /// 定位横向距离所在的区间 `(k, t)`，值为 `v[k] + t * (v[k+1] - v[k])`
    ///
    /// 超出范围时夹到端点。至少需要一个采样点。
    pub fn locate(&self, lateral: f64) -> (usize, f64) {
        let n = self.len();
        if n < 2 {
            return (0, 0.0);
        }
        let k = self
            .samples
            .partition_point(|s| s.lateral <= lateral)
            .saturating_sub(1)
            .min(n - 2);
        let (l0, l1) = (self.samples[k].lateral, self.samples[k + 1].lateral);
        let t = if l1 > l0 {
            ((lateral - l0) / (l1 - l0)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (k, t)
    }

    /// 在指定横向距离处线性插值出新采样点
    pub fn sample_at(&self, lateral: f64) -> Option<ProfileSample> {
        let first = self.samples.first()?;
        if self.len() == 1 {
            return Some(*first);
        }
        let (k, t) = self.locate(lateral);
        let (a, b) = (self.samples[k], self.samples[k + 1]);
        Some(ProfileSample {
            xy: a.xy.lerp(&b.xy, t),
            lateral: a.lateral + t * (b.lateral - a.lateral),
            z: a.z + t * (b.z - a.z),
        })
    }

    /// 在一组横向距离处重采样
    pub fn resample(&self, laterals: &[f64]) -> Option<Profile> {
        let samples = laterals
            .iter()
            .map(|&l| self.sample_at(l))
            .collect::<Option<Vec<_>>>()?;
        Some(Profile { samples })
    }
}

/// 按 `(k, t)` 线性插值
#[inline]
pub(crate) fn interpolate(values: &[f64], (k, t): (usize, f64)) -> f64 {
    match values.get(k + 1) {
        Some(&next) => values[k] + t * (next - values[k]),
        None => values.get(k).copied().unwrap_or(0.0),
    }
}

/// 剖面水力数据（单一时间步）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileHydro {
    /// 流速
    pub velocity: Vec<f64>,
    /// 水深
    pub depth: Vec<f64>,
}

impl ProfileHydro {
    /// 创建水力数据
    pub fn new(velocity: Vec<f64>, depth: Vec<f64>) -> Self {
        Self { velocity, depth }
    }

    /// 全零（干）数据
    pub fn dry(n: usize) -> Self {
        Self {
            velocity: vec![0.0; n],
            depth: vec![0.0; n],
        }
    }

    /// 检查与剖面对齐
    pub fn check(&self, profile_index: usize, profile: &Profile) -> Result<(), ProfileError> {
        let expected = profile.len();
        for (field, actual) in [("velocity", self.velocity.len()), ("depth", self.depth.len())] {
            if actual != expected {
                return Err(ProfileError::HydroLength {
                    profile: profile_index,
                    field,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// 河段划分
///
/// 累计剖面数：从 0 开始、非递减，最后一个值等于剖面总数。
/// 河段 r 包含剖面 `[bounds[r], bounds[r+1])`。
///
/// 序列化为累计剖面数数组，反序列化时做与 [`ReachLayout::new`] 相同的检查。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct ReachLayout {
    bounds: Vec<usize>,
}

impl ReachLayout {
    /// 创建并验证河段划分
    pub fn new(bounds: Vec<usize>, n_profiles: usize) -> RhResult<Self> {
        let layout = Self::try_from(bounds)?;
        if layout.n_profiles() != n_profiles {
            return Err(invalid_layout(format!(
                "末项为 {}, 剖面总数为 {}",
                layout.n_profiles(),
                n_profiles
            )));
        }
        Ok(layout)
    }

    /// 单一河段
    pub fn single(n_profiles: usize) -> Self {
        Self {
            bounds: vec![0, n_profiles],
        }
    }

    /// 河段数
    #[inline]
    pub fn n_reaches(&self) -> usize {
        self.bounds.len().saturating_sub(1)
    }

    /// 剖面总数
    #[inline]
    pub fn n_profiles(&self) -> usize {
        self.bounds.last().copied().unwrap_or(0)
    }

    /// 河段 r 的剖面范围
    pub fn range(&self, reach: usize) -> Range<usize> {
        self.bounds[reach]..self.bounds[reach + 1]
    }

    /// 累计剖面数序列
    pub fn as_slice(&self) -> &[usize] {
        &self.bounds
    }
}

/// 检查序列从 0 开始且非递减
impl TryFrom<Vec<usize>> for ReachLayout {
    type Error = RhError;

    fn try_from(bounds: Vec<usize>) -> RhResult<Self> {
        match bounds.first() {
            Some(0) => {}
            Some(&first) => return Err(invalid_layout(format!("首项为 {}, 应为 0", first))),
            None => return Err(invalid_layout("序列为空".into())),
        }
        if let Some(i) = bounds.windows(2).position(|w| w[1] < w[0]) {
            return Err(invalid_layout(format!("第 {} 项递减", i + 1)));
        }
        Ok(Self { bounds })
    }
}

impl From<ReachLayout> for Vec<usize> {
    fn from(layout: ReachLayout) -> Self {
        layout.bounds
    }
}

fn invalid_layout(reason: String) -> RhError {
    ProfileError::InvalidLayout { reason }.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transect() {
        let p = Profile::transect(5.0, &[-2.0, 0.0, 2.0], &[1.0, 0.0, 1.0]).unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.samples[0].xy, Point2D::new(5.0, -2.0));
        assert!((p.width() - 4.0).abs() < 1e-12);
        assert_eq!(p.stations(), vec![0.0, 0.5, 1.0]);
        assert!(p.is_joinable());
    }

    #[test]
    fn test_non_monotonic_rejected() {
        let result = Profile::transect(0.0, &[0.0, 2.0, 1.0], &[0.0; 3]);
        assert!(matches!(result, Err(RhError::InvalidInput { .. })));
    }

    #[test]
    fn test_sample_at() {
        let p = Profile::transect(0.0, &[0.0, 2.0, 4.0], &[2.0, 0.0, 2.0]).unwrap();
        let s = p.sample_at(1.0).unwrap();
        assert!((s.z - 1.0).abs() < 1e-12);
        assert!((s.xy.y - 1.0).abs() < 1e-12);
        let end = p.sample_at(10.0).unwrap();
        assert!((end.lateral - 4.0).abs() < 1e-12);
        assert_eq!(p.locate(4.0), (1, 1.0));
    }

    #[test]
    fn test_interpolate_values() {
        let p = Profile::transect(0.0, &[0.0, 1.0, 3.0], &[0.0; 3]).unwrap();
        let v = [1.0, 3.0, 7.0];
        assert!((interpolate(&v, p.locate(2.0)) - 5.0).abs() < 1e-12);
        assert!((interpolate(&v, p.locate(0.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hydro_check() {
        let p = Profile::transect(0.0, &[0.0, 1.0], &[0.0, 0.0]).unwrap();
        assert!(ProfileHydro::dry(2).check(0, &p).is_ok());
        assert!(ProfileHydro::new(vec![1.0], vec![1.0, 1.0]).check(0, &p).is_err());
    }

    #[test]
    fn test_layout() {
        let layout = ReachLayout::new(vec![0, 3, 3, 5], 5).unwrap();
        assert_eq!(layout.n_reaches(), 3);
        assert_eq!(layout.range(1), 3..3);
        assert_eq!(layout.range(2), 3..5);

        assert!(ReachLayout::new(vec![1, 5], 5).is_err());
        assert!(ReachLayout::new(vec![0, 3, 2, 5], 5).is_err());
        assert!(ReachLayout::new(vec![0, 4], 5).is_err());
        assert!(ReachLayout::new(vec![], 0).is_err());
    }

    #[test]
    fn test_layout_deserialize_checked() {
        let layout: ReachLayout = serde_json::from_str("[0, 2, 2, 4]").unwrap();
        assert_eq!(layout.n_reaches(), 3);
        assert_eq!(layout.n_profiles(), 4);
        assert_eq!(serde_json::to_string(&layout).unwrap(), "[0,2,2,4]");

        assert!(serde_json::from_str::<ReachLayout>("[0, 4, 2]").is_err());
        assert!(serde_json::from_str::<ReachLayout>("[1, 2]").is_err());
        assert!(serde_json::from_str::<ReachLayout>("[]").is_err());
    }
}
