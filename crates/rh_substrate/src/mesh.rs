// crates/rh_substrate/src/mesh.rs

//! 底质网格
//!
//! 多边形网格，每个多边形带 Cemagref 百分比向量与主导类。

use crate::classify::{check_percentage_sums, dominant_to_percentage, percentage_to_dominant, Dominant};
use crate::code::Percentages;
use crate::error::SubstrateError;
use rh_config::DominantCase;
use rh_foundation::{Bounds2D, Diagnostics, Point2D, RhResult};
use serde::{Deserialize, Serialize};

/// 底质网格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstrateMesh {
    /// 顶点
    pub points: Vec<Point2D>,
    /// 多边形顶点编号
    pub polygons: Vec<Vec<usize>>,
    /// 每个多边形的主导类
    pub dominant: Vec<Dominant>,
    /// 每个多边形的百分比
    pub percentages: Vec<Percentages>,
}

impl SubstrateMesh {
    /// 由百分比创建，主导类按 `case` 计算
    pub fn from_percentages(
        points: Vec<Point2D>,
        polygons: Vec<Vec<usize>>,
        percentages: Vec<Percentages>,
        case: DominantCase,
    ) -> RhResult<Self> {
        let dominant = percentages
            .iter()
            .map(|p| percentage_to_dominant(p, case))
            .collect();
        let mesh = Self {
            points,
            polygons,
            dominant,
            percentages,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// 由主导类创建，百分比为该类 100%
    pub fn from_dominant(
        points: Vec<Point2D>,
        polygons: Vec<Vec<usize>>,
        dominant: &[u8],
    ) -> RhResult<Self> {
        let percentages = dominant
            .iter()
            .map(|&c| dominant_to_percentage(c))
            .collect::<Result<Vec<_>, _>>()?;
        let mesh = Self {
            points,
            polygons,
            dominant: dominant.iter().map(|&c| Dominant::Class(c)).collect(),
            percentages,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// 覆盖包围盒的单一多边形常数底质
    pub fn constant(bounds: Bounds2D, code: u8) -> RhResult<Self> {
        Self::from_dominant(bounds.corners().to_vec(), vec![vec![0, 1, 2, 3]], &[code])
    }

    /// 验证拓扑与数据长度
    pub fn validate(&self) -> Result<(), SubstrateError> {
        if self.polygons.is_empty() {
            return Err(SubstrateError::EmptySubstrate);
        }
        let n_points = self.points.len();
        for (i, poly) in self.polygons.iter().enumerate() {
            if poly.len() < 3 {
                return Err(SubstrateError::InvalidPolygon {
                    polygon: i,
                    reason: format!("仅 {} 个顶点", poly.len()),
                });
            }
            if let Some(&v) = poly.iter().find(|&&v| v >= n_points) {
                return Err(SubstrateError::InvalidPolygon {
                    polygon: i,
                    reason: format!("顶点 {} 超出范围 0..{}", v, n_points),
                });
            }
        }
        for (what, len) in [("dominant", self.dominant.len()), ("percentages", self.percentages.len())] {
            if len != self.polygons.len() {
                return Err(SubstrateError::InvalidPolygon {
                    polygon: len.min(self.polygons.len()),
                    reason: format!("{} 长度 {}, 多边形数 {}", what, len, self.polygons.len()),
                });
            }
        }
        Ok(())
    }

    /// 多边形数
    #[inline]
    pub fn n_polygons(&self) -> usize {
        self.polygons.len()
    }

    /// 多边形顶点坐标
    pub fn polygon_points(&self, polygon: usize) -> Vec<Point2D> {
        self.polygons[polygon]
            .iter()
            .map(|&v| self.points[v])
            .collect()
    }

    /// 检查百分比之和
    pub fn check_sums(&self) -> Diagnostics {
        check_percentage_sums(self.percentages.iter().map(|p| &p[..]))
    }
}
