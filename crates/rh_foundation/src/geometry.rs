// crates/rh_foundation/src/geometry.rs

//! 平面几何类型与工具
//!
//! 所有坐标均为投影坐标（米）。河道剖面、水力网格与底质多边形共用 [`Point2D`]。
//!
//! # 工具函数
//!
//! - [`signed_area`]: 三角形有向面积（逆时针为正）
//! - [`barycentric`]: 重心坐标
//! - [`point_in_polygon`]: 射线法点在多边形内判断
//! - [`polygon_centroid`]: 顶点平均中心

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

// ============================================================================
// Point2D
// ============================================================================

/// 2D点 - 网格节点、单元中心与剖面采样点的统一类型
///
/// # 示例
///
/// ```
/// use rh_foundation::geometry::Point2D;
///
/// let p1 = Point2D::new(0.0, 0.0);
/// let p2 = Point2D::new(3.0, 4.0);
/// assert_eq!(p1.distance_to(&p2), 5.0);
/// assert_eq!(p1.lerp(&p2, 0.5), Point2D::new(1.5, 2.0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// X坐标
    pub x: f64,
    /// Y坐标
    pub y: f64,
}

impl Point2D {
    /// 零点常量
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// 创建新的2D点
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 计算到另一个点的欧几里得距离
    #[inline]
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    /// 计算到另一个点的距离的平方
    #[inline]
    #[must_use]
    pub fn distance_squared_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// 点积
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 叉积（返回标量，即Z分量）
    #[inline]
    #[must_use]
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// 向量长度
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// 线性插值
    #[inline]
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// 标量乘法
    #[inline]
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// 判断是否为有限数
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// 分量最小值
    #[inline]
    #[must_use]
    pub fn min(&self, other: &Self) -> Self {
        Self {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }

    /// 分量最大值
    #[inline]
    #[must_use]
    pub fn max(&self, other: &Self) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }
}

impl Add for Point2D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Neg for Point2D {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        self.scale(scalar)
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

// ============================================================================
// Bounds2D
// ============================================================================

/// 轴对齐包围盒
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds2D {
    /// 最小角点
    pub min: Point2D,
    /// 最大角点
    pub max: Point2D,
}

impl Bounds2D {
    /// 由点集计算包围盒，空点集返回 None
    pub fn from_points(points: &[Point2D]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    /// 向外扩展 `margin`
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: Point2D::new(self.min.x - margin, self.min.y - margin),
            max: Point2D::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// 闭区间包含判断
    #[inline]
    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// 逆时针顺序的四个角点
    pub fn corners(&self) -> [Point2D; 4] {
        [
            self.min,
            Point2D::new(self.max.x, self.min.y),
            self.max,
            Point2D::new(self.min.x, self.max.y),
        ]
    }
}

// ============================================================================
// 平面几何工具
// ============================================================================

/// 三角形有向面积，逆时针为正
#[inline]
pub fn signed_area(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    0.5 * (b - a).cross(&(c - a))
}

/// 三角形重心
#[inline]
pub fn triangle_centroid(a: Point2D, b: Point2D, c: Point2D) -> Point2D {
    Point2D::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
}

/// 多边形顶点平均中心，空多边形返回 None
pub fn polygon_centroid(vertices: &[Point2D]) -> Option<Point2D> {
    if vertices.is_empty() {
        return None;
    }
    let sum = vertices.iter().fold(Point2D::ZERO, |acc, v| acc + *v);
    Some(sum.scale(1.0 / vertices.len() as f64))
}

/// 多边形有向面积（鞋带公式），逆时针为正
pub fn polygon_signed_area(vertices: &[Point2D]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i].cross(&vertices[j]);
    }
    0.5 * area
}

/// 计算点 `p` 相对三角形 `(a, b, c)` 的重心坐标
///
/// 三角形退化（面积 ≤ `eps`）时返回 None。
pub fn barycentric(p: Point2D, a: Point2D, b: Point2D, c: Point2D, eps: f64) -> Option<[f64; 3]> {
    let area = signed_area(a, b, c);
    if area.abs() <= eps {
        return None;
    }
    let l_a = signed_area(p, b, c) / area;
    let l_b = signed_area(a, p, c) / area;
    let l_c = 1.0 - l_a - l_b;
    Some([l_a, l_b, l_c])
}

/// 射线法判断点是否在多边形内
///
/// 从待测点向右发射水平射线，统计与多边形边的交点数：奇数在内，偶数在外。
/// 少于 3 个顶点的多边形恒返回 false。
pub fn point_in_polygon(p: Point2D, vertices: &[Point2D]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        if ((vi.y > p.y) != (vj.y > p.y))
            && (p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_area_orientation() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(2.0, 0.0);
        let c = Point2D::new(0.0, 2.0);
        assert!((signed_area(a, b, c) - 2.0).abs() < 1e-12);
        assert!((signed_area(a, c, b) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(1.0, 0.0);
        let c = Point2D::new(0.0, 1.0);
        let w = barycentric(Point2D::new(0.25, 0.25), a, b, c, 1e-12).unwrap();
        assert!((w[0] - 0.5).abs() < 1e-12);
        assert!((w[1] - 0.25).abs() < 1e-12);
        assert!((w[2] - 0.25).abs() < 1e-12);

        let d = Point2D::new(2.0, 0.0);
        assert!(barycentric(Point2D::new(0.5, 0.0), a, b, d, 1e-12).is_none());
    }

    #[test]
    fn test_point_in_polygon() {
        let square = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ];
        assert!(point_in_polygon(Point2D::new(0.5, 0.5), &square));
        assert!(!point_in_polygon(Point2D::new(1.5, 0.5), &square));
        assert!(!point_in_polygon(Point2D::new(0.5, 0.5), &square[..2]));
    }

    #[test]
    fn test_bounds_from_points() {
        let pts = [Point2D::new(1.0, -2.0), Point2D::new(-3.0, 4.0)];
        let b = Bounds2D::from_points(&pts).unwrap();
        assert_eq!(b.min, Point2D::new(-3.0, -2.0));
        assert_eq!(b.max, Point2D::new(1.0, 4.0));
        assert!(b.contains(Point2D::new(0.0, 0.0)));
        assert!(Bounds2D::from_points(&[]).is_none());
        assert!((polygon_signed_area(&b.corners()) - 24.0).abs() < 1e-12);
    }
}
