// crates/rh_mesh/src/triangulate.rs

//! 简单多边形三角化（耳切法）
//!
//! 用于单元中心环的局部三角化。输入顶点顺序任意（顺/逆时针），
//! 输出三角形均为逆时针。

use rh_foundation::geometry::{polygon_signed_area, signed_area};
use rh_foundation::Point2D;

/// 耳切法三角化
///
/// 返回三角形顶点在 `vertices` 中的编号。少于 3 个顶点返回空；
/// 遇到无法继续切耳的退化多边形时返回已切出的部分。
pub fn ear_clip(vertices: &[Point2D]) -> Vec<[usize; 3]> {
    let n = vertices.len();
    if n < 3 {
        return Vec::new();
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    if polygon_signed_area(vertices) < 0.0 {
        remaining.reverse();
    }
    if n == 3 {
        return vec![[remaining[0], remaining[1], remaining[2]]];
    }

    let mut triangles = Vec::with_capacity(n - 2);
    while remaining.len() > 3 {
        let len = remaining.len();
        let ear = (0..len).find(|&i| {
            let prev = remaining[(i + len - 1) % len];
            let next = remaining[(i + 1) % len];
            is_ear(vertices, &remaining, prev, remaining[i], next)
        });

        match ear {
            Some(i) => {
                let prev = remaining[(i + len - 1) % len];
                let next = remaining[(i + 1) % len];
                triangles.push([prev, remaining[i], next]);
                remaining.remove(i);
            }
            None => {
                log::trace!("耳切中止: 剩余 {} 个顶点无凸耳", remaining.len());
                return triangles;
            }
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

/// 凸角且没有其他剩余顶点严格落在三角形内
fn is_ear(vertices: &[Point2D], remaining: &[usize], prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (vertices[prev], vertices[curr], vertices[next]);
    if signed_area(a, b, c) <= 0.0 {
        return false;
    }

    !remaining
        .iter()
        .filter(|&&i| i != prev && i != curr && i != next)
        .any(|&i| strictly_inside(vertices[i], a, b, c))
}

/// 点严格位于逆时针三角形内部（边上不算）
fn strictly_inside(p: Point2D, a: Point2D, b: Point2D, c: Point2D) -> bool {
    signed_area(a, b, p) > 0.0 && signed_area(b, c, p) > 0.0 && signed_area(c, a, p) > 0.0
}
