// crates/rh_profile/src/grid/strip.rs

//! 条带三角化
//!
//! 同时沿上游行 A 和下游行 B 推进：每一步比较两行下一个点的归一化桩号，
//! 推进桩号较小的一行（相等时推进上游行），生成一个三角形。
//! `m` 点与 `n` 点两行之间恰好生成 `(m-1)+(n-1)` 个三角形。
//!
//! 三角形顶点按四边形 `a_i → a_{i+1} → b_{j+1} → b_j` 的环向给出，
//! 同一条带内方向一致，由调用方统一调整为逆时针。

use super::rows::Row;

/// 条带三角形（全局节点编号）
pub(crate) fn walk(a: &Row, b: &Row) -> Vec<[usize; 3]> {
    let (m, n) = (a.len(), b.len());
    if m == 0 || n == 0 || m + n < 3 {
        return Vec::new();
    }

    let mut triangles = Vec::with_capacity(m + n - 2);
    let (mut i, mut j) = (0, 0);
    while i + 1 < m || j + 1 < n {
        let advance_a = if i + 1 == m {
            false
        } else if j + 1 == n {
            true
        } else {
            a.stations[i + 1] <= b.stations[j + 1]
        };

        if advance_a {
            triangles.push([a.node(i), a.node(i + 1), b.node(j)]);
            i += 1;
        } else {
            triangles.push([a.node(i), b.node(j + 1), b.node(j)]);
            j += 1;
        }
    }
    triangles
}
