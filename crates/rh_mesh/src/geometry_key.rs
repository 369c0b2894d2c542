// crates/rh_mesh/src/geometry_key.rs

//! 网格几何指纹
//!
//! 对节点坐标（按位）和连接表做 xxh3 哈希。几何不变的时间步得到相同的键，
//! 可直接复用已计算的插值权重；几何变化则得到新键。

use crate::mesh::TriMesh;
use xxhash_rust::xxh3::xxh3_64;

/// 网格几何指纹
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryKey(pub u64);

impl GeometryKey {
    /// 计算网格的几何指纹
    pub fn of(mesh: &TriMesh) -> Self {
        let mut bytes = Vec::with_capacity(16 + mesh.n_nodes() * 16 + mesh.n_cells() * 24);
        bytes.extend_from_slice(&(mesh.n_nodes() as u64).to_le_bytes());
        for p in &mesh.points {
            bytes.extend_from_slice(&p.x.to_bits().to_le_bytes());
            bytes.extend_from_slice(&p.y.to_bits().to_le_bytes());
        }
        bytes.extend_from_slice(&(mesh.n_cells() as u64).to_le_bytes());
        for tri in &mesh.ikle {
            for &v in tri {
                bytes.extend_from_slice(&(v as u64).to_le_bytes());
            }
        }
        Self(xxh3_64(&bytes))
    }
}

impl std::fmt::Display for GeometryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
