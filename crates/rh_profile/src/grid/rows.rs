// crates/rh_profile/src/grid/rows.rs

//! 河段节点行的生成
//!
//! 每条（观测或插入的）剖面生成一行节点，相邻两行构成一个条带。
//!
//! - `Block`: 观测剖面的采样点直接成行
//! - `Linear`/`Nearest`: 河段内所有可连接剖面重采样到归一化桩号的并集上，
//!   每对观测剖面之间按 `k/(n+1)` 插入 `n` 行

use super::SampleRef;
use crate::profile::{interpolate, Profile, ProfileHydro};
use rh_config::InterpolationMode;
use rh_foundation::Point2D;

/// 桩号去重容差
const STATION_EPS: f64 = 1e-9;

/// 一行节点：`start..start + stations.len()`
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub start: usize,
    pub stations: Vec<f64>,
}

impl Row {
    #[inline]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[inline]
    pub fn node(&self, i: usize) -> usize {
        self.start + i
    }
}

/// 河段节点数据
#[derive(Debug, Clone, Default)]
pub(crate) struct ReachNodes {
    pub xy: Vec<Point2D>,
    pub z: Vec<f64>,
    pub velocity: Vec<f64>,
    pub depth: Vec<f64>,
    pub sample: Vec<SampleRef>,
}

impl ReachNodes {
    fn push(&mut self, xy: Point2D, z: f64, velocity: f64, depth: f64, sample: SampleRef) {
        self.xy.push(xy);
        self.z.push(z);
        self.velocity.push(velocity);
        self.depth.push(depth);
        self.sample.push(sample);
    }

    fn push_sample(&mut self, obs: &Observed<'_>, sample: usize) {
        let s = obs.profile.samples[sample];
        self.push(
            s.xy,
            s.z,
            obs.hydro.velocity[sample],
            obs.hydro.depth[sample],
            SampleRef {
                profile: obs.index,
                sample,
            },
        );
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.xy.len()
    }
}

/// 河段内的一条观测剖面
pub(crate) struct Observed<'a> {
    /// 全局剖面编号
    pub index: usize,
    pub profile: &'a Profile,
    pub hydro: &'a ProfileHydro,
}

/// 条带：`(条带编号, 上游行, 下游行)`
pub(crate) type Band = (usize, Row, Row);

/// 河段的节点与条带
#[derive(Debug, Default)]
pub(crate) struct ReachRows {
    pub nodes: ReachNodes,
    pub bands: Vec<Band>,
    /// 无法连接的条带编号
    pub holes: Vec<usize>,
}

/// 生成河段节点行
pub(crate) fn build_rows(
    observed: &[Observed<'_>],
    mode: InterpolationMode,
    nb_add_profile: usize,
) -> ReachRows {
    let mut out = ReachRows::default();
    let stations = union_stations(observed);

    let rows: Vec<Option<Row>> = observed
        .iter()
        .map(|obs| {
            if !obs.profile.is_joinable() {
                return None;
            }
            Some(match mode {
                InterpolationMode::Block => observed_row(&mut out.nodes, obs),
                _ => resampled_row(&mut out.nodes, obs, &stations, mode),
            })
        })
        .collect();

    for band in 0..observed.len().saturating_sub(1) {
        let (Some(up), Some(down)) = (&rows[band], &rows[band + 1]) else {
            out.holes.push(band);
            continue;
        };

        if !mode.adds_profiles() {
            out.bands.push((band, up.clone(), down.clone()));
            continue;
        }

        let mut previous = up.clone();
        for k in 1..=nb_add_profile {
            let t = k as f64 / (nb_add_profile + 1) as f64;
            let row = synthetic_row(
                &mut out.nodes,
                up,
                down,
                t,
                [&observed[band], &observed[band + 1]],
                mode,
            );
            out.bands.push((band, previous, row.clone()));
            previous = row;
        }
        out.bands.push((band, previous, down.clone()));
    }
    out
}

/// 观测采样点直接成行
fn observed_row(nodes: &mut ReachNodes, obs: &Observed<'_>) -> Row {
    let start = nodes.len();
    for i in 0..obs.profile.len() {
        nodes.push_sample(obs, i);
    }
    Row {
        start,
        stations: obs.profile.stations(),
    }
}

/// 观测剖面重采样到桩号并集
fn resampled_row(
    nodes: &mut ReachNodes,
    obs: &Observed<'_>,
    stations: &[f64],
    mode: InterpolationMode,
) -> Row {
    let start = nodes.len();
    let (lo, hi) = obs.profile.lateral_range().unwrap_or((0.0, 0.0));

    for &s in stations {
        let lateral = lo + s * (hi - lo);
        let loc = obs.profile.locate(lateral);
        let a = obs.profile.samples[loc.0];
        let b = obs.profile.samples[loc.0 + 1];
        let xy = a.xy.lerp(&b.xy, loc.1);
        let nearest = nearest_sample(xy, &[obs]);

        if mode == InterpolationMode::Nearest {
            let src = nearest.sample;
            let z = obs.profile.samples[src].z;
            nodes.push(xy, z, obs.hydro.velocity[src], obs.hydro.depth[src], nearest);
        } else {
            nodes.push(
                xy,
                a.z + loc.1 * (b.z - a.z),
                interpolate(&obs.hydro.velocity, loc),
                interpolate(&obs.hydro.depth, loc),
                nearest,
            );
        }
    }

    Row {
        start,
        stations: stations.to_vec(),
    }
}

/// 两行之间按比例 `t` 插入一行
fn synthetic_row(
    nodes: &mut ReachNodes,
    up: &Row,
    down: &Row,
    t: f64,
    bounding: [&Observed<'_>; 2],
    mode: InterpolationMode,
) -> Row {
    let start = nodes.len();
    for i in 0..up.len() {
        let (ia, ib) = (up.node(i), down.node(i));
        let xy = nodes.xy[ia].lerp(&nodes.xy[ib], t);
        let nearest = nearest_sample(xy, &bounding);

        if mode == InterpolationMode::Nearest {
            let obs = if nearest.profile == bounding[0].index {
                bounding[0]
            } else {
                bounding[1]
            };
            let src = nearest.sample;
            nodes.push(
                xy,
                obs.profile.samples[src].z,
                obs.hydro.velocity[src],
                obs.hydro.depth[src],
                nearest,
            );
        } else {
            let lerp = |v: &[f64]| v[ia] + t * (v[ib] - v[ia]);
            let (z, vel, h) = (lerp(&nodes.z), lerp(&nodes.velocity), lerp(&nodes.depth));
            nodes.push(xy, z, vel, h, nearest);
        }
    }
    Row {
        start,
        stations: up.stations.clone(),
    }
}

/// 河段内所有可连接剖面的归一化桩号并集
fn union_stations(observed: &[Observed<'_>]) -> Vec<f64> {
    let mut all: Vec<f64> = observed
        .iter()
        .filter(|o| o.profile.is_joinable())
        .flat_map(|o| o.profile.stations())
        .collect();
    all.sort_by(f64::total_cmp);
    all.dedup_by(|b, a| (*b - *a).abs() <= STATION_EPS);
    all
}

/// 最近观测采样点（欧氏距离，等距取先出现者：上游剖面优先、采样编号小者优先）
fn nearest_sample(p: Point2D, candidates: &[&Observed<'_>]) -> SampleRef {
    let mut best: Option<(f64, SampleRef)> = None;
    for obs in candidates {
        consider(p, obs, &mut best);
    }
    best.map(|(_, s)| s).unwrap_or_default()
}

fn consider(p: Point2D, obs: &Observed<'_>, best: &mut Option<(f64, SampleRef)>) {
    for (i, s) in obs.profile.samples.iter().enumerate() {
        let d2 = p.distance_squared_to(&s.xy);
        if best.map_or(true, |(bd, _)| d2 < bd) {
            *best = Some((
                d2,
                SampleRef {
                    profile: obs.index,
                    sample: i,
                },
            ));
        }
    }
}
