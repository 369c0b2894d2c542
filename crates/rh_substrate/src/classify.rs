// crates/rh_substrate/src/classify.rs

//! 百分比与主导类互转
//!
//! 主导类为百分比最大的类。并列时由 [`DominantCase`] 决定：
//! `Finest` 取编号小者，`Coarsest` 取编号大者，`Undetermined` 返回
//! [`Dominant::Undetermined`]。全零向量没有主导类，同样返回 `Undetermined`。

use crate::code::{Percentages, N_CEMAGREF};
use crate::error::SubstrateError;
use rh_config::DominantCase;
use rh_foundation::{Diagnostic, Diagnostics};
use serde::{Deserialize, Serialize};

/// 百分比之和的容差
pub const SUM_TOLERANCE: f64 = 1.0;

/// 主导类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dominant {
    /// 确定的类（从 1 开始）
    Class(u8),
    /// 无法确定
    Undetermined,
}

impl Dominant {
    /// 类编号，无法确定时为 None
    pub fn class(&self) -> Option<u8> {
        match self {
            Self::Class(c) => Some(*c),
            Self::Undetermined => None,
        }
    }

    /// 按函数映射类编号
    pub fn try_map<E>(self, f: impl FnOnce(u8) -> Result<u8, E>) -> Result<Self, E> {
        match self {
            Self::Class(c) => Ok(Self::Class(f(c)?)),
            Self::Undetermined => Ok(Self::Undetermined),
        }
    }
}

/// 百分比向量的主导类
pub fn percentage_to_dominant(percentages: &[f64], case: DominantCase) -> Dominant {
    let max = percentages.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return Dominant::Undetermined;
    }

    let mut tied = percentages
        .iter()
        .enumerate()
        .filter(|&(_, &p)| p == max)
        .map(|(i, _)| i as u8 + 1);
    let first = tied.next();
    let last = tied.last();

    match (first, last, case) {
        (Some(c), None, _) => Dominant::Class(c),
        (Some(c), Some(_), DominantCase::Finest) => Dominant::Class(c),
        (Some(_), Some(c), DominantCase::Coarsest) => Dominant::Class(c),
        _ => Dominant::Undetermined,
    }
}

/// 主导类对应的百分比向量（该类 100%）
pub fn dominant_to_percentage(class: u8) -> Result<Percentages, SubstrateError> {
    if !(1..=N_CEMAGREF as u8).contains(&class) {
        return Err(SubstrateError::InvalidCode {
            system: "Cemagref",
            code: class,
            max: N_CEMAGREF as u8,
        });
    }
    let mut out = [0.0; N_CEMAGREF];
    out[usize::from(class) - 1] = 100.0;
    Ok(out)
}

/// 主导类与最粗的非零类
///
/// 返回 `(主导类, 最粗类)`。全零向量两者均为 `Undetermined`。
pub fn percentage_to_dominant_coarse(percentages: &[f64], case: DominantCase) -> (Dominant, Dominant) {
    let dominant = percentage_to_dominant(percentages, case);
    let coarse = percentages
        .iter()
        .rposition(|&p| p > 0.0)
        .map_or(Dominant::Undetermined, |i| Dominant::Class(i as u8 + 1));
    (dominant, coarse)
}

/// 百分比之和是否在 `100 ± 1` 以内
pub fn percentage_sum_ok(percentages: &[f64]) -> bool {
    (percentages.iter().sum::<f64>() - 100.0).abs() <= SUM_TOLERANCE
}

/// 检查一组百分比向量之和，偏差记录为警告与诊断
pub fn check_percentage_sums<'a, I>(rows: I) -> Diagnostics
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut report = Diagnostics::new();
    for (element, row) in rows.into_iter().enumerate() {
        if !percentage_sum_ok(row) {
            let sum: f64 = row.iter().sum();
            log::warn!("底质元素 {} 百分比之和为 {:.2}, 不为 100", element, sum);
            report.push(Diagnostic::PercentageSum { element, sum });
        }
    }
    report
}
