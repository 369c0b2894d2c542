// crates/rh_substrate/src/code.rs

//! 底质编码体系
//!
//! 内部统一使用 Cemagref 8 类编码，1 为最细、8 为最粗：
//!
//! | 编码 | 类别 |
//! |---|---|
//! | 1 | 植被 |
//! | 2 | 淤泥 |
//! | 3 | 砂 |
//! | 4 | 细砾 |
//! | 5 | 砾石 |
//! | 6 | 卵石 |
//! | 7 | 漂石 |
//! | 8 | 基岩 |
//!
//! Sandre 为 12 类，EDF 为 8 类（不含植被，卵石分两级）。
//! 百分比向量转换时，落入同一 Cemagref 类的份额相加。

use crate::error::SubstrateError;
use std::fmt;
use std::str::FromStr;

/// Cemagref 分类数
pub const N_CEMAGREF: usize = 8;
/// Sandre 分类数
pub const N_SANDRE: usize = 12;
/// EDF 分类数
pub const N_EDF: usize = 8;

/// Cemagref 百分比向量
pub type Percentages = [f64; N_CEMAGREF];

/// EDF → Cemagref
const EDF_TO_CEMAGREF: [u8; N_EDF] = [2, 3, 4, 5, 6, 6, 7, 8];
/// Sandre → Cemagref
const SANDRE_TO_CEMAGREF: [u8; N_SANDRE] = [1, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 8];
/// Cemagref → Sandre（每类取最细的 Sandre 编码）
const CEMAGREF_TO_SANDRE: [u8; N_CEMAGREF] = [1, 2, 3, 5, 7, 9, 11, 12];

/// 底质编码体系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstrateCode {
    /// Cemagref 8 类
    Cemagref,
    /// Sandre 12 类
    Sandre,
    /// EDF 8 类
    Edf,
}

impl SubstrateCode {
    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cemagref => "Cemagref",
            Self::Sandre => "Sandre",
            Self::Edf => "EDF",
        }
    }

    /// 分类数
    pub fn n_classes(&self) -> usize {
        match self {
            Self::Cemagref => N_CEMAGREF,
            Self::Sandre => N_SANDRE,
            Self::Edf => N_EDF,
        }
    }

    /// 检查编码在本体系范围内
    pub fn check(&self, code: u8) -> Result<u8, SubstrateError> {
        let max = self.n_classes() as u8;
        if (1..=max).contains(&code) {
            Ok(code)
        } else {
            Err(SubstrateError::InvalidCode {
                system: self.name(),
                code,
                max,
            })
        }
    }

    /// 主导类编码转换为 Cemagref
    pub fn to_cemagref(&self, code: u8) -> Result<u8, SubstrateError> {
        let idx = usize::from(self.check(code)?) - 1;
        Ok(match self {
            Self::Cemagref => code,
            Self::Sandre => SANDRE_TO_CEMAGREF[idx],
            Self::Edf => EDF_TO_CEMAGREF[idx],
        })
    }

    /// Cemagref 编码转换为本体系
    ///
    /// EDF 方向不可逆（植被无对应类），返回错误。
    pub fn from_cemagref(&self, code: u8) -> Result<u8, SubstrateError> {
        let idx = usize::from(Self::Cemagref.check(code)?) - 1;
        match self {
            Self::Cemagref => Ok(code),
            Self::Sandre => Ok(CEMAGREF_TO_SANDRE[idx]),
            Self::Edf => Err(SubstrateError::UnsupportedConversion {
                from: Self::Cemagref.name(),
                to: self.name(),
            }),
        }
    }

    /// 百分比向量转换为 Cemagref
    pub fn percentages_to_cemagref(&self, values: &[f64]) -> Result<Percentages, SubstrateError> {
        let expected = self.n_classes();
        if values.len() != expected {
            return Err(SubstrateError::PercentageLength {
                system: self.name(),
                expected,
                actual: values.len(),
            });
        }

        let mut out = [0.0; N_CEMAGREF];
        for (i, &v) in values.iter().enumerate() {
            if !v.is_finite() || v < 0.0 {
                return Err(SubstrateError::InvalidPercentage { class: i + 1, value: v });
            }
            let target = self.to_cemagref(i as u8 + 1)?;
            out[usize::from(target) - 1] += v;
        }
        Ok(out)
    }
}

impl Default for SubstrateCode {
    fn default() -> Self {
        Self::Cemagref
    }
}

impl fmt::Display for SubstrateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SubstrateCode {
    type Err = SubstrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cemagref" => Ok(Self::Cemagref),
            "sandre" => Ok(Self::Sandre),
            "edf" => Ok(Self::Edf),
            _ => Err(SubstrateError::UnknownSystem { name: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edf_to_cemagref() {
        let codes: Vec<u8> = (1..=8)
            .map(|c| SubstrateCode::Edf.to_cemagref(c).unwrap())
            .collect();
        assert_eq!(codes, vec![2, 3, 4, 5, 6, 6, 7, 8]);
        assert!(SubstrateCode::Edf.to_cemagref(0).is_err());
        assert!(SubstrateCode::Edf.to_cemagref(9).is_err());
    }

    #[test]
    fn test_sandre_round_trip() {
        for code in 1..=8u8 {
            let sandre = SubstrateCode::Sandre.from_cemagref(code).unwrap();
            assert_eq!(SubstrateCode::Sandre.to_cemagref(sandre).unwrap(), code);
        }
        assert!(SubstrateCode::Sandre.to_cemagref(12).is_ok());
        assert!(SubstrateCode::Sandre.to_cemagref(13).is_err());
        assert!(SubstrateCode::Edf.from_cemagref(3).is_err());
    }

    #[test]
    fn test_percentages_merge_classes() {
        let edf = [0.0, 10.0, 0.0, 0.0, 30.0, 40.0, 20.0, 0.0];
        let cem = SubstrateCode::Edf.percentages_to_cemagref(&edf).unwrap();
        assert_eq!(cem, [0.0, 0.0, 10.0, 0.0, 0.0, 70.0, 20.0, 0.0]);

        assert!(SubstrateCode::Edf.percentages_to_cemagref(&[100.0]).is_err());
        let negative = [-1.0, 101.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert!(SubstrateCode::Cemagref.percentages_to_cemagref(&negative).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("EDF".parse::<SubstrateCode>().unwrap(), SubstrateCode::Edf);
        assert_eq!(" sandre ".parse::<SubstrateCode>().unwrap(), SubstrateCode::Sandre);
        assert!("ifremer".parse::<SubstrateCode>().is_err());
    }
}
