// crates/rh_foundation/src/diagnostics.rs

//! 几何与数据诊断
//!
//! 网格构建过程中出现的非致命问题（空洞、重叠、退化三角形、未匹配底质等）
//! 以 [`Diagnostic`] 形式记录并随结果返回，构建照常进行。
//!
//! # 示例
//!
//! ```
//! use rh_foundation::diagnostics::{Diagnostic, Diagnostics};
//!
//! let mut report = Diagnostics::new();
//! report.push(Diagnostic::Hole { reach: 0, band: 2 });
//! assert_eq!(report.holes(), 1);
//! assert!(!report.is_clean());
//! ```

use std::fmt;

/// 单条诊断
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// 相邻剖面无法连接，该条带被跳过
    Hole {
        /// 河段编号
        reach: usize,
        /// 条带编号（上游剖面在河段内的序号）
        band: usize,
    },
    /// 三角形方向与条带主方向相反（剖面交叉）
    Overlap {
        /// 河段编号
        reach: usize,
        /// 条带编号
        band: usize,
        /// 输出网格中的单元编号
        cell: usize,
    },
    /// 零面积三角形，已丢弃
    DegenerateTriangle {
        /// 河段编号
        reach: usize,
        /// 条带编号
        band: usize,
    },
    /// 剖面数不足以构成条带，河段被跳过
    ReachSkipped {
        /// 河段编号
        reach: usize,
        /// 该河段的剖面数
        n_profiles: usize,
    },
    /// 水力单元未落入任何底质多边形，使用默认底质
    UnmatchedSubstrate {
        /// 水力单元编号
        cell: usize,
    },
    /// 底质百分比之和不为 100
    PercentageSum {
        /// 元素编号
        element: usize,
        /// 实际总和
        sum: f64,
    },
    /// 节点不在单元中心三角化内，使用最近单元值
    BoundaryFallback {
        /// 节点编号
        node: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hole { reach, band } => {
                write!(f, "河段{}: 条带{} 无法连接 (空洞)", reach, band)
            }
            Self::Overlap { reach, band, cell } => {
                write!(f, "河段{}: 条带{} 单元{} 重叠", reach, band, cell)
            }
            Self::DegenerateTriangle { reach, band } => {
                write!(f, "河段{}: 条带{} 退化三角形已丢弃", reach, band)
            }
            Self::ReachSkipped { reach, n_profiles } => {
                write!(f, "河段{}: 仅有 {} 个剖面, 已跳过", reach, n_profiles)
            }
            Self::UnmatchedSubstrate { cell } => {
                write!(f, "单元{}: 未匹配底质, 使用默认值", cell)
            }
            Self::PercentageSum { element, sum } => {
                write!(f, "元素{}: 底质百分比之和为 {:.2}", element, sum)
            }
            Self::BoundaryFallback { node } => {
                write!(f, "节点{}: 位于边界, 使用最近单元值", node)
            }
        }
    }
}

/// 诊断报告
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    /// 诊断列表（按发现顺序）
    pub items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// 创建空报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// 诊断总数
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 是否无空洞、无重叠
    pub fn is_clean(&self) -> bool {
        self.holes() == 0 && self.overlaps() == 0
    }

    /// 空洞数量
    pub fn holes(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::Hole { .. }))
    }

    /// 重叠数量
    pub fn overlaps(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::Overlap { .. }))
    }

    /// 退化三角形数量
    pub fn degenerate(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::DegenerateTriangle { .. }))
    }

    /// 使用默认底质的单元数量
    pub fn unmatched(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::UnmatchedSubstrate { .. }))
    }

    /// 按条件计数
    pub fn count(&self, pred: impl Fn(&Diagnostic) -> bool) -> usize {
        self.items.iter().filter(|d| pred(d)).count()
    }

    /// 迭代所有诊断
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "诊断报告: {} 条", self.len())?;
        for (i, item) in self.items.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, item)?;
        }
        Ok(())
    }
}
