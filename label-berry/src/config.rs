//! 引擎配置.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 背景 (`0`) 在邻居统计中的处理方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BackgroundPolicy {
    /// 背景与普通区域同等对待, 可以成为其它区域的邻居.
    #[default]
    Neighbor,

    /// 在求中位数之前将背景从邻居掩码中清除.
    ///
    /// 接触比例本身不变 (分母仍包含与背景的接触), 只是背景不再计入邻居分布.
    Excluded,
}

/// 接触比例图的计算选项.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapOptions {
    /// 背景处理方式.
    pub background: BackgroundPolicy,
}

impl MapOptions {
    /// 将背景排除在邻居之外的选项.
    #[inline]
    pub const fn excluding_background() -> Self {
        Self {
            background: BackgroundPolicy::Excluded,
        }
    }

    /// 背景是否参与邻居统计?
    #[inline]
    pub fn counts_background(&self) -> bool {
        matches!(self.background, BackgroundPolicy::Neighbor)
    }
}
