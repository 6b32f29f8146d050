//! 接触比例归一化.

use super::TouchCountMatrix;
use crate::consts::{EMPTY_ROW_PLACEHOLDER, LABEL_BACKGROUND};
use crate::ops::Primitives;
use crate::{EngineResult, Mask, Matrix};
use ndarray::{ArrayView2, Axis};

/// 接触比例矩阵与邻居掩码.
///
/// `portions[(i, j)]` 为区域 `i` 的总接触中与区域 `j` 接触的比例;
/// `mask[(i, j)]` 当且仅当该比例严格大于 0. 非空行的比例之和为 1,
/// 孤立区域 (没有任何邻居) 的行全为 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchPortions {
    portions: Matrix,
    mask: Mask,
}

impl TouchPortions {
    /// 直接由比例矩阵和掩码构造. 两者形状必须一致, 否则返回 `None`.
    pub fn from_parts(portions: Matrix, mask: Mask) -> Option<Self> {
        (portions.dim() == mask.dim()).then_some(Self { portions, mask })
    }

    /// 矩阵边长 `N + 1`.
    #[inline]
    pub fn size(&self) -> usize {
        self.portions.nrows()
    }

    /// 接触比例矩阵.
    #[inline]
    pub fn portions(&self) -> ArrayView2<'_, f32> {
        self.portions.view()
    }

    /// 邻居掩码.
    #[inline]
    pub fn mask(&self) -> ArrayView2<'_, bool> {
        self.mask.view()
    }

    /// 区域 `i` 的所有邻居标签, 升序排列. 越界时返回空 `Vec`.
    pub fn neighbours(&self, i: usize) -> Vec<usize> {
        if i >= self.size() {
            return vec![];
        }
        self.mask
            .row(i)
            .iter()
            .enumerate()
            .filter_map(|(j, &m)| m.then_some(j))
            .collect()
    }

    /// 区域 `i` 的接触比例之和. 非空行应为 1, 孤立区域为 0.
    #[inline]
    pub fn row_sum(&self, i: usize) -> f32 {
        self.portions.row(i).sum()
    }

    /// 消费自我, 获得 (比例矩阵, 邻居掩码).
    #[inline]
    pub fn into_parts(self) -> (Matrix, Mask) {
        (self.portions, self.mask)
    }
}

/// 将接触计数矩阵归一化为接触比例矩阵, 并求出邻居掩码.
///
/// 1. 对角线清零, 去掉自接触;
/// 2. 按行求和得到每个区域的总接触数;
/// 3. 为 0 的总数替换为 [`EMPTY_ROW_PLACEHOLDER`], 避免除零;
/// 4. 每行除以自己的总数;
/// 5. 比例严格大于 0 处即为邻居.
///
/// 背景 (第 0 行/列) 与普通区域同等对待.
pub fn normalize<P: Primitives>(ops: &P, counts: TouchCountMatrix) -> EngineResult<TouchPortions> {
    let counts = ops.set_diagonal(counts.into_inner(), 0.0);
    let totals = ops.sum_projection(&counts, Axis(1));
    let totals = ops.replace_value(totals, 0.0, EMPTY_ROW_PLACEHOLDER);
    let portions = ops.divide_rows(&counts, &totals)?;
    let mask = ops.greater_than(&portions, 0.0);
    Ok(TouchPortions { portions, mask })
}

/// 将背景从邻居关系中排除: 清空掩码的第 0 行和第 0 列.
pub fn exclude_background(mut mask: Mask) -> Mask {
    if mask.is_empty() {
        return mask;
    }
    let bg = LABEL_BACKGROUND as usize;
    mask.row_mut(bg).fill(false);
    mask.column_mut(bg).fill(false);
    mask
}
