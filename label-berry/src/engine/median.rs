//! 邻居分布上的中位数规约.

use crate::ops::Primitives;
use crate::{EngineError, EngineResult, Mask, Matrix, Vector};
use ndarray::{Array1, ArrayView1, Axis};
use std::ops::Index;

/// `1 * (N + 1)` 区域向量, 每个区域标签对应一个标量 (第 0 个为背景).
#[derive(Debug, Clone, PartialEq)]
pub struct RegionVector {
    data: Vector,
}

impl RegionVector {
    /// 直接由稠密向量构造.
    #[inline]
    pub fn new(data: Vector) -> Self {
        Self { data }
    }

    /// 向量长度, 即可容纳的最大标签 + 1.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 向量是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 获取标签 `label` 对应的值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, label: usize) -> Option<f32> {
        self.data.get(label).copied()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn view(&self) -> ArrayView1<'_, f32> {
        self.data.view()
    }

    /// 底层稠密向量.
    #[inline]
    pub fn as_array(&self) -> &Vector {
        &self.data
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_inner(self) -> Vector {
        self.data
    }
}

impl From<Vec<f32>> for RegionVector {
    #[inline]
    fn from(v: Vec<f32>) -> Self {
        Self::new(Array1::from(v))
    }
}

impl Index<usize> for RegionVector {
    type Output = f32;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

/// 对每个区域 `i`, 求 `{ values[(i, j)] | mask[(i, j)] }` 的中位数.
///
/// 各区域的邻居个数不同, 但这里不对单个区域做变长循环: 先将两个矩阵转置,
/// 使邻居方向成为第 0 轴, 再沿该轴做一次掩码中位数投影.
///
/// 奇数个邻居取中间值, 偶数个取中间两个的平均值, 没有邻居的区域结果为 0.
/// 掩码为 `true` 处必须有对应的值, 这由调用方保证.
pub fn reduce_median<P: Primitives>(
    ops: &P,
    values: Matrix,
    mask: Mask,
) -> EngineResult<RegionVector> {
    if values.dim() != mask.dim() {
        return Err(EngineError::shape(values.shape(), mask.shape()));
    }
    let values = ops.transpose(values);
    let mask = ops.transpose(mask);
    let data = ops.masked_median_projection(&values, &mask, Axis(0))?;
    Ok(RegionVector { data })
}
