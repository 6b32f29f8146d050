//! 原语提供者 (primitive operator provider).
//!
//! 引擎只通过 [`Primitives`] 中的整块数组操作完成计算, 不关心其执行位置.
//! 缓冲区的分配对应于 [`Primitives::allocate`], 释放则交给 `Drop`:
//! 每个中间结果由产生它的阶段独占, 并以所有权转移的方式交给下一阶段,
//! 因此任何返回路径 (包括 `?` 提前返回) 上的中间结果都会被释放.

mod serial;

pub use serial::SerialBackend;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        mod parallel;

        pub use parallel::ParallelBackend;

        /// 默认后端. 打开 `rayon` feature 时为 [`ParallelBackend`].
        pub type DefaultBackend = ParallelBackend;
    } else {
        /// 默认后端. 未打开 `rayon` feature 时为 [`SerialBackend`].
        pub type DefaultBackend = SerialBackend;
    }
}

use crate::{EngineError, EngineResult, Mask, Matrix, Vector};
use itertools::Itertools;
use ndarray::{Array, ArrayD, ArrayView1, ArrayViewD, Axis, Dimension, ShapeBuilder};
use ordered_float::OrderedFloat;

/// 原语提供者的能力集合.
///
/// 所有方法都是同步的整块操作, 实现可以在内部并行. 不同实现对相同输入必须给出
/// 完全一致的结果.
pub trait Primitives {
    /// 后端名称, 仅用于日志.
    fn name(&self) -> &'static str;

    /// 缓冲区中的最大值. 空缓冲区返回 0.
    fn max_value(&self, buffer: &ArrayViewD<'_, f32>) -> f32;

    /// 分配一个全 0 缓冲区.
    #[inline]
    fn allocate<Sh, D>(&self, shape: Sh) -> Array<f32, D>
    where
        Sh: ShapeBuilder<Dim = D>,
        D: Dimension,
    {
        Array::zeros(shape)
    }

    /// 统计标签对出现次数 (scatter-add).
    ///
    /// `a` 和 `b` 形状相同, 同位置的两个标签构成一个无序对, 计数累加到
    /// `(max, min)` 处 (下三角, 含对角线). 返回 `size * size` 方阵.
    ///
    /// 若形状不一致返回 [`EngineError::ShapeMismatch`], 若标签不小于 `size`
    /// 返回 [`EngineError::OutOfRange`].
    fn pair_histogram(
        &self,
        a: &ArrayViewD<'_, f32>,
        b: &ArrayViewD<'_, f32>,
        size: usize,
    ) -> EngineResult<Matrix>;

    /// 返回 `max(m, m^T)`. `m` 必须是方阵.
    fn symmetrize_max(&self, m: Matrix) -> EngineResult<Matrix>;

    /// 将对角线 (`x == y`) 设置为 `value`.
    #[inline]
    fn set_diagonal(&self, mut m: Matrix, value: f32) -> Matrix {
        m.diag_mut().fill(value);
        m
    }

    /// 沿 `axis` 求和投影. `Axis(1)` 得到行和, `Axis(0)` 得到列和.
    fn sum_projection(&self, m: &Matrix, axis: Axis) -> Vector;

    /// 将向量中等于 `matched` 的元素替换为 `replacement`.
    fn replace_value(&self, v: Vector, matched: f32, replacement: f32) -> Vector;

    /// 按行广播除法: `out[(i, j)] = m[(i, j)] / v[i]`.
    fn divide_rows(&self, m: &Matrix, v: &Vector) -> EngineResult<Matrix>;

    /// 逐元素比较: `out[(i, j)] = m[(i, j)] > scalar`.
    fn greater_than(&self, m: &Matrix, scalar: f32) -> Mask;

    /// 交换两个轴, 结果为标准 (行优先) 布局.
    #[inline]
    fn transpose<T: Clone>(&self, m: ndarray::Array2<T>) -> ndarray::Array2<T> {
        let t = m.reversed_axes();
        if t.is_standard_layout() {
            t
        } else {
            t.as_standard_layout().into_owned()
        }
    }

    /// 掩码中位数投影: 沿 `axis` 的每一条 lane 上, 只对掩码为 `true`
    /// 的元素求中位数. 空集合的结果为 0.
    ///
    /// 结果长度等于另一个轴的长度.
    fn masked_median_projection(
        &self,
        values: &Matrix,
        mask: &Mask,
        axis: Axis,
    ) -> EngineResult<Vector>;

    /// 以 `index` 的每个元素为下标, 从 `values` 中取值, 得到与 `index` 同形状的缓冲区.
    ///
    /// 若存在下标不小于 `values.len()`, 返回 [`EngineError::OutOfRange`].
    fn gather_by_index(
        &self,
        index: &ArrayViewD<'_, f32>,
        values: &Vector,
    ) -> EngineResult<ArrayD<f32>>;
}

/// 求中位数. 偶数个元素时取中间两个的平均值, 空集合返回 0.
///
/// 该函数会就地排序 `buf`.
pub fn median_of(buf: &mut [f32]) -> f32 {
    let k = buf.len();
    if k == 0 {
        return 0.0;
    }
    buf.sort_unstable_by_key(|&v| OrderedFloat(v));
    if k % 2 == 1 {
        buf[k / 2]
    } else {
        (buf[k / 2 - 1] + buf[k / 2]) / 2.0
    }
}

/// 单条 lane 上的掩码中位数. `scratch` 用于复用堆分配.
#[inline]
pub(crate) fn lane_median(
    values: ArrayView1<'_, f32>,
    mask: ArrayView1<'_, bool>,
    scratch: &mut Vec<f32>,
) -> f32 {
    scratch.clear();
    scratch.extend(
        values
            .iter()
            .zip(mask.iter())
            .filter_map(|(&v, &m)| m.then_some(v)),
    );
    median_of(scratch)
}

/// 将 `a`, `b` 中的标签对累加到 `counts` 中. 见 [`Primitives::pair_histogram`].
pub(crate) fn accumulate_pairs(
    counts: &mut Matrix,
    a: &ArrayViewD<'_, f32>,
    b: &ArrayViewD<'_, f32>,
) -> EngineResult<()> {
    let size = counts.nrows();
    for (&la, &lb) in a.iter().zip_eq(b.iter()) {
        let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
        let hi = hi as usize;
        if hi >= size {
            return Err(EngineError::OutOfRange {
                label: hi as u32,
                len: size,
            });
        }
        counts[(hi, lo as usize)] += 1.0;
    }
    Ok(())
}

/// 检查 `a` 与 `b` 形状一致.
#[inline]
pub(crate) fn check_same_shape(a: &[usize], b: &[usize]) -> EngineResult<()> {
    if a == b {
        Ok(())
    } else {
        Err(EngineError::shape(a, b))
    }
}

/// 检查 `m` 是方阵.
#[inline]
pub(crate) fn check_square(m: &Matrix) -> EngineResult<()> {
    let (h, w) = m.dim();
    if h == w {
        Ok(())
    } else {
        Err(EngineError::shape(&[h, h], &[h, w]))
    }
}

/// 检查 `index` 中的最大下标是否在 `len` 范围内.
pub(crate) fn check_index_range(max_index: f32, len: usize) -> EngineResult<()> {
    if (max_index as usize) < len {
        Ok(())
    } else {
        Err(EngineError::OutOfRange {
            label: max_index as u32,
            len,
        })
    }
}
