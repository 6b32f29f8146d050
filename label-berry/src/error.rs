//! 运行时错误.

use crate::engine::Stage;
use thiserror::Error;

/// 引擎运行时错误.
///
/// 所有错误都是确定性的数据错误, 引擎不会重试. 第一个错误会被直接向上传播,
/// 此前分配的中间矩阵随所有权一同释放.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// 标签图像不合法.
    #[error("标签图像不合法: {0}")]
    InvalidInput(InvalidLabel),

    /// 标签超出区域向量的索引范围.
    #[error("标签 {label} 超出区域向量范围 (长度 {len})")]
    OutOfRange {
        /// 越界的标签.
        label: u32,

        /// 区域向量长度.
        len: usize,
    },

    /// 两个缓冲区的形状不一致, 或矩阵不是方阵.
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        /// 期望的形状.
        expected: Vec<usize>,

        /// 实际的形状.
        got: Vec<usize>,
    },

    /// 计算在某个阶段结束后被调用方取消.
    #[error("计算在 `{0}` 阶段结束后被取消")]
    Cancelled(Stage),
}

/// 标签图像不合法的具体原因.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidLabel {
    /// 只支持 2D 和 3D 图像. 参数为实际维数.
    #[error("不支持 {0} 维图像")]
    Dimension(usize),

    /// 图像不含任何像素.
    #[error("图像为空")]
    Empty,

    /// 标签为 NaN 或无穷大.
    #[error("标签 {0} 不是有限值")]
    NotFinite(f32),

    /// 标签为负数.
    #[error("标签 {0} 为负数")]
    Negative(f64),

    /// 标签不是整数.
    #[error("标签 {0} 不是整数")]
    NonIntegral(f64),

    /// 标签超出 `f32` 可精确表示的整数范围.
    #[error("标签 {0} 超出可精确表示的范围")]
    TooLarge(f64),

    /// 标签无法转换为数值.
    #[error("标签无法转换为数值")]
    NotRepresentable,
}

impl From<InvalidLabel> for EngineError {
    #[inline]
    fn from(e: InvalidLabel) -> Self {
        Self::InvalidInput(e)
    }
}

/// 引擎运行时结果.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// 构造一个形状不匹配错误.
    #[inline]
    pub(crate) fn shape(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }
}
