//! 通用常量.

/// 背景的标签值.
pub const LABEL_BACKGROUND: u32 = 0;

/// `f32` 能精确表示的最大整数 (2^24).
///
/// 标签以浮点数存储, 超过该值的标签无法与相邻整数区分.
pub const MAX_EXACT_LABEL: u32 = 1 << 24;

/// 接触比例行和的浮点误差容限.
pub const PORTION_TOLERANCE: f32 = 1e-5;

/// 行和为 0 时的除数占位值. 对应行的分子同样为 0, 因此结果仍是全 0 行.
pub const EMPTY_ROW_PLACEHOLDER: f32 = 1.0;

