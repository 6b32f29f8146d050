#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 从标签图像 (label image) 出发, 统计每个区域与其邻居的接触比例
//! (touch portion), 求其中位数, 并将结果绘制回原图空间, 得到 "接触比例图".
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 流水线
//!
//! ```text
//! 标签图像 -> 接触计数矩阵 -> 接触比例矩阵 + 邻居掩码 -> 区域中位数向量 -> 输出图像
//! ```
//!
//! 每个阶段都只由 [`ops::Primitives`] 提供的整块数组原语组合而成,
//! 因此引擎本身与执行后端 (单线程 / `rayon`) 无关.
//!
//! # 注意
//!
//! 1. 该 crate 不负责区域分割, 输入必须是已经标注好的标签图像.
//! 2. 背景 (`0`) 默认被当作普通区域参与邻居统计.
//!   如有需要, 可通过 [`config::BackgroundPolicy::Excluded`] 将其排除.
//! 3. 各中间矩阵在引擎内部以所有权转移的方式逐阶段传递, 不存在共享可变状态.
//!
//! # 开发计划
//!
//! ### 接触计数矩阵 (2D 4-邻接 / 3D 6-邻接) ✅
//!
//! 实现位于 `label-berry/src/engine/adjacency.rs`.
//!
//! ### 接触比例归一化, 空行保护 ✅
//!
//! 实现位于 `label-berry/src/engine/normalize.rs`.
//!
//! ### 变长邻居集合上的掩码中位数 ✅
//!
//! 通过 "转置 + 掩码投影" 完成, 不对单个区域做变长循环.
//!
//! 实现位于 `label-berry/src/engine/median.rs`.
//!
//! ### 区域向量与图像空间的相互映射 ✅
//!
//! 实现位于 `label-berry/src/engine/remap.rs`.
//!
//! ### `rayon` 并行后端 ✅
//!
//! 实现位于 `label-berry/src/ops/parallel.rs`.
//!
//! ### 其它统计量 (平均值, 最小/最大接触比例图) ⌛️
//!
//! 只需在 [`ops::Primitives`] 上补充对应的掩码投影原语.

use ndarray::{Array1, Array2};

/// 稠密方阵, 行列均以区域标签为索引.
pub type Matrix = Array2<f32>;

/// 与 [`Matrix`] 同形状的布尔掩码.
pub type Mask = Array2<bool>;

/// 以区域标签为索引的稠密向量.
pub type Vector = Array1<f32>;

pub mod config;
pub mod consts;
pub mod engine;
mod error;
pub mod label;
pub mod ops;
pub mod prelude;

pub use config::{BackgroundPolicy, MapOptions};
pub use engine::{
    median_touch_portion_map, RegionVector, Stage, TouchCountMatrix, TouchPortionEngine,
    TouchPortionReport, TouchPortions,
};
pub use error::{EngineError, EngineResult, InvalidLabel};
pub use label::{Connectivity, LabelImage};
pub use ops::{DefaultBackend, Primitives, SerialBackend};

#[cfg(feature = "rayon")]
pub use ops::ParallelBackend;
