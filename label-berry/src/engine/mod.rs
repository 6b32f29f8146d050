//! 接触比例统计引擎.
//!
//! 流水线严格按顺序执行, 每个阶段的输出是下一阶段唯一的输入:
//!
//! ```text
//! LabelImage --build_adjacency--> TouchCountMatrix
//!            --normalize--------> TouchPortions
//!            --reduce_median----> RegionVector
//!            --remap------------> ArrayD<f32>
//! ```

mod adjacency;
mod median;
mod normalize;
mod remap;

pub use adjacency::{build_adjacency, TouchCountMatrix};
pub use median::{reduce_median, RegionVector};
pub use normalize::{exclude_background, normalize, TouchPortions};
pub use remap::{extract, remap};

use crate::config::MapOptions;
use crate::ops::{DefaultBackend, Primitives};
use crate::{EngineError, EngineResult, LabelImage};
use ndarray::ArrayD;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 流水线阶段.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    /// 接触计数矩阵.
    Adjacency,

    /// 接触比例归一化.
    Normalize,

    /// 中位数规约.
    Median,

    /// 映射回图像空间.
    Remap,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Adjacency => "adjacency",
            Self::Normalize => "normalize",
            Self::Median => "median",
            Self::Remap => "remap",
        };
        f.write_str(name)
    }
}

/// 一次完整计算的全部中间结果.
#[derive(Debug, Clone)]
pub struct TouchPortionReport {
    /// 接触计数矩阵.
    pub counts: TouchCountMatrix,

    /// 接触比例矩阵与邻居掩码 (未应用背景策略).
    pub portions: TouchPortions,

    /// 每个区域的接触比例中位数.
    pub medians: RegionVector,

    /// 中位数接触比例图, 与输入同形状.
    pub map: ArrayD<f32>,
}

/// 接触比例统计引擎.
///
/// 引擎持有一个原语提供者 `P`, 自身不含任何跨调用状态.
/// 不同标签图像上的多次调用互不影响, 可以并发执行.
#[derive(Debug, Clone, Default)]
pub struct TouchPortionEngine<P> {
    ops: P,
    options: MapOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl<P: Primitives> TouchPortionEngine<P> {
    /// 以默认选项创建引擎.
    #[inline]
    pub fn new(ops: P) -> Self {
        Self::with_options(ops, MapOptions::default())
    }

    /// 以指定选项创建引擎.
    #[inline]
    pub fn with_options(ops: P, options: MapOptions) -> Self {
        Self {
            ops,
            options,
            cancel: None,
        }
    }

    /// 设置取消标志. 标志只在阶段之间被检查, 不会打断正在执行的原语.
    #[inline]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// 计算选项.
    #[inline]
    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// 原语提供者.
    #[inline]
    pub fn primitives(&self) -> &P {
        &self.ops
    }

    /// 计算中位数接触比例图.
    ///
    /// 输出与 `labels` 同形状, 每个像素的值为其所在区域与各邻居接触比例的中位数,
    /// 没有邻居的区域为 0.
    pub fn median_touch_portion_map(&self, labels: &LabelImage) -> EngineResult<ArrayD<f32>> {
        let counts = self.adjacency(labels)?;
        let portions = self.normalize(counts)?;
        let medians = self.medians(portions)?;
        self.paint(labels, &medians)
    }

    /// 计算中位数接触比例图, 并保留全部中间结果.
    pub fn report(&self, labels: &LabelImage) -> EngineResult<TouchPortionReport> {
        let counts = self.adjacency(labels)?;
        let portions = self.normalize(counts.clone())?;
        let medians = self.medians(portions.clone())?;
        let map = self.paint(labels, &medians)?;
        Ok(TouchPortionReport {
            counts,
            portions,
            medians,
            map,
        })
    }

    fn adjacency(&self, labels: &LabelImage) -> EngineResult<TouchCountMatrix> {
        log::debug!(
            "[{}] touch count matrix from {:?} labels",
            self.ops.name(),
            labels.shape()
        );
        let counts = build_adjacency(&self.ops, labels)?;
        self.checkpoint(Stage::Adjacency)?;
        Ok(counts)
    }

    fn normalize(&self, counts: TouchCountMatrix) -> EngineResult<TouchPortions> {
        log::debug!(
            "[{}] normalizing {}x{} counts",
            self.ops.name(),
            counts.size(),
            counts.size()
        );
        let portions = normalize(&self.ops, counts)?;
        self.checkpoint(Stage::Normalize)?;
        Ok(portions)
    }

    fn medians(&self, portions: TouchPortions) -> EngineResult<RegionVector> {
        let (values, mask) = portions.into_parts();
        let mask = if self.options.counts_background() {
            mask
        } else {
            exclude_background(mask)
        };
        log::debug!(
            "[{}] median over {} neighbour pairs",
            self.ops.name(),
            mask.iter().filter(|&&m| m).count()
        );
        let medians = reduce_median(&self.ops, values, mask)?;
        self.checkpoint(Stage::Median)?;
        Ok(medians)
    }

    fn paint(&self, labels: &LabelImage, medians: &RegionVector) -> EngineResult<ArrayD<f32>> {
        let map = remap(&self.ops, labels, medians)?;
        log::debug!("[{}] painted {} pixels", self.ops.name(), map.len());
        self.checkpoint(Stage::Remap)?;
        Ok(map)
    }

    /// 阶段边界上检查取消标志.
    fn checkpoint(&self, stage: Stage) -> EngineResult<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Acquire) => {
                log::debug!("cancelled after `{stage}`");
                Err(EngineError::Cancelled(stage))
            }
            _ => Ok(()),
        }
    }
}

/// 使用默认后端和默认选项计算中位数接触比例图.
///
/// 见 [`TouchPortionEngine::median_touch_portion_map`].
#[inline]
pub fn median_touch_portion_map(labels: &LabelImage) -> EngineResult<ArrayD<f32>> {
    TouchPortionEngine::new(DefaultBackend::default()).median_touch_portion_map(labels)
}
