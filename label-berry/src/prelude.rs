//! 常用类型与函数的一站式导入.
//!
//! ```ignore
//! use label_berry::prelude::*;
//! ```

pub use crate::config::{BackgroundPolicy, MapOptions};
pub use crate::engine::{
    build_adjacency, exclude_background, extract, median_touch_portion_map, normalize,
    reduce_median, remap, RegionVector, Stage, TouchCountMatrix, TouchPortionEngine,
    TouchPortionReport, TouchPortions,
};
pub use crate::label::{Connectivity, LabelImage};
pub use crate::ops::{DefaultBackend, Primitives, SerialBackend};
pub use crate::{EngineError, EngineResult, InvalidLabel};

#[cfg(feature = "rayon")]
pub use crate::ops::ParallelBackend;
