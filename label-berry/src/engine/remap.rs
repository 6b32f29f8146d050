//! 区域向量与图像空间之间的映射.

use super::RegionVector;
use crate::ops::{check_same_shape, Primitives};
use crate::{EngineResult, LabelImage, Vector};
use ndarray::{ArrayD, ArrayViewD, Zip};

/// 将区域向量绘制回图像空间: `out[p] = vector[labels[p]]`.
///
/// 背景像素取 `vector[0]`. 如果存在标签不小于 `vector.len()`,
/// 返回 [`crate::EngineError::OutOfRange`].
pub fn remap<P: Primitives>(
    ops: &P,
    labels: &LabelImage,
    vector: &RegionVector,
) -> EngineResult<ArrayD<f32>> {
    ops.gather_by_index(&labels.view(), vector.as_array())
}

/// [`remap`] 的逆操作: 从图像中为每个标签读回一个值.
///
/// 每个标签取其第一个像素 (行优先序) 的值, 图像中不存在的标签取 0.
/// 对 [`remap`] 的输出调用该函数, 可以得到原向量在已出现标签上的取值.
///
/// `image` 与 `labels` 形状必须一致.
pub fn extract(labels: &LabelImage, image: &ArrayViewD<'_, f32>) -> EngineResult<RegionVector> {
    check_same_shape(labels.shape(), image.shape())?;
    let size = labels.max_label() as usize + 1;
    let mut data = Vector::zeros(size);
    let mut seen = vec![false; size];

    Zip::from(&labels.view()).and(image).for_each(|&label, &value| {
        let label = label as usize;
        if !seen[label] {
            seen[label] = true;
            data[label] = value;
        }
    });
    Ok(RegionVector::new(data))
}
