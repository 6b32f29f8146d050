//! 接触计数矩阵 (touch count matrix).

use crate::ops::Primitives;
use crate::{EngineResult, LabelImage, Matrix};
use ndarray::ArrayView2;

/// `(N + 1) * (N + 1)` 接触计数方阵.
///
/// `(i, j)` 处为区域 `i` 与区域 `j` 之间相邻像素对的个数, 保证对称.
/// 第 0 行/列对应背景. 对角线上可能残留自接触计数, 归一化时会被清零.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchCountMatrix {
    data: Matrix,
}

impl TouchCountMatrix {
    /// 矩阵边长 `N + 1`.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.nrows()
    }

    /// 区域 `i` 与区域 `j` 的接触计数. 越界时返回 `None`.
    #[inline]
    pub fn count(&self, i: usize, j: usize) -> Option<f32> {
        self.data.get((i, j)).copied()
    }

    /// 矩阵是否对称?
    pub fn is_symmetric(&self) -> bool {
        self.data == self.data.t()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_inner(self) -> Matrix {
        self.data
    }
}

/// 扫描标签图像, 构建接触计数矩阵.
///
/// 沿每个坐标轴取一次正方向的相邻像素对 (2D 为 4-邻接, 3D 为 6-邻接),
/// 以批量计数的方式累加到下三角, 再与转置取逐元素最大值得到对称矩阵.
/// 图像边界之外不视为背景.
///
/// `N = 0` (全背景) 时得到 `1 * 1` 矩阵.
pub fn build_adjacency<P: Primitives>(
    ops: &P,
    labels: &LabelImage,
) -> EngineResult<TouchCountMatrix> {
    let view = labels.view();
    let size = ops.max_value(&view) as usize + 1;
    let mut counts = ops.allocate((size, size));

    for axis in 0..labels.connectivity().axes() {
        let Some((a, b)) = labels.forward_pairs(axis) else {
            continue;
        };
        let partial = ops.pair_histogram(&a, &b, size)?;
        log::trace!("axis {axis}: {} pixel pairs", a.len());
        counts += &partial;
    }

    let data = ops.symmetrize_max(counts)?;
    Ok(TouchCountMatrix { data })
}

#[cfg(test)]
mod tests {
    use super::build_adjacency;
    use crate::ops::SerialBackend;
    use crate::LabelImage;
    use ndarray::{array, Array2, Array3};

    #[test]
    fn test_bands_touch_counts() {
        // 三条等宽水平带.
        let labels = LabelImage::new(Array2::from_shape_fn((6, 4), |(h, _)| (h / 2 + 1) as f32))
            .unwrap();
        let m = build_adjacency(&SerialBackend, &labels).unwrap();

        assert_eq!(m.size(), 4);
        assert_eq!(m.count(1, 2), Some(4.0));
        assert_eq!(m.count(2, 3), Some(4.0));
        assert_eq!(m.count(1, 3), Some(0.0));
        assert_eq!(m.count(0, 1), Some(0.0));
        assert_eq!(m.count(4, 0), None);
        assert!(m.is_symmetric());
    }

    #[test]
    fn test_background_only() {
        let labels = LabelImage::new(Array2::<f32>::zeros((3, 3))).unwrap();
        let m = build_adjacency(&SerialBackend, &labels).unwrap();
        assert_eq!(m.size(), 1);
        // 只有自接触.
        assert_eq!(m.count(0, 0), Some(12.0));
    }

    #[test]
    fn test_single_pixel() {
        let labels = LabelImage::new(array![[3.0]]).unwrap();
        let m = build_adjacency(&SerialBackend, &labels).unwrap();
        assert_eq!(m.size(), 4);
        assert!(m.view().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_volume_symmetric() {
        let vol = Array3::from_shape_fn((4, 5, 6), |(z, h, w)| ((z * 5 + h * 3 + w) % 7) as f32);
        let labels = LabelImage::new(vol).unwrap();
        let m = build_adjacency(&SerialBackend, &labels).unwrap();
        assert_eq!(m.size(), 7);
        assert!(m.is_symmetric());
    }

    #[test]
    fn test_volume_z_contacts() {
        // 上下两层, 只在 z 方向接触.
        let mut vol = Array3::<f32>::ones((2, 2, 2));
        vol.index_axis_mut(ndarray::Axis(0), 1).fill(2.0);
        let labels = LabelImage::new(vol).unwrap();
        let m = build_adjacency(&SerialBackend, &labels).unwrap();
        assert_eq!(m.count(1, 2), Some(4.0));
        assert_eq!(m.count(2, 1), Some(4.0));
        assert_eq!(m.count(1, 1), Some(4.0));
    }
}
