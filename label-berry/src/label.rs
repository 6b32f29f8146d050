//! 标签图像.

use crate::consts::MAX_EXACT_LABEL;
use crate::{EngineResult, InvalidLabel};
use ndarray::{ArrayBase, ArrayD, ArrayViewD, Axis, Data, Dimension, IxDyn, Slice};
use num::ToPrimitive;

/// 像素邻接方式. 只考虑共面 (face) 邻居.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Connectivity {
    /// 2D 图像的上下左右 4-邻接.
    Face4,

    /// 3D 图像的前后上下左右 6-邻接.
    Face6,
}

impl Connectivity {
    /// 根据图像维数确定邻接方式. 仅支持 2D 和 3D.
    #[inline]
    pub fn from_ndim(ndim: usize) -> Option<Self> {
        match ndim {
            2 => Some(Self::Face4),
            3 => Some(Self::Face6),
            _ => None,
        }
    }

    /// 每个像素的邻居个数.
    #[inline]
    pub const fn neighbours(&self) -> usize {
        match self {
            Self::Face4 => 4,
            Self::Face6 => 6,
        }
    }

    /// 参与扫描的坐标轴个数. 每个轴只沿正方向取一次相邻对.
    #[inline]
    pub const fn axes(&self) -> usize {
        self.neighbours() / 2
    }
}

/// 2D 或 3D 标签图像.
///
/// 标签以 `f32` 存储, 与原语提供者的缓冲区类型保持一致. `0` 为背景,
/// `1..=N` 为区域. 构造时保证所有像素都是有限、非负、可精确表示的整数.
///
/// 允许标签不连续 (跳号): 缺失的标签在派生矩阵中表现为空行/空列.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelImage {
    data: ArrayD<f32>,
}

impl LabelImage {
    /// 从浮点标签数据创建标签图像.
    ///
    /// 如果维数不是 2 或 3, 图像为空, 或存在负数、非整数、非有限值、
    /// 过大的标签, 则返回 [`crate::EngineError::InvalidInput`].
    pub fn new<D: Dimension>(data: ndarray::Array<f32, D>) -> EngineResult<Self> {
        let data = data.into_dyn();
        check_shape(data.shape())?;
        for &p in data.iter() {
            check_label(p)?;
        }
        Ok(Self { data })
    }

    /// 从任意数值类型的标签数据创建标签图像, 数值会先转换为 `f32`.
    ///
    /// 检查规则与 [`Self::new`] 相同. 无法转换为数值的元素视为非法输入.
    pub fn from_labels<S, D, T>(data: &ArrayBase<S, D>) -> EngineResult<Self>
    where
        S: Data<Elem = T>,
        D: Dimension,
        T: ToPrimitive,
    {
        check_shape(data.shape())?;
        let mut converted = Vec::with_capacity(data.len());
        for p in data.iter() {
            let value = p.to_f64().ok_or(InvalidLabel::NotRepresentable)?;
            check_label_f64(value)?;
            converted.push(value as f32);
        }
        // 形状与元素个数一致, 该操作不会失败.
        let data = ArrayD::from_shape_vec(IxDyn(data.shape()), converted)
            .map_err(|_| InvalidLabel::Empty)?;
        Ok(Self { data })
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_inner(self) -> ArrayD<f32> {
        self.data
    }

    /// 图像形状.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 图像维数, 只可能是 2 或 3.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// 像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 邻接方式.
    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        match self.ndim() {
            2 => Connectivity::Face4,
            _ => Connectivity::Face6,
        }
    }

    /// 获取给定位置的标签. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: &[usize]) -> Option<u32> {
        self.data.get(pos).map(|&p| p as u32)
    }

    /// 最大标签值 `N`. 全背景图像返回 0.
    pub fn max_label(&self) -> u32 {
        self.data.iter().fold(0.0f32, |acc, &p| acc.max(p)) as u32
    }

    /// 获取沿 `axis` 方向的全部相邻像素对, 以两个同形状视图表示:
    /// 第一个视图的每个像素与第二个视图同位置的像素在 `axis` 方向上相邻.
    ///
    /// 如果该方向长度不足 2, 则返回 `None`.
    pub fn forward_pairs(&self, axis: usize) -> Option<(ArrayViewD<'_, f32>, ArrayViewD<'_, f32>)> {
        let len = self.data.len_of(Axis(axis));
        (len >= 2).then(|| {
            (
                self.data.slice_axis(Axis(axis), Slice::from(0..len - 1)),
                self.data.slice_axis(Axis(axis), Slice::from(1..len)),
            )
        })
    }
}

/// 检查图像维数与大小.
fn check_shape(shape: &[usize]) -> Result<(), InvalidLabel> {
    if Connectivity::from_ndim(shape.len()).is_none() {
        return Err(InvalidLabel::Dimension(shape.len()));
    }
    if shape.iter().product::<usize>() == 0 {
        return Err(InvalidLabel::Empty);
    }
    Ok(())
}

/// 检查单个浮点标签.
#[inline]
fn check_label(p: f32) -> Result<(), InvalidLabel> {
    if !p.is_finite() {
        return Err(InvalidLabel::NotFinite(p));
    }
    check_label_f64(p as f64)
}

/// 检查单个标签 (以 `f64` 表示, 避免大整数在检查前被舍入).
fn check_label_f64(p: f64) -> Result<(), InvalidLabel> {
    if !p.is_finite() {
        return Err(InvalidLabel::NotFinite(p as f32));
    }
    if p < 0.0 {
        return Err(InvalidLabel::Negative(p));
    }
    if p.fract() != 0.0 {
        return Err(InvalidLabel::NonIntegral(p));
    }
    if p > MAX_EXACT_LABEL as f64 {
        return Err(InvalidLabel::TooLarge(p));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Connectivity, LabelImage};
    use crate::{EngineError, InvalidLabel};
    use ndarray::{array, Array1, Array3, ArrayD, IxDyn};

    fn invalid(data: ArrayD<f32>) -> InvalidLabel {
        match LabelImage::new(data).unwrap_err() {
            EngineError::InvalidInput(e) => e,
            e => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_label_image_invalid_input() {
        let bad = |v: f32| array![[1.0, v], [0.0, 2.0]].into_dyn();

        assert_eq!(invalid(bad(-1.0)), InvalidLabel::Negative(-1.0));
        assert_eq!(invalid(bad(1.5)), InvalidLabel::NonIntegral(1.5));
        assert!(matches!(invalid(bad(f32::NAN)), InvalidLabel::NotFinite(_)));
        assert!(matches!(
            invalid(bad(f32::INFINITY)),
            InvalidLabel::NotFinite(_)
        ));
        assert!(matches!(invalid(bad(1e9)), InvalidLabel::TooLarge(_)));
    }

    #[test]
    fn test_label_image_dimension() {
        let one_d = Array1::<f32>::zeros(4).into_dyn();
        assert_eq!(invalid(one_d), InvalidLabel::Dimension(1));

        let four_d = ArrayD::<f32>::zeros(IxDyn(&[2, 2, 2, 2]));
        assert_eq!(invalid(four_d), InvalidLabel::Dimension(4));

        let empty = ArrayD::<f32>::zeros(IxDyn(&[0, 3]));
        assert_eq!(invalid(empty), InvalidLabel::Empty);
    }

    #[test]
    fn test_label_image_from_integers() {
        let img = LabelImage::from_labels(&array![[0u32, 1, 1], [2, 2, 5]]).unwrap();
        assert_eq!(img.shape(), &[2, 3]);
        assert_eq!(img.max_label(), 5);
        assert_eq!(img.get(&[1, 2]), Some(5));
        assert_eq!(img.get(&[2, 0]), None);
        assert_eq!(img.connectivity(), Connectivity::Face4);

        let err = LabelImage::from_labels(&array![[0i64, -3]]).unwrap_err();
        assert_eq!(err, EngineError::InvalidInput(InvalidLabel::Negative(-3.0)));
    }

    #[test]
    fn test_label_image_background_only() {
        let img = LabelImage::new(Array3::<f32>::zeros((2, 3, 4))).unwrap();
        assert_eq!(img.max_label(), 0);
        assert_eq!(img.connectivity(), Connectivity::Face6);
        assert_eq!(img.size(), 24);
    }

    #[test]
    fn test_forward_pairs() {
        let img = LabelImage::new(array![[1.0, 2.0, 3.0]]).unwrap();
        assert!(img.forward_pairs(0).is_none());

        let (a, b) = img.forward_pairs(1).unwrap();
        assert_eq!(a.shape(), &[1, 2]);
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0]);
        assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_connectivity_axes() {
        assert_eq!(Connectivity::from_ndim(2).unwrap().axes(), 2);
        assert_eq!(Connectivity::from_ndim(3).unwrap().axes(), 3);
        assert!(Connectivity::from_ndim(4).is_none());
    }
}
