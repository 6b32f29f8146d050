//! 借助 `rayon` 的并行后端.

use super::{
    accumulate_pairs, check_index_range, check_same_shape, check_square, lane_median, Primitives,
};
use crate::{EngineResult, Mask, Matrix, Vector};
use ndarray::{ArrayD, ArrayViewD, Axis, Zip};
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

/// 并行后端.
///
/// 逐像素、逐行的原语借助 `rayon` 在全局线程池上并行执行.
/// 结果与 [`super::SerialBackend`] 完全一致.
#[derive(Copy, Clone, Debug, Default)]
pub struct ParallelBackend;

impl Primitives for ParallelBackend {
    #[inline]
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn max_value(&self, buffer: &ArrayViewD<'_, f32>) -> f32 {
        if buffer.ndim() == 0 || buffer.is_empty() {
            return 0.0;
        }
        buffer
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|sub| sub.iter().fold(0.0f32, |acc, &p| acc.max(p)))
            .reduce(|| 0.0, f32::max)
    }

    fn pair_histogram(
        &self,
        a: &ArrayViewD<'_, f32>,
        b: &ArrayViewD<'_, f32>,
        size: usize,
    ) -> EngineResult<Matrix> {
        check_same_shape(a.shape(), b.shape())?;
        if a.ndim() == 0 {
            let mut counts = self.allocate((size, size));
            accumulate_pairs(&mut counts, a, b)?;
            return Ok(counts);
        }
        // 每个工作线程维护自己的计数矩阵, 最后逐元素相加. 计数都是小整数, 求和与顺序无关.
        a.axis_iter(Axis(0))
            .into_par_iter()
            .zip(b.axis_iter(Axis(0)).into_par_iter())
            .try_fold(
                || self.allocate((size, size)),
                |mut acc, (sa, sb)| accumulate_pairs(&mut acc, &sa, &sb).map(|_| acc),
            )
            .try_reduce(|| self.allocate((size, size)), |x, y| Ok(x + y))
    }

    fn symmetrize_max(&self, m: Matrix) -> EngineResult<Matrix> {
        check_square(&m)?;
        let t = m.t().to_owned();
        let mut out = m;
        Zip::from(&mut out)
            .and(&t)
            .par_for_each(|p, &q| *p = (*p).max(q));
        Ok(out)
    }

    fn sum_projection(&self, m: &Matrix, axis: Axis) -> Vector {
        // 每条 lane 各自求和, 与单线程后端的累加方式一致.
        Zip::from(m.lanes(axis)).par_map_collect(|lane| lane.sum())
    }

    fn replace_value(&self, mut v: Vector, matched: f32, replacement: f32) -> Vector {
        v.par_map_inplace(|p| {
            if *p == matched {
                *p = replacement;
            }
        });
        v
    }

    fn divide_rows(&self, m: &Matrix, v: &Vector) -> EngineResult<Matrix> {
        check_same_shape(&[m.nrows()], v.shape())?;
        let mut out = m.to_owned();
        Zip::from(out.rows_mut())
            .and(v)
            .par_for_each(|mut row, &total| row /= total);
        Ok(out)
    }

    fn greater_than(&self, m: &Matrix, scalar: f32) -> Mask {
        Zip::from(m).par_map_collect(|&p| p > scalar)
    }

    fn masked_median_projection(
        &self,
        values: &Matrix,
        mask: &Mask,
        axis: Axis,
    ) -> EngineResult<Vector> {
        check_same_shape(values.shape(), mask.shape())?;
        let len = values.len_of(axis);
        Ok(Zip::from(values.lanes(axis))
            .and(mask.lanes(axis))
            .par_map_collect(|v, m| lane_median(v, m, &mut Vec::with_capacity(len))))
    }

    fn gather_by_index(
        &self,
        index: &ArrayViewD<'_, f32>,
        values: &Vector,
    ) -> EngineResult<ArrayD<f32>> {
        check_index_range(self.max_value(index), values.len())?;
        Ok(Zip::from(index).par_map_collect(|&label| values[label as usize]))
    }
}

#[cfg(test)]
mod tests {
    use super::ParallelBackend;
    use crate::ops::{Primitives, SerialBackend};
    use ndarray::{Array2, Array3, Axis, Slice};

    /// 确定性的伪随机标签体.
    fn scrambled_volume(n: u32) -> Array3<f32> {
        Array3::from_shape_fn((5, 7, 6), |(z, h, w)| {
            ((z * 31 + h * 17 + w * 7 + (h * w) % 5) as u32 % (n + 1)) as f32
        })
    }

    #[test]
    fn test_backends_agree_on_histogram() {
        let vol = scrambled_volume(6).into_dyn();
        let a = vol.slice_axis(Axis(1), Slice::from(0..6usize));
        let b = vol.slice_axis(Axis(1), Slice::from(1..7usize));

        let par = ParallelBackend.pair_histogram(&a, &b, 7).unwrap();
        let ser = SerialBackend.pair_histogram(&a, &b, 7).unwrap();
        assert_eq!(par, ser);
        assert_eq!(par.sum() as usize, a.len());

        let sym_par = ParallelBackend.symmetrize_max(par).unwrap();
        let sym_ser = SerialBackend.symmetrize_max(ser).unwrap();
        assert_eq!(sym_par, sym_ser);
    }

    #[test]
    fn test_backends_agree_on_reductions() {
        let m = Array2::from_shape_fn((9, 9), |(i, j)| ((i * 7 + j * 3) % 5) as f32 / 4.0);
        let mask = m.mapv(|p| p > 0.3);

        for axis in [Axis(0), Axis(1)] {
            assert_eq!(
                ParallelBackend.sum_projection(&m, axis),
                SerialBackend.sum_projection(&m, axis)
            );
            assert_eq!(
                ParallelBackend
                    .masked_median_projection(&m, &mask, axis)
                    .unwrap(),
                SerialBackend
                    .masked_median_projection(&m, &mask, axis)
                    .unwrap()
            );
        }
        assert_eq!(
            ParallelBackend.greater_than(&m, 0.3),
            SerialBackend.greater_than(&m, 0.3)
        );
        let totals = SerialBackend.sum_projection(&m, Axis(1));
        assert_eq!(
            ParallelBackend.divide_rows(&m, &totals).unwrap(),
            SerialBackend.divide_rows(&m, &totals).unwrap()
        );
    }

    #[test]
    fn test_backends_agree_on_gather() {
        let vol = scrambled_volume(4).into_dyn();
        let values = ndarray::array![0.0, 0.5, 1.0, 1.5, 2.0];
        assert_eq!(ParallelBackend.max_value(&vol.view()), 4.0);
        assert_eq!(
            ParallelBackend.gather_by_index(&vol.view(), &values).unwrap(),
            SerialBackend.gather_by_index(&vol.view(), &values).unwrap()
        );
        assert!(ParallelBackend
            .gather_by_index(&vol.view(), &values.slice(ndarray::s![..4]).to_owned())
            .is_err());
    }
}
