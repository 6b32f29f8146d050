//! 单线程 ndarray 后端.

use super::{
    accumulate_pairs, check_index_range, check_same_shape, check_square, lane_median, Primitives,
};
use crate::{EngineResult, Mask, Matrix, Vector};
use ndarray::{ArrayD, ArrayViewD, Axis, Zip};

/// 单线程后端. 所有原语都在调用线程上顺序执行.
#[derive(Copy, Clone, Debug, Default)]
pub struct SerialBackend;

impl Primitives for SerialBackend {
    #[inline]
    fn name(&self) -> &'static str {
        "serial"
    }

    fn max_value(&self, buffer: &ArrayViewD<'_, f32>) -> f32 {
        buffer.iter().fold(0.0f32, |acc, &p| acc.max(p))
    }

    fn pair_histogram(
        &self,
        a: &ArrayViewD<'_, f32>,
        b: &ArrayViewD<'_, f32>,
        size: usize,
    ) -> EngineResult<Matrix> {
        check_same_shape(a.shape(), b.shape())?;
        let mut counts = self.allocate((size, size));
        accumulate_pairs(&mut counts, a, b)?;
        Ok(counts)
    }

    fn symmetrize_max(&self, mut m: Matrix) -> EngineResult<Matrix> {
        check_square(&m)?;
        let n = m.nrows();
        for i in 0..n {
            for j in 0..i {
                let v = m[(i, j)].max(m[(j, i)]);
                m[(i, j)] = v;
                m[(j, i)] = v;
            }
        }
        Ok(m)
    }

    fn sum_projection(&self, m: &Matrix, axis: Axis) -> Vector {
        Zip::from(m.lanes(axis)).map_collect(|lane| lane.sum())
    }

    fn replace_value(&self, mut v: Vector, matched: f32, replacement: f32) -> Vector {
        v.map_inplace(|p| {
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
            .for_each(|mut row, &total| row /= total);
        Ok(out)
    }

    fn greater_than(&self, m: &Matrix, scalar: f32) -> Mask {
        m.mapv(|p| p > scalar)
    }

    fn masked_median_projection(
        &self,
        values: &Matrix,
        mask: &Mask,
        axis: Axis,
    ) -> EngineResult<Vector> {
        check_same_shape(values.shape(), mask.shape())?;
        let mut scratch = Vec::with_capacity(values.len_of(axis));
        Ok(Zip::from(values.lanes(axis))
            .and(mask.lanes(axis))
            .map_collect(|v, m| lane_median(v, m, &mut scratch)))
    }

    fn gather_by_index(
        &self,
        index: &ArrayViewD<'_, f32>,
        values: &Vector,
    ) -> EngineResult<ArrayD<f32>> {
        check_index_range(self.max_value(index), values.len())?;
        Ok(index.mapv(|label| values[label as usize]))
    }
}

#[cfg(test)]
mod tests {
    use super::SerialBackend;
    use crate::ops::Primitives;
    use crate::EngineError;
    use ndarray::{array, Axis};

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_pair_histogram() {
        let ops = SerialBackend;
        let a = array![[0.0, 1.0], [2.0, 2.0]].into_dyn();
        let b = array![[1.0, 1.0], [1.0, 0.0]].into_dyn();

        let counts = ops.pair_histogram(&a.view(), &b.view(), 3).unwrap();
        assert_eq!(
            counts,
            array![[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 0.0]]
        );

        let err = ops.pair_histogram(&a.view(), &b.view(), 2).unwrap_err();
        assert_eq!(err, EngineError::OutOfRange { label: 2, len: 2 });

        let c = array![[1.0, 1.0]].into_dyn();
        assert!(matches!(
            ops.pair_histogram(&a.view(), &c.view(), 3),
            Err(EngineError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_symmetrize_max() {
        let ops = SerialBackend;
        let m = array![[5.0, 0.0, 0.0], [2.0, 0.0, 1.0], [0.0, 3.0, 0.0]];
        let s = ops.symmetrize_max(m).unwrap();
        assert_eq!(s, array![[5.0, 2.0, 0.0], [2.0, 0.0, 3.0], [0.0, 3.0, 0.0]]);
        assert_eq!(s, s.t());

        assert!(ops.symmetrize_max(array![[1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_divide_rows() {
        let ops = SerialBackend;
        let m = array![[2.0, 2.0], [1.0, 3.0]];
        let out = ops.divide_rows(&m, &array![4.0, 2.0]).unwrap();
        assert_eq!(out, array![[0.5, 0.5], [0.5, 1.5]]);

        assert!(ops.divide_rows(&m, &array![1.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_replace_and_project() {
        let ops = SerialBackend;
        let m = array![[0.0, 0.0], [1.0, 3.0]];
        let totals = ops.sum_projection(&m, Axis(1));
        assert_eq!(totals, array![0.0, 4.0]);
        assert_eq!(ops.replace_value(totals, 0.0, 1.0), array![1.0, 4.0]);
        assert_eq!(ops.sum_projection(&m, Axis(0)), array![1.0, 3.0]);
    }

    #[test]
    fn test_transpose_and_diagonal() {
        let ops = SerialBackend;
        let m = array![[1.0, 2.0], [3.0, 4.0]];
        let t = ops.transpose(m.clone());
        assert!(t.is_standard_layout());
        assert_eq!(t, array![[1.0, 3.0], [2.0, 4.0]]);

        let d = ops.set_diagonal(m, 0.0);
        assert_eq!(d, array![[0.0, 2.0], [3.0, 0.0]]);

        let mask = ops.transpose(array![[true, false], [false, false]]);
        assert!(mask[(0, 0)] && !mask[(1, 0)]);
    }

    #[test]
    fn test_masked_median_projection() {
        let ops = SerialBackend;
        let values = array![
            [0.1, 0.7, 0.3],
            [0.2, 0.8, 0.1],
            [0.3, 0.9, 0.2],
            [0.4, 0.5, 0.6],
        ];
        let mask = array![
            [true, false, true],
            [true, false, true],
            [true, false, true],
            [true, false, false],
        ];
        let med = ops
            .masked_median_projection(&values, &mask, Axis(0))
            .unwrap();
        assert_eq!(med.len(), 3);
        assert!(float_eq(med[0], 0.25));
        assert!(float_eq(med[1], 0.0));
        assert!(float_eq(med[2], 0.2));

        let wrong = array![[true]];
        assert!(ops
            .masked_median_projection(&values, &wrong, Axis(0))
            .is_err());
    }

    #[test]
    fn test_gather_by_index() {
        let ops = SerialBackend;
        let index = array![[0.0, 2.0], [1.0, 1.0]].into_dyn();
        let out = ops
            .gather_by_index(&index.view(), &array![9.0, 8.0, 7.0])
            .unwrap();
        assert_eq!(out, array![[9.0, 7.0], [8.0, 8.0]].into_dyn());

        let err = ops
            .gather_by_index(&index.view(), &array![9.0, 8.0])
            .unwrap_err();
        assert_eq!(err, EngineError::OutOfRange { label: 2, len: 2 });
    }
}
