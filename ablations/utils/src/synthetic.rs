//! 合成标签图像.
//!
//! 真实的组织切片需要先经过分割才能得到标签图像, 这里直接生成结构类似的合成数据:
//! 在规则网格上抖动种子点, 再按最近种子划分 Voronoi 区域, 得到类似细胞组织的镶嵌.

use label_berry::consts::LABEL_BACKGROUND;
use ndarray::{Array2, ArrayD, ArrayViewD};

/// `h * w` 的水平条带图像, 自上而下依次为标签 `1..=n`.
///
/// `n` 为 0 时得到全背景图像.
pub fn bands(h: usize, w: usize, n: usize) -> Array2<u32> {
    if n == 0 || h == 0 {
        return Array2::from_elem((h, w), LABEL_BACKGROUND);
    }
    Array2::from_shape_fn((h, w), |(y, _)| (y * n / h + 1) as u32)
}

/// splitmix64, 只用于生成可复现的种子抖动.
#[inline]
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// 网格单元 `(cy, cx)` 中种子点的绝对坐标.
#[inline]
fn seed_of(cy: usize, cx: usize, cell: usize, seed: u64) -> (usize, usize) {
    let r = mix(seed ^ mix(((cy as u64) << 32) | cx as u64));
    let dy = (r & 0xFFFF_FFFF) as usize % cell;
    let dx = (r >> 32) as usize % cell;
    (cy * cell + dy, cx * cell + dx)
}

/// 生成 `h * w` 的 Voronoi 组织图像.
///
/// 图像被划分为边长 `cell` 的网格, 每个单元内放置一个随机种子点,
/// 像素归属于欧氏距离最近的种子 (只需搜索相邻的 3 * 3 个单元).
/// 标签从 1 开始按单元行优先编号, 不含背景. 相同参数总是得到相同结果.
///
/// # 注意
///
/// `cell` 为 0 时按 1 处理.
pub fn voronoi_tissue(h: usize, w: usize, cell: usize, seed: u64) -> Array2<u32> {
    let cell = cell.max(1);
    let (ch, cw) = (h.div_ceil(cell), w.div_ceil(cell));

    Array2::from_shape_fn((h, w), |(y, x)| {
        let (gy, gx) = (y / cell, x / cell);
        let mut best = (usize::MAX, 0);
        for cy in gy.saturating_sub(1)..=(gy + 1).min(ch - 1) {
            for cx in gx.saturating_sub(1)..=(gx + 1).min(cw - 1) {
                let (sy, sx) = seed_of(cy, cx, cell, seed);
                let d = sy.abs_diff(y).pow(2) + sx.abs_diff(x).pow(2);
                if d < best.0 {
                    best = (d, cy * cw + cx + 1);
                }
            }
        }
        best.1 as u32
    })
}

/// 逐像素求倒数, 0 保持为 0.
///
/// 中位数接触比例的倒数可以近似理解为 "典型邻居个数".
pub fn reciprocal(image: &ArrayViewD<'_, f32>) -> ArrayD<f32> {
    image.mapv(|v| if v == 0.0 { 0.0 } else { v.recip() })
}
