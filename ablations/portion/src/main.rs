//! 串行后端与 `rayon` 后端的接触比例图消融实验.
//!
//! 环境变量:
//!
//! - `PORTION_SIZE`: 合成组织图像边长, 默认 512;
//! - `PORTION_CELL`: Voronoi 网格单元边长, 默认 16;
//! - `PORTION_ROUNDS`: 每个后端运行的轮数, 默认 8.

mod profile;
mod result;
mod runner;

fn main() {
    simple_logger::init_with_env().unwrap();
    runner::run().analyze();
}
