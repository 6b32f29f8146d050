//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use label_berry::prelude::*;
use ndarray::{Array2, ArrayD};
use utils::synthetic;

/// 实验参数, 均可由环境变量覆盖.
#[derive(Copy, Clone, Debug)]
struct Setting {
    size: usize,
    cell: usize,
    rounds: u64,
}

impl Setting {
    fn from_env() -> Self {
        Self {
            size: utils::env_or("PORTION_SIZE", 512),
            cell: utils::env_or("PORTION_CELL", 16),
            rounds: utils::env_or("PORTION_ROUNDS", 8),
        }
    }

    /// 第 `round` 轮使用的合成组织图像.
    fn tissue(&self, round: u64) -> LabelImage {
        let t: Array2<u32> = synthetic::voronoi_tissue(self.size, self.size, self.cell, round);
        LabelImage::from_labels(&t).expect("synthetic labels are always valid")
    }
}

/// 在所有轮次上运行 `engine`, 返回统计与每轮的输出图像.
fn bench<P: Primitives>(
    engine: &TouchPortionEngine<P>,
    setting: &Setting,
) -> (Profile, Vec<ArrayD<f32>>) {
    let mut profile = Profile::new();
    let mut maps = Vec::with_capacity(setting.rounds as usize);

    for round in 0..setting.rounds {
        let labels = setting.tissue(round);
        log::info!("{}: round {round}...", engine.primitives().name());

        profile.round_start();
        let report = engine.report(&labels).expect("engine failure");
        let regions = report.medians.len().saturating_sub(1) as u64;
        let neighbours = report.portions.mask().iter().filter(|&&m| m).count() as u64;
        profile.round_elapsed(regions, neighbours);

        maps.push(report.map);
    }
    (profile.finish(), maps)
}

/// 实际运行.
pub fn run() -> AblationResult {
    let setting = Setting::from_env();
    assert!(setting.size > 0 && setting.rounds > 0, "Empty ablation setting");
    log::info!("{setting:?}, {} cpus available", utils::cpus());

    println!("Running ablation studies...");
    let (serial, expected) = bench(&TouchPortionEngine::new(SerialBackend), &setting);
    let (parallel, got) = bench(&TouchPortionEngine::new(ParallelBackend), &setting);
    assert_eq!(expected, got, "Backends disagree");

    if let Some(first) = got.first() {
        let inv = synthetic::reciprocal(&first.view());
        let peak = inv.iter().copied().fold(0.0f32, f32::max);
        log::info!("round 0: at most {peak:.2} typical neighbours per region");
    }

    AblationResult::from_iter([("serial", serial), ("rayon", parallel)])
}
