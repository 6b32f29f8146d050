//! 算法运行统计.

use std::time::{Duration, Instant};

/// ablation/benchmark 计时器.
///
/// 支持多次 "开始 - 结束" 区间的累加.
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器, 视为已经开始计时.
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 累计时间 (以微秒为单位).
    #[inline]
    fn total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 单个后端的运行统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 处理的图像个数.
    images: u64,

    /// 所有图像中出现的区域总数 (不含背景).
    regions: u64,

    /// 邻居关系总数 (有序对).
    neighbours: u64,

    /// 引擎计算的总时间.
    engine_time: AccTimer,

    /// 整个任务的总时间 (包括生成数据与校验).
    real_time: AccTimer,

    /// 最耗时的一轮.
    most: Option<Duration>,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            images: 0,
            regions: 0,
            neighbours: 0,
            engine_time: AccTimer::new(),
            real_time: AccTimer::new(),
            most: None,
        }
    }

    /// 开始一轮引擎计时.
    #[inline]
    pub fn round_start(&mut self) {
        self.engine_time.start();
    }

    /// 结束一轮引擎计时, 并记录该图像的区域数与邻居关系数.
    pub fn round_elapsed(&mut self, regions: u64, neighbours: u64) {
        let d = self.engine_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
        self.images += 1;
        self.regions += regions;
        self.neighbours += neighbours;
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    /// 图像个数.
    #[inline]
    pub fn images(&self) -> u64 {
        self.images
    }

    /// 每幅图像平均区域数.
    pub fn avg_regions(&self) -> Option<f64> {
        (self.images != 0).then(|| self.regions as f64 / self.images as f64)
    }

    /// 每个区域平均邻居数.
    pub fn avg_neighbours(&self) -> Option<f64> {
        (self.regions != 0).then(|| self.neighbours as f64 / self.regions as f64)
    }

    /// 引擎总时间 (微秒).
    #[inline]
    pub fn engine_time_us(&self) -> u64 {
        self.engine_time.total_us()
    }

    /// 每轮平均引擎时间 (微秒).
    pub fn avg_engine_time_us(&self) -> Option<f64> {
        (self.images != 0).then(|| self.engine_time_us() as f64 / self.images as f64)
    }

    /// 任务总时间 (微秒).
    #[inline]
    pub fn real_time_us(&self) -> u64 {
        self.real_time.total_us()
    }

    /// 最耗时的一轮. 没有运行过时返回 `None`.
    #[inline]
    pub fn most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Profile;

    #[test]
    fn test_profile_averages() {
        let mut p = Profile::new();
        assert_eq!(p.avg_regions(), None);
        assert_eq!(p.most_time_consuming(), None);

        p.round_start();
        p.round_elapsed(10, 40);
        p.round_start();
        p.round_elapsed(30, 80);
        let p = p.finish();

        assert_eq!(p.images(), 2);
        assert_eq!(p.avg_regions(), Some(20.0));
        assert_eq!(p.avg_neighbours(), Some(3.0));
        assert!(p.most_time_consuming().is_some());
        assert!(p.real_time_us() >= p.engine_time_us());
    }
}
