// crates/mh_foundation/src/kahan.rs

//! Kahan 补偿求和
//!
//! 面积加权平均等累加量在面数较多时容易积累舍入误差，
//! 这里提供 f64 版本的补偿求和器。

/// Kahan 求和器
///
/// # 示例
///
/// ```
/// use mh_foundation::KahanSum;
///
/// let data = vec![0.1f64; 1000];
/// let sum = KahanSum::sum_iter(data.iter().copied());
/// assert!((sum - 100.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    /// 创建新的求和器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 当前求和值
    #[inline]
    pub fn value(&self) -> f64 {
        self.sum
    }

    /// 从迭代器求和
    pub fn sum_iter<I: IntoIterator<Item = f64>>(iter: I) -> f64 {
        let mut kahan = Self::new();
        for v in iter {
            kahan.add(v);
        }
        kahan.value()
    }
}

impl Extend<f64> for KahanSum {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for v in iter {
            self.add(v);
        }
    }
}
