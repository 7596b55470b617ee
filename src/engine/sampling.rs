// ==========================================
// 来料检验系统 - 抽样数量
// ==========================================
// 按到货件数分档确定每个检验项目的样本数，
// 不是 AQL 抽样方案，仅为批量生成报告提供样本数。
// ==========================================

use serde::{Deserialize, Serialize};

/// 件数分档: 件数 ≤ max_packages 时取 sample_size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSizeTier {
    pub max_packages: i32,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// 件数未知（≤0）时的样本数
    pub default_sample_size: usize,
    /// 分档（按 max_packages 升序）
    pub tiers: Vec<SampleSizeTier>,
    /// 超过所有分档时的样本数
    pub max_sample_size: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            default_sample_size: 5,
            tiers: vec![
                SampleSizeTier { max_packages: 15, sample_size: 3 },
                SampleSizeTier { max_packages: 50, sample_size: 5 },
                SampleSizeTier { max_packages: 150, sample_size: 8 },
            ],
            max_sample_size: 13,
        }
    }
}

impl SamplingConfig {
    /// 按件数确定样本数
    pub fn sample_size_for_packages(&self, package_count: i32) -> usize {
        if package_count <= 0 {
            return self.default_sample_size;
        }
        let mut tiers = self.tiers.clone();
        tiers.sort_by_key(|t| t.max_packages);
        tiers
            .iter()
            .find(|t| package_count <= t.max_packages)
            .map(|t| t.sample_size)
            .unwrap_or(self.max_sample_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        let config = SamplingConfig::default();
        assert_eq!(config.sample_size_for_packages(0), 5);
        assert_eq!(config.sample_size_for_packages(-3), 5);
        assert_eq!(config.sample_size_for_packages(1), 3);
        assert_eq!(config.sample_size_for_packages(15), 3);
        assert_eq!(config.sample_size_for_packages(16), 5);
        assert_eq!(config.sample_size_for_packages(50), 5);
        assert_eq!(config.sample_size_for_packages(150), 8);
        assert_eq!(config.sample_size_for_packages(151), 13);
    }

    #[test]
    fn test_unsorted_tiers() {
        let config = SamplingConfig {
            default_sample_size: 2,
            tiers: vec![
                SampleSizeTier { max_packages: 100, sample_size: 7 },
                SampleSizeTier { max_packages: 10, sample_size: 1 },
            ],
            max_sample_size: 20,
        };
        assert_eq!(config.sample_size_for_packages(5), 1);
        assert_eq!(config.sample_size_for_packages(50), 7);
        assert_eq!(config.sample_size_for_packages(500), 20);
    }
}
