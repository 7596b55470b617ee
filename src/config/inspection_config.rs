// ==========================================
// 来料检验系统 - 检验参数
// ==========================================
// 汇总各引擎的可调参数，缺省值即出厂行为
// ==========================================

use crate::engine::judgment::JudgmentConfig;
use crate::engine::sample_generator::GeneratorConfig;
use crate::engine::sampling::SamplingConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionConfig {
    /// 交互生成时未指定样本数的缺省值
    pub default_sample_count: usize,
    pub generator: GeneratorConfig,
    pub judgment: JudgmentConfig,
    pub sampling: SamplingConfig,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            default_sample_count: 5,
            generator: GeneratorConfig::default(),
            judgment: JudgmentConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: InspectionConfig =
            serde_json::from_str(r#"{"generator":{"initial_tack_cap":15}}"#).unwrap();
        assert_eq!(cfg.generator.initial_tack_cap, 15);
        assert_eq!(cfg.generator.initial_tack_default_min, 4);
        assert_eq!(cfg.default_sample_count, 5);
        assert!(!cfg.judgment.strict_numeric);
    }
}
