// ==========================================
// 来料检验系统 - 判定引擎
// ==========================================
// 单值通过条件（任一满足即可）:
//   1. 值为 "OK" 或 "合格"
//   2. 值与目标文本完全一致
//   3. 持粘性项目: 值与标准都含整数，且值 ≥ 标准
//   4. 值可解析为数值
// 任一值不通过 → 整组不合格
// ==========================================

use crate::domain::inspection::{GeneratedSample, InspectionItem};
use crate::domain::types::{ItemKind, Judgment};
use crate::engine::criteria_parser::parse_criteria;
use crate::engine::numeric::{first_integer, leading_float};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 直接通过的定性值
const ACCEPTED_LITERALS: [&str; 2] = ["OK", Judgment::PASS_LABEL];

// ==========================================
// JudgmentConfig
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgmentConfig {
    /// 严格数值判定: 数值样本需落在验收标准解析出的约束内
    ///
    /// 关闭时（缺省）数值样本一律视为通过，只拦截定性不合格。
    pub strict_numeric: bool,
}

/// JudgmentEngine - 样本判定
#[derive(Debug, Clone, Default)]
pub struct JudgmentEngine {
    config: JudgmentConfig,
}

impl JudgmentEngine {
    pub fn new(config: JudgmentConfig) -> Self {
        Self { config }
    }

    /// 判定一组样本值
    pub fn judge<S: AsRef<str>>(&self, item: &InspectionItem, values: &[S]) -> Judgment {
        for value in values {
            let value: &str = value.as_ref();
            if !self.value_passes(item, value) {
                debug!(item = %item.name, value, "样本值不通过");
                return Judgment::Fail;
            }
        }
        Judgment::Pass
    }

    /// 判定单个样本值
    pub fn value_passes(&self, item: &InspectionItem, value: &str) -> bool {
        if ACCEPTED_LITERALS.contains(&value) {
            return true;
        }

        let target = item.target_text();
        if !target.is_empty() && value == target {
            return true;
        }

        if item.kind() == ItemKind::HoldTime {
            if let (Some(v), Some(c)) = (first_integer(value), first_integer(target)) {
                if v >= c {
                    return true;
                }
            }
        }

        match leading_float(value) {
            Some(number) if self.config.strict_numeric => parse_criteria(target).contains(number),
            Some(_) => true,
            None => false,
        }
    }
}

/// 使用缺省参数判定
pub fn judge<S: AsRef<str>>(item: &InspectionItem, values: &[S]) -> Judgment {
    JudgmentEngine::default().judge(item, values)
}

/// 报告总体结论: 所有项目合格才合格
pub fn aggregate_judgment(details: &[GeneratedSample]) -> Judgment {
    Judgment::from_pass(details.iter().all(|d| d.judgment.is_pass()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> JudgmentEngine {
        JudgmentEngine::new(JudgmentConfig { strict_numeric: true })
    }

    #[test]
    fn test_qualitative_literals() {
        let item = InspectionItem::new(1, "外观").with_criteria("无破损");
        assert_eq!(judge(&item, &["OK", "OK", "OK"]), Judgment::Pass);
        assert_eq!(judge(&item, &["合格", "OK"]), Judgment::Pass);
        assert_eq!(judge(&item, &["OK", "不合格"]), Judgment::Fail);
        assert_eq!(judge(&item, &["OK", "有划伤"]), Judgment::Fail);
    }

    #[test]
    fn test_empty_values_pass() {
        let item = InspectionItem::new(1, "外观");
        assert_eq!(judge::<&str>(&item, &[]), Judgment::Pass);
    }

    #[test]
    fn test_equal_to_target_text() {
        let item = InspectionItem::new(1, "气味").with_standard("无异味");
        assert_eq!(judge(&item, &["无异味", "无异味"]), Judgment::Pass);
        assert_eq!(judge(&item, &["有异味"]), Judgment::Fail);
    }

    #[test]
    fn test_hold_time_integer_comparison() {
        let item = InspectionItem::new(1, "持粘性").with_criteria(">= 24h");
        assert_eq!(judge(&item, &[">= 24h", "≥ 24h", "≥ 36h"]), Judgment::Pass);
        assert_eq!(judge(&item, &["≥ 12h"]), Judgment::Fail);
        assert_eq!(judge(&item, &["未脱落"]), Judgment::Fail);
    }

    #[test]
    fn test_hold_time_rule_only_for_hold_time_items() {
        let item = InspectionItem::new(1, "外观").with_criteria(">= 24h");
        assert_eq!(judge(&item, &["≥ 36h"]), Judgment::Fail);
    }

    #[test]
    fn test_numeric_values_pass_leniently() {
        let item = InspectionItem::new(1, "剥离力").with_criteria("2.2~3.0");
        assert_eq!(judge(&item, &["2.2", "3.0", "2.5"]), Judgment::Pass);
        // 宽松模式不复核区间
        assert_eq!(judge(&item, &["9.9"]), Judgment::Pass);
        // 初粘性钢球号按前导数值通过
        let tack = InspectionItem::new(2, "初粘性").with_criteria("≥ 8#");
        assert_eq!(judge(&tack, &["8#", "12#"]), Judgment::Pass);
    }

    #[test]
    fn test_strict_numeric_mode() {
        let engine = strict();
        let item = InspectionItem::new(1, "剥离力").with_criteria("2.2~3.0");
        assert_eq!(engine.judge(&item, &["2.2", "3.0"]), Judgment::Pass);
        assert_eq!(engine.judge(&item, &["3.1"]), Judgment::Fail);

        let tack = InspectionItem::new(2, "初粘性").with_criteria("≥ 8#");
        assert_eq!(engine.judge(&tack, &["8#", "12#"]), Judgment::Pass);
        assert_eq!(engine.judge(&tack, &["6#"]), Judgment::Fail);

        // 标准无法解析时数值不受约束
        let free = InspectionItem::new(3, "克重").with_standard("见规格书");
        assert_eq!(engine.judge(&free, &["180.5"]), Judgment::Pass);
    }

    #[test]
    fn test_aggregate_judgment() {
        let pass = GeneratedSample {
            item_id: 1,
            item_name: "外观".to_string(),
            values: vec!["OK".to_string()],
            judgment: Judgment::Pass,
            unit: String::new(),
        };
        let fail = GeneratedSample {
            judgment: Judgment::Fail,
            ..pass.clone()
        };
        assert_eq!(aggregate_judgment(&[]), Judgment::Pass);
        assert_eq!(aggregate_judgment(&[pass.clone(), pass.clone()]), Judgment::Pass);
        assert_eq!(aggregate_judgment(&[pass, fail]), Judgment::Fail);
    }
}
