// ==========================================
// 来料检验系统 - 生成规则解释器
// ==========================================
// 输入: 检验项目上配置的生成规则 JSON
//   {"type":"fixed","value":"OK"}
//   {"type":"enum","passRate":95}
//   {"type":"random_range","base":0.05,"minOffset":-0.005,"maxOffset":0.005,"precision":3}
// 输出: GenerationRule（JSON 异常一律视为无规则，不向上抛错）
// ==========================================

use crate::engine::numeric::{leading_float, MAX_PRECISION};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// 固定值规则缺省值
pub const DEFAULT_FIXED_VALUE: &str = "OK";
/// 枚举规则缺省合格率（%）
pub const DEFAULT_PASS_RATE: f64 = 100.0;
/// 随机区间规则缺省小数位
pub const DEFAULT_RULE_PRECISION: usize = 2;

// ==========================================
// GenerationRule - 解释后的生成规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationRule {
    /// 所有样本取同一值
    Fixed { value: String },
    /// 每个样本按合格率独立取 "合格"/"不合格"
    Enum { pass_rate: f64 },
    /// 样本 = base + U(min_offset, max_offset)
    RandomRange {
        base: f64,
        min_offset: f64,
        max_offset: f64,
        precision: usize,
    },
    /// 未配置或无法识别
    NoRule,
}

impl GenerationRule {
    pub fn is_rule(&self) -> bool {
        !matches!(self, GenerationRule::NoRule)
    }
}

/// 数值或数值字符串 → f64（字符串按前导数值解析）
fn value_as_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => leading_float(s),
        _ => None,
    }
}

fn value_as_precision(value: Option<&Value>) -> Option<usize> {
    let v = value_as_f64(value)?;
    if v < 0.0 {
        return None;
    }
    Some((v.trunc() as usize).min(MAX_PRECISION))
}

fn fixed_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => DEFAULT_FIXED_VALUE.to_string(),
    }
}

/// 解释生成规则
///
/// # 参数
/// - `rule_json`: 规则 JSON 文本（None / 空串 / 非法 JSON 均为无规则）
/// - `inspection_standard`: 随机区间规则缺少 base 时的回退来源
pub fn interpret_rule(rule_json: Option<&str>, inspection_standard: &str) -> GenerationRule {
    let raw = match rule_json.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return GenerationRule::NoRule,
    };

    let rule: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(rule = raw, error = %e, "生成规则 JSON 无效，按无规则处理");
            return GenerationRule::NoRule;
        }
    };

    let rule_type = match rule.get("type").and_then(Value::as_str) {
        Some(t) => t.trim(),
        None => return GenerationRule::NoRule,
    };

    match rule_type {
        "fixed" => GenerationRule::Fixed {
            value: fixed_value(rule.get("value")),
        },
        "enum" => {
            let pass_rate = match rule.get("passRate") {
                None | Some(Value::Null) => DEFAULT_PASS_RATE,
                Some(v) => value_as_f64(Some(v)).unwrap_or_else(|| {
                    warn!(pass_rate = %v, "合格率无法识别，按 100% 处理");
                    DEFAULT_PASS_RATE
                }),
            };
            GenerationRule::Enum {
                pass_rate: pass_rate.clamp(0.0, 100.0),
            }
        }
        "random_range" => {
            let base = value_as_f64(rule.get("base"))
                .or_else(|| leading_float(inspection_standard))
                .unwrap_or(0.0);
            GenerationRule::RandomRange {
                base,
                min_offset: value_as_f64(rule.get("minOffset")).unwrap_or(0.0),
                max_offset: value_as_f64(rule.get("maxOffset")).unwrap_or(0.0),
                precision: value_as_precision(rule.get("precision"))
                    .unwrap_or(DEFAULT_RULE_PRECISION),
            }
        }
        other => {
            debug!(rule_type = other, "未知生成规则类型");
            GenerationRule::NoRule
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rule_inputs() {
        assert_eq!(interpret_rule(None, ""), GenerationRule::NoRule);
        assert_eq!(interpret_rule(Some("  "), ""), GenerationRule::NoRule);
        assert_eq!(interpret_rule(Some("{not json"), ""), GenerationRule::NoRule);
        assert_eq!(interpret_rule(Some("[1,2]"), ""), GenerationRule::NoRule);
        assert_eq!(interpret_rule(Some(r#"{"value":"OK"}"#), ""), GenerationRule::NoRule);
        assert_eq!(interpret_rule(Some(r#"{"type":"gauss"}"#), ""), GenerationRule::NoRule);
    }

    #[test]
    fn test_fixed_rule() {
        assert_eq!(
            interpret_rule(Some(r#"{"type":"fixed","value":"无异味"}"#), ""),
            GenerationRule::Fixed { value: "无异味".to_string() }
        );
        assert_eq!(
            interpret_rule(Some(r#"{"type":"fixed"}"#), ""),
            GenerationRule::Fixed { value: "OK".to_string() }
        );
        assert_eq!(
            interpret_rule(Some(r#"{"type":"fixed","value":""}"#), ""),
            GenerationRule::Fixed { value: "OK".to_string() }
        );
        assert_eq!(
            interpret_rule(Some(r#"{"type":"fixed","value":12}"#), ""),
            GenerationRule::Fixed { value: "12".to_string() }
        );
    }

    #[test]
    fn test_enum_rule() {
        assert_eq!(
            interpret_rule(Some(r#"{"type":"enum"}"#), ""),
            GenerationRule::Enum { pass_rate: 100.0 }
        );
        assert_eq!(
            interpret_rule(Some(r#"{"type":"enum","passRate":80}"#), ""),
            GenerationRule::Enum { pass_rate: 80.0 }
        );
        assert_eq!(
            interpret_rule(Some(r#"{"type":"enum","passRate":"60"}"#), ""),
            GenerationRule::Enum { pass_rate: 60.0 }
        );
        assert_eq!(
            interpret_rule(Some(r#"{"type":"enum","passRate":150}"#), ""),
            GenerationRule::Enum { pass_rate: 100.0 }
        );
    }

    #[test]
    fn test_random_range_rule() {
        let rule = interpret_rule(
            Some(r#"{"type":"random_range","base":"0.05","minOffset":-0.005,"maxOffset":0.005,"precision":3}"#),
            "",
        );
        assert_eq!(
            rule,
            GenerationRule::RandomRange {
                base: 0.05,
                min_offset: -0.005,
                max_offset: 0.005,
                precision: 3,
            }
        );
    }

    #[test]
    fn test_random_range_base_fallback() {
        let rule = interpret_rule(
            Some(r#"{"type":"random_range","minOffset":-1,"maxOffset":1}"#),
            "0.05 +/- 0.01",
        );
        assert_eq!(
            rule,
            GenerationRule::RandomRange {
                base: 0.05,
                min_offset: -1.0,
                max_offset: 1.0,
                precision: 2,
            }
        );

        let rule = interpret_rule(Some(r#"{"type":"random_range","base":"abc"}"#), "见图纸");
        assert_eq!(
            rule,
            GenerationRule::RandomRange {
                base: 0.0,
                min_offset: 0.0,
                max_offset: 0.0,
                precision: 2,
            }
        );
    }
}
