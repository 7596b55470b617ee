// ==========================================
// 来料检验系统 - 样本值生成器
// ==========================================
// 优先级: 专用项目 → 生成规则 → 标准解析 → 名称启发式
// 约束: 总是返回 count 个值，不报错
// ==========================================

use crate::domain::inspection::InspectionItem;
use crate::domain::types::{ItemKind, Judgment};
use crate::engine::criteria_parser::{infer_precision, parse_criteria, ParsedCriteria};
use crate::engine::generation_rule::{interpret_rule, GenerationRule};
use crate::engine::numeric::{first_integer, format_fixed, leading_float, sample_on_grid, uniform};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

// 初粘性钢球号: "≥ 8#"
static TACK_BALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*#").expect("valid tack regex"));

/// 启发式定性项目的取值
pub const QUALITATIVE_OK: &str = "OK";

// ==========================================
// GeneratorConfig - 生成器参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// 持粘性项目无标准时的取值
    pub hold_time_default: String,
    /// 初粘性钢球号无法提取时的下限
    pub initial_tack_default_min: i64,
    /// 初粘性钢球号上限
    pub initial_tack_cap: i64,
    /// 厚度启发式缺省基准
    pub thickness_base: f64,
    /// 宽/长启发式缺省基准
    pub dimension_base: f64,
    /// 量/重启发式缺省基准
    pub weight_base: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            hold_time_default: "≥ 24h".to_string(),
            initial_tack_default_min: 4,
            initial_tack_cap: 12,
            thickness_base: 0.05,
            dimension_base: 500.0,
            weight_base: 10.0,
        }
    }
}

// ==========================================
// SampleValueGenerator
// ==========================================
/// 样本值生成器
///
/// 无内部可变状态，可在任意线程并发调用；每次调用使用调用方
/// 提供的随机源（或线程本地随机源）。
#[derive(Debug, Clone, Default)]
pub struct SampleValueGenerator {
    config: GeneratorConfig,
}

impl SampleValueGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// 使用线程本地随机源生成样本值
    pub fn generate(&self, item: &InspectionItem, count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        self.generate_with_rng(item, count, &mut rng)
    }

    /// 使用指定随机源生成样本值
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        item: &InspectionItem,
        count: usize,
        rng: &mut R,
    ) -> Vec<String> {
        let target = item.target_text();

        // 1. 专用项目
        match item.kind() {
            ItemKind::HoldTime => {
                debug!(item = %item.name, "持粘性项目，样本取标准原文");
                return self.hold_time_values(target, count);
            }
            ItemKind::InitialTack => {
                return self.initial_tack_values(&item.name, target, count, rng);
            }
            _ => {}
        }

        // 2. 生成规则
        let rule = interpret_rule(item.generation_rule.as_deref(), &item.inspection_standard);
        if rule.is_rule() {
            debug!(item = %item.name, ?rule, "按生成规则生成");
            return rule_values(&rule, count, rng);
        }

        // 3. 标准解析
        let parsed = parse_criteria(target);
        if parsed.is_parseable() {
            let precision = infer_precision(target, &parsed);
            debug!(item = %item.name, %parsed, precision, "按验收标准生成");
            return (0..count)
                .map(|_| criteria_value(&parsed, precision, rng))
                .collect();
        }

        // 4. 名称启发式
        debug!(item = %item.name, kind = %item.kind(), "标准无法解析，按名称启发式生成");
        self.heuristic_values(item, count, rng)
    }

    fn hold_time_values(&self, target: &str, count: usize) -> Vec<String> {
        let value = if target.trim().is_empty() {
            self.config.hold_time_default.as_str()
        } else {
            target
        };
        vec![value.to_string(); count]
    }

    fn initial_tack_values<R: Rng + ?Sized>(
        &self,
        name: &str,
        target: &str,
        count: usize,
        rng: &mut R,
    ) -> Vec<String> {
        let min_val = TACK_BALL_RE
            .captures(target)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .or_else(|| first_integer(target))
            .unwrap_or(self.config.initial_tack_default_min);
        let max_val = min_val.max(self.config.initial_tack_cap);

        debug!(item = name, min_val, max_val, "初粘性项目，按钢球号生成");

        (0..count)
            .map(|_| format!("{}#", rng.gen_range(min_val..=max_val)))
            .collect()
    }

    fn heuristic_values<R: Rng + ?Sized>(
        &self,
        item: &InspectionItem,
        count: usize,
        rng: &mut R,
    ) -> Vec<String> {
        // 启发式只看检验标准，0 值按缺省基准处理
        let base_or = |fallback: f64| {
            leading_float(&item.inspection_standard)
                .filter(|v| *v != 0.0)
                .unwrap_or(fallback)
        };

        match item.kind() {
            ItemKind::Thickness => {
                let base = base_or(self.config.thickness_base);
                let spread = base.abs() * 0.1;
                (0..count)
                    .map(|_| format_fixed(base + uniform(rng, -spread, spread), 3))
                    .collect()
            }
            ItemKind::Dimension => {
                let base = base_or(self.config.dimension_base);
                (0..count)
                    .map(|_| format_fixed(base + uniform(rng, -2.0, 2.0), 1))
                    .collect()
            }
            ItemKind::Weight => {
                let base = base_or(self.config.weight_base);
                let spread = base.abs() * 0.05;
                (0..count)
                    .map(|_| format_fixed(base + uniform(rng, -spread, spread), 2))
                    .collect()
            }
            _ => vec![QUALITATIVE_OK.to_string(); count],
        }
    }
}

fn rule_values<R: Rng + ?Sized>(rule: &GenerationRule, count: usize, rng: &mut R) -> Vec<String> {
    match rule {
        GenerationRule::Fixed { value } => vec![value.clone(); count],
        GenerationRule::Enum { pass_rate } => {
            let p = (pass_rate / 100.0).clamp(0.0, 1.0);
            (0..count)
                .map(|_| Judgment::from_pass(rng.gen_bool(p)).as_str().to_string())
                .collect()
        }
        GenerationRule::RandomRange {
            base,
            min_offset,
            max_offset,
            precision,
        } => (0..count)
            .map(|_| format_fixed(base + uniform(rng, *min_offset, *max_offset), *precision))
            .collect(),
        GenerationRule::NoRule => vec![QUALITATIVE_OK.to_string(); count],
    }
}

fn criteria_value<R: Rng + ?Sized>(parsed: &ParsedCriteria, precision: usize, rng: &mut R) -> String {
    match *parsed {
        ParsedCriteria::Range { min, max } => sample_on_grid(rng, min, max, precision),
        ParsedCriteria::Minimum { val } => {
            // 上浮 20% 余量；val 为 0 时余量取 0.2
            let headroom = if val == 0.0 { 1.0 } else { val.abs() } * 0.2;
            sample_on_grid(rng, val, val + headroom, precision)
        }
        ParsedCriteria::Maximum { val } => {
            // 负上限向下扩 20%，避免符号翻转
            let lower = if val > 0.0 { val * 0.8 } else { val * 1.2 };
            sample_on_grid(rng, lower, val, precision)
        }
        ParsedCriteria::Unparseable => QUALITATIVE_OK.to_string(),
    }
}

/// 使用缺省参数为检验项目生成样本值
pub fn generate_samples(item: &InspectionItem, count: usize) -> Vec<String> {
    SampleValueGenerator::default().generate(item, count)
}
