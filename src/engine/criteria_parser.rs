// ==========================================
// 来料检验系统 - 验收标准解析器
// ==========================================
// 输入: 验收标准/检验标准自由文本
// 输出: 区间 / 下限 / 上限 / 无法解析
// 顺序: 区间 → 公差 → 下限 → 上限，先匹配先得
// ==========================================

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

// 区间: "2.2~3.0" / "2.2-3.0" / "2.2gf~3.0gf"
// 分隔符两侧允许单位字符，但不吞 "+/-"，以免把公差写法误读为区间
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?[0-9]+(?:\.[0-9]+)?)[^0-9.~～+/\-]*[~～\-][^0-9.+/\-]*(-?[0-9]+(?:\.[0-9]+)?)")
        .expect("valid range regex")
});

// 公差: "10 ± 0.5" / "10±0.5" / "0.05 +/- 0.01"
static TOLERANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?[0-9]+(?:\.[0-9]+)?)[^0-9.±+]*(?:±|\+/-|\+-)[^0-9.]*?([0-9]+(?:\.[0-9]+)?)")
        .expect("valid tolerance regex")
});

// 下限: "≥ 8" / ">= 8" / "> 8"
static MIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:≥|>=|>)\s*(-?[0-9]+(?:\.[0-9]+)?)").expect("valid minimum regex")
});

// 上限: "≤ 10" / "<= 10" / "< 10"
static MAX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:≤|<=|<)\s*(-?[0-9]+(?:\.[0-9]+)?)").expect("valid maximum regex")
});

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([0-9]+)").expect("valid decimal regex"));

/// 区间默认小数位
pub const DEFAULT_RANGE_PRECISION: usize = 2;
/// 单边界默认小数位
pub const DEFAULT_BOUND_PRECISION: usize = 1;

// ==========================================
// ParsedCriteria - 解析结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedCriteria {
    /// 闭区间 [min, max]，保证 min ≤ max
    Range { min: f64, max: f64 },
    /// 值 ≥ val
    Minimum { val: f64 },
    /// 值 ≤ val
    Maximum { val: f64 },
    /// 未提取到数值约束
    Unparseable,
}

impl ParsedCriteria {
    pub fn is_parseable(&self) -> bool {
        !matches!(self, ParsedCriteria::Unparseable)
    }

    /// 数值是否满足约束（Unparseable 视为不约束）
    pub fn contains(&self, value: f64) -> bool {
        const EPS: f64 = 1e-9;
        match *self {
            ParsedCriteria::Range { min, max } => value >= min - EPS && value <= max + EPS,
            ParsedCriteria::Minimum { val } => value >= val - EPS,
            ParsedCriteria::Maximum { val } => value <= val + EPS,
            ParsedCriteria::Unparseable => true,
        }
    }
}

impl fmt::Display for ParsedCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedCriteria::Range { min, max } => write!(f, "[{}, {}]", min, max),
            ParsedCriteria::Minimum { val } => write!(f, "≥ {}", val),
            ParsedCriteria::Maximum { val } => write!(f, "≤ {}", val),
            ParsedCriteria::Unparseable => write!(f, "UNPARSEABLE"),
        }
    }
}

fn capture_f64(caps: &regex::Captures<'_>, idx: usize) -> Option<f64> {
    caps.get(idx)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// 解析验收标准文本
///
/// 纯函数：同一输入总是得到同一结果。
/// 反向书写的区间（如 "3.0~2.2"）会交换端点并记录告警。
pub fn parse_criteria(text: &str) -> ParsedCriteria {
    let text = text.trim();
    if text.is_empty() {
        return ParsedCriteria::Unparseable;
    }

    if let Some(caps) = RANGE_RE.captures(text) {
        if let (Some(a), Some(b)) = (capture_f64(&caps, 1), capture_f64(&caps, 2)) {
            if a > b {
                warn!(criteria = text, min = a, max = b, "区间端点反向，已交换");
                return ParsedCriteria::Range { min: b, max: a };
            }
            return ParsedCriteria::Range { min: a, max: b };
        }
    }

    if let Some(caps) = TOLERANCE_RE.captures(text) {
        if let (Some(base), Some(tol)) = (capture_f64(&caps, 1), capture_f64(&caps, 2)) {
            return ParsedCriteria::Range {
                min: base - tol,
                max: base + tol,
            };
        }
    }

    if let Some(val) = MIN_RE.captures(text).and_then(|c| capture_f64(&c, 1)) {
        return ParsedCriteria::Minimum { val };
    }

    if let Some(val) = MAX_RE.captures(text).and_then(|c| capture_f64(&c, 1)) {
        return ParsedCriteria::Maximum { val };
    }

    ParsedCriteria::Unparseable
}

/// 推断格式化精度
///
/// 取文本中第一个带小数点的数值的小数位数；
/// 没有小数时区间取 2 位，单边界取 1 位。
pub fn infer_precision(text: &str, parsed: &ParsedCriteria) -> usize {
    if let Some(digits) = DECIMAL_RE.captures(text).and_then(|c| c.get(1)) {
        return digits.as_str().len();
    }
    match parsed {
        ParsedCriteria::Minimum { .. } | ParsedCriteria::Maximum { .. } => DEFAULT_BOUND_PRECISION,
        ParsedCriteria::Range { .. } | ParsedCriteria::Unparseable => DEFAULT_RANGE_PRECISION,
    }
}
