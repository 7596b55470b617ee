// ==========================================
// 来料检验系统 - 数值文本工具
// ==========================================
// 前导数值提取、定点格式化、按精度网格取样
// ==========================================

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

static LEADING_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+))").expect("valid regex"));

static FIRST_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// 最大格式化精度（小数位）
pub const MAX_PRECISION: usize = 10;

const GRID_EPSILON: f64 = 1e-9;

/// 2^63，网格步数的上限
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// 提取字符串开头的数值（允许前导空白与尾随单位）
///
/// "0.05 ± 0.01" → 0.05, "8#" → 8, "≥ 24h" → None
pub fn leading_float(text: &str) -> Option<f64> {
    LEADING_FLOAT
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// 提取字符串中第一个整数
pub fn first_integer(text: &str) -> Option<i64> {
    FIRST_INTEGER
        .find(text)
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// 按固定小数位格式化
pub fn format_fixed(value: f64, precision: usize) -> String {
    let precision = precision.min(MAX_PRECISION);
    let formatted = format!("{:.*}", precision, value);
    // 避免出现 "-0.00"
    if formatted.starts_with('-') && formatted[1..].chars().all(|c| c == '0' || c == '.') {
        formatted[1..].to_string()
    } else {
        formatted
    }
}

/// 在 [lo, hi] 区间内按精度网格均匀取样并格式化
///
/// 取样点都是 10^-precision 的整数倍，格式化后的数值严格落在区间内。
/// 区间内没有网格点时逐级提高精度。
pub fn sample_on_grid<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64, precision: usize) -> String {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut precision = precision.min(MAX_PRECISION);
    loop {
        let scale = 10f64.powi(precision as i32);
        let lo_step = (lo * scale - GRID_EPSILON).ceil();
        let hi_step = (hi * scale + GRID_EPSILON).floor();
        // 超出 i64 可表示范围的网格无法按整数取样
        if lo_step.abs() >= I64_LIMIT || hi_step.abs() >= I64_LIMIT {
            return format_fixed(uniform(rng, lo, hi), precision);
        }
        if lo_step <= hi_step {
            let step = if lo_step == hi_step {
                lo_step
            } else {
                rng.gen_range(lo_step as i64..=hi_step as i64) as f64
            };
            return format_fixed(step / scale, precision);
        }
        if precision >= MAX_PRECISION {
            return format_fixed(lo, precision);
        }
        precision += 1;
    }
}

/// 在 [a, b] 内均匀取样（a、b 顺序不限）
///
/// 不调用 gen_range，区间宽度溢出 f64 时按半宽计算；
/// 端点为 NaN 或无穷时返回有限的那一端，都不是有限值时返回 0。
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64) -> f64 {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => {}
        (true, false) => return a,
        (false, true) => return b,
        (false, false) => return 0.0,
    }
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let width = hi - lo;
    if width <= f64::EPSILON {
        return lo;
    }
    let t: f64 = rng.gen();
    let value = if width.is_finite() {
        lo + t * width
    } else {
        let half_lo = lo / 2.0;
        (half_lo + t * (hi / 2.0 - half_lo)) * 2.0
    };
    value.clamp(lo, hi)
}
