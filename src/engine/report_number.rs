// ==========================================
// 来料检验系统 - 报告编号生成
// ==========================================
// 格式: TJ + 类型码 + YY + MM + 3位流水，共 10 位
//   类型码: 纸张 → Y，其余类别 → F
//   例: TJY2501008
// 本模块只做纯计算（读取当前最大号 → 下一个号），
// 读-算-写的串行化由调用方负责（见 repository::report_repo）。
// ==========================================

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

/// 报告编号总长度
pub const REPORT_NO_LEN: usize = 10;
/// 流水号位数
pub const SEQUENCE_WIDTH: usize = 3;
/// 单月最大流水号
pub const MAX_SEQUENCE: u32 = 999;

const REPORT_NO_HEAD: &str = "TJ";
const PAPER_CATEGORY: &str = "纸张";

/// ReportNumberGenerator - 报告编号计算
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportNumberGenerator;

impl ReportNumberGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 类型码: 纸张 → 'Y'，其余 → 'F'
    pub fn type_code(category: &str) -> char {
        if category.trim() == PAPER_CATEGORY {
            'Y'
        } else {
            'F'
        }
    }

    /// 编号前缀: TJ{类型码}{YY}{MM}
    pub fn prefix(category: &str, date: NaiveDate) -> String {
        format!(
            "{}{}{:02}{:02}",
            REPORT_NO_HEAD,
            Self::type_code(category),
            date.year().rem_euclid(100),
            date.month()
        )
    }

    /// 由当前最大编号推算下一个流水号
    ///
    /// 无当前编号或末 3 位无法解析时从 1 开始。
    pub fn next_sequence(current_max: Option<&str>) -> u32 {
        let Some(last) = current_max.map(str::trim).filter(|s| !s.is_empty()) else {
            return 1;
        };
        let suffix_start = last
            .char_indices()
            .rev()
            .nth(SEQUENCE_WIDTH - 1)
            .map(|(i, _)| i);
        let parsed = suffix_start
            .map(|i| &last[i..])
            .filter(|s| s.chars().all(|c| c.is_ascii_digit()))
            .and_then(|s| s.parse::<u32>().ok());

        match parsed {
            Some(seq) => seq + 1,
            None => {
                debug!(current_max = last, "流水号无法解析，从 1 开始");
                1
            }
        }
    }

    /// 计算下一个报告编号
    ///
    /// # 参数
    /// - `category`: 物料类别（决定类型码）
    /// - `date`: 报告日期（决定年月）
    /// - `current_max`: 同前缀下当前最大的 10 位编号
    pub fn next(&self, category: &str, date: NaiveDate, current_max: Option<&str>) -> String {
        let prefix = Self::prefix(category, date);
        let seq = Self::next_sequence(current_max);
        if seq > MAX_SEQUENCE {
            warn!(prefix = %prefix, seq, "当月流水号超过 999，编号将超出 10 位");
        }
        format!("{}{:0width$}", prefix, seq, width = SEQUENCE_WIDTH)
    }

    /// 是否为合法的 10 位报告编号
    pub fn is_well_formed(report_no: &str) -> bool {
        let bytes = report_no.as_bytes();
        bytes.len() == REPORT_NO_LEN
            && report_no.starts_with(REPORT_NO_HEAD)
            && matches!(bytes[2], b'Y' | b'F')
            && bytes[3..].iter().all(u8::is_ascii_digit)
            && (1..=12).contains(&(u32::from(bytes[5] - b'0') * 10 + u32::from(bytes[6] - b'0')))
    }
}

/// 计算下一个报告编号
pub fn next_report_number(category: &str, date: NaiveDate, current_max: Option<&str>) -> String {
    ReportNumberGenerator::new().next(category, date, current_max)
}
