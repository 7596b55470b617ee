// ==========================================
// 来料检验系统 - 领域类型定义
// ==========================================
// 判定结论 / 物料类别 / 检验项目类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 判定结论 (Judgment)
// ==========================================
// 序列化格式: 中文标签 (与报告存储一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgment {
    #[serde(rename = "合格")]
    Pass, // 合格
    #[serde(rename = "不合格")]
    Fail, // 不合格
}

impl Judgment {
    pub const PASS_LABEL: &'static str = "合格";
    pub const FAIL_LABEL: &'static str = "不合格";

    pub fn as_str(&self) -> &'static str {
        match self {
            Judgment::Pass => Self::PASS_LABEL,
            Judgment::Fail => Self::FAIL_LABEL,
        }
    }

    /// 从存储字符串解析，无法识别的一律视为不合格
    pub fn from_str(s: &str) -> Self {
        match s.trim() {
            Self::PASS_LABEL => Judgment::Pass,
            _ => Judgment::Fail,
        }
    }

    pub fn from_pass(pass: bool) -> Self {
        if pass {
            Judgment::Pass
        } else {
            Judgment::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Judgment::Pass)
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 物料类别 (Material Category)
// ==========================================
// 报告编号类型码: 纸张 → Y, 其余 → F
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialCategory {
    #[serde(rename = "纸张")]
    Paper, // 纸张（原材料）
    #[serde(rename = "膜类")]
    Film, // 膜类
    #[serde(rename = "化学辅料")]
    Chemical, // 油墨/胶水/溶剂等
    #[serde(rename = "其他")]
    Other, // 其他
}

impl MaterialCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialCategory::Paper => "纸张",
            MaterialCategory::Film => "膜类",
            MaterialCategory::Chemical => "化学辅料",
            MaterialCategory::Other => "其他",
        }
    }

    /// 从中文标签解析，未知标签归为其他
    pub fn from_str(s: &str) -> Self {
        match s.trim() {
            "纸张" => MaterialCategory::Paper,
            "膜类" => MaterialCategory::Film,
            "化学辅料" => MaterialCategory::Chemical,
            _ => MaterialCategory::Other,
        }
    }

    /// 根据品名推断物料类别
    ///
    /// 匹配顺序: 纸 → 膜/BOPP/PET → 墨/胶/液/剂 → 其他
    pub fn infer(product_name: &str) -> Self {
        let name = product_name.trim().to_lowercase();
        if name.is_empty() {
            return MaterialCategory::Other;
        }
        if name.contains('纸') {
            return MaterialCategory::Paper;
        }
        if name.contains('膜') || name.contains("bopp") || name.contains("pet") {
            return MaterialCategory::Film;
        }
        if ['墨', '胶', '液', '剂'].iter().any(|c| name.contains(*c)) {
            return MaterialCategory::Chemical;
        }
        MaterialCategory::Other
    }
}

impl fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 检验项目类型 (Item Kind)
// ==========================================
// 在项目定义时由名称解析一次，生成器与判定器都按此分派，
// 不再在每次调用时重复扫描名称子串。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    HoldTime,    // 持粘性/持粘力
    InitialTack, // 初粘性/初粘力
    Thickness,   // 厚度
    Dimension,   // 宽/长
    Weight,      // 量/重
    Generic,     // 其他（定性项目）
}

impl ItemKind {
    /// 由项目名称解析类型（拉丁字母不区分大小写）
    pub fn resolve(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        if name.contains("持粘性") || name.contains("持粘力") {
            ItemKind::HoldTime
        } else if name.contains("初粘性") || name.contains("初粘力") {
            ItemKind::InitialTack
        } else if name.contains("厚度") {
            ItemKind::Thickness
        } else if name.contains('宽') || name.contains('长') {
            ItemKind::Dimension
        } else if name.contains('量') || name.contains('重') {
            ItemKind::Weight
        } else {
            ItemKind::Generic
        }
    }

    /// 是否为专用规则项目（优先于生成规则与标准解析）
    pub fn is_special_case(&self) -> bool {
        matches!(self, ItemKind::HoldTime | ItemKind::InitialTack)
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ItemKind::HoldTime => "HOLD_TIME",
            ItemKind::InitialTack => "INITIAL_TACK",
            ItemKind::Thickness => "THICKNESS",
            ItemKind::Dimension => "DIMENSION",
            ItemKind::Weight => "WEIGHT",
            ItemKind::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
