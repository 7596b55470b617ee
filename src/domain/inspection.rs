// ==========================================
// 来料检验系统 - 检验领域实体
// ==========================================
// InspectionItem: 检验项目定义（调用方持有，只读）
// GeneratedSample: 单项目样本值 + 判定（每次生成新建）
// ArrivalRecord / InspectionReport: 批量生成报告的输入与产出
// ==========================================

use crate::domain::types::{ItemKind, Judgment};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 通用项目的物料类别标记
pub const GENERAL_CATEGORY: &str = "通用";

// ==========================================
// InspectionItem - 检验项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionItem {
    pub id: i64,
    pub name: String,                    // 检验项目名称
    pub inspection_standard: String,     // 检验标准（参考值）
    pub acceptance_criteria: String,     // 验收标准（优先于检验标准）
    pub generation_rule: Option<String>, // 生成规则 JSON
    pub unit: String,                    // 单位，仅用于展示
    pub material_category: String,       // 适用物料类别（空 / 通用 = 所有类别）
    pub sort_order: i32,
    pub active: bool,
    kind: ItemKind,
}

impl InspectionItem {
    /// 创建检验项目，项目类型在此解析一次
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = ItemKind::resolve(&name);
        Self {
            id,
            name,
            inspection_standard: String::new(),
            acceptance_criteria: String::new(),
            generation_rule: None,
            unit: String::new(),
            material_category: String::new(),
            sort_order: 0,
            active: true,
            kind,
        }
    }

    pub fn with_standard(mut self, standard: impl Into<String>) -> Self {
        self.inspection_standard = standard.into();
        self
    }

    pub fn with_criteria(mut self, criteria: impl Into<String>) -> Self {
        self.acceptance_criteria = criteria.into();
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        let rule = rule.into();
        self.generation_rule = if rule.trim().is_empty() { None } else { Some(rule) };
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.material_category = category.into();
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// 判定/解析目标文本: 验收标准非空白时优先，否则取检验标准
    pub fn target_text(&self) -> &str {
        if !self.acceptance_criteria.trim().is_empty() {
            &self.acceptance_criteria
        } else {
            &self.inspection_standard
        }
    }

    /// 是否适用于给定物料类别
    ///
    /// - strict=true: 仅类别完全一致（批量生成）
    /// - strict=false: 另外包含空类别与"通用"项目（交互生成）
    pub fn applies_to(&self, category: &str, strict: bool) -> bool {
        let own = self.material_category.trim();
        if own == category.trim() {
            return true;
        }
        !strict && (own.is_empty() || own == GENERAL_CATEGORY)
    }
}

// ==========================================
// GeneratedSample - 单项目生成结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSample {
    pub item_id: i64,
    pub item_name: String,
    pub values: Vec<String>,
    pub judgment: Judgment,
    pub unit: String,
}

// ==========================================
// ArrivalRecord - 到货记录（批量生成输入）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    pub supplier: String,
    pub product_name: String,
    pub specification: Option<String>,
    pub category: Option<String>, // 为空时按品名推断
    pub quantity: f64,
    pub package_count: i32,
    pub po_number: Option<String>,
    pub inbound_date: Option<NaiveDate>,
}

// ==========================================
// InspectionReport - 检验报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub report_no: String,
    pub supplier: String,
    pub product_name: String,
    pub specification: Option<String>,
    pub material_category: String,
    pub quantity: f64,
    pub package_count: i32,
    pub arrival_date: Option<NaiveDate>,
    pub sampling_quantity: usize,
    pub po_number: Option<String>,
    pub report_result: Judgment,
    pub inspector: String,
    pub inspection_date: NaiveDate,
    pub details: Vec<GeneratedSample>,
}
