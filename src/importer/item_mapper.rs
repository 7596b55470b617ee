// ==========================================
// 来料检验系统 - 检验项目字段映射器
// ==========================================
// 职责: 源表头 → 检验项目字段 + 类型转换
// 表头: 检验项目 / 检验标准 / 验收标准 / 生成规则 / 单位 / 物料类别 / 排序 / 状态
// ==========================================

use crate::domain::inspection::InspectionItem;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;

pub const FIELD_NAME: &str = "检验项目";
pub const FIELD_STANDARD: &str = "检验标准";
pub const FIELD_CRITERIA: &str = "验收标准";
pub const FIELD_RULE: &str = "生成规则";
pub const FIELD_UNIT: &str = "单位";
pub const FIELD_CATEGORY: &str = "物料类别";
pub const FIELD_SORT_ORDER: &str = "排序";
pub const FIELD_STATUS: &str = "状态";

pub struct ItemFieldMapper;

impl ItemFieldMapper {
    /// 映射一行为检验项目（id 为 0，落库时分配）
    pub fn map_row(&self, row: &RawRow) -> ImportResult<InspectionItem> {
        let name = self
            .get_string(row, FIELD_NAME)
            .ok_or_else(|| ImportError::RequiredFieldMissing {
                row: row.row_number,
                field: FIELD_NAME.to_string(),
            })?;

        let mut item = InspectionItem::new(0, name)
            .with_standard(self.get_string(row, FIELD_STANDARD).unwrap_or_default())
            .with_criteria(self.get_string(row, FIELD_CRITERIA).unwrap_or_default())
            .with_unit(self.get_string(row, FIELD_UNIT).unwrap_or_default())
            .with_category(self.get_string(row, FIELD_CATEGORY).unwrap_or_default())
            .with_sort_order(self.parse_sort_order(row)?)
            .with_active(self.parse_status(row)?);

        if let Some(rule) = self.get_string(row, FIELD_RULE) {
            self.validate_rule(&rule, row.row_number)?;
            item = item.with_rule(rule);
        }

        Ok(item)
    }

    /// 提取字符串字段，支持别名列；空白视为缺失
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        let aliases: &[&str] = match key {
            FIELD_NAME => &["检验项目", "项目名称", "项目"],
            FIELD_STANDARD => &["检验标准", "标准"],
            FIELD_CRITERIA => &["验收标准", "判定标准", "验收准则"],
            FIELD_RULE => &["生成规则", "规则"],
            FIELD_CATEGORY => &["物料类别", "适用类别", "类别"],
            FIELD_SORT_ORDER => &["排序", "排序号", "序号"],
            FIELD_STATUS => &["状态", "启用"],
            _ => &[],
        };

        std::iter::once(key)
            .chain(aliases.iter().copied())
            .filter_map(|alias| row.fields.get(alias))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn parse_sort_order(&self, row: &RawRow) -> ImportResult<i32> {
        let Some(value) = self.get_string(row, FIELD_SORT_ORDER) else {
            return Ok(0);
        };
        // Excel 数值单元格可能带 ".0"
        value
            .parse::<i32>()
            .ok()
            .or_else(|| {
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.abs() <= i32::MAX as f64)
                    .map(|f| f as i32)
            })
            .ok_or_else(|| ImportError::TypeConversionError {
                row: row.row_number,
                field: FIELD_SORT_ORDER.to_string(),
                message: format!("无法解析为整数: {}", value),
            })
    }

    fn parse_status(&self, row: &RawRow) -> ImportResult<bool> {
        let Some(value) = self.get_string(row, FIELD_STATUS) else {
            return Ok(true);
        };
        match value.to_lowercase().as_str() {
            "启用" | "有效" | "是" | "1" | "true" | "y" => Ok(true),
            "停用" | "禁用" | "无效" | "否" | "0" | "false" | "n" => Ok(false),
            _ => Err(ImportError::TypeConversionError {
                row: row.row_number,
                field: FIELD_STATUS.to_string(),
                message: format!("无法识别的状态: {}", value),
            }),
        }
    }

    // 生成规则必须是 JSON 对象；字段含义由规则解释器处理
    fn validate_rule(&self, rule: &str, row_number: usize) -> ImportResult<()> {
        match serde_json::from_str::<serde_json::Value>(rule) {
            Ok(value) if value.is_object() => Ok(()),
            Ok(_) => Err(ImportError::InvalidGenerationRule {
                row: row_number,
                message: format!("不是 JSON 对象: {}", rule),
            }),
            Err(e) => Err(ImportError::InvalidGenerationRule {
                row: row_number,
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ItemKind;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow {
            row_number: 2,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_map_full_row() {
        let item = ItemFieldMapper
            .map_row(&row(&[
                ("检验项目", " 初粘性 "),
                ("验收标准", "≥ 8#"),
                ("单位", "#"),
                ("物料类别", "膜类"),
                ("排序", "3.0"),
                ("状态", "启用"),
                ("生成规则", r#"{"type":"fixed","value":"10#"}"#),
            ]))
            .unwrap();

        assert_eq!(item.name, "初粘性");
        assert_eq!(item.kind(), ItemKind::InitialTack);
        assert_eq!(item.sort_order, 3);
        assert!(item.active);
        assert!(item.generation_rule.is_some());
    }

    #[test]
    fn test_aliases_and_defaults() {
        let item = ItemFieldMapper
            .map_row(&row(&[("项目名称", "外观"), ("判定标准", "无破损"), ("状态", "")]))
            .unwrap();
        assert_eq!(item.acceptance_criteria, "无破损");
        assert_eq!(item.sort_order, 0);
        assert!(item.active);
        assert_eq!(item.material_category, "");
    }

    #[test]
    fn test_row_errors() {
        let missing = ItemFieldMapper.map_row(&row(&[("单位", "mm")])).unwrap_err();
        assert!(matches!(missing, ImportError::RequiredFieldMissing { row: 2, .. }));

        let bad_sort = ItemFieldMapper
            .map_row(&row(&[("检验项目", "厚度"), ("排序", "第一")]))
            .unwrap_err();
        assert!(bad_sort.is_row_error());

        let bad_rule = ItemFieldMapper
            .map_row(&row(&[("检验项目", "厚度"), ("生成规则", "[1,2]")]))
            .unwrap_err();
        assert!(matches!(bad_rule, ImportError::InvalidGenerationRule { .. }));

        let inactive = ItemFieldMapper
            .map_row(&row(&[("检验项目", "厚度"), ("状态", "停用")]))
            .unwrap();
        assert!(!inactive.active);
    }
}
