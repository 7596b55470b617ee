// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use incoming_inspection::{ArrivalRecord, InspectionItem};

// ==========================================
// InspectionItem 构建器
// ==========================================

pub struct ItemBuilder {
    name: String,
    standard: String,
    criteria: String,
    rule: Option<String>,
    unit: String,
    category: String,
    sort_order: i32,
    active: bool,
}

impl ItemBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            standard: String::new(),
            criteria: String::new(),
            rule: None,
            unit: String::new(),
            category: String::new(),
            sort_order: 0,
            active: true,
        }
    }

    pub fn standard(mut self, standard: &str) -> Self {
        self.standard = standard.to_string();
        self
    }

    pub fn criteria(mut self, criteria: &str) -> Self {
        self.criteria = criteria.to_string();
        self
    }

    pub fn rule(mut self, rule: &str) -> Self {
        self.rule = Some(rule.to_string());
        self
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> InspectionItem {
        let item = InspectionItem::new(0, self.name)
            .with_standard(self.standard)
            .with_criteria(self.criteria)
            .with_unit(self.unit)
            .with_category(self.category)
            .with_sort_order(self.sort_order)
            .with_active(self.active);
        match self.rule {
            Some(rule) => item.with_rule(rule),
            None => item,
        }
    }
}

// ==========================================
// ArrivalRecord 构建器
// ==========================================

pub struct ArrivalBuilder {
    record: ArrivalRecord,
}

impl ArrivalBuilder {
    pub fn new(product_name: &str) -> Self {
        Self {
            record: ArrivalRecord {
                supplier: "测试供应商".to_string(),
                product_name: product_name.to_string(),
                quantity: 100.0,
                ..Default::default()
            },
        }
    }

    pub fn supplier(mut self, supplier: &str) -> Self {
        self.record.supplier = supplier.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.record.category = Some(category.to_string());
        self
    }

    pub fn packages(mut self, count: i32) -> Self {
        self.record.package_count = count;
        self
    }

    pub fn po(mut self, po_number: &str) -> Self {
        self.record.po_number = Some(po_number.to_string());
        self
    }

    pub fn inbound(mut self, date: NaiveDate) -> Self {
        self.record.inbound_date = Some(date);
        self
    }

    pub fn build(self) -> ArrivalRecord {
        self.record
    }
}

/// 标准检验项目目录: 纸张 / 膜类 / 通用 各若干项
pub fn standard_catalog() -> Vec<InspectionItem> {
    vec![
        ItemBuilder::new("外观").criteria("无破损、无污渍").category("通用").sort_order(0).build(),
        ItemBuilder::new("克重").criteria("240-260").unit("g/m²").category("纸张").sort_order(1).build(),
        ItemBuilder::new("厚度").criteria("0.30±0.02").unit("mm").category("纸张").sort_order(2).build(),
        ItemBuilder::new("水分").criteria("≤8%").unit("%").category("纸张").sort_order(3).build(),
        ItemBuilder::new("初粘性").criteria("≥ 8#").unit("#").category("膜类").sort_order(1).build(),
        ItemBuilder::new("持粘性").criteria("≥ 24h").category("膜类").sort_order(2).build(),
        ItemBuilder::new("宽度")
            .criteria("1000±2")
            .unit("mm")
            .category("膜类")
            .sort_order(3)
            .build(),
        ItemBuilder::new("停用项目").criteria("≥ 1").category("纸张").inactive().build(),
    ]
}
