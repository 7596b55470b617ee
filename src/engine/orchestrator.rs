// ==========================================
// 来料检验系统 - 检验数据编排
// ==========================================
// 职责: 串联样本生成与判定，组装报告草稿
// 红线: 不访问数据库，报告编号由仓储层在事务内分配
// ==========================================

use crate::domain::inspection::{ArrivalRecord, GeneratedSample, InspectionItem, InspectionReport};
use crate::domain::types::MaterialCategory;
use crate::engine::judgment::{aggregate_judgment, JudgmentConfig, JudgmentEngine};
use crate::engine::sample_generator::{GeneratorConfig, SampleValueGenerator};
use crate::engine::sampling::SamplingConfig;
use chrono::NaiveDate;
use rand::Rng;
use tracing::debug;

/// InspectionOrchestrator - 检验数据编排器
#[derive(Debug, Clone, Default)]
pub struct InspectionOrchestrator {
    generator: SampleValueGenerator,
    judgment: JudgmentEngine,
    sampling: SamplingConfig,
}

impl InspectionOrchestrator {
    pub fn new(
        generator_config: GeneratorConfig,
        judgment_config: JudgmentConfig,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            generator: SampleValueGenerator::new(generator_config),
            judgment: JudgmentEngine::new(judgment_config),
            sampling,
        }
    }

    pub fn generator(&self) -> &SampleValueGenerator {
        &self.generator
    }

    pub fn judgment(&self) -> &JudgmentEngine {
        &self.judgment
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    /// 为单个项目生成样本并判定
    pub fn generate_detail<R: Rng + ?Sized>(
        &self,
        item: &InspectionItem,
        count: usize,
        rng: &mut R,
    ) -> GeneratedSample {
        let values = self.generator.generate_with_rng(item, count, rng);
        let judgment = self.judgment.judge(item, values.as_slice());
        GeneratedSample {
            item_id: item.id,
            item_name: item.name.clone(),
            values,
            judgment,
            unit: item.unit.clone(),
        }
    }

    /// 为一组项目生成样本并判定（保持项目顺序）
    pub fn generate_details(&self, items: &[InspectionItem], count: usize) -> Vec<GeneratedSample> {
        let mut rng = rand::thread_rng();
        items
            .iter()
            .map(|item| self.generate_detail(item, count, &mut rng))
            .collect()
    }

    /// 到货记录的物料类别: 显式给出则用之，否则按品名推断
    pub fn resolve_category(arrival: &ArrivalRecord) -> String {
        match arrival.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => MaterialCategory::infer(&arrival.product_name).as_str().to_string(),
        }
    }

    /// 组装报告草稿（report_no 为空，由仓储层分配）
    ///
    /// 只使用类别严格匹配的启用项目，按排序号排列。
    pub fn build_report(
        &self,
        arrival: &ArrivalRecord,
        catalog: &[InspectionItem],
        inspector: &str,
        inspection_date: NaiveDate,
    ) -> InspectionReport {
        let category = Self::resolve_category(arrival);
        let sample_size = self.sampling.sample_size_for_packages(arrival.package_count);

        let mut items: Vec<&InspectionItem> = catalog
            .iter()
            .filter(|i| i.active && i.applies_to(&category, true))
            .collect();
        items.sort_by_key(|i| i.sort_order);

        let mut rng = rand::thread_rng();
        let details: Vec<GeneratedSample> = items
            .into_iter()
            .map(|item| self.generate_detail(item, sample_size, &mut rng))
            .collect();
        let report_result = aggregate_judgment(&details);

        debug!(
            product = %arrival.product_name,
            category = %category,
            sample_size,
            items = details.len(),
            result = %report_result,
            "报告草稿已生成"
        );

        InspectionReport {
            report_no: String::new(),
            supplier: arrival.supplier.clone(),
            product_name: arrival.product_name.clone(),
            specification: arrival.specification.clone(),
            material_category: category,
            quantity: arrival.quantity,
            package_count: arrival.package_count,
            arrival_date: arrival.inbound_date,
            sampling_quantity: sample_size,
            po_number: arrival.po_number.clone(),
            report_result,
            inspector: inspector.to_string(),
            inspection_date,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Judgment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> Vec<InspectionItem> {
        vec![
            InspectionItem::new(1, "克重").with_criteria("195~205").with_category("纸张").with_sort_order(2),
            InspectionItem::new(2, "外观").with_category("纸张").with_sort_order(1),
            InspectionItem::new(3, "初粘性").with_criteria("≥ 8#").with_category("膜类"),
            InspectionItem::new(4, "气味").with_category("通用"),
            InspectionItem::new(5, "水分").with_criteria("≤ 8").with_category("纸张").with_active(false),
        ]
    }

    fn arrival(product: &str, packages: i32) -> ArrivalRecord {
        ArrivalRecord {
            supplier: "供应商A".to_string(),
            product_name: product.to_string(),
            package_count: packages,
            quantity: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_detail_judges_values() {
        let orchestrator = InspectionOrchestrator::default();
        let item = InspectionItem::new(9, "剥离力").with_criteria("2.2~3.0").with_unit("N");
        let detail = orchestrator.generate_detail(&item, 5, &mut StdRng::seed_from_u64(3));
        assert_eq!(detail.item_id, 9);
        assert_eq!(detail.values.len(), 5);
        assert_eq!(detail.judgment, Judgment::Pass);
        assert_eq!(detail.unit, "N");
    }

    #[test]
    fn test_enum_failure_propagates_to_detail() {
        let orchestrator = InspectionOrchestrator::default();
        let item = InspectionItem::new(1, "外观").with_rule(r#"{"type":"enum","passRate":0}"#);
        let details = orchestrator.generate_details(&[item], 3);
        assert_eq!(details[0].judgment, Judgment::Fail);
    }

    #[test]
    fn test_resolve_category() {
        assert_eq!(InspectionOrchestrator::resolve_category(&arrival("白卡纸", 0)), "纸张");
        let mut explicit = arrival("白卡纸", 0);
        explicit.category = Some("化学辅料".to_string());
        assert_eq!(InspectionOrchestrator::resolve_category(&explicit), "化学辅料");
        explicit.category = Some("  ".to_string());
        assert_eq!(InspectionOrchestrator::resolve_category(&explicit), "纸张");
    }

    #[test]
    fn test_build_report_uses_strict_active_items() {
        let orchestrator = InspectionOrchestrator::default();
        let report = orchestrator.build_report(
            &arrival("双胶纸", 40),
            &catalog(),
            "张三",
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        );

        assert_eq!(report.material_category, "纸张");
        assert_eq!(report.sampling_quantity, 5);
        let names: Vec<&str> = report.details.iter().map(|d| d.item_name.as_str()).collect();
        assert_eq!(names, vec!["外观", "克重"]);
        assert!(report.details.iter().all(|d| d.values.len() == 5));
        assert_eq!(report.report_result, Judgment::Pass);
        assert!(report.report_no.is_empty());
    }
}
