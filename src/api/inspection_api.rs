// ==========================================
// 来料检验系统 - 检验 API
// ==========================================
// 职责: 验收标准预览、交互生成样本、判定、报告编号预览、
//       批量生成报告、报告查询、检验项目导入
// 并发: 报告编号在仓储层 IMMEDIATE 事务内分配
// ==========================================

use crate::api::error::{require_non_blank, ApiError, ApiResult};
use crate::config::{ConfigManager, InspectionConfig};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::inspection::{ArrivalRecord, GeneratedSample, InspectionReport};
use crate::domain::types::Judgment;
use crate::engine::criteria_parser::{parse_criteria, ParsedCriteria};
use crate::engine::orchestrator::InspectionOrchestrator;
use crate::engine::report_number::ReportNumberGenerator;
use crate::importer::{ItemCatalogImporter, ItemImportSummary};
use crate::repository::{InspectionItemRepository, InspectionReportRepository, RepositoryError};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// 编号冲突时的最大尝试次数
const MAX_ALLOCATION_ATTEMPTS: usize = 3;

/// 单条到货记录的生成失败
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// 在输入列表中的下标
    pub index: usize,
    pub product_name: String,
    pub reason: String,
}

/// 批量生成结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchGenerateResult {
    pub success_count: usize,
    pub fail_count: usize,
    /// 成功生成的报告编号（按输入顺序）
    pub report_nos: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<BatchFailure>,
}

impl BatchGenerateResult {
    pub fn message(&self) -> String {
        format!(
            "批量生成完成: 成功 {} 条, 失败 {} 条",
            self.success_count, self.fail_count
        )
    }
}

// ==========================================
// InspectionApi - 检验 API
// ==========================================
pub struct InspectionApi {
    conn: Arc<Mutex<Connection>>,
    item_repo: Arc<InspectionItemRepository>,
    report_repo: Arc<InspectionReportRepository>,
    orchestrator: InspectionOrchestrator,
    report_numbers: ReportNumberGenerator,
    default_sample_count: usize,
}

impl InspectionApi {
    /// 从已有连接创建（建表 + 从 config_kv 加载检验参数）
    pub fn new(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(format!("锁获取失败: {}", e)))?;
            init_schema(&guard).map_err(RepositoryError::from)?;
        }

        let config = ConfigManager::from_connection(conn.clone())
            .and_then(|mgr| mgr.load_inspection_config())
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        Ok(Self::with_config(conn, config))
    }

    /// 打开数据库文件并创建
    pub fn from_db_path(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Self::new(Arc::new(Mutex::new(conn)))
    }

    /// 使用显式参数创建（不读取 config_kv，调用方需保证已建表）
    pub fn with_config(conn: Arc<Mutex<Connection>>, config: InspectionConfig) -> Self {
        Self {
            item_repo: Arc::new(InspectionItemRepository::new(conn.clone())),
            report_repo: Arc::new(InspectionReportRepository::new(conn.clone())),
            conn,
            orchestrator: InspectionOrchestrator::new(
                config.generator,
                config.judgment,
                config.sampling,
            ),
            report_numbers: ReportNumberGenerator::new(),
            default_sample_count: config.default_sample_count.max(1),
        }
    }

    // ==========================================
    // 单项工具
    // ==========================================

    /// 解析验收标准（预览用）
    pub fn parse_criteria(&self, criteria: &str) -> ParsedCriteria {
        parse_criteria(criteria)
    }

    /// 交互生成: 为某物料类别的适用项目生成样本并判定
    ///
    /// 项目选择含空类别与"通用"项目；类别为空时只取这两类。
    /// 样本数缺省或为 0 时取配置值。
    pub fn generate_data(
        &self,
        category: &str,
        sample_size: Option<usize>,
    ) -> ApiResult<Vec<GeneratedSample>> {
        let count = sample_size.filter(|n| *n > 0).unwrap_or(self.default_sample_count);

        let items = self.item_repo.find_for_category(category.trim(), false)?;
        if items.is_empty() {
            warn!(category, "该物料类别没有适用的检验项目");
        }
        Ok(self.orchestrator.generate_details(&items, count))
    }

    /// 对人工录入的样本值进行判定
    pub fn judge_values(&self, item_id: i64, values: &[String]) -> ApiResult<Judgment> {
        let item = self
            .item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("检验项目(id={})不存在", item_id)))?;
        Ok(self.orchestrator.judgment().judge(&item, values))
    }

    /// 预览下一个报告编号（不占号）
    pub fn preview_report_number(&self, category: &str, date: NaiveDate) -> ApiResult<String> {
        let prefix = ReportNumberGenerator::prefix(category, date);
        let current_max = self.report_repo.find_max_report_no(&prefix)?;
        Ok(self.report_numbers.next(category, date, current_max.as_deref()))
    }

    // ==========================================
    // 报告生成
    // ==========================================

    /// 为单条到货记录生成并保存报告
    pub fn create_report(
        &self,
        arrival: &ArrivalRecord,
        inspector: &str,
        inspection_date: NaiveDate,
    ) -> ApiResult<InspectionReport> {
        require_non_blank("检验员", inspector)?;
        let catalog = self.item_repo.find_active()?;
        self.generate_and_save(arrival, &catalog, inspector, inspection_date)
    }

    /// 批量生成报告: 每条到货记录独立成败，失败记录后继续
    pub fn batch_generate(
        &self,
        arrivals: &[ArrivalRecord],
        inspector: &str,
        today: NaiveDate,
    ) -> ApiResult<BatchGenerateResult> {
        if arrivals.is_empty() {
            return Err(ApiError::InvalidInput("请选择至少一条记录".to_string()));
        }
        require_non_blank("检验员", inspector)?;

        // 项目目录只读一次
        let catalog = self.item_repo.find_active()?;
        let mut result = BatchGenerateResult::default();

        for (index, arrival) in arrivals.iter().enumerate() {
            match self.generate_and_save(arrival, &catalog, inspector, today) {
                Ok(report) => {
                    result.success_count += 1;
                    result.report_nos.push(report.report_no);
                }
                Err(e) => {
                    error!(index, product = %arrival.product_name, error = %e, "到货记录生成报告失败");
                    result.fail_count += 1;
                    result.failures.push(BatchFailure {
                        index,
                        product_name: arrival.product_name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            success = result.success_count,
            failed = result.fail_count,
            "{}",
            result.message()
        );
        Ok(result)
    }

    fn generate_and_save(
        &self,
        arrival: &ArrivalRecord,
        catalog: &[crate::domain::inspection::InspectionItem],
        inspector: &str,
        inspection_date: NaiveDate,
    ) -> ApiResult<InspectionReport> {
        require_non_blank("品名", &arrival.product_name)?;

        let mut report = self
            .orchestrator
            .build_report(arrival, catalog, inspector, inspection_date);
        if report.details.is_empty() {
            warn!(
                product = %arrival.product_name,
                category = %report.material_category,
                "没有匹配的检验项目，报告不含明细"
            );
        }

        let category = report.material_category.clone();
        let prefix = ReportNumberGenerator::prefix(&category, inspection_date);

        let mut attempt = 0;
        let report_no = loop {
            attempt += 1;
            let outcome = self.report_repo.insert_with_allocated_number(&prefix, &report, |current| {
                self.report_numbers.next(&category, inspection_date, current)
            });
            match outcome {
                Ok(no) => break no,
                Err(RepositoryError::UniqueConstraintViolation(msg))
                    if attempt < MAX_ALLOCATION_ATTEMPTS =>
                {
                    warn!(attempt, error = %msg, "报告编号冲突，重新分配");
                }
                Err(e) => return Err(e.into()),
            }
        };

        report.report_no = report_no;
        Ok(report)
    }

    // ==========================================
    // 查询与导入
    // ==========================================

    /// 按编号查询报告
    pub fn get_report(&self, report_no: &str) -> ApiResult<InspectionReport> {
        self.report_repo
            .find_by_report_no(report_no)?
            .ok_or_else(|| ApiError::NotFound(format!("报告{}不存在", report_no)))
    }

    /// 从 CSV/Excel 导入检验项目目录
    pub fn import_items(&self, file_path: &str) -> ApiResult<ItemImportSummary> {
        let importer = ItemCatalogImporter::new(InspectionItemRepository::new(self.conn.clone()));
        Ok(importer.import_from_file(file_path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inspection::InspectionItem;

    fn api() -> InspectionApi {
        let conn = Connection::open_in_memory().unwrap();
        InspectionApi::new(Arc::new(Mutex::new(conn))).unwrap()
    }

    fn jan_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_generate_data_uses_loose_selection() {
        let api = api();
        api.item_repo
            .upsert(&InspectionItem::new(0, "外观").with_category("通用").with_criteria("无破损"))
            .unwrap();
        api.item_repo
            .upsert(&InspectionItem::new(0, "克重").with_category("纸张").with_criteria("240-260"))
            .unwrap();

        let details = api.generate_data("纸张", Some(4)).unwrap();
        assert_eq!(details.len(), 2);
        assert!(details.iter().all(|d| d.values.len() == 4));

        let defaulted = api.generate_data("纸张", None).unwrap();
        assert!(defaulted.iter().all(|d| d.values.len() == 5));

        let zero = api.generate_data("纸张", Some(0)).unwrap();
        assert!(zero.iter().all(|d| d.values.len() == 5));
    }

    #[test]
    fn test_generate_data_blank_category_takes_general_items() {
        let api = api();
        api.item_repo
            .upsert(&InspectionItem::new(0, "外观").with_category("通用").with_criteria("无破损"))
            .unwrap();
        api.item_repo
            .upsert(&InspectionItem::new(0, "气味").with_criteria("无异味"))
            .unwrap();
        api.item_repo
            .upsert(&InspectionItem::new(0, "克重").with_category("纸张").with_criteria("240-260"))
            .unwrap();

        let details = api.generate_data("  ", Some(2)).unwrap();
        let mut names: Vec<&str> = details.iter().map(|d| d.item_name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["外观", "气味"]);
    }

    #[test]
    fn test_judge_values_and_missing_item() {
        let api = api();
        let id = api
            .item_repo
            .upsert(&InspectionItem::new(0, "外观").with_criteria("无破损"))
            .unwrap();
        let ok = api.judge_values(id, &["OK".to_string(), "无破损".to_string()]).unwrap();
        assert_eq!(ok, Judgment::Pass);
        let bad = api.judge_values(id, &["破损".to_string()]).unwrap();
        assert_eq!(bad, Judgment::Fail);
        assert!(matches!(api.judge_values(id + 1, &[]), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_batch_generate_allocates_sequential_numbers() {
        let api = api();
        api.item_repo
            .upsert(&InspectionItem::new(0, "克重").with_category("纸张").with_criteria("240-260"))
            .unwrap();

        let arrivals = vec![
            ArrivalRecord {
                product_name: "白卡纸".to_string(),
                package_count: 10,
                ..Default::default()
            },
            ArrivalRecord {
                product_name: "  ".to_string(),
                ..Default::default()
            },
            ArrivalRecord {
                product_name: "铜版纸".to_string(),
                package_count: 60,
                ..Default::default()
            },
        ];

        assert_eq!(api.preview_report_number("纸张", jan_15()).unwrap(), "TJY2501001");
        let result = api.batch_generate(&arrivals, "张三", jan_15()).unwrap();
        assert_eq!(result.success_count, 2);
        assert_eq!(result.fail_count, 1);
        assert_eq!(result.failures[0].index, 1);
        assert_eq!(result.report_nos, vec!["TJY2501001", "TJY2501002"]);
        assert_eq!(api.preview_report_number("纸张", jan_15()).unwrap(), "TJY2501003");

        let report = api.get_report("TJY2501002").unwrap();
        assert_eq!(report.sampling_quantity, 8);
        assert_eq!(report.details.len(), 1);
        assert_eq!(report.details[0].values.len(), 8);
    }

    #[test]
    fn test_batch_generate_rejects_empty_input() {
        let api = api();
        assert!(matches!(
            api.batch_generate(&[], "张三", jan_15()),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(api.get_report("TJF2501001"), Err(ApiError::NotFound(_))));
    }
}
