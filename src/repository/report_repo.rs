// ==========================================
// 来料检验系统 - 检验报告仓储
// ==========================================
// 红线: Repository 不含业务逻辑（编号规则由调用方以闭包传入）
// 表: inspection_report / inspection_report_detail
// 并发: 读当前最大号 → 计算下一个号 → 写入 在同一个
//       IMMEDIATE 事务内完成，配合 report_no 唯一约束防止重号
// ==========================================

use crate::domain::inspection::{GeneratedSample, InspectionReport};
use crate::domain::types::Judgment;
use crate::engine::report_number::REPORT_NO_LEN;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

const DATE_FMT: &str = "%Y-%m-%d";

// 报告主表原始行
struct ReportRow {
    id: i64,
    report_no: String,
    supplier: String,
    product_name: String,
    specification: Option<String>,
    material_category: String,
    quantity: f64,
    package_count: i32,
    arrival_date: Option<String>,
    sampling_quantity: i64,
    po_number: Option<String>,
    report_result: String,
    inspector: String,
    inspection_date: String,
}

// ==========================================
// InspectionReportRepository - 检验报告仓储
// ==========================================
pub struct InspectionReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InspectionReportRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn query_max_report_no(conn: &Connection, prefix: &str) -> RepositoryResult<Option<String>> {
        let max = conn
            .query_row(
                r#"
                SELECT report_no
                FROM inspection_report
                WHERE report_no LIKE ?1 || '%' AND LENGTH(report_no) = ?2
                ORDER BY report_no DESC
                LIMIT 1
                "#,
                params![prefix, REPORT_NO_LEN as i64],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(max)
    }

    /// 查询指定前缀下最大的 10 位报告编号
    pub fn find_max_report_no(&self, prefix: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        Self::query_max_report_no(&conn, prefix)
    }

    /// 在事务内分配报告编号并写入报告
    ///
    /// # 参数
    /// - `prefix`: 编号前缀（TJ + 类型码 + 年月）
    /// - `report`: 报告内容（report_no 字段忽略）
    /// - `allocate`: 由当前最大编号计算下一个编号
    ///
    /// # 返回
    /// - Ok(String): 实际写入的报告编号
    /// - Err(BusinessRuleViolation): 计算出的编号不是 10 位（当月流水号用尽）
    pub fn insert_with_allocated_number<F>(
        &self,
        prefix: &str,
        report: &InspectionReport,
        allocate: F,
    ) -> RepositoryResult<String>
    where
        F: FnOnce(Option<&str>) -> String,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let current_max = Self::query_max_report_no(&tx, prefix)?;
        let report_no = allocate(current_max.as_deref());
        if report_no.len() != REPORT_NO_LEN || !report_no.starts_with(prefix) {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "报告编号 {} 不符合 {} 前缀的 10 位格式（当月流水号可能已用尽）",
                report_no, prefix
            )));
        }

        tx.execute(
            r#"
            INSERT INTO inspection_report (
                report_no, supplier, product_name, specification, material_category,
                quantity, package_count, arrival_date, sampling_quantity, po_number,
                report_result, inspector, inspection_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                report_no,
                report.supplier,
                report.product_name,
                report.specification,
                report.material_category,
                report.quantity,
                report.package_count,
                report.arrival_date.map(|d| d.format(DATE_FMT).to_string()),
                report.sampling_quantity as i64,
                report.po_number,
                report.report_result.as_str(),
                report.inspector,
                report.inspection_date.format(DATE_FMT).to_string(),
            ],
        )?;
        let report_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO inspection_report_detail (
                    report_id, item_id, item_name, sample_values, judgment, unit
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for detail in &report.details {
                stmt.execute(params![
                    report_id,
                    detail.item_id,
                    detail.item_name,
                    serde_json::to_string(&detail.values)?,
                    detail.judgment.as_str(),
                    detail.unit,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(report_no = %report_no, details = report.details.len(), "检验报告已写入");
        Ok(report_no)
    }

    /// 按报告编号查询报告（含明细）
    pub fn find_by_report_no(&self, report_no: &str) -> RepositoryResult<Option<InspectionReport>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT id, report_no, supplier, product_name, specification, material_category,
                       quantity, package_count, arrival_date, sampling_quantity, po_number,
                       report_result, inspector, inspection_date
                FROM inspection_report
                WHERE report_no = ?1
                "#,
                params![report_no],
                |row| {
                    Ok(ReportRow {
                        id: row.get(0)?,
                        report_no: row.get(1)?,
                        supplier: row.get(2)?,
                        product_name: row.get(3)?,
                        specification: row.get(4)?,
                        material_category: row.get(5)?,
                        quantity: row.get(6)?,
                        package_count: row.get(7)?,
                        arrival_date: row.get(8)?,
                        sampling_quantity: row.get(9)?,
                        po_number: row.get(10)?,
                        report_result: row.get(11)?,
                        inspector: row.get(12)?,
                        inspection_date: row.get(13)?,
                    })
                },
            )
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let details = Self::load_details(&conn, row.id)?;
        let inspection_date = NaiveDate::parse_from_str(&row.inspection_date, DATE_FMT).map_err(|e| {
            RepositoryError::FieldValueError {
                field: "inspection_date".to_string(),
                message: format!("{}: {}", row.inspection_date, e),
            }
        })?;

        Ok(Some(InspectionReport {
            report_no: row.report_no,
            supplier: row.supplier,
            product_name: row.product_name,
            specification: row.specification,
            material_category: row.material_category,
            quantity: row.quantity,
            package_count: row.package_count,
            arrival_date: row
                .arrival_date
                .and_then(|s| NaiveDate::parse_from_str(&s, DATE_FMT).ok()),
            sampling_quantity: row.sampling_quantity.max(0) as usize,
            po_number: row.po_number,
            report_result: Judgment::from_str(&row.report_result),
            inspector: row.inspector,
            inspection_date,
            details,
        }))
    }

    fn load_details(conn: &Connection, report_id: i64) -> RepositoryResult<Vec<GeneratedSample>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT item_id, item_name, sample_values, judgment, unit
            FROM inspection_report_detail
            WHERE report_id = ?1
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![report_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(item_id, item_name, raw_values, judgment, unit)| {
                // 样本值 JSON 损坏时按空列表处理
                let values = serde_json::from_str::<Vec<String>>(&raw_values).unwrap_or_else(|e| {
                    warn!(report_id, item_id, error = %e, "样本值 JSON 无法解析，按空列表处理");
                    Vec::new()
                });
                GeneratedSample {
                    item_id,
                    item_name,
                    values,
                    judgment: Judgment::from_str(&judgment),
                    unit,
                }
            })
            .collect())
    }

    /// 列出指定前缀下的全部报告编号（升序）
    pub fn list_report_nos(&self, prefix: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT report_no FROM inspection_report WHERE report_no LIKE ?1 || '%' ORDER BY report_no ASC",
        )?;
        let nos = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nos)
    }
}
