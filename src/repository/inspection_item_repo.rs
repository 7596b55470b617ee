// ==========================================
// 来料检验系统 - 检验项目仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: inspection_item
// ==========================================

use crate::domain::inspection::{InspectionItem, GENERAL_CATEGORY};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT id, item_name, inspection_standard, acceptance_criteria, generation_rule,
           unit, material_category, sort_order, status
    FROM inspection_item
"#;

// ==========================================
// InspectionItemRepository - 检验项目仓储
// ==========================================
pub struct InspectionItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InspectionItemRepository {
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

    fn map_row(row: &Row<'_>) -> rusqlite::Result<InspectionItem> {
        let rule: Option<String> = row.get(4)?;
        let mut item = InspectionItem::new(row.get(0)?, row.get::<_, String>(1)?)
            .with_standard(row.get::<_, String>(2)?)
            .with_criteria(row.get::<_, String>(3)?)
            .with_unit(row.get::<_, String>(5)?)
            .with_category(row.get::<_, String>(6)?)
            .with_sort_order(row.get(7)?)
            .with_active(row.get::<_, i32>(8)? == 1);
        if let Some(rule) = rule {
            item = item.with_rule(rule);
        }
        Ok(item)
    }

    /// 插入或更新检验项目（按 项目名称 + 物料类别 匹配）
    ///
    /// # 返回
    /// - Ok(i64): 项目ID
    pub fn upsert(&self, item: &InspectionItem) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO inspection_item (
                item_name, inspection_standard, acceptance_criteria, generation_rule,
                unit, material_category, sort_order, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(item_name, material_category) DO UPDATE SET
                inspection_standard = excluded.inspection_standard,
                acceptance_criteria = excluded.acceptance_criteria,
                generation_rule = excluded.generation_rule,
                unit = excluded.unit,
                sort_order = excluded.sort_order,
                status = excluded.status
            "#,
            params![
                item.name,
                item.inspection_standard,
                item.acceptance_criteria,
                item.generation_rule,
                item.unit,
                item.material_category,
                item.sort_order,
                if item.active { 1 } else { 0 },
            ],
        )?;

        let id = conn.query_row(
            "SELECT id FROM inspection_item WHERE item_name = ?1 AND material_category = ?2",
            params![item.name, item.material_category],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// 按ID查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<InspectionItem>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let item = conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        Ok(item)
    }

    /// 查询所有启用项目（按排序号）
    pub fn find_active(&self) -> RepositoryResult<Vec<InspectionItem>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE status = 1 ORDER BY sort_order ASC, id ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// 查询适用于某物料类别的启用项目
    ///
    /// # 参数
    /// - `category`: 物料类别
    /// - `strict`: true 时仅类别完全一致；false 时另含空类别与"通用"项目
    pub fn find_for_category(
        &self,
        category: &str,
        strict: bool,
    ) -> RepositoryResult<Vec<InspectionItem>> {
        let conn = self.get_conn()?;
        let sql = if strict {
            format!(
                "{} WHERE status = 1 AND material_category = ?1 ORDER BY sort_order ASC, id ASC",
                SELECT_COLUMNS
            )
        } else {
            format!(
                "{} WHERE status = 1 AND (material_category = ?1 OR material_category = '' OR material_category = ?2) \
                 ORDER BY sort_order ASC, id ASC",
                SELECT_COLUMNS
            )
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = if strict {
            stmt.query_map(params![category], Self::map_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![category, GENERAL_CATEGORY], Self::map_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(rows)
    }

    /// 停用项目
    pub fn deactivate(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("UPDATE inspection_item SET status = 0 WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "InspectionItem".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
