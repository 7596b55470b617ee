// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、检验项目目录准备等功能
// ==========================================

#![allow(dead_code)]

use incoming_inspection::db::{init_schema, open_sqlite_connection};
use incoming_inspection::repository::InspectionItemRepository;
use incoming_inspection::InspectionItem;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是合法 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    Ok(Arc::new(Mutex::new(open_sqlite_connection(db_path)?)))
}

/// 写入一组检验项目，返回项目ID（按输入顺序）
pub fn seed_items(
    conn: Arc<Mutex<Connection>>,
    items: &[InspectionItem],
) -> Result<Vec<i64>, Box<dyn Error>> {
    let repo = InspectionItemRepository::new(conn);
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        ids.push(repo.upsert(item)?);
    }
    Ok(ids)
}
