// ==========================================
// 来料检验系统 - 检验项目目录导入器
// ==========================================
// 流程: 解析 → 映射 → 落库（按 项目名称 + 物料类别 覆盖）
// 单行错误记录后跳过，不中断整个批次
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use crate::importer::item_mapper::ItemFieldMapper;
use crate::repository::InspectionItemRepository;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 单行导入失败
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    pub row_number: usize,
    pub message: String,
}

/// 导入结果汇总
#[derive(Debug, Clone, Serialize)]
pub struct ItemImportSummary {
    pub batch_id: String,
    /// 非空白数据行数
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    pub failures: Vec<RowFailure>,
    pub elapsed_ms: u128,
}

// ==========================================
// ItemCatalogImporter - 检验项目导入器
// ==========================================
pub struct ItemCatalogImporter {
    repo: InspectionItemRepository,
    file_parser: Box<dyn FileParser>,
    mapper: ItemFieldMapper,
}

impl ItemCatalogImporter {
    pub fn new(repo: InspectionItemRepository) -> Self {
        Self::with_parser(repo, Box::new(UniversalFileParser))
    }

    pub fn with_parser(repo: InspectionItemRepository, file_parser: Box<dyn FileParser>) -> Self {
        Self {
            repo,
            file_parser,
            mapper: ItemFieldMapper,
        }
    }

    /// 从 CSV/Excel 文件导入检验项目
    ///
    /// # 返回
    /// - Ok(ItemImportSummary): 成功/失败行数及失败明细
    /// - Err: 文件级错误（不存在、格式不支持、解析失败）
    #[instrument(skip(self, file_path), fields(batch_id))]
    pub fn import_from_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ItemImportSummary> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(file_path = %file_path.as_ref().display(), "开始导入检验项目");

        let rows = self.file_parser.parse_to_raw_rows(file_path.as_ref())?;
        let total = rows.len();

        let mut imported = 0;
        let mut failures = Vec::new();
        for row in &rows {
            let outcome = self
                .mapper
                .map_row(row)
                .and_then(|item| self.repo.upsert(&item).map_err(ImportError::from));
            match outcome {
                Ok(_) => imported += 1,
                Err(e) => {
                    warn!(row = row.row_number, error = %e, "检验项目行导入失败");
                    failures.push(RowFailure {
                        row_number: row.row_number,
                        message: e.to_string(),
                    });
                }
            }
        }

        let summary = ItemImportSummary {
            batch_id,
            total,
            imported,
            failed: failures.len(),
            failures,
            elapsed_ms: start.elapsed().as_millis(),
        };
        info!(
            total = summary.total,
            imported = summary.imported,
            failed = summary.failed,
            elapsed_ms = summary.elapsed_ms as u64,
            "检验项目导入完成"
        );
        Ok(summary)
    }
}
