// ==========================================
// 来料检验系统 - 导入层
// ==========================================
// 职责: 检验项目目录从 Excel/CSV 导入
// ==========================================

pub mod error;
pub mod file_parser;
pub mod item_importer;
pub mod item_mapper;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use item_importer::{ItemCatalogImporter, ItemImportSummary, RowFailure};
pub use item_mapper::ItemFieldMapper;
