// ==========================================
// 来料检验系统 - 领域层
// ==========================================
// 职责: 领域实体与类型，不含解析/生成规则
// ==========================================

pub mod inspection;
pub mod types;

// 重导出核心类型
pub use inspection::{ArrivalRecord, GeneratedSample, InspectionItem, InspectionReport, GENERAL_CATEGORY};
pub use types::{ItemKind, Judgment, MaterialCategory};
