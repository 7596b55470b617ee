// ==========================================
// 来料检验系统 - 核心库
// ==========================================
// 职责: 验收标准解析、生成规则解释、样本生成、判定、报告编号
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则（纯计算）
pub mod engine;

// 导入层 - 检验项目目录
pub mod importer;

// 配置层 - 检验参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型与实体
pub use domain::{
    ArrivalRecord, GeneratedSample, InspectionItem, InspectionReport, ItemKind, Judgment,
    MaterialCategory,
};

// 引擎
pub use engine::{
    aggregate_judgment, generate_samples, interpret_rule, judge, next_report_number,
    parse_criteria, GenerationRule, InspectionOrchestrator, JudgmentEngine, ParsedCriteria,
    ReportNumberGenerator, SampleValueGenerator,
};

// 配置
pub use config::InspectionConfig;

// API
pub use api::{ApiError, ApiResult, BatchGenerateResult, InspectionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "来料检验系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
