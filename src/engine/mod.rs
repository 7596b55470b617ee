// ==========================================
// 来料检验系统 - 引擎层
// ==========================================
// 职责: 验收标准解析、生成规则解释、样本生成、判定、报告编号
// 红线: Engine 不访问数据库，所有计算为纯函数（随机源除外）
// ==========================================

pub mod criteria_parser;
pub mod generation_rule;
pub mod judgment;
pub mod numeric;
pub mod orchestrator;
pub mod report_number;
pub mod sample_generator;
pub mod sampling;

// 重导出核心引擎
pub use criteria_parser::{infer_precision, parse_criteria, ParsedCriteria};
pub use generation_rule::{interpret_rule, GenerationRule};
pub use judgment::{aggregate_judgment, judge, JudgmentConfig, JudgmentEngine};
pub use orchestrator::InspectionOrchestrator;
pub use report_number::{next_report_number, ReportNumberGenerator};
pub use sample_generator::{generate_samples, GeneratorConfig, SampleValueGenerator};
pub use sampling::{SampleSizeTier, SamplingConfig};
