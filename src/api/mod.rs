// ==========================================
// 来料检验系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供上层（命令行/服务端路由）调用
// ==========================================

pub mod error;
pub mod inspection_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use inspection_api::{BatchFailure, BatchGenerateResult, InspectionApi};
