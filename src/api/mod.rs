// ==========================================
// 班次 OEE 管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 供命令行/外部表现层调用
// ==========================================

pub mod area_api;
pub mod dashboard_api;
pub mod error;
pub mod export_api;
pub mod shift_record_api;
pub mod validator;

// 重导出核心类型
pub use area_api::AreaApi;
pub use dashboard_api::{AreaOeeStats, DashboardApi, DashboardSummary};
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use export_api::ExportApi;
pub use shift_record_api::{ShiftRecordApi, ShiftRecordResponse};
pub use validator::SubmissionMode;
