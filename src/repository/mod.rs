// ==========================================
// 班次 OEE 管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod area_repo;
pub mod error;
pub mod row_utils;
pub mod shift_record_repo;

// 重导出核心仓储
pub use area_repo::AreaRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use shift_record_repo::ShiftRecordRepository;
