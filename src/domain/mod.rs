// ==========================================
// 班次 OEE 管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod area;
pub mod shift_record;
pub mod types;

// 重导出核心类型
pub use area::{Area, AreasByKind, NewArea};
pub use shift_record::{
    OeeIndicators, RecordFilter, RequiredInput, ShiftMetrics, ShiftRecord, ShiftRecordInput,
    DEFAULT_QUALITY,
};
pub use types::{AreaKind, OeeStatus, OeeThresholds, ShiftCode};
