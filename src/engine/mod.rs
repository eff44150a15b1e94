// ==========================================
// 班次 OEE 管理系统 - 引擎层
// ==========================================
// 职责: 实现 OEE 计算与汇总规则,不拼 SQL
// 红线: Engine 无副作用, 持久化由 Repository 负责
// ==========================================

pub mod oee_aggregator;
pub mod oee_calculator;

// 重导出核心引擎
pub use oee_aggregator::{round1, OeeAggregator, OeeAverages};
pub use oee_calculator::{actual_hours, OeeCalculator, OeeOutcome, DEFAULT_NOMINAL_SHIFT_HOURS};
