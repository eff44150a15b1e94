// ==========================================
// 班次 OEE 管理系统 - 核心库
// ==========================================
// 范围: 包装线 / 压机 的班次记录与 OEE 计算
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - OEE 计算与汇总
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AreaKind, OeeStatus, OeeThresholds, ShiftCode};

// 领域实体
pub use domain::{Area, NewArea, RecordFilter, ShiftMetrics, ShiftRecord, ShiftRecordInput};

// 引擎
pub use engine::{OeeAggregator, OeeAverages, OeeCalculator, OeeOutcome};

// API
pub use api::{AreaApi, DashboardApi, ExportApi, ShiftRecordApi, SubmissionMode};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "班次 OEE 管理系统";
