// ==========================================
// 班次 OEE 管理系统 - 班次记录领域模型
// ==========================================
// 唯一约束: (area_id, shift_date, shift)
// 派生字段 availability / performance / quality / oee
// 在每次创建或更新时重新计算，调用方不直接提供
// ==========================================

use crate::domain::types::{AreaKind, ShiftCode};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 质量默认值（未评估视为 100%）
pub const DEFAULT_QUALITY: f64 = 100.0;

// ==========================================
// ShiftMetrics - 区域类型专属字段
// ==========================================
// 包装线与压机的专属字段互斥，用标签联合表达，
// 不允许在包装记录上出现电表读数，反之亦然
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftMetrics {
    Packaging {
        product_format: Option<String>, // 产品规格
        output_kg: Option<f64>,         // 产量 (kg)
    },
    Press {
        initial_reading: Option<f64>, // 班初计数表读数
        final_reading: Option<f64>,   // 班末计数表读数
        stop_count: u32,              // 停机次数
        stop_reason: Option<String>,  // 停机原因
    },
}

impl ShiftMetrics {
    /// 指定区域类型的空字段组
    pub fn empty_for(kind: AreaKind) -> Self {
        match kind {
            AreaKind::Packaging => ShiftMetrics::Packaging {
                product_format: None,
                output_kg: None,
            },
            AreaKind::Press => ShiftMetrics::Press {
                initial_reading: None,
                final_reading: None,
                stop_count: 0,
                stop_reason: None,
            },
        }
    }

    /// 字段组所属的区域类型
    pub fn kind(&self) -> AreaKind {
        match self {
            ShiftMetrics::Packaging { .. } => AreaKind::Packaging,
            ShiftMetrics::Press { .. } => AreaKind::Press,
        }
    }

    /// 班内计数表产量 (final - initial)，任一读数缺失返回 None
    pub fn meter_output(&self) -> Option<f64> {
        match self {
            ShiftMetrics::Press {
                initial_reading: Some(initial),
                final_reading: Some(fin),
                ..
            } => Some(fin - initial),
            _ => None,
        }
    }
}

// ==========================================
// OeeIndicators - OEE 四项指标（百分比）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OeeIndicators {
    pub availability: f64, // 时间开动率
    pub performance: f64,  // 性能开动率
    pub quality: f64,      // 合格品率
    pub oee: f64,          // 综合效率
}

impl Default for OeeIndicators {
    fn default() -> Self {
        Self {
            availability: 0.0,
            performance: 0.0,
            quality: DEFAULT_QUALITY,
            oee: 0.0,
        }
    }
}

// ==========================================
// RequiredInput - 计算 OEE 的必填输入
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredInput {
    StartTime,
    EndTime,
    PlannedOutput,
    ActualOutput,
}

impl fmt::Display for RequiredInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredInput::StartTime => write!(f, "start_time"),
            RequiredInput::EndTime => write!(f, "end_time"),
            RequiredInput::PlannedOutput => write!(f, "planned_output"),
            RequiredInput::ActualOutput => write!(f, "actual_output"),
        }
    }
}

// ==========================================
// ShiftRecord - 班次记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRecord {
    // ===== 主键 =====
    pub record_id: String,
    pub area_id: String,
    pub shift_date: NaiveDate,
    pub shift: ShiftCode,

    // ===== 公共生产数据 =====
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub planned_output: Option<f64>,
    pub actual_output: Option<f64>,
    pub notes: Option<String>,
    pub created_by: Option<String>, // 提交人（由外部认证模块提供）

    // ===== 区域专属字段 =====
    pub metrics: ShiftMetrics,

    // ===== 派生字段 (自动计算) =====
    pub availability: f64,
    pub performance: f64,
    pub quality: f64, // 可人工调整，默认 100
    pub oee: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftRecord {
    /// 当前派生指标
    pub fn indicators(&self) -> OeeIndicators {
        OeeIndicators {
            availability: self.availability,
            performance: self.performance,
            quality: self.quality,
            oee: self.oee,
        }
    }

    /// 覆盖派生指标
    pub fn set_indicators(&mut self, indicators: OeeIndicators) {
        self.availability = indicators.availability;
        self.performance = indicators.performance;
        self.quality = indicators.quality;
        self.oee = indicators.oee;
    }

    /// 有效计划产量（0 视为未填写）
    pub fn effective_planned_output(&self) -> Option<f64> {
        non_zero(self.planned_output)
    }

    /// 有效实际产量（0 视为未填写）
    pub fn effective_actual_output(&self) -> Option<f64> {
        non_zero(self.actual_output)
    }

    /// 缺失的必填输入（空表示可计算）
    pub fn missing_inputs(&self) -> Vec<RequiredInput> {
        let mut missing = Vec::new();
        if self.start_time.is_none() {
            missing.push(RequiredInput::StartTime);
        }
        if self.end_time.is_none() {
            missing.push(RequiredInput::EndTime);
        }
        if self.effective_planned_output().is_none() {
            missing.push(RequiredInput::PlannedOutput);
        }
        if self.effective_actual_output().is_none() {
            missing.push(RequiredInput::ActualOutput);
        }
        missing
    }
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

impl fmt::Display for ShiftRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.area_id, self.shift_date, self.shift)
    }
}

// ==========================================
// ShiftRecordInput - 操作员提交的输入字段
// ==========================================
// 创建与更新共用；派生字段中只有 quality 可由操作员提供
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRecordInput {
    pub area_id: String,
    pub shift_date: NaiveDate,
    pub shift: ShiftCode,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub planned_output: Option<f64>,
    pub actual_output: Option<f64>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub metrics: ShiftMetrics,
    pub quality: Option<f64>,
}

// ==========================================
// RecordFilter - 记录查询条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub area_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub shift: Option<ShiftCode>,
}

impl RecordFilter {
    pub fn for_area(area_id: &str) -> Self {
        Self {
            area_id: Some(area_id.to_string()),
            ..Self::default()
        }
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date_from: Some(date),
            date_to: Some(date),
            ..Self::default()
        }
    }
}
