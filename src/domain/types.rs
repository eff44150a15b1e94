// ==========================================
// 班次 OEE 管理系统 - 领域类型定义
// ==========================================
// 区域类型 / 班次代码 / OEE 等级
// ==========================================

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 区域类型 (Area Kind)
// ==========================================
// 决定性能(Performance)的计算分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaKind {
    Packaging, // 包装线
    Press,     // 压机
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl AreaKind {
    /// 从字符串解析区域类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PACKAGING" => Some(AreaKind::Packaging),
            "PRESS" => Some(AreaKind::Press),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AreaKind::Packaging => "PACKAGING",
            AreaKind::Press => "PRESS",
        }
    }
}

// ==========================================
// 班次代码 (Shift Code)
// ==========================================
// 三个固定的 8 小时名义班次:
// A 06:00-14:00 / B 14:00-22:00 / C 22:00-06:00 (跨零点)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftCode {
    A, // 早班
    B, // 中班
    C, // 夜班
}

impl fmt::Display for ShiftCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ShiftCode {
    /// 从字符串解析班次代码
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(ShiftCode::A),
            "B" => Some(ShiftCode::B),
            "C" => Some(ShiftCode::C),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ShiftCode::A => "A",
            ShiftCode::B => "B",
            ShiftCode::C => "C",
        }
    }

    /// 名义时间窗 (开始, 结束)
    ///
    /// C 班的结束时间早于开始时间，表示跨零点
    pub fn nominal_window(&self) -> (NaiveTime, NaiveTime) {
        let (start_h, end_h) = match self {
            ShiftCode::A => (6, 14),
            ShiftCode::B => (14, 22),
            ShiftCode::C => (22, 6),
        };
        (hour(start_h), hour(end_h))
    }

    /// 根据时刻判断所属班次
    ///
    /// - 06:00 <= t < 14:00 → A
    /// - 14:00 <= t < 22:00 → B
    /// - 其他 → C
    pub fn for_time(time: NaiveTime) -> Self {
        match time.hour() {
            6..=13 => ShiftCode::A,
            14..=21 => ShiftCode::B,
            _ => ShiftCode::C,
        }
    }

    /// 显示名称，例如 "A班 (06:00-14:00)"
    pub fn display_name(&self) -> String {
        let (start, end) = self.nominal_window();
        format!(
            "{}班 ({}-{})",
            self.to_db_str(),
            start.format("%H:%M"),
            end.format("%H:%M")
        )
    }
}

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN)
}

// ==========================================
// OEE 等级 (OEE Status)
// ==========================================
// 顺序: Critical < Warning < Good < Excellent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OeeStatus {
    Critical,  // 危险
    Warning,   // 需关注
    Good,      // 良好
    Excellent, // 优秀
}

impl fmt::Display for OeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OeeStatus::Critical => write!(f, "CRITICAL"),
            OeeStatus::Warning => write!(f, "WARNING"),
            OeeStatus::Good => write!(f, "GOOD"),
            OeeStatus::Excellent => write!(f, "EXCELLENT"),
        }
    }
}

/// OEE 等级阈值（百分比）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OeeThresholds {
    pub excellent: f64,
    pub good: f64,
    pub warning: f64,
}

impl Default for OeeThresholds {
    fn default() -> Self {
        Self {
            excellent: 85.0,
            good: 75.0,
            warning: 65.0,
        }
    }
}

impl OeeThresholds {
    /// 按阈值划分 OEE 等级
    pub fn classify(&self, oee: f64) -> OeeStatus {
        if oee >= self.excellent {
            OeeStatus::Excellent
        } else if oee >= self.good {
            OeeStatus::Good
        } else if oee >= self.warning {
            OeeStatus::Warning
        } else {
            OeeStatus::Critical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_shift_for_time_boundaries() {
        assert_eq!(ShiftCode::for_time(t(6, 0)), ShiftCode::A);
        assert_eq!(ShiftCode::for_time(t(13, 59)), ShiftCode::A);
        assert_eq!(ShiftCode::for_time(t(14, 0)), ShiftCode::B);
        assert_eq!(ShiftCode::for_time(t(21, 59)), ShiftCode::B);
        assert_eq!(ShiftCode::for_time(t(22, 0)), ShiftCode::C);
        assert_eq!(ShiftCode::for_time(t(0, 30)), ShiftCode::C);
        assert_eq!(ShiftCode::for_time(t(5, 59)), ShiftCode::C);
    }

    #[test]
    fn test_shift_nominal_window_crosses_midnight_for_c() {
        let (start, end) = ShiftCode::C.nominal_window();
        assert!(end < start);
        assert_eq!(ShiftCode::C.display_name(), "C班 (22:00-06:00)");
    }

    #[test]
    fn test_kind_and_shift_parsing() {
        assert_eq!(AreaKind::from_str("press"), Some(AreaKind::Press));
        assert_eq!(AreaKind::from_str(" Packaging "), Some(AreaKind::Packaging));
        assert_eq!(AreaKind::from_str("oven"), None);
        assert_eq!(ShiftCode::from_str("b"), Some(ShiftCode::B));
        assert_eq!(ShiftCode::from_str("D"), None);
    }

    #[test]
    fn test_oee_thresholds_classify() {
        let th = OeeThresholds::default();
        assert_eq!(th.classify(90.0), OeeStatus::Excellent);
        assert_eq!(th.classify(85.0), OeeStatus::Excellent);
        assert_eq!(th.classify(80.0), OeeStatus::Good);
        assert_eq!(th.classify(65.0), OeeStatus::Warning);
        assert_eq!(th.classify(64.9), OeeStatus::Critical);
        assert_eq!(th.classify(0.0), OeeStatus::Critical);
    }
}
