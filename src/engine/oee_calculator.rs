// ==========================================
// 班次 OEE 管理系统 - OEE 计算引擎
// ==========================================
// 输入: ShiftRecord + Area (理论产能 / 区域类型)
// 输出: availability / performance / quality / oee
// 约束: 纯函数, 无副作用, 四项指标上限 100
// ==========================================
// 计算步骤:
// 1. 时间开动率: 实际小时 / 名义班长 (跨零点补 24h)
// 2. 性能开动率: 压机按计数表与理论产能, 包装按计划完成率
// 3. 合格品率: 0 视为未评估, 按 100 处理
// 4. OEE = A * P * Q / 10000, 最后各自封顶 100
// ==========================================

use crate::domain::area::Area;
use crate::domain::shift_record::{OeeIndicators, RequiredInput, ShiftRecord, DEFAULT_QUALITY};
use crate::domain::types::AreaKind;
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 默认名义班长（小时）
pub const DEFAULT_NOMINAL_SHIFT_HOURS: f64 = 8.0;

/// 指标上限（百分比）
const MAX_PERCENT: f64 = 100.0;

// ==========================================
// OeeOutcome - 计算结果
// ==========================================
// Incomplete: 必填输入缺失, 派生字段保持原值 (不清零, 不报错)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OeeOutcome {
    Computed(OeeIndicators),
    Incomplete { missing: Vec<RequiredInput> },
}

impl OeeOutcome {
    pub fn is_computed(&self) -> bool {
        matches!(self, OeeOutcome::Computed(_))
    }

    pub fn indicators(&self) -> Option<OeeIndicators> {
        match self {
            OeeOutcome::Computed(ind) => Some(*ind),
            OeeOutcome::Incomplete { .. } => None,
        }
    }
}

// ==========================================
// OeeCalculator - OEE 计算引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct OeeCalculator {
    nominal_shift_hours: f64,
}

impl Default for OeeCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl OeeCalculator {
    /// 使用默认名义班长 (8 小时) 创建计算器
    pub fn new() -> Self {
        Self {
            nominal_shift_hours: DEFAULT_NOMINAL_SHIFT_HOURS,
        }
    }

    /// 指定名义班长创建计算器
    ///
    /// 非正数或非有限值回退到默认 8 小时
    pub fn with_nominal_shift_hours(hours: f64) -> Self {
        if !hours.is_finite() || hours <= 0.0 {
            tracing::warn!(
                nominal_shift_hours = hours,
                "名义班长配置无效，回退为默认值 {}",
                DEFAULT_NOMINAL_SHIFT_HOURS
            );
            return Self::new();
        }
        Self {
            nominal_shift_hours: hours,
        }
    }

    pub fn nominal_shift_hours(&self) -> f64 {
        self.nominal_shift_hours
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算并就地覆盖记录的四项派生指标
    ///
    /// 返回 Incomplete 时记录保持不变
    #[instrument(skip(self, record, area), fields(record_id = %record.record_id, area = %area.code))]
    pub fn apply(&self, record: &mut ShiftRecord, area: &Area) -> OeeOutcome {
        let outcome = self.calculate(record, area);
        match &outcome {
            OeeOutcome::Computed(indicators) => {
                record.set_indicators(*indicators);
                tracing::debug!(
                    availability = indicators.availability,
                    performance = indicators.performance,
                    quality = indicators.quality,
                    oee = indicators.oee,
                    "OEE 计算完成"
                );
            }
            OeeOutcome::Incomplete { missing } => {
                tracing::debug!(?missing, "必填输入缺失，跳过 OEE 计算");
            }
        }
        outcome
    }

    /// 计算四项指标，不修改记录
    pub fn calculate(&self, record: &ShiftRecord, area: &Area) -> OeeOutcome {
        // 计划/实际产量为 0 与未填写同等处理
        let (start_time, end_time, planned_output, actual_output) = match (
            record.start_time,
            record.end_time,
            record.effective_planned_output(),
            record.effective_actual_output(),
        ) {
            (Some(s), Some(e), Some(p), Some(a)) => (s, e, p, a),
            _ => {
                return OeeOutcome::Incomplete {
                    missing: record.missing_inputs(),
                }
            }
        };

        // 1. 时间开动率
        let actual_hours = actual_hours(record.shift_date, start_time, end_time);
        let availability =
            ((actual_hours / self.nominal_shift_hours) * 100.0).min(MAX_PERCENT);

        // 2. 性能开动率
        let performance = match area.kind {
            AreaKind::Press => match record.metrics.meter_output() {
                Some(produced) => {
                    let theoretical = area.theoretical_output(actual_hours);
                    if theoretical > 0.0 {
                        (produced / theoretical) * 100.0
                    } else {
                        0.0
                    }
                }
                None => 0.0,
            },
            AreaKind::Packaging => {
                if planned_output > 0.0 {
                    (actual_output / planned_output) * 100.0
                } else {
                    0.0
                }
            }
        };

        // 3. 合格品率
        let quality = if record.quality == 0.0 {
            DEFAULT_QUALITY
        } else {
            record.quality
        };

        // 4. 综合 OEE（使用封顶前的性能与质量）
        let oee = (availability * performance * quality) / 10_000.0;

        OeeOutcome::Computed(OeeIndicators {
            availability: availability.min(MAX_PERCENT),
            performance: performance.min(MAX_PERCENT),
            quality: quality.min(MAX_PERCENT),
            oee: oee.min(MAX_PERCENT),
        })
    }
}

/// 班次实际运行小时数
///
/// 结束时刻早于开始时刻视为跨零点，结束时刻加 24 小时
pub fn actual_hours(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> f64 {
    let start_at = date.and_time(start);
    let mut end_at = date.and_time(end);
    if end_at < start_at {
        end_at += Duration::days(1);
    }
    (end_at - start_at).num_seconds() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shift_record::ShiftMetrics;
    use crate::domain::types::ShiftCode;
    use chrono::Utc;

    const EPS: f64 = 1e-9;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn area(kind: AreaKind, capacity: f64) -> Area {
        Area {
            area_id: "AREA_1".to_string(),
            code: "EMPAQUE_COBRA".to_string(),
            name: "包装线 1".to_string(),
            kind,
            theoretical_capacity: capacity,
            real_capacity: capacity * 0.8,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn record(start: (u32, u32), end: (u32, u32), planned: f64, actual: f64) -> ShiftRecord {
        ShiftRecord {
            record_id: "R1".to_string(),
            area_id: "AREA_1".to_string(),
            shift_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            shift: ShiftCode::A,
            start_time: Some(t(start.0, start.1)),
            end_time: Some(t(end.0, end.1)),
            planned_output: Some(planned),
            actual_output: Some(actual),
            notes: None,
            created_by: None,
            metrics: ShiftMetrics::empty_for(AreaKind::Packaging),
            availability: 0.0,
            performance: 0.0,
            quality: 100.0,
            oee: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn press_metrics(initial: Option<f64>, fin: Option<f64>) -> ShiftMetrics {
        ShiftMetrics::Press {
            initial_reading: initial,
            final_reading: fin,
            stop_count: 0,
            stop_reason: None,
        }
    }

    fn computed(outcome: OeeOutcome) -> OeeIndicators {
        outcome.indicators().expect("expected computed outcome")
    }

    // ==========================================
    // 时间开动率
    // ==========================================

    #[test]
    fn test_overnight_shift_gives_full_availability() {
        let hours = actual_hours(
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            t(22, 0),
            t(6, 0),
        );
        assert!((hours - 8.0).abs() < EPS);

        let r = record((22, 0), (6, 0), 100.0, 100.0);
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Packaging, 10.0)));
        assert!((ind.availability - 100.0).abs() < EPS);
    }

    #[test]
    fn test_four_hour_shift_gives_half_availability() {
        let r = record((6, 0), (10, 0), 100.0, 100.0);
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Packaging, 10.0)));
        assert!((ind.availability - 50.0).abs() < EPS);
    }

    #[test]
    fn test_long_shift_availability_clamped() {
        // 06:00 → 16:30 = 10.5h
        let r = record((6, 0), (16, 30), 100.0, 100.0);
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Packaging, 10.0)));
        assert_eq!(ind.availability, 100.0);
    }

    #[test]
    fn test_same_start_and_end_is_zero_hours() {
        let r = record((6, 0), (6, 0), 100.0, 80.0);
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Packaging, 10.0)));
        assert_eq!(ind.availability, 0.0);
        assert_eq!(ind.oee, 0.0);
    }

    #[test]
    fn test_configured_shift_length() {
        let r = record((6, 0), (12, 0), 100.0, 100.0);
        let calc = OeeCalculator::with_nominal_shift_hours(12.0);
        let ind = computed(calc.calculate(&r, &area(AreaKind::Packaging, 10.0)));
        assert!((ind.availability - 50.0).abs() < EPS);

        assert_eq!(
            OeeCalculator::with_nominal_shift_hours(0.0).nominal_shift_hours(),
            DEFAULT_NOMINAL_SHIFT_HOURS
        );
        assert_eq!(
            OeeCalculator::with_nominal_shift_hours(f64::NAN).nominal_shift_hours(),
            DEFAULT_NOMINAL_SHIFT_HOURS
        );
    }

    // ==========================================
    // 性能开动率
    // ==========================================

    #[test]
    fn test_packaging_performance_and_oee() {
        let r = record((6, 0), (14, 0), 100.0, 80.0);
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Packaging, 10.0)));
        assert!((ind.performance - 80.0).abs() < EPS);
        assert!((ind.quality - 100.0).abs() < EPS);
        assert!((ind.oee - 80.0).abs() < EPS);
    }

    #[test]
    fn test_zero_planned_output_is_incomplete() {
        let mut r = record((6, 0), (14, 0), 0.0, 80.0);
        let before = r.clone();
        let outcome = OeeCalculator::new().apply(&mut r, &area(AreaKind::Packaging, 10.0));
        assert_eq!(
            outcome,
            OeeOutcome::Incomplete {
                missing: vec![RequiredInput::PlannedOutput]
            }
        );
        assert_eq!(r, before);
    }

    #[test]
    fn test_zero_actual_output_keeps_default_availability() {
        let mut r = record((6, 0), (14, 0), 100.0, 0.0);
        let outcome = OeeCalculator::new().apply(&mut r, &area(AreaKind::Packaging, 10.0));
        assert_eq!(
            outcome,
            OeeOutcome::Incomplete {
                missing: vec![RequiredInput::ActualOutput]
            }
        );
        assert_eq!(r.availability, 0.0);
        assert_eq!(r.oee, 0.0);
    }

    #[test]
    fn test_press_performance_uses_meter_and_actual_hours() {
        let mut r = record((6, 0), (14, 0), 100.0, 100.0);
        r.metrics = press_metrics(Some(1000.0), Some(5000.0));
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Press, 1000.0)));
        assert!((ind.performance - 50.0).abs() < EPS);
        assert!((ind.oee - 50.0).abs() < EPS);
    }

    #[test]
    fn test_press_theoretical_output_follows_actual_hours() {
        // 4h × 1000/h = 4000 理论; 2000 实际 → 50%
        let mut r = record((6, 0), (10, 0), 100.0, 100.0);
        r.metrics = press_metrics(Some(0.0), Some(2000.0));
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Press, 1000.0)));
        assert!((ind.performance - 50.0).abs() < EPS);
        assert!((ind.availability - 50.0).abs() < EPS);
        assert!((ind.oee - 25.0).abs() < EPS);
    }

    #[test]
    fn test_press_missing_reading_gives_zero_performance() {
        let mut r = record((6, 0), (14, 0), 100.0, 100.0);
        r.metrics = press_metrics(Some(1000.0), None);
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Press, 1000.0)));
        assert_eq!(ind.performance, 0.0);
        assert_eq!(ind.oee, 0.0);

        // 包装字段组挂在压机区域上，同样视为无读数
        r.metrics = ShiftMetrics::empty_for(AreaKind::Packaging);
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Press, 1000.0)));
        assert_eq!(ind.performance, 0.0);
    }

    #[test]
    fn test_press_zero_hours_avoids_division() {
        let mut r = record((6, 0), (6, 0), 100.0, 100.0);
        r.metrics = press_metrics(Some(0.0), Some(500.0));
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Press, 1000.0)));
        assert_eq!(ind.performance, 0.0);
    }

    // ==========================================
    // 合格品率 / 综合 / 封顶
    // ==========================================

    #[test]
    fn test_zero_quality_treated_as_full() {
        let mut r = record((6, 0), (14, 0), 100.0, 80.0);
        r.quality = 0.0;
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Packaging, 10.0)));
        assert_eq!(ind.quality, 100.0);
        assert!((ind.oee - 80.0).abs() < EPS);
    }

    #[test]
    fn test_manual_quality_feeds_oee() {
        let mut r = record((6, 0), (14, 0), 100.0, 80.0);
        r.quality = 90.0;
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Packaging, 10.0)));
        assert!((ind.oee - 72.0).abs() < EPS);
        assert!(
            (ind.oee - ind.availability * ind.performance * ind.quality / 10_000.0).abs() < EPS
        );
    }

    #[test]
    fn test_over_plan_output_clamped_to_hundred() {
        let r = record((6, 0), (14, 0), 100.0, 130.0);
        let ind = computed(OeeCalculator::new().calculate(&r, &area(AreaKind::Packaging, 10.0)));
        assert_eq!(ind.performance, 100.0);
        assert_eq!(ind.oee, 100.0);
    }

    #[test]
    fn test_all_indicators_within_bounds() {
        let cases = [
            ((6, 0), (14, 0), 100.0, 0.5),
            ((22, 0), (6, 0), 50.0, 75.0),
            ((6, 0), (9, 15), 10.0, 1000.0),
            ((23, 30), (0, 15), 1.0, 1.0),
        ];
        let calc = OeeCalculator::new();
        for (start, end, planned, actual) in cases {
            let r = record(start, end, planned, actual);
            let ind = computed(calc.calculate(&r, &area(AreaKind::Packaging, 10.0)));
            for v in [ind.availability, ind.performance, ind.quality, ind.oee] {
                assert!((0.0..=100.0).contains(&v), "out of range: {v}");
            }
        }
    }

    // ==========================================
    // 不完整输入
    // ==========================================

    #[test]
    fn test_incomplete_record_is_left_untouched() {
        let mut r = record((6, 0), (14, 0), 100.0, 80.0);
        r.end_time = None;
        r.actual_output = None;
        r.availability = 12.0;
        r.performance = 34.0;
        r.quality = 0.0;
        r.oee = 5.0;
        let before = r.clone();

        let outcome = OeeCalculator::new().apply(&mut r, &area(AreaKind::Packaging, 10.0));
        assert_eq!(
            outcome,
            OeeOutcome::Incomplete {
                missing: vec![RequiredInput::EndTime, RequiredInput::ActualOutput]
            }
        );
        assert_eq!(r, before);

        // 再次执行仍为无操作
        OeeCalculator::new().apply(&mut r, &area(AreaKind::Packaging, 10.0));
        assert_eq!(r, before);
    }

    #[test]
    fn test_apply_overwrites_derived_fields() {
        let mut r = record((6, 0), (10, 0), 100.0, 80.0);
        let outcome = OeeCalculator::new().apply(&mut r, &area(AreaKind::Packaging, 10.0));
        assert!(outcome.is_computed());
        assert!((r.availability - 50.0).abs() < EPS);
        assert!((r.performance - 80.0).abs() < EPS);
        assert!((r.oee - 40.0).abs() < EPS);
    }
}
