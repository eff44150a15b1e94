// ==========================================
// 班次 OEE 管理系统 - 输入校验器
// ==========================================
// 职责: 计算器不做范围断言, 负数/越界输入在此拦截
// 覆盖: 班次记录输入 / 区域创建参数
// ==========================================

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::area::{Area, NewArea};
use crate::domain::shift_record::{ShiftMetrics, ShiftRecordInput};

// ==========================================
// SubmissionMode - 提交模式
// ==========================================

/// 不完整记录的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionMode {
    /// 严格模式：缺少必填输入直接拒绝
    #[default]
    Strict,
    /// 宽松模式：允许保存，派生指标保持默认/原值
    AllowIncomplete,
}

// ==========================================
// 班次记录输入校验
// ==========================================

/// 校验班次记录输入
///
/// # 规则
/// - 字段组类型必须与区域类型一致
/// - 计划/实际产量不可为负
/// - quality ∈ [0, 100]
/// - 压机: 读数不可为负, final_reading >= initial_reading
/// - 包装: output_kg 不可为负
pub fn validate_shift_input(input: &ShiftRecordInput, area: &Area) -> ApiResult<()> {
    if input.metrics.kind() != area.kind {
        return Err(ApiError::MetricsKindMismatch {
            area_kind: area.kind,
            metrics_kind: input.metrics.kind(),
        });
    }

    let mut violations = Vec::new();

    check_non_negative(&mut violations, "planned_output", input.planned_output);
    check_non_negative(&mut violations, "actual_output", input.actual_output);

    if let Some(quality) = input.quality {
        if !quality.is_finite() || !(0.0..=100.0).contains(&quality) {
            violations.push(violation(
                "quality",
                format!("合格品率必须在 0-100 之间, 实际为 {}", quality),
                Some(serde_json::json!({ "quality": quality })),
            ));
        }
    }

    match &input.metrics {
        ShiftMetrics::Packaging { output_kg, .. } => {
            check_non_negative(&mut violations, "output_kg", *output_kg);
        }
        ShiftMetrics::Press {
            initial_reading,
            final_reading,
            ..
        } => {
            check_non_negative(&mut violations, "initial_reading", *initial_reading);
            check_non_negative(&mut violations, "final_reading", *final_reading);
            if let (Some(initial), Some(fin)) = (initial_reading, final_reading) {
                if fin < initial {
                    violations.push(violation(
                        "final_reading",
                        format!("班末读数 {} 小于班初读数 {}", fin, initial),
                        Some(serde_json::json!({
                            "initial_reading": initial,
                            "final_reading": fin,
                        })),
                    ));
                }
            }
        }
    }

    into_result(violations, "班次记录")
}

/// 校验人工质量评估值
pub fn validate_quality(quality: f64) -> ApiResult<()> {
    if !quality.is_finite() || !(0.0..=100.0).contains(&quality) {
        return Err(ApiError::InvalidInput(format!(
            "合格品率必须在 0-100 之间, 实际为 {}",
            quality
        )));
    }
    Ok(())
}

// ==========================================
// 区域参数校验
// ==========================================

/// 校验区域代码格式: 大写字母 + "_" + 大写字母/数字, 例如 EMPAQUE_COBRA / PRENSA_1
pub fn is_valid_area_code(code: &str) -> bool {
    let code = code.trim().to_uppercase();
    let Some((prefix, suffix)) = code.split_once('_') else {
        return false;
    };
    !prefix.is_empty()
        && !suffix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_uppercase())
        && suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// 校验新建区域参数
pub fn validate_new_area(area: &NewArea) -> ApiResult<()> {
    let mut violations = Vec::new();

    if !is_valid_area_code(&area.code) {
        violations.push(violation(
            "code",
            format!("区域代码格式错误: {} (应为 字母_字母数字, 例如 EMPAQUE_COBRA)", area.code),
            None,
        ));
    }
    if area.name.trim().is_empty() {
        violations.push(violation("name", "区域名称不能为空".to_string(), None));
    }
    violations.extend(capacity_violations(area.theoretical_capacity, area.real_capacity));

    into_result(violations, "区域参数")
}

/// 校验产能参数
pub fn validate_capacity(theoretical_capacity: f64, real_capacity: f64) -> ApiResult<()> {
    into_result(
        capacity_violations(theoretical_capacity, real_capacity),
        "产能参数",
    )
}

fn capacity_violations(theoretical_capacity: f64, real_capacity: f64) -> Vec<ValidationViolation> {
    let mut violations = Vec::new();
    if !theoretical_capacity.is_finite() || theoretical_capacity <= 0.0 {
        violations.push(violation(
            "theoretical_capacity",
            format!("理论产能必须大于 0, 实际为 {}", theoretical_capacity),
            None,
        ));
    }
    if !real_capacity.is_finite() || real_capacity < 0.0 {
        violations.push(violation(
            "real_capacity",
            format!("实际产能不可为负, 实际为 {}", real_capacity),
            None,
        ));
    }
    violations
}

// ==========================================
// 内部工具
// ==========================================

fn check_non_negative(violations: &mut Vec<ValidationViolation>, field: &str, value: Option<f64>) {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            violations.push(violation(field, format!("{} 不可为负, 实际为 {}", field, v), None));
        }
    }
}

fn violation(field: &str, reason: String, details: Option<serde_json::Value>) -> ValidationViolation {
    ValidationViolation {
        field: field.to_string(),
        reason,
        details,
    }
}

fn into_result(violations: Vec<ValidationViolation>, subject: &str) -> ApiResult<()> {
    if violations.is_empty() {
        return Ok(());
    }
    Err(ApiError::ValidationError {
        reason: format!("{}存在{}项违规", subject, violations.len()),
        violations,
    })
}
