// ==========================================
// 班次 OEE 管理系统 - 班次记录 API
// ==========================================
// 职责: 班次记录提交/修改/质量评估/查询/删除
// 流程: 校验 → 加载区域 → 组装记录 → OEE 计算 → 持久化
// 红线: 同一 (区域, 日期, 班次) 只允许一条记录,
//       由数据库唯一约束裁决, 并发提交时只有一条成功
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_quality, validate_shift_input, SubmissionMode};
use crate::domain::area::Area;
use crate::domain::shift_record::{RecordFilter, ShiftRecord, ShiftRecordInput, DEFAULT_QUALITY};
use crate::engine::oee_calculator::{OeeCalculator, OeeOutcome};
use crate::repository::area_repo::AreaRepository;
use crate::repository::error::RepositoryError;
use crate::repository::shift_record_repo::ShiftRecordRepository;

// ==========================================
// ShiftRecordResponse - 提交结果
// ==========================================
/// 记录 + 本次计算结果
///
/// outcome 为 Incomplete 时, 记录中的派生指标为默认值（新建）或原值（修改）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftRecordResponse {
    pub record: ShiftRecord,
    pub outcome: OeeOutcome,
}

// ==========================================
// ShiftRecordApi - 班次记录 API
// ==========================================
pub struct ShiftRecordApi {
    area_repo: Arc<AreaRepository>,
    record_repo: Arc<ShiftRecordRepository>,
    calculator: OeeCalculator,
}

impl ShiftRecordApi {
    /// 创建新的 ShiftRecordApi 实例
    ///
    /// # 参数
    /// - area_repo: 区域仓储（读取理论产能/区域类型）
    /// - record_repo: 班次记录仓储
    /// - calculator: OEE 计算器（名义班长已由配置决定）
    pub fn new(
        area_repo: Arc<AreaRepository>,
        record_repo: Arc<ShiftRecordRepository>,
        calculator: OeeCalculator,
    ) -> Self {
        Self {
            area_repo,
            record_repo,
            calculator,
        }
    }

    pub fn calculator(&self) -> &OeeCalculator {
        &self.calculator
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 提交新的班次记录
    ///
    /// # 返回
    /// - Err(DuplicateShiftRecord): 同一区域/日期/班次已有记录
    /// - Err(IncompleteShiftRecord): 严格模式下缺少必填输入
    /// - Err(InactiveArea): 区域已停用
    #[instrument(skip(self, input), fields(area_id = %input.area_id, date = %input.shift_date, shift = %input.shift))]
    pub fn create(
        &self,
        input: ShiftRecordInput,
        mode: SubmissionMode,
    ) -> ApiResult<ShiftRecordResponse> {
        let area = self.load_active_area(&input.area_id)?;
        validate_shift_input(&input, &area)?;

        let now = Utc::now();
        let quality = input.quality.unwrap_or(DEFAULT_QUALITY);
        let mut record = ShiftRecord {
            record_id: Uuid::new_v4().to_string(),
            area_id: input.area_id,
            shift_date: input.shift_date,
            shift: input.shift,
            start_time: input.start_time,
            end_time: input.end_time,
            planned_output: input.planned_output,
            actual_output: input.actual_output,
            notes: input.notes,
            created_by: input.created_by,
            metrics: input.metrics,
            availability: 0.0,
            performance: 0.0,
            quality,
            oee: 0.0,
            created_at: now,
            updated_at: now,
        };

        let outcome = self.calculate_checked(&mut record, &area, mode)?;
        self.record_repo
            .insert(&record)
            .map_err(|e| duplicate_or(e, &record))?;

        info!(record_id = %record.record_id, oee = record.oee, "班次记录已创建");
        Ok(ShiftRecordResponse { record, outcome })
    }

    /// 修改班次记录并重新计算
    ///
    /// quality 未提供时沿用原值; 缺少必填输入时（宽松模式）派生指标保持原值
    #[instrument(skip(self, input))]
    pub fn update(
        &self,
        record_id: &str,
        input: ShiftRecordInput,
        mode: SubmissionMode,
    ) -> ApiResult<ShiftRecordResponse> {
        let existing = self.get(record_id)?;
        let area = self.load_active_area(&input.area_id)?;
        validate_shift_input(&input, &area)?;

        let mut record = ShiftRecord {
            record_id: existing.record_id.clone(),
            area_id: input.area_id,
            shift_date: input.shift_date,
            shift: input.shift,
            start_time: input.start_time,
            end_time: input.end_time,
            planned_output: input.planned_output,
            actual_output: input.actual_output,
            notes: input.notes,
            created_by: input.created_by.or(existing.created_by),
            metrics: input.metrics,
            availability: existing.availability,
            performance: existing.performance,
            quality: input.quality.unwrap_or(existing.quality),
            oee: existing.oee,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        let outcome = self.calculate_checked(&mut record, &area, mode)?;
        self.record_repo
            .update(&record)
            .map_err(|e| duplicate_or(e, &record))?;

        info!(oee = record.oee, "班次记录已更新");
        Ok(ShiftRecordResponse { record, outcome })
    }

    /// 录入质量评估并重新计算
    ///
    /// 仅修改 quality; 其余输入不完整时派生指标保持原值. 停用区域拒绝录入
    #[instrument(skip(self))]
    pub fn set_quality(&self, record_id: &str, quality: f64) -> ApiResult<ShiftRecordResponse> {
        validate_quality(quality)?;

        let mut record = self.get(record_id)?;
        let area = self.load_active_area(&record.area_id)?;

        record.quality = quality;
        record.updated_at = Utc::now();
        let outcome = self.calculator.apply(&mut record, &area);
        self.record_repo.update(&record)?;

        info!(quality, oee = record.oee, "质量评估已录入");
        Ok(ShiftRecordResponse { record, outcome })
    }

    /// 删除班次记录
    #[instrument(skip(self))]
    pub fn delete(&self, record_id: &str) -> ApiResult<()> {
        self.record_repo.delete(record_id)?;
        info!("班次记录已删除");
        Ok(())
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按ID获取记录
    pub fn get(&self, record_id: &str) -> ApiResult<ShiftRecord> {
        self.record_repo
            .find_by_id(record_id)?
            .ok_or_else(|| ApiError::NotFound(format!("班次记录(id={})不存在", record_id)))
    }

    /// 按条件查询（日期倒序, 同日班次倒序）
    pub fn list(&self, filter: &RecordFilter) -> ApiResult<Vec<ShiftRecord>> {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            if from > to {
                return Err(ApiError::InvalidInput(format!(
                    "日期范围无效: {} > {}",
                    from, to
                )));
            }
        }
        Ok(self.record_repo.list(filter)?)
    }

    // ==========================================
    // 内部工具
    // ==========================================

    fn load_area(&self, area_id: &str) -> ApiResult<Area> {
        self.area_repo
            .find_by_id(area_id)?
            .ok_or_else(|| ApiError::NotFound(format!("区域(id={})不存在", area_id)))
    }

    fn load_active_area(&self, area_id: &str) -> ApiResult<Area> {
        let area = self.load_area(area_id)?;
        if !area.active {
            return Err(ApiError::InactiveArea(area.code));
        }
        Ok(area)
    }

    fn calculate_checked(
        &self,
        record: &mut ShiftRecord,
        area: &Area,
        mode: SubmissionMode,
    ) -> ApiResult<OeeOutcome> {
        let outcome = self.calculator.apply(record, area);
        if let OeeOutcome::Incomplete { missing } = &outcome {
            match mode {
                SubmissionMode::Strict => {
                    return Err(ApiError::IncompleteShiftRecord {
                        missing: missing.clone(),
                    });
                }
                SubmissionMode::AllowIncomplete => {
                    warn!(?missing, "班次记录不完整，派生指标未更新");
                }
            }
        }
        Ok(outcome)
    }
}

fn duplicate_or(err: RepositoryError, record: &ShiftRecord) -> ApiError {
    match err {
        RepositoryError::UniqueConstraintViolation(_) => {
            warn!(
                area_id = %record.area_id,
                date = %record.shift_date,
                shift = %record.shift,
                "重复的班次记录被拒绝"
            );
            ApiError::DuplicateShiftRecord {
                area_id: record.area_id.clone(),
                shift_date: record.shift_date,
                shift: record.shift,
            }
        }
        other => other.into(),
    }
}
