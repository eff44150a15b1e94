// ==========================================
// 班次 OEE 管理系统 - 看板 API
// ==========================================
// 职责: 看板汇总 (平均 OEE / 记录数 / 启用区域 / 等级)
// 架构: API 层 → Repository 取记录 → OeeAggregator 求平均
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::area::Area;
use crate::domain::shift_record::RecordFilter;
use crate::domain::types::{AreaKind, OeeStatus, OeeThresholds};
use crate::engine::oee_aggregator::{OeeAggregator, OeeAverages};
use crate::repository::area_repo::AreaRepository;
use crate::repository::shift_record_repo::ShiftRecordRepository;

// ==========================================
// 响应结构
// ==========================================

/// 看板汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub averages: OeeAverages,
    /// 指定日期的记录数
    pub records_today: usize,
    pub active_areas: usize,
    /// 平均 OEE 的等级
    pub status: OeeStatus,
}

/// 单区域统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaOeeStats {
    pub area_id: String,
    pub code: String,
    pub name: String,
    pub kind: AreaKind,
    pub averages: OeeAverages,
    pub status: OeeStatus,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    area_repo: Arc<AreaRepository>,
    record_repo: Arc<ShiftRecordRepository>,
    thresholds: OeeThresholds,
}

impl DashboardApi {
    /// 创建新的 DashboardApi 实例
    ///
    /// # 参数
    /// - thresholds: OEE 等级阈值（启动时由配置读取）
    pub fn new(
        area_repo: Arc<AreaRepository>,
        record_repo: Arc<ShiftRecordRepository>,
        thresholds: OeeThresholds,
    ) -> Self {
        Self {
            area_repo,
            record_repo,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> OeeThresholds {
        self.thresholds
    }

    /// 看板汇总
    ///
    /// # 参数
    /// - filter: 参与平均的记录范围
    /// - today: 统计"当日记录数"所用的日期（与 filter 无关）
    pub fn summary(&self, filter: &RecordFilter, today: NaiveDate) -> ApiResult<DashboardSummary> {
        let records = self.record_repo.list(filter)?;
        let averages = OeeAggregator::averages(&records);
        let records_today = self.record_repo.count_by_date(today)?;
        let active_areas = self.area_repo.count_active()?;

        debug!(
            total_records = averages.total_records,
            oee_avg = averages.oee_avg,
            records_today,
            active_areas,
            "看板汇总完成"
        );

        Ok(DashboardSummary {
            averages,
            records_today,
            active_areas,
            status: self.thresholds.classify(averages.oee_avg),
        })
    }

    /// 单区域统计（filter 中的 area_id 被覆盖）
    pub fn area_stats(&self, area_id: &str, filter: &RecordFilter) -> ApiResult<AreaOeeStats> {
        let area = self
            .area_repo
            .find_by_id(area_id)?
            .ok_or_else(|| ApiError::NotFound(format!("区域(id={})不存在", area_id)))?;

        let scoped = RecordFilter {
            area_id: Some(area.area_id.clone()),
            ..filter.clone()
        };
        let records = self.record_repo.list(&scoped)?;
        Ok(self.stats_for(area, OeeAggregator::averages(&records)))
    }

    /// 全部启用区域的统计（按区域名称排序, 无记录的区域平均值为 0）
    pub fn stats_by_area(&self, filter: &RecordFilter) -> ApiResult<Vec<AreaOeeStats>> {
        let records = self.record_repo.list(filter)?;
        let mut by_area = OeeAggregator::averages_by_area(&records);

        let stats = self
            .area_repo
            .list(true, None)?
            .into_iter()
            .map(|area| {
                let averages = by_area.remove(&area.area_id).unwrap_or_default();
                self.stats_for(area, averages)
            })
            .collect();
        Ok(stats)
    }

    fn stats_for(&self, area: Area, averages: OeeAverages) -> AreaOeeStats {
        AreaOeeStats {
            area_id: area.area_id,
            code: area.code,
            name: area.name,
            kind: area.kind,
            status: self.thresholds.classify(averages.oee_avg),
            averages,
        }
    }
}
