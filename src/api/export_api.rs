// ==========================================
// 班次 OEE 管理系统 - 导出 API
// ==========================================
// 职责: 按条件导出班次记录为 CSV (一条记录一行)
// ==========================================

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::shift_record::{RecordFilter, ShiftMetrics, ShiftRecord};
use crate::repository::area_repo::AreaRepository;
use crate::repository::row_utils::{format_date, format_time};
use crate::repository::shift_record_repo::ShiftRecordRepository;

// ==========================================
// ExportRow - CSV 行
// ==========================================

/// 表头, 顺序与 ExportRow 字段一致
const EXPORT_HEADERS: [&str; 20] = [
    "area_code",
    "shift_date",
    "shift",
    "start_time",
    "end_time",
    "planned_output",
    "actual_output",
    "kind",
    "product_format",
    "output_kg",
    "initial_reading",
    "final_reading",
    "stop_count",
    "stop_reason",
    "availability",
    "performance",
    "quality",
    "oee",
    "notes",
    "created_by",
];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    area_code: &'a str,
    shift_date: String,
    shift: &'static str,
    start_time: Option<String>,
    end_time: Option<String>,
    planned_output: Option<f64>,
    actual_output: Option<f64>,
    kind: &'static str,
    product_format: Option<&'a str>,
    output_kg: Option<f64>,
    initial_reading: Option<f64>,
    final_reading: Option<f64>,
    stop_count: Option<u32>,
    stop_reason: Option<&'a str>,
    availability: f64,
    performance: f64,
    quality: f64,
    oee: f64,
    notes: Option<&'a str>,
    created_by: Option<&'a str>,
}

impl<'a> ExportRow<'a> {
    fn new(record: &'a ShiftRecord, area_code: &'a str) -> Self {
        let mut row = ExportRow {
            area_code,
            shift_date: format_date(record.shift_date),
            shift: record.shift.to_db_str(),
            start_time: record.start_time.map(format_time),
            end_time: record.end_time.map(format_time),
            planned_output: record.planned_output,
            actual_output: record.actual_output,
            kind: record.metrics.kind().to_db_str(),
            product_format: None,
            output_kg: None,
            initial_reading: None,
            final_reading: None,
            stop_count: None,
            stop_reason: None,
            availability: record.availability,
            performance: record.performance,
            quality: record.quality,
            oee: record.oee,
            notes: record.notes.as_deref(),
            created_by: record.created_by.as_deref(),
        };

        match &record.metrics {
            ShiftMetrics::Packaging {
                product_format,
                output_kg,
            } => {
                row.product_format = product_format.as_deref();
                row.output_kg = *output_kg;
            }
            ShiftMetrics::Press {
                initial_reading,
                final_reading,
                stop_count,
                stop_reason,
            } => {
                row.initial_reading = *initial_reading;
                row.final_reading = *final_reading;
                row.stop_count = Some(*stop_count);
                row.stop_reason = stop_reason.as_deref();
            }
        }
        row
    }
}

// ==========================================
// ExportApi - 导出 API
// ==========================================
pub struct ExportApi {
    area_repo: Arc<AreaRepository>,
    record_repo: Arc<ShiftRecordRepository>,
}

impl ExportApi {
    pub fn new(area_repo: Arc<AreaRepository>, record_repo: Arc<ShiftRecordRepository>) -> Self {
        Self {
            area_repo,
            record_repo,
        }
    }

    /// 导出 CSV（含表头）
    ///
    /// 无匹配记录时仍输出表头行
    ///
    /// # 返回
    /// - Ok(usize): 导出的记录行数
    pub fn export_csv<W: Write>(&self, filter: &RecordFilter, writer: W) -> ApiResult<usize> {
        let records = self.record_repo.list(filter)?;
        let area_codes: HashMap<String, String> = self
            .area_repo
            .list(false, None)?
            .into_iter()
            .map(|a| (a.area_id, a.code))
            .collect();

        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer
            .write_record(EXPORT_HEADERS)
            .map_err(|e| ApiError::ExportError(e.to_string()))?;

        for record in &records {
            let area_code = area_codes
                .get(&record.area_id)
                .map(String::as_str)
                .unwrap_or(record.area_id.as_str());
            csv_writer
                .serialize(ExportRow::new(record, area_code))
                .map_err(|e| ApiError::ExportError(e.to_string()))?;
        }
        csv_writer
            .flush()
            .map_err(|e| ApiError::ExportError(e.to_string()))?;

        info!(rows = records.len(), "CSV 导出完成");
        Ok(records.len())
    }
}
