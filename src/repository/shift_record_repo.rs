// ==========================================
// 班次 OEE 管理系统 - 班次记录数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（OEE 由引擎层计算后写入）
// 约束: (area_id, shift_date, shift_code) 由 UNIQUE 约束保证唯一,
//       重复提交返回 UniqueConstraintViolation, 不覆盖已有记录
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::shift_record::{RecordFilter, ShiftMetrics, ShiftRecord};
use crate::domain::types::{AreaKind, ShiftCode};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{
    format_date, format_time, format_timestamp, invalid_column, parse_date, parse_opt_time,
    parse_timestamp,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const RECORD_COLUMNS: &str = r#"
    record_id, area_id, shift_date, shift_code, start_time, end_time,
    planned_output, actual_output, notes, created_by,
    metrics_kind, product_format, output_kg, initial_reading, final_reading,
    stop_count, stop_reason,
    availability, performance, quality, oee, created_at, updated_at
"#;

// ==========================================
// ShiftRecordRepository - 班次记录仓储
// ==========================================
pub struct ShiftRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShiftRecordRepository {
    /// 创建新的班次记录仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入班次记录
    ///
    /// # 返回
    /// - Ok(()): 插入成功
    /// - Err(UniqueConstraintViolation): 同一区域/日期/班次已有记录
    /// - Err(ForeignKeyViolation): 区域不存在
    pub fn insert(&self, record: &ShiftRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let m = MetricColumns::from(&record.metrics);

        conn.execute(
            r#"
            INSERT INTO shift_record (
                record_id, area_id, shift_date, shift_code, start_time, end_time,
                planned_output, actual_output, notes, created_by,
                metrics_kind, product_format, output_kg, initial_reading, final_reading,
                stop_count, stop_reason,
                availability, performance, quality, oee, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                ?18, ?19, ?20, ?21, ?22, ?23
            )
            "#,
            params![
                record.record_id,
                record.area_id,
                format_date(record.shift_date),
                record.shift.to_db_str(),
                record.start_time.map(format_time),
                record.end_time.map(format_time),
                record.planned_output,
                record.actual_output,
                record.notes,
                record.created_by,
                m.kind,
                m.product_format,
                m.output_kg,
                m.initial_reading,
                m.final_reading,
                m.stop_count,
                m.stop_reason,
                record.availability,
                record.performance,
                record.quality,
                record.oee,
                format_timestamp(record.created_at),
                format_timestamp(record.updated_at),
            ],
        )?;

        Ok(())
    }

    /// 更新班次记录（整行覆盖, created_at 除外）
    ///
    /// # 返回
    /// - Err(NotFound): 记录不存在
    /// - Err(UniqueConstraintViolation): 改到了已被占用的区域/日期/班次
    pub fn update(&self, record: &ShiftRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let m = MetricColumns::from(&record.metrics);

        let affected = conn.execute(
            r#"
            UPDATE shift_record SET
                area_id = ?2, shift_date = ?3, shift_code = ?4,
                start_time = ?5, end_time = ?6,
                planned_output = ?7, actual_output = ?8, notes = ?9, created_by = ?10,
                metrics_kind = ?11, product_format = ?12, output_kg = ?13,
                initial_reading = ?14, final_reading = ?15,
                stop_count = ?16, stop_reason = ?17,
                availability = ?18, performance = ?19, quality = ?20, oee = ?21,
                updated_at = ?22
            WHERE record_id = ?1
            "#,
            params![
                record.record_id,
                record.area_id,
                format_date(record.shift_date),
                record.shift.to_db_str(),
                record.start_time.map(format_time),
                record.end_time.map(format_time),
                record.planned_output,
                record.actual_output,
                record.notes,
                record.created_by,
                m.kind,
                m.product_format,
                m.output_kg,
                m.initial_reading,
                m.final_reading,
                m.stop_count,
                m.stop_reason,
                record.availability,
                record.performance,
                record.quality,
                record.oee,
                format_timestamp(record.updated_at),
            ],
        )?;

        if affected == 0 {
            return Err(not_found(&record.record_id));
        }
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, record_id: &str) -> RepositoryResult<Option<ShiftRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM shift_record WHERE record_id = ?1", RECORD_COLUMNS);
        let record = conn
            .query_row(&sql, params![record_id], map_record_row)
            .optional()?;
        Ok(record)
    }

    /// 按唯一键 (区域, 日期, 班次) 查询
    pub fn find_by_key(
        &self,
        area_id: &str,
        shift_date: NaiveDate,
        shift: ShiftCode,
    ) -> RepositoryResult<Option<ShiftRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM shift_record WHERE area_id = ?1 AND shift_date = ?2 AND shift_code = ?3",
            RECORD_COLUMNS
        );
        let record = conn
            .query_row(
                &sql,
                params![area_id, format_date(shift_date), shift.to_db_str()],
                map_record_row,
            )
            .optional()?;
        Ok(record)
    }

    /// 按条件查询记录列表
    ///
    /// 排序: 日期倒序, 同日班次倒序 (C, B, A)
    pub fn list(&self, filter: &RecordFilter) -> RepositoryResult<Vec<ShiftRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM shift_record
            WHERE (?1 IS NULL OR area_id = ?1)
              AND (?2 IS NULL OR shift_date >= ?2)
              AND (?3 IS NULL OR shift_date <= ?3)
              AND (?4 IS NULL OR shift_code = ?4)
            ORDER BY shift_date DESC, shift_code DESC
            "#,
            RECORD_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                params![
                    filter.area_id,
                    filter.date_from.map(format_date),
                    filter.date_to.map(format_date),
                    filter.shift.map(|s| s.to_db_str()),
                ],
                map_record_row,
            )?
            .collect::<SqliteResult<Vec<ShiftRecord>>>()?;

        Ok(records)
    }

    /// 删除记录
    pub fn delete(&self, record_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM shift_record WHERE record_id = ?1",
            params![record_id],
        )?;
        if affected == 0 {
            return Err(not_found(record_id));
        }
        Ok(())
    }

    /// 按日期统计记录数
    pub fn count_by_date(&self, shift_date: NaiveDate) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM shift_record WHERE shift_date = ?1",
            params![format_date(shift_date)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn not_found(record_id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "ShiftRecord".to_string(),
        id: record_id.to_string(),
    }
}

// ==========================================
// 区域专属字段 <-> 平铺列
// ==========================================
struct MetricColumns<'a> {
    kind: &'static str,
    product_format: Option<&'a str>,
    output_kg: Option<f64>,
    initial_reading: Option<f64>,
    final_reading: Option<f64>,
    stop_count: u32,
    stop_reason: Option<&'a str>,
}

impl<'a> From<&'a ShiftMetrics> for MetricColumns<'a> {
    fn from(metrics: &'a ShiftMetrics) -> Self {
        match metrics {
            ShiftMetrics::Packaging {
                product_format,
                output_kg,
            } => MetricColumns {
                kind: AreaKind::Packaging.to_db_str(),
                product_format: product_format.as_deref(),
                output_kg: *output_kg,
                initial_reading: None,
                final_reading: None,
                stop_count: 0,
                stop_reason: None,
            },
            ShiftMetrics::Press {
                initial_reading,
                final_reading,
                stop_count,
                stop_reason,
            } => MetricColumns {
                kind: AreaKind::Press.to_db_str(),
                product_format: None,
                output_kg: None,
                initial_reading: *initial_reading,
                final_reading: *final_reading,
                stop_count: *stop_count,
                stop_reason: stop_reason.as_deref(),
            },
        }
    }
}

fn map_record_row(row: &Row<'_>) -> SqliteResult<ShiftRecord> {
    let shift_date: String = row.get(2)?;
    let shift_raw: String = row.get(3)?;
    let shift = ShiftCode::from_str(&shift_raw)
        .ok_or_else(|| invalid_column(3, format!("未知班次: {}", shift_raw)))?;

    let kind_raw: String = row.get(10)?;
    let metrics = match AreaKind::from_str(&kind_raw) {
        Some(AreaKind::Packaging) => ShiftMetrics::Packaging {
            product_format: row.get(11)?,
            output_kg: row.get(12)?,
        },
        Some(AreaKind::Press) => ShiftMetrics::Press {
            initial_reading: row.get(13)?,
            final_reading: row.get(14)?,
            stop_count: row.get(15)?,
            stop_reason: row.get(16)?,
        },
        None => return Err(invalid_column(10, format!("未知字段组类型: {}", kind_raw))),
    };

    let created_at: String = row.get(21)?;
    let updated_at: String = row.get(22)?;

    Ok(ShiftRecord {
        record_id: row.get(0)?,
        area_id: row.get(1)?,
        shift_date: parse_date(2, &shift_date)?,
        shift,
        start_time: parse_opt_time(4, row.get(4)?)?,
        end_time: parse_opt_time(5, row.get(5)?)?,
        planned_output: row.get(6)?,
        actual_output: row.get(7)?,
        notes: row.get(8)?,
        created_by: row.get(9)?,
        metrics,
        availability: row.get(17)?,
        performance: row.get(18)?,
        quality: row.get(19)?,
        oee: row.get(20)?,
        created_at: parse_timestamp(21, &created_at)?,
        updated_at: parse_timestamp(22, &updated_at)?,
    })
}
