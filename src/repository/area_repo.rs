// ==========================================
// 班次 OEE 管理系统 - 生产区域数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::area::Area;
use crate::domain::types::AreaKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{format_timestamp, invalid_column, parse_timestamp};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const AREA_COLUMNS: &str = r#"
    area_id, code, name, kind, theoretical_capacity, real_capacity, active, created_at
"#;

// ==========================================
// AreaRepository - 生产区域仓储
// ==========================================

/// 生产区域仓储
/// 职责: 管理 area 表的 CRUD 操作
pub struct AreaRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AreaRepository {
    /// 创建新的区域仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入区域
    ///
    /// # 返回
    /// - Err(UniqueConstraintViolation): code 或 name 已存在
    pub fn insert(&self, area: &Area) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO area (
                area_id, code, name, kind, theoretical_capacity, real_capacity, active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                area.area_id,
                area.code,
                area.name,
                area.kind.to_db_str(),
                area.theoretical_capacity,
                area.real_capacity,
                area.active,
                format_timestamp(area.created_at),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询区域
    pub fn find_by_id(&self, area_id: &str) -> RepositoryResult<Option<Area>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM area WHERE area_id = ?1", AREA_COLUMNS);
        let area = conn
            .query_row(&sql, params![area_id], map_area_row)
            .optional()?;
        Ok(area)
    }

    /// 按区域代码查询区域（代码不区分大小写）
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Area>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM area WHERE code = ?1", AREA_COLUMNS);
        let area = conn
            .query_row(&sql, params![code.trim().to_uppercase()], map_area_row)
            .optional()?;
        Ok(area)
    }

    /// 查询区域列表
    ///
    /// # 参数
    /// - active_only: 仅返回启用的区域
    /// - kind: 按区域类型过滤（None 表示全部）
    pub fn list(&self, active_only: bool, kind: Option<AreaKind>) -> RepositoryResult<Vec<Area>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM area
            WHERE (?1 = 0 OR active = 1)
              AND (?2 IS NULL OR kind = ?2)
            ORDER BY name
            "#,
            AREA_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let areas = stmt
            .query_map(
                params![active_only, kind.map(|k| k.to_db_str())],
                map_area_row,
            )?
            .collect::<SqliteResult<Vec<Area>>>()?;

        Ok(areas)
    }

    /// 更新启用状态
    ///
    /// # 返回
    /// - Err(NotFound): 区域不存在
    pub fn set_active(&self, area_id: &str, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE area SET active = ?1 WHERE area_id = ?2",
            params![active, area_id],
        )?;
        if affected == 0 {
            return Err(not_found(area_id));
        }
        Ok(())
    }

    /// 更新产能参数
    pub fn update_capacity(
        &self,
        area_id: &str,
        theoretical_capacity: f64,
        real_capacity: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE area SET theoretical_capacity = ?1, real_capacity = ?2 WHERE area_id = ?3",
            params![theoretical_capacity, real_capacity, area_id],
        )?;
        if affected == 0 {
            return Err(not_found(area_id));
        }
        Ok(())
    }

    /// 统计启用区域数量
    pub fn count_active(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM area WHERE active = 1", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn not_found(area_id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "Area".to_string(),
        id: area_id.to_string(),
    }
}

fn map_area_row(row: &Row<'_>) -> SqliteResult<Area> {
    let kind_raw: String = row.get(3)?;
    let kind = AreaKind::from_str(&kind_raw)
        .ok_or_else(|| invalid_column(3, format!("未知区域类型: {}", kind_raw)))?;
    let created_at: String = row.get(7)?;

    Ok(Area {
        area_id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        kind,
        theoretical_capacity: row.get(4)?,
        real_capacity: row.get(5)?,
        active: row.get(6)?,
        created_at: parse_timestamp(7, &created_at)?,
    })
}
