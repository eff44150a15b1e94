// ==========================================
// 班次 OEE 管理系统 - 生产区域 API
// ==========================================
// 职责: 区域创建、启停、产能参数维护
// 红线: 区域代码统一大写; 代码与名称全局唯一
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_capacity, validate_new_area};
use crate::domain::area::{Area, AreasByKind, NewArea};
use crate::domain::types::AreaKind;
use crate::repository::area_repo::AreaRepository;
use crate::repository::error::RepositoryError;

// ==========================================
// AreaApi - 生产区域 API
// ==========================================
pub struct AreaApi {
    area_repo: Arc<AreaRepository>,
}

impl AreaApi {
    pub fn new(area_repo: Arc<AreaRepository>) -> Self {
        Self { area_repo }
    }

    /// 创建区域
    ///
    /// # 返回
    /// - Ok(Area): 新建区域 (active = true)
    /// - Err(ValidationError): 代码格式/名称/产能不合法
    /// - Err(BusinessRuleViolation): 代码或名称已存在
    #[instrument(skip(self, new_area), fields(code = %new_area.code))]
    pub fn create_area(&self, new_area: NewArea) -> ApiResult<Area> {
        validate_new_area(&new_area)?;

        let area = Area {
            area_id: Uuid::new_v4().to_string(),
            code: new_area.code.trim().to_uppercase(),
            name: new_area.name.trim().to_string(),
            kind: new_area.kind,
            theoretical_capacity: new_area.theoretical_capacity,
            real_capacity: new_area.real_capacity,
            active: true,
            created_at: Utc::now(),
        };

        match self.area_repo.insert(&area) {
            Ok(()) => {}
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "区域代码或名称已存在: code={}, name={}",
                    area.code, area.name
                )));
            }
            Err(e) => return Err(e.into()),
        }

        info!(area_id = %area.area_id, kind = %area.kind, "区域已创建");
        Ok(area)
    }

    /// 按ID获取区域
    pub fn get_area(&self, area_id: &str) -> ApiResult<Area> {
        self.area_repo
            .find_by_id(area_id)?
            .ok_or_else(|| ApiError::NotFound(format!("区域(id={})不存在", area_id)))
    }

    /// 按代码获取区域
    pub fn get_area_by_code(&self, code: &str) -> ApiResult<Area> {
        self.area_repo
            .find_by_code(code)?
            .ok_or_else(|| ApiError::NotFound(format!("区域(code={})不存在", code)))
    }

    /// 列出启用区域（按名称排序）
    pub fn list_active_areas(&self) -> ApiResult<Vec<Area>> {
        Ok(self.area_repo.list(true, None)?)
    }

    /// 列出全部区域（含停用）
    pub fn list_all_areas(&self) -> ApiResult<Vec<Area>> {
        Ok(self.area_repo.list(false, None)?)
    }

    /// 启用区域按类型分组
    pub fn list_by_kind(&self) -> ApiResult<AreasByKind> {
        let mut grouped = AreasByKind::default();
        for area in self.area_repo.list(true, None)? {
            match area.kind {
                AreaKind::Packaging => grouped.packaging.push(area),
                AreaKind::Press => grouped.press.push(area),
            }
        }
        Ok(grouped)
    }

    /// 启用/停用区域
    ///
    /// 停用区域不再接受新的班次记录, 历史记录保留
    #[instrument(skip(self))]
    pub fn set_area_active(&self, area_id: &str, active: bool) -> ApiResult<()> {
        self.area_repo.set_active(area_id, active)?;
        info!("区域启用状态已更新");
        Ok(())
    }

    /// 更新产能参数
    ///
    /// 已有记录的派生指标不回溯重算
    #[instrument(skip(self))]
    pub fn update_capacity(
        &self,
        area_id: &str,
        theoretical_capacity: f64,
        real_capacity: f64,
    ) -> ApiResult<Area> {
        validate_capacity(theoretical_capacity, real_capacity)?;
        self.area_repo
            .update_capacity(area_id, theoretical_capacity, real_capacity)?;
        info!("区域产能已更新");
        self.get_area(area_id)
    }

    /// 启用区域数量
    pub fn count_active(&self) -> ApiResult<usize> {
        Ok(self.area_repo.count_active()?)
    }
}
