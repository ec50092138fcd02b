// ==========================================
// 灌区配水决策支持系统 - 灌区 API
// ==========================================
// 职责: 灌区列表查询、登记与示例数据初始化
// ==========================================

use std::sync::Arc;

use crate::api::auth::{require_admin, Actor};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_district_id;
use crate::domain::district::{demo_districts, District, NewDistrict};
use crate::repository::district_repo::DistrictRepository;

pub struct DistrictApi {
    district_repo: Arc<DistrictRepository>,
}

impl DistrictApi {
    pub fn new(district_repo: Arc<DistrictRepository>) -> Self {
        Self { district_repo }
    }

    /// 全部灌区（按名称排序）
    pub fn list_districts(&self) -> ApiResult<Vec<District>> {
        Ok(self.district_repo.list_all()?)
    }

    pub fn get_district(&self, district_id: i64) -> ApiResult<District> {
        let district_id = validate_district_id(district_id)?;
        self.district_repo
            .find_by_id(district_id)?
            .ok_or_else(|| ApiError::NotFound(format!("灌区(id={})不存在", district_id)))
    }

    /// 按代码登记或更新灌区（管理员）
    pub fn upsert_district(&self, actor: Option<&Actor>, district: &NewDistrict) -> ApiResult<District> {
        require_admin(actor)?;
        if district.name.trim().is_empty() {
            return Err(ApiError::ValidationError("灌区名称不能为空".to_string()));
        }
        Ok(self.district_repo.upsert(district)?)
    }

    /// 写入示例灌区（管理员，可重复执行）
    pub fn seed_demo_districts(&self, actor: Option<&Actor>) -> ApiResult<usize> {
        let actor = require_admin(actor)?;

        let mut count = 0;
        for district in demo_districts() {
            self.district_repo.upsert(&district)?;
            count += 1;
        }

        tracing::info!(user_id = actor.user_id, count, "示例灌区已写入");
        Ok(count)
    }
}
