// ==========================================
// 灌区配水决策支持系统 - 缺水风险 API
// ==========================================
// 职责: 单灌区评估、全量重算、历史与最新评估查询
// 权限: 单灌区评估需登录；全量重算需管理员
// ==========================================

use std::sync::Arc;

use crate::api::auth::{require_admin, require_authenticated, Actor};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_district_id, validate_limit};
use crate::config::ConfigManager;
use crate::domain::risk::{LatestRiskAssessment, RiskAssessment};
use crate::engine::risk::RiskAssessor;
use crate::repository::district_repo::DistrictRepository;
use crate::repository::risk_repo::RiskAssessmentRepository;

pub struct RiskApi {
    assessor: Arc<RiskAssessor>,
    risk_repo: Arc<RiskAssessmentRepository>,
    district_repo: Arc<DistrictRepository>,
    config: Arc<ConfigManager>,
}

impl RiskApi {
    pub fn new(
        assessor: Arc<RiskAssessor>,
        risk_repo: Arc<RiskAssessmentRepository>,
        district_repo: Arc<DistrictRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            assessor,
            risk_repo,
            district_repo,
            config,
        }
    }

    /// 计算并保存单个灌区的风险评估
    ///
    /// # 返回
    /// - Ok(RiskAssessment): 已落库的评估
    /// - Err(Unauthorized): 未登录
    /// - Err(NotFound): 灌区不存在
    /// - Err(AssessmentFailed): 落库失败
    pub fn calculate_risk(&self, actor: Option<&Actor>, district_id: i64) -> ApiResult<RiskAssessment> {
        let actor = require_authenticated(actor)?;
        let district_id = validate_district_id(district_id)?;
        self.ensure_district_exists(district_id)?;

        let assessment = self
            .assessor
            .assess_and_record(district_id, self.risk_repo.as_ref())
            .map_err(ApiError::from_assessment_error)?;

        tracing::info!(
            user_id = actor.user_id,
            district_id,
            risk_level = %assessment.risk_level,
            "单灌区风险评估完成"
        );
        Ok(assessment)
    }

    /// 为所有灌区重新计算风险评估（管理员）
    ///
    /// # 返回
    /// - Ok(usize): 新增评估条数
    pub fn calculate_all(&self, actor: Option<&Actor>) -> ApiResult<usize> {
        let actor = require_admin(actor)?;
        let districts = self
            .district_repo
            .list_all()
            .map_err(ApiError::from_assessment_storage)?;

        let mut count = 0;
        for district in &districts {
            self.assessor
                .assess_and_record(district.id, self.risk_repo.as_ref())
                .map_err(ApiError::from_assessment_error)?;
            count += 1;
        }

        tracing::info!(user_id = actor.user_id, count, "全量风险重算完成");
        Ok(count)
    }

    /// 灌区评估历史（最新在前，默认条数取自配置）
    pub fn list_history(&self, district_id: i64, limit: Option<i64>) -> ApiResult<Vec<RiskAssessment>> {
        let district_id = validate_district_id(district_id)?;
        let default_limit = self
            .config
            .get_risk_history_limit()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        let limit = validate_limit(limit, default_limit)?;

        Ok(self.risk_repo.find_by_district(district_id, limit)?)
    }

    /// 每个灌区的最新评估
    pub fn list_latest(&self) -> ApiResult<Vec<LatestRiskAssessment>> {
        Ok(self.risk_repo.find_latest_per_district()?)
    }

    fn ensure_district_exists(&self, district_id: i64) -> ApiResult<()> {
        let district = self
            .district_repo
            .find_by_id(district_id)
            .map_err(ApiError::from_assessment_storage)?;
        match district {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound(format!("灌区(id={})不存在", district_id))),
        }
    }
}
