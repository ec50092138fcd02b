// ==========================================
// 灌区配水决策支持系统 - 驾驶舱 API
// ==========================================
// 职责: 汇总各灌区最新风险，供驾驶舱首页展示
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::domain::risk::{LatestRiskAssessment, RiskDistribution};
use crate::repository::district_repo::DistrictRepository;
use crate::repository::risk_repo::RiskAssessmentRepository;

/// 驾驶舱总览
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_districts: usize,
    pub assessed_districts: usize,
    pub risk_distribution: RiskDistribution,
    pub latest_assessments: Vec<LatestRiskAssessment>,
    /// 最近一次评估时间；尚无评估时为 None
    pub last_updated: Option<NaiveDateTime>,
}

pub struct DashboardApi {
    risk_repo: Arc<RiskAssessmentRepository>,
    district_repo: Arc<DistrictRepository>,
}

impl DashboardApi {
    pub fn new(
        risk_repo: Arc<RiskAssessmentRepository>,
        district_repo: Arc<DistrictRepository>,
    ) -> Self {
        Self {
            risk_repo,
            district_repo,
        }
    }

    /// 驾驶舱总览
    pub fn get_overview(&self) -> ApiResult<DashboardOverview> {
        let total_districts = self.district_repo.count()?;
        let latest_assessments = self.risk_repo.find_latest_per_district()?;

        let risk_distribution =
            RiskDistribution::from_levels(latest_assessments.iter().map(|l| l.assessment.risk_level));
        let last_updated = latest_assessments
            .iter()
            .map(|l| l.assessment.assessment_date)
            .max();

        Ok(DashboardOverview {
            total_districts,
            assessed_districts: latest_assessments.len(),
            risk_distribution,
            latest_assessments,
            last_updated,
        })
    }
}
