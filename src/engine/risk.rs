// ==========================================
// 灌区配水决策支持系统 - 缺水风险评估引擎
// ==========================================
// 职责: 灌区风险分级与建议
// 输入: 灌区ID + 水情信号 (WaterSignalSampler)
// 输出: RiskAssessment (assess 不落库；assess_and_record 经 store 落库)
// ==========================================

use crate::domain::risk::RiskAssessment;
use crate::domain::types::{current_timestamp, round_to, RiskLevel};
use crate::engine::error::EngineResult;
use crate::engine::sampler::{RiskSignals, WaterSignalSampler};
use crate::engine::store::RiskAssessmentStore;
use chrono::NaiveDateTime;
use std::sync::Arc;
use uuid::Uuid;

// ===== 分级阈值 (左闭右开) =====
pub const MODERATE_THRESHOLD: f64 = 25.0;
pub const HIGH_THRESHOLD: f64 = 50.0;
pub const CRITICAL_THRESHOLD: f64 = 75.0;

// ===== 建议文案 =====
pub const CRITICAL_RECOMMENDATION: &str = "建議立即啟動抗旱應變措施，調整配水計畫";
pub const HIGH_RECOMMENDATION: &str = "建議加強水源調度，準備備用水源";
pub const NORMAL_RECOMMENDATION: &str = "維持正常灌溉作業";

// ==========================================
// RiskAssessor - 风险评估引擎
// ==========================================
pub struct RiskAssessor {
    sampler: Arc<dyn WaterSignalSampler>,
}

impl RiskAssessor {
    pub fn new(sampler: Arc<dyn WaterSignalSampler>) -> Self {
        Self { sampler }
    }

    /// 评估单个灌区
    ///
    /// 不校验灌区是否存在；引用完整性由持久化时的外键保证。
    pub fn assess(&self, district_id: i64) -> RiskAssessment {
        let signals = self.sampler.sample_risk_signals(district_id);
        let assessment = build_assessment(district_id, &signals, current_timestamp());

        tracing::debug!(
            district_id,
            risk_level = %assessment.risk_level,
            risk_score = assessment.risk_score,
            "风险评估完成"
        );
        assessment
    }

    /// 评估并落库
    ///
    /// # 返回
    /// - Ok(RiskAssessment): 记录已落库
    /// - Err(Storage): 落库失败 (不返回评估结果)
    pub fn assess_and_record(
        &self,
        district_id: i64,
        store: &dyn RiskAssessmentStore,
    ) -> EngineResult<RiskAssessment> {
        let assessment = self.assess(district_id);
        store.insert_risk_assessment(&assessment)?;

        tracing::info!(
            district_id,
            assessment_id = %assessment.assessment_id,
            risk_level = %assessment.risk_level,
            "风险评估已落库"
        );
        Ok(assessment)
    }
}

// ==========================================
// 纯计算函数
// ==========================================

/// 风险分数分级
///
/// - `< 25` low
/// - `[25, 50)` moderate
/// - `[50, 75)` high
/// - `>= 75` critical
pub fn classify_risk_score(score: f64) -> RiskLevel {
    if score < MODERATE_THRESHOLD {
        RiskLevel::Low
    } else if score < HIGH_THRESHOLD {
        RiskLevel::Moderate
    } else if score < CRITICAL_THRESHOLD {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

/// 风险等级对应的建议 (low 与 moderate 共用一条)
pub fn risk_recommendation(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical => CRITICAL_RECOMMENDATION,
        RiskLevel::High => HIGH_RECOMMENDATION,
        RiskLevel::Moderate | RiskLevel::Low => NORMAL_RECOMMENDATION,
    }
}

/// 由信号构造评估记录
///
/// 所有数值按两位小数报告；等级与供需比按报告值计算，
/// 保证落库记录自洽。
///
/// 等级按舍入后的分数判定，而非原始采样值：例如原始分数 24.996
/// 报告为 25.00，判定为 moderate (按原始值则为 low)。
pub fn build_assessment(
    district_id: i64,
    signals: &RiskSignals,
    assessment_date: NaiveDateTime,
) -> RiskAssessment {
    let risk_score = round_to(signals.risk_score, 2);
    let risk_level = classify_risk_score(risk_score);

    let water_supply = round_to(signals.water_supply, 2);
    let water_demand = round_to(signals.water_demand, 2);
    let supply_demand_ratio = if water_demand > 0.0 {
        round_to(water_supply / water_demand, 2)
    } else {
        0.0
    };

    RiskAssessment {
        assessment_id: Uuid::new_v4().to_string(),
        district_id,
        assessment_date,
        risk_level,
        risk_score,
        water_supply,
        water_demand,
        supply_demand_ratio,
        rainfall_forecast: round_to(signals.rainfall_forecast, 2),
        reservoir_storage: round_to(signals.reservoir_storage, 2),
        factors: signals.factors,
        recommendations: risk_recommendation(risk_level).to_string(),
    }
}
