// ==========================================
// 灌区配水决策支持系统 - 缺水风险评估领域模型
// ==========================================
// 用途: 驾驶舱风险分布、灌区风险历史
// 不变量: risk_level 由 risk_score 分段决定
// 不变量: supply_demand_ratio = water_supply / water_demand，不截断
// ==========================================

use crate::domain::types::RiskLevel;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// RiskFactors - 风险因子注记
// ==========================================

/// 降雨展望
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainfallOutlook {
    BelowNormal,
    Normal,
}

/// 气温展望
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureOutlook {
    AboveNormal,
    Normal,
}

/// 作物生长阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropStage {
    Growing,
}

/// 风险因子 (以 JSON 存储于 risk_assessment.factors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactors {
    pub rainfall: RainfallOutlook,
    pub temperature: TemperatureOutlook,
    pub crop_stage: CropStage,
}

impl Default for RiskFactors {
    fn default() -> Self {
        Self {
            rainfall: RainfallOutlook::Normal,
            temperature: TemperatureOutlook::Normal,
            crop_stage: CropStage::Growing,
        }
    }
}

// ==========================================
// RiskAssessment - 缺水风险评估记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub assessment_id: String,             // 评估ID
    pub district_id: i64,                  // 灌区ID (外键)
    pub assessment_date: NaiveDateTime,    // 评估时间

    // ===== 风险分级 =====
    pub risk_level: RiskLevel,             // 风险等级
    pub risk_score: f64,                   // 风险分数 [0,100]

    // ===== 供需 (万吨) =====
    pub water_supply: f64,                 // 供水量
    pub water_demand: f64,                 // 需水量
    pub supply_demand_ratio: f64,          // 供需比 (可 > 1)

    // ===== 水文信号 =====
    pub rainfall_forecast: f64,            // 降雨预报 (mm)
    pub reservoir_storage: f64,            // 水库蓄水率 (%)

    pub factors: RiskFactors,              // 风险因子
    pub recommendations: String,           // 建议
}

/// 灌区最新一次评估 (含灌区名称)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestRiskAssessment {
    pub district_id: i64,
    pub district_name: String,
    pub county: Option<String>,
    pub assessment: RiskAssessment,
}

/// 驾驶舱风险分布
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub critical: usize,
}

impl RiskDistribution {
    /// 统计各风险等级数量
    pub fn from_levels<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = RiskLevel>,
    {
        let mut dist = Self::default();
        for level in levels {
            match level {
                RiskLevel::Low => dist.low += 1,
                RiskLevel::Moderate => dist.moderate += 1,
                RiskLevel::High => dist.high += 1,
                RiskLevel::Critical => dist.critical += 1,
            }
        }
        dist
    }

    pub fn total(&self) -> usize {
        self.low + self.moderate + self.high + self.critical
    }
}
