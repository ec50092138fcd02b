// ==========================================
// 灌区配水决策支持系统 - 配水模拟领域模型
// ==========================================
// 不变量: allocated_amount = total_available × allocation_ratio
// 不变量: deficit = max(0, total_demand − total_available)
// 不变量: allocation_ratio = min(total_available / total_demand, 1)
// 模拟记录只追加、不修改，可按ID物理删除
// ==========================================

use crate::domain::types::AllocationPriority;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// AllocationPlan - 配水方案 (万吨)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPlan {
    pub priority: AllocationPriority, // 优先级
    pub allocation_ratio: f64,        // 配水比例 [0,1]，3位小数
    pub total_available: f64,         // 可用水量
    pub total_demand: f64,            // 需水量
    pub allocated_amount: f64,        // 配水量
    pub deficit: f64,                 // 缺水量
}

// ==========================================
// SimulationParameters - 模拟输入参数
// ==========================================

/// 参数标量值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

/// 已由 `SimulationParameters` 字段占用的键，不允许出现在附加参数中
pub const RESERVED_PARAMETER_KEYS: [&str; 1] = ["totalWaterAvailable"];

/// 模拟输入参数
///
/// `totalWaterAvailable` 为万吨单位；其余键原样保留，值只允许标量。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_water_available: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, ParamValue>,
}

impl SimulationParameters {
    /// 附加参数中与保留键冲突的第一个键
    pub fn reserved_key_in<'a>(extra: &'a BTreeMap<String, ParamValue>) -> Option<&'a str> {
        extra
            .keys()
            .map(String::as_str)
            .find(|key| RESERVED_PARAMETER_KEYS.contains(key))
    }
}

// ==========================================
// SimulationResults - 模拟结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResults {
    pub allocated_water: f64,          // 配水量 (万吨)
    pub shortfall: f64,                // 缺水量 (万吨)
    pub recommendations: Vec<String>,  // 建议
}

/// 模拟状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationStatus {
    Completed,
}

impl SimulationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationStatus::Completed => "completed",
        }
    }
}

// ==========================================
// SimulationRecord - 配水模拟记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    pub simulation_id: String,              // 模拟ID
    pub district_id: i64,                   // 灌区ID (外键)
    pub scenario_name: String,              // 情境名称
    pub simulation_date: NaiveDateTime,     // 模拟时间
    pub parameters: SimulationParameters,   // 输入参数

    // ===== 汇总 (万吨) =====
    pub total_water_available: f64,
    pub total_water_demand: f64,
    pub allocation_efficiency: f64,         // 配水比例，2位小数

    pub allocation_plan: AllocationPlan,
    pub results: SimulationResults,
    pub status: SimulationStatus,
    pub created_by: Option<i64>,            // 操作人
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_keep_extra_scalars() {
        let raw = r#"{"totalWaterAvailable": 5000, "season": "dry", "useReserve": true, "weight": 0.5}"#;
        let params: SimulationParameters = serde_json::from_str(raw).unwrap();

        assert_eq!(params.total_water_available, Some(5000.0));
        assert_eq!(params.extra.get("season"), Some(&ParamValue::Text("dry".to_string())));
        assert_eq!(params.extra.get("useReserve"), Some(&ParamValue::Flag(true)));
        assert_eq!(params.extra.get("weight"), Some(&ParamValue::Number(0.5)));
    }

    #[test]
    fn test_reserved_key_detected() {
        let mut extra = BTreeMap::new();
        extra.insert("season".to_string(), ParamValue::Text("dry".to_string()));
        assert_eq!(SimulationParameters::reserved_key_in(&extra), None);

        extra.insert("totalWaterAvailable".to_string(), ParamValue::Number(5000.0));
        assert_eq!(
            SimulationParameters::reserved_key_in(&extra),
            Some("totalWaterAvailable")
        );
    }

    #[test]
    fn test_parameters_without_available_water() {
        let params = SimulationParameters::default();
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_plan_camel_case() {
        let plan = AllocationPlan {
            priority: AllocationPriority::Restricted,
            allocation_ratio: 0.7,
            total_available: 0.7,
            total_demand: 1.0,
            allocated_amount: 0.49,
            deficit: 0.3,
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["priority"], "restricted");
        assert!(json.get("allocationRatio").is_some());
        assert!(json.get("allocatedAmount").is_some());
    }
}
