// ==========================================
// 灌区配水决策支持系统 - 请求参数校验
// ==========================================
// 职责: 计算与查询前的输入校验，失败时不做任何写入
// ==========================================

use std::collections::BTreeMap;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::allocation::{ParamValue, SimulationParameters};
use crate::domain::types::MAX_AVAILABLE_WATER_WAN_T;

/// 情境名称最大长度 (字符)
pub const MAX_SCENARIO_NAME_CHARS: usize = 100;

/// 校验灌区ID
pub fn validate_district_id(district_id: i64) -> ApiResult<i64> {
    if district_id <= 0 {
        return Err(ApiError::ValidationError(format!(
            "灌区ID必须为正整数: {}",
            district_id
        )));
    }
    Ok(district_id)
}

/// 校验情境名称，返回去除首尾空白后的名称
pub fn validate_scenario_name(name: &str) -> ApiResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::ValidationError("情境名称不能为空".to_string()));
    }
    if trimmed.chars().count() > MAX_SCENARIO_NAME_CHARS {
        return Err(ApiError::ValidationError(format!(
            "情境名称不能超过{}个字符",
            MAX_SCENARIO_NAME_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

/// 校验可用水量 (万吨)
pub fn validate_available_water(value: Option<f64>) -> ApiResult<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ApiError::ValidationError(format!(
            "可用水量必须为非负数: {}",
            v
        ))),
        Some(v) if v > MAX_AVAILABLE_WATER_WAN_T => Err(ApiError::ValidationError(format!(
            "可用水量不能超过{}万吨: {}",
            MAX_AVAILABLE_WATER_WAN_T, v
        ))),
        other => Ok(other),
    }
}

/// 校验附加情境参数 (不得使用保留键)
pub fn validate_extra_parameters(extra: &BTreeMap<String, ParamValue>) -> ApiResult<()> {
    match SimulationParameters::reserved_key_in(extra) {
        Some(key) => Err(ApiError::ValidationError(format!(
            "附加参数不能使用保留键: {}",
            key
        ))),
        None => Ok(()),
    }
}

/// 校验查询条数；未提供时使用默认值
pub fn validate_limit(limit: Option<i64>, default: usize) -> ApiResult<usize> {
    match limit {
        None => Ok(default),
        Some(n) if n <= 0 => Err(ApiError::ValidationError(format!(
            "查询条数必须为正整数: {}",
            n
        ))),
        Some(n) => usize::try_from(n)
            .map_err(|_| ApiError::ValidationError(format!("查询条数超出范围: {}", n))),
    }
}

/// 校验模拟记录ID
pub fn validate_simulation_id(simulation_id: &str) -> ApiResult<&str> {
    let trimmed = simulation_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::ValidationError("模拟记录ID不能为空".to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_name() {
        assert_eq!(validate_scenario_name("  枯水期  ").unwrap(), "枯水期");
        assert!(validate_scenario_name("   ").is_err());

        let long_name: String = "水".repeat(MAX_SCENARIO_NAME_CHARS);
        assert!(validate_scenario_name(&long_name).is_ok());
        let too_long: String = "水".repeat(MAX_SCENARIO_NAME_CHARS + 1);
        assert!(validate_scenario_name(&too_long).is_err());
    }

    #[test]
    fn test_available_water() {
        assert_eq!(validate_available_water(None).unwrap(), None);
        assert_eq!(validate_available_water(Some(0.0)).unwrap(), Some(0.0));
        assert!(validate_available_water(Some(-0.5)).is_err());
        assert!(validate_available_water(Some(f64::INFINITY)).is_err());
        assert!(validate_available_water(Some(f64::NAN)).is_err());

        let max = Some(MAX_AVAILABLE_WATER_WAN_T);
        assert_eq!(validate_available_water(max).unwrap(), max);
        assert!(validate_available_water(Some(1e305)).is_err());
    }

    #[test]
    fn test_extra_parameters() {
        let mut extra = BTreeMap::new();
        extra.insert("season".to_string(), ParamValue::Text("dry".to_string()));
        assert!(validate_extra_parameters(&extra).is_ok());

        extra.insert("totalWaterAvailable".to_string(), ParamValue::Number(5000.0));
        assert!(matches!(
            validate_extra_parameters(&extra),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_limit() {
        assert_eq!(validate_limit(None, 10).unwrap(), 10);
        assert_eq!(validate_limit(Some(3), 10).unwrap(), 3);
        assert!(matches!(
            validate_limit(Some(0), 10),
            Err(ApiError::ValidationError(_))
        ));
        assert!(validate_limit(Some(-2), 10).is_err());
    }

    #[test]
    fn test_ids() {
        assert!(validate_district_id(0).is_err());
        assert_eq!(validate_district_id(5).unwrap(), 5);
        assert!(validate_simulation_id("").is_err());
        assert_eq!(validate_simulation_id(" abc ").unwrap(), "abc");
    }
}
