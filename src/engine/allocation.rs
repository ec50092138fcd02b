// ==========================================
// 灌区配水决策支持系统 - 配水模拟引擎
// ==========================================
// 职责: 由可用水量与需水量计算配水方案，并落库一条模拟记录
// 输入: SimulationRequest + 水情信号 (WaterSignalSampler)
// 输出: SimulationOutcome (方案 + 已落库记录)
// ==========================================

use crate::domain::allocation::{
    AllocationPlan, ParamValue, SimulationParameters, SimulationRecord, SimulationResults,
    SimulationStatus,
};
use crate::domain::types::{
    current_timestamp, round_to, tons_to_wan, wan_to_tons, AllocationPriority,
    MAX_AVAILABLE_WATER_WAN_T,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::sampler::WaterSignalSampler;
use crate::engine::store::SimulationStore;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

// ===== 优先级阈值 =====
pub const CRITICAL_RATIO_THRESHOLD: f64 = 0.7;
pub const RESTRICTED_RATIO_THRESHOLD: f64 = 0.9;
/// 低于该比例时建议启动节水措施
pub const CONSERVATION_RATIO_THRESHOLD: f64 = 0.8;

pub const CONSERVATION_RECOMMENDATIONS: [&str; 3] =
    ["建議啟動節水措施", "調整灌溉時程", "優先供應高經濟作物"];
pub const NORMAL_RECOMMENDATIONS: [&str; 2] = ["維持正常配水", "監控水源變化"];

// ==========================================
// AllocationComputation - 配水计算结果 (吨，未舍入)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationComputation {
    pub total_available_t: f64,
    pub total_demand_t: f64,
    pub allocation_ratio: f64,
    pub allocated_amount_t: f64,
    pub deficit_t: f64,
    pub priority: AllocationPriority,
}

impl AllocationComputation {
    /// 转换为万吨单位的展示方案 (水量2位小数，比例3位小数)
    pub fn to_plan(&self) -> AllocationPlan {
        AllocationPlan {
            priority: self.priority,
            allocation_ratio: round_to(self.allocation_ratio, 3),
            total_available: round_to(tons_to_wan(self.total_available_t), 2),
            total_demand: round_to(tons_to_wan(self.total_demand_t), 2),
            allocated_amount: round_to(tons_to_wan(self.allocated_amount_t), 2),
            deficit: round_to(tons_to_wan(self.deficit_t), 2),
        }
    }

    /// 建议清单
    pub fn recommendations(&self) -> Vec<String> {
        allocation_recommendations(self.allocation_ratio)
    }
}

/// 计算配水方案
///
/// - ratio = min(available / demand, 1)
/// - allocated = available × ratio
/// - deficit = max(0, demand − available)
///
/// 需水量不为正时，比例定义为 1，缺水量为 0。
pub fn compute_allocation(available_t: f64, demand_t: f64) -> AllocationComputation {
    let allocation_ratio = if demand_t > 0.0 {
        (available_t / demand_t).min(1.0)
    } else {
        1.0
    };
    let allocated_amount_t = available_t * allocation_ratio;
    let deficit_t = (demand_t - available_t).max(0.0);

    AllocationComputation {
        total_available_t: available_t,
        total_demand_t: demand_t,
        allocation_ratio,
        allocated_amount_t,
        deficit_t,
        priority: classify_priority(allocation_ratio),
    }
}

/// 配水比例 -> 优先级
///
/// - `< 0.7` critical
/// - `[0.7, 0.9)` restricted
/// - `>= 0.9` normal
pub fn classify_priority(ratio: f64) -> AllocationPriority {
    if ratio < CRITICAL_RATIO_THRESHOLD {
        AllocationPriority::Critical
    } else if ratio < RESTRICTED_RATIO_THRESHOLD {
        AllocationPriority::Restricted
    } else {
        AllocationPriority::Normal
    }
}

/// 配水比例 -> 建议清单
pub fn allocation_recommendations(ratio: f64) -> Vec<String> {
    if ratio < CONSERVATION_RATIO_THRESHOLD {
        CONSERVATION_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect()
    } else {
        NORMAL_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect()
    }
}

// ==========================================
// 请求 / 结果
// ==========================================

/// 配水模拟请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub district_id: i64,
    pub scenario_name: String,
    /// 可用水量 (万吨)；None 时由采样器提供
    pub available_water_wan_t: Option<f64>,
    /// 其他情境参数，原样记录
    #[serde(default)]
    pub extra_parameters: BTreeMap<String, ParamValue>,
    pub created_by: Option<i64>,
}

impl SimulationRequest {
    pub fn new(district_id: i64, scenario_name: &str, available_water_wan_t: Option<f64>) -> Self {
        Self {
            district_id,
            scenario_name: scenario_name.to_string(),
            available_water_wan_t,
            extra_parameters: BTreeMap::new(),
            created_by: None,
        }
    }

    pub fn created_by(mut self, user_id: i64) -> Self {
        self.created_by = Some(user_id);
        self
    }
}

/// 配水模拟结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub plan: AllocationPlan,
    pub record: SimulationRecord,
}

// ==========================================
// AllocationSimulator - 配水模拟引擎
// ==========================================
pub struct AllocationSimulator {
    sampler: Arc<dyn WaterSignalSampler>,
    store: Arc<dyn SimulationStore>,
}

impl AllocationSimulator {
    pub fn new(sampler: Arc<dyn WaterSignalSampler>, store: Arc<dyn SimulationStore>) -> Self {
        Self { sampler, store }
    }

    /// 执行一次配水模拟并落库
    ///
    /// # 返回
    /// - Ok(SimulationOutcome): 记录已落库
    /// - Err(InvalidInput): 情境名称为空、可用水量为负/非有限值/超上限、
    ///   附加参数使用保留键 (未落库)
    /// - Err(Storage): 落库失败 (不返回计算结果)
    pub fn simulate(&self, request: SimulationRequest) -> EngineResult<SimulationOutcome> {
        validate_request(&request)?;

        let district_id = request.district_id;
        let available_t = match request.available_water_wan_t {
            Some(wan) => wan_to_tons(wan),
            None => self.sampler.sample_available_water_t(district_id),
        };
        let demand_t = self.sampler.sample_water_demand_t(district_id);

        let computation = compute_allocation(available_t, demand_t);
        let record = build_record(request, &computation, current_timestamp());

        self.store.insert_simulation_record(&record)?;

        tracing::info!(
            district_id,
            simulation_id = %record.simulation_id,
            priority = %computation.priority,
            allocation_ratio = computation.allocation_ratio,
            "配水模拟完成"
        );

        Ok(SimulationOutcome {
            plan: record.allocation_plan.clone(),
            record,
        })
    }
}

/// 输入校验 (计算前拒绝)
pub fn validate_request(request: &SimulationRequest) -> EngineResult<()> {
    if request.scenario_name.trim().is_empty() {
        return Err(EngineError::InvalidInput("情境名称不能为空".to_string()));
    }

    if let Some(wan) = request.available_water_wan_t {
        if !wan.is_finite() || wan < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "可用水量必须为非负数: {}",
                wan
            )));
        }
        if wan > MAX_AVAILABLE_WATER_WAN_T {
            return Err(EngineError::InvalidInput(format!(
                "可用水量不能超过{}万吨: {}",
                MAX_AVAILABLE_WATER_WAN_T, wan
            )));
        }
    }

    if let Some(key) = SimulationParameters::reserved_key_in(&request.extra_parameters) {
        return Err(EngineError::InvalidInput(format!(
            "附加参数不能使用保留键: {}",
            key
        )));
    }

    Ok(())
}

/// 由计算结果构造模拟记录
pub fn build_record(
    request: SimulationRequest,
    computation: &AllocationComputation,
    simulation_date: NaiveDateTime,
) -> SimulationRecord {
    let plan = computation.to_plan();
    let results = SimulationResults {
        allocated_water: plan.allocated_amount,
        shortfall: plan.deficit,
        recommendations: computation.recommendations(),
    };

    SimulationRecord {
        simulation_id: Uuid::new_v4().to_string(),
        district_id: request.district_id,
        scenario_name: request.scenario_name.trim().to_string(),
        simulation_date,
        parameters: SimulationParameters {
            total_water_available: request.available_water_wan_t,
            extra: request.extra_parameters,
        },
        total_water_available: plan.total_available,
        total_water_demand: plan.total_demand,
        allocation_efficiency: round_to(computation.allocation_ratio, 2),
        allocation_plan: plan,
        results,
        status: SimulationStatus::Completed,
        created_by: request.created_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::RiskFactors;
    use crate::engine::sampler::{FixedSampler, RiskSignals, UniformSampler};
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<SimulationRecord>>,
    }

    impl SimulationStore for MemoryStore {
        fn insert_simulation_record(&self, record: &SimulationRecord) -> RepositoryResult<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct FailingStore;

    impl SimulationStore for FailingStore {
        fn insert_simulation_record(&self, _record: &SimulationRecord) -> RepositoryResult<()> {
            Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()))
        }
    }

    fn fixed(available_t: f64, demand_t: f64) -> Arc<FixedSampler> {
        Arc::new(FixedSampler {
            risk: RiskSignals {
                risk_score: 0.0,
                water_supply: 1.0,
                water_demand: 1.0,
                rainfall_forecast: 0.0,
                reservoir_storage: 50.0,
                factors: RiskFactors::default(),
            },
            available_water_t: available_t,
            water_demand_t: demand_t,
        })
    }

    #[test]
    fn test_priority_boundaries() {
        let c = compute_allocation(7000.0, 10000.0);
        assert_eq!(c.allocation_ratio, 0.7);
        assert_eq!(c.priority, AllocationPriority::Restricted);

        let c = compute_allocation(9000.0, 10000.0);
        assert_eq!(c.allocation_ratio, 0.9);
        assert_eq!(c.priority, AllocationPriority::Normal);

        assert_eq!(classify_priority(0.6999), AllocationPriority::Critical);
        assert_eq!(classify_priority(0.8999), AllocationPriority::Restricted);
    }

    #[test]
    fn test_ratio_capped_when_supply_exceeds_demand() {
        let c = compute_allocation(80_000.0, 25_000.0);
        assert_eq!(c.allocation_ratio, 1.0);
        assert_eq!(c.allocated_amount_t, 80_000.0);
        assert_eq!(c.deficit_t, 0.0);
        assert_eq!(c.priority, AllocationPriority::Normal);
    }

    #[test]
    fn test_formula_properties() {
        let rng = UniformSampler::from_seed_u64(99);
        for _ in 0..1000 {
            let a = rng.sample_available_water_t(0) - 30_000.0; // [0, 50000)
            let d = rng.sample_water_demand_t(0);
            let c = compute_allocation(a, d);

            assert!((0.0..=1.0).contains(&c.allocation_ratio));
            assert!(c.allocated_amount_t <= a);
            assert!(c.deficit_t >= 0.0);
            assert!(c.allocated_amount_t + c.deficit_t >= a.min(d) - 1e-6);
        }
    }

    #[test]
    fn test_equal_supply_and_demand() {
        let c = compute_allocation(40_000.0, 40_000.0);
        assert_eq!(c.allocation_ratio, 1.0);
        assert_eq!(c.allocated_amount_t + c.deficit_t, 40_000.0);
    }

    #[test]
    fn test_computation_is_pure() {
        let a = compute_allocation(41_234.5, 63_210.9);
        let b = compute_allocation(41_234.5, 63_210.9);
        assert_eq!(a.allocation_ratio.to_bits(), b.allocation_ratio.to_bits());
        assert_eq!(a.allocated_amount_t.to_bits(), b.allocated_amount_t.to_bits());
        assert_eq!(a.deficit_t.to_bits(), b.deficit_t.to_bits());
        assert_eq!(a.to_plan(), b.to_plan());
    }

    #[test]
    fn test_zero_demand_guard() {
        let c = compute_allocation(5000.0, 0.0);
        assert_eq!(c.allocation_ratio, 1.0);
        assert_eq!(c.deficit_t, 0.0);
        assert_eq!(c.priority, AllocationPriority::Normal);
    }

    #[test]
    fn test_recommendation_threshold() {
        assert_eq!(allocation_recommendations(0.79).len(), 3);
        assert_eq!(allocation_recommendations(0.79)[0], "建議啟動節水措施");
        assert_eq!(allocation_recommendations(0.8), vec!["維持正常配水", "監控水源變化"]);
    }

    #[test]
    fn test_plan_units_and_precision() {
        let plan = compute_allocation(45_000.0, 60_000.0).to_plan();
        assert_eq!(plan.allocation_ratio, 0.75);
        assert_eq!(plan.total_available, 4.5);
        assert_eq!(plan.total_demand, 6.0);
        assert_eq!(plan.allocated_amount, 3.38); // 33750 吨
        assert_eq!(plan.deficit, 1.5);
        assert_eq!(plan.priority, AllocationPriority::Restricted);

        let plan = compute_allocation(20_000.0, 30_000.0).to_plan();
        assert_eq!(plan.allocation_ratio, 0.667);
    }

    #[test]
    fn test_supplied_water_converted_once() {
        let store = Arc::new(MemoryStore::default());
        let simulator = AllocationSimulator::new(fixed(1.0, 60_000_000.0), store.clone());

        let outcome = simulator
            .simulate(SimulationRequest::new(4, "乾旱情境", Some(5000.0)))
            .unwrap();

        // 5000 万吨 = 50,000,000 吨
        assert_eq!(outcome.plan.total_available, 5000.0);
        assert_eq!(outcome.plan.total_demand, 6000.0);
        assert_eq!(outcome.record.parameters.total_water_available, Some(5000.0));
        assert_eq!(outcome.record.total_water_available, 5000.0);
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_sampled_water_when_not_supplied() {
        let store = Arc::new(MemoryStore::default());
        let simulator = AllocationSimulator::new(fixed(35_000.0, 70_000.0), store.clone());

        let outcome = simulator
            .simulate(SimulationRequest::new(2, "基準情境", None).created_by(42))
            .unwrap();

        assert_eq!(outcome.plan.total_available, 3.5);
        assert_eq!(outcome.plan.allocation_ratio, 0.5);
        assert_eq!(outcome.plan.priority, AllocationPriority::Critical);
        assert_eq!(outcome.record.results.shortfall, 3.5);
        assert_eq!(outcome.record.results.recommendations.len(), 3);
        assert_eq!(outcome.record.allocation_efficiency, 0.5);
        assert_eq!(outcome.record.created_by, Some(42));
        assert_eq!(outcome.record.parameters.total_water_available, None);
        assert_eq!(outcome.plan, outcome.record.allocation_plan);
    }

    #[test]
    fn test_invalid_input_not_persisted() {
        let store = Arc::new(MemoryStore::default());
        let simulator = AllocationSimulator::new(fixed(1.0, 1.0), store.clone());

        let err = simulator
            .simulate(SimulationRequest::new(1, "   ", None))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = simulator
            .simulate(SimulationRequest::new(1, "負值", Some(-1.0)))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = simulator
            .simulate(SimulationRequest::new(1, "NaN", Some(f64::NAN)))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = simulator
            .simulate(SimulationRequest::new(1, "溢位", Some(1e305)))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let mut request = SimulationRequest::new(1, "重複鍵", Some(3.0));
        request
            .extra_parameters
            .insert("totalWaterAvailable".to_string(), ParamValue::Number(5000.0));
        let err = simulator.simulate(request).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        assert!(store.records.lock().unwrap().is_empty());
    }

    #[test]
    fn test_largest_supplied_water_stays_finite() {
        let store = Arc::new(MemoryStore::default());
        let simulator = AllocationSimulator::new(fixed(1.0, 1.0), store.clone());

        let outcome = simulator
            .simulate(SimulationRequest::new(1, "上限", Some(MAX_AVAILABLE_WATER_WAN_T)))
            .unwrap();
        let plan = &outcome.plan;
        for value in [plan.total_available, plan.allocated_amount, plan.deficit] {
            assert!(value.is_finite());
        }
        assert_eq!(plan.total_available, MAX_AVAILABLE_WATER_WAN_T);
    }

    #[test]
    fn test_storage_failure_propagates() {
        let simulator = AllocationSimulator::new(fixed(1.0, 1.0), Arc::new(FailingStore));
        let err = simulator
            .simulate(SimulationRequest::new(1, "情境", Some(1.0)))
            .unwrap_err();
        assert!(matches!(err, EngineError::Storage(_)));
    }
}
