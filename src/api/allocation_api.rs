// ==========================================
// 灌区配水决策支持系统 - 配水模拟 API
// ==========================================
// 职责: 执行配水模拟、查询与删除模拟记录
// 权限: 执行与删除需登录
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::auth::{require_authenticated, Actor};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    validate_available_water, validate_district_id, validate_extra_parameters, validate_limit,
    validate_scenario_name, validate_simulation_id,
};
use crate::config::ConfigManager;
use crate::domain::allocation::{ParamValue, SimulationRecord};
use crate::engine::allocation::{AllocationSimulator, SimulationOutcome, SimulationRequest};
use crate::repository::district_repo::DistrictRepository;
use crate::repository::simulation_repo::SimulationRepository;

pub struct AllocationApi {
    simulator: Arc<AllocationSimulator>,
    simulation_repo: Arc<SimulationRepository>,
    district_repo: Arc<DistrictRepository>,
    config: Arc<ConfigManager>,
}

impl AllocationApi {
    pub fn new(
        simulator: Arc<AllocationSimulator>,
        simulation_repo: Arc<SimulationRepository>,
        district_repo: Arc<DistrictRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            simulator,
            simulation_repo,
            district_repo,
            config,
        }
    }

    /// 执行配水模拟
    ///
    /// # 参数
    /// - available_water_wan_t: 可用水量 (万吨)，None 时由采样器提供
    /// - extra_parameters: 其他情境参数，原样记录
    ///
    /// # 返回
    /// - Ok(SimulationOutcome): 方案与已落库记录
    /// - Err(ValidationError): 输入无效 (未落库)
    /// - Err(SimulationFailed): 落库失败
    pub fn run_simulation(
        &self,
        actor: Option<&Actor>,
        district_id: i64,
        scenario_name: &str,
        available_water_wan_t: Option<f64>,
        extra_parameters: BTreeMap<String, ParamValue>,
    ) -> ApiResult<SimulationOutcome> {
        let actor = require_authenticated(actor)?;
        let district_id = validate_district_id(district_id)?;
        let scenario_name = validate_scenario_name(scenario_name)?;
        let available_water_wan_t = validate_available_water(available_water_wan_t)?;
        validate_extra_parameters(&extra_parameters)?;

        let district = self
            .district_repo
            .find_by_id(district_id)
            .map_err(ApiError::from_simulation_storage)?;
        if district.is_none() {
            return Err(ApiError::NotFound(format!("灌区(id={})不存在", district_id)));
        }

        let mut request = SimulationRequest::new(district_id, &scenario_name, available_water_wan_t)
            .created_by(actor.user_id);
        request.extra_parameters = extra_parameters;

        self.simulator
            .simulate(request)
            .map_err(ApiError::from_simulation_error)
    }

    /// 灌区模拟记录（最新在前，默认条数取自配置）
    pub fn list_simulations(
        &self,
        district_id: i64,
        limit: Option<i64>,
    ) -> ApiResult<Vec<SimulationRecord>> {
        let district_id = validate_district_id(district_id)?;
        let default_limit = self
            .config
            .get_simulation_list_limit()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        let limit = validate_limit(limit, default_limit)?;

        Ok(self.simulation_repo.find_by_district(district_id, limit)?)
    }

    /// 按ID查询模拟记录
    pub fn get_simulation(&self, simulation_id: &str) -> ApiResult<SimulationRecord> {
        let simulation_id = validate_simulation_id(simulation_id)?;
        self.simulation_repo
            .find_by_id(simulation_id)?
            .ok_or_else(|| ApiError::NotFound(format!("模拟记录(id={})不存在", simulation_id)))
    }

    /// 删除模拟记录
    ///
    /// # 返回
    /// - Err(NotFound): 记录不存在
    pub fn delete_simulation(&self, actor: Option<&Actor>, simulation_id: &str) -> ApiResult<()> {
        let actor = require_authenticated(actor)?;
        let simulation_id = validate_simulation_id(simulation_id)?;

        self.simulation_repo.delete(simulation_id)?;

        tracing::info!(user_id = actor.user_id, simulation_id, "模拟记录已删除");
        Ok(())
    }
}
