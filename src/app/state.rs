// ==========================================
// 灌区配水决策支持系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AllocationApi, DashboardApi, DistrictApi, RiskApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version};
use crate::engine::{AllocationSimulator, RiskAssessor, UniformSampler, WaterSignalSampler};
use crate::repository::{DistrictRepository, RiskAssessmentRepository, SimulationRepository};

/// 应用状态
///
/// 所有仓储共享同一个数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 灌区API
    pub district_api: Arc<DistrictApi>,

    /// 缺水风险API
    pub risk_api: Arc<RiskApi>,

    /// 配水模拟API
    pub allocation_api: Arc<AllocationApi>,

    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 采样器: 配置了 sampler_seed 时使用固定种子，否则使用系统熵
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::build(db_path, None)
    }

    /// 使用外部提供的水情信号源创建 AppState
    pub fn with_sampler(
        db_path: String,
        sampler: Arc<dyn WaterSignalSampler>,
    ) -> Result<Self, String> {
        Self::build(db_path, Some(sampler))
    }

    fn build(
        db_path: String,
        sampler: Option<Arc<dyn WaterSignalSampler>>,
    ) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库表结构初始化失败: {}", e))?;
        let schema_version = read_schema_version(&conn)
            .map_err(|e| format!("读取 schema 版本失败: {}", e))?;
        tracing::debug!(?schema_version, "数据库表结构就绪");
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let district_repo = Arc::new(DistrictRepository::from_connection(conn.clone()));
        let risk_repo = Arc::new(RiskAssessmentRepository::from_connection(conn.clone()));
        let simulation_repo = Arc::new(SimulationRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let sampler: Arc<dyn WaterSignalSampler> = match sampler {
            Some(s) => s,
            None => {
                let seed = config_manager
                    .get_sampler_seed()
                    .map_err(|e| format!("读取采样种子失败: {}", e))?;
                match seed {
                    Some(seed) => {
                        tracing::info!(seed, "使用固定种子采样");
                        Arc::new(UniformSampler::from_seed_u64(seed))
                    }
                    None => Arc::new(UniformSampler::from_entropy()),
                }
            }
        };

        let assessor = Arc::new(RiskAssessor::new(sampler.clone()));
        let simulator = Arc::new(AllocationSimulator::new(sampler, simulation_repo.clone()));

        // ==========================================
        // 创建API实例
        // ==========================================
        let district_api = Arc::new(DistrictApi::new(district_repo.clone()));
        let risk_api = Arc::new(RiskApi::new(
            assessor,
            risk_repo.clone(),
            district_repo.clone(),
            config_manager.clone(),
        ));
        let allocation_api = Arc::new(AllocationApi::new(
            simulator,
            simulation_repo,
            district_repo.clone(),
            config_manager.clone(),
        ));
        let dashboard_api = Arc::new(DashboardApi::new(risk_repo, district_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            district_api,
            risk_api,
            allocation_api,
            dashboard_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 WATER_DSS_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("WATER_DSS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./water_allocation_dss.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("water-allocation-dss");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("water_allocation_dss.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
