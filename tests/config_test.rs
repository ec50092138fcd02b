// ==========================================
// 配置管理测试
// ==========================================
// 职责: 验证配置持久化与采样种子对 AppState 的影响
// ==========================================


#[cfg(test)]
mod config_test {
    use std::collections::BTreeMap;

    use water_allocation_dss::api::Actor;
    use water_allocation_dss::app::AppState;
    use water_allocation_dss::config::{config_keys, ConfigManager};

    use crate::test_helpers::{create_test_db, open_shared_connection, seed_districts};

    #[test]
    fn test_config_survives_reopen() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        {
            let config = ConfigManager::new(&db_path).unwrap();
            config
                .set_config_value(config_keys::SIMULATION_LIST_LIMIT, "25")
                .unwrap();
        }

        let config = ConfigManager::new(&db_path).unwrap();
        assert_eq!(config.get_simulation_list_limit().unwrap(), 25);
        assert_eq!(config.get_risk_history_limit().unwrap(), 30);

        let snapshot: BTreeMap<String, String> =
            serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot.get("simulation_list_limit").map(String::as_str), Some("25"));
    }

    #[test]
    fn test_sampler_seed_makes_runs_reproducible() {
        let mut plans = Vec::new();
        let mut temp_files = Vec::new();

        for _ in 0..2 {
            let (temp_file, db_path) = create_test_db().unwrap();
            let districts = seed_districts(open_shared_connection(&db_path), 1);
            ConfigManager::new(&db_path)
                .unwrap()
                .set_config_value(config_keys::SAMPLER_SEED, "20240601")
                .unwrap();

            let state = AppState::new(db_path).unwrap();
            let outcome = state
                .allocation_api
                .run_simulation(
                    Some(&Actor::local_admin()),
                    districts[0].id,
                    "重現",
                    None,
                    BTreeMap::new(),
                )
                .unwrap();
            plans.push(outcome.plan);
            temp_files.push(temp_file);
        }

        assert_eq!(plans[0], plans[1]);
    }
}
