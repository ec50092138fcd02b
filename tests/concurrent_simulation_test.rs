// ==========================================
// 并发模拟测试
// ==========================================
// 职责: 验证同一灌区并发模拟各自落库，互不覆盖
// ==========================================


#[cfg(test)]
mod concurrent_simulation_test {
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Arc;
    use std::thread;

    use water_allocation_dss::api::Actor;

    use crate::test_helpers::{fixed_sampler, setup_app};

    #[test]
    fn test_concurrent_simulations_same_district() {
        let (_temp_file, state, districts) = setup_app(fixed_sampler(0.0, 45_000.0, 60_000.0), 1);
        let district_id = districts[0].id;
        let allocation_api = state.allocation_api.clone();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let api = Arc::clone(&allocation_api);
                thread::spawn(move || {
                    let actor = Actor::user(i);
                    api.run_simulation(
                        Some(&actor),
                        district_id,
                        &format!("並發{}", i),
                        None,
                        BTreeMap::new(),
                    )
                    .unwrap()
                })
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let ids: HashSet<_> = outcomes.iter().map(|o| o.record.simulation_id.clone()).collect();
        assert_eq!(ids.len(), 8);
        assert!(outcomes.iter().all(|o| o.plan == outcomes[0].plan));

        let stored = allocation_api.list_simulations(district_id, Some(100)).unwrap();
        assert_eq!(stored.len(), 8);
    }

    #[test]
    fn test_concurrent_assessments_all_persisted() {
        let (_temp_file, state, districts) = setup_app(fixed_sampler(40.0, 1.0, 1.0), 3);
        let risk_api = state.risk_api.clone();

        let handles: Vec<_> = districts
            .iter()
            .map(|d| {
                let api = Arc::clone(&risk_api);
                let id = d.id;
                thread::spawn(move || {
                    for _ in 0..5 {
                        api.calculate_risk(Some(&Actor::user(1)), id).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for d in &districts {
            assert_eq!(risk_api.list_history(d.id, None).unwrap().len(), 5);
        }
    }
}
