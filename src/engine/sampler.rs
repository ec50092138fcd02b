// ==========================================
// 灌区配水决策支持系统 - 水情信号采样
// ==========================================
// 职责: 为风险评估与配水模拟提供输入信号
// 说明: 目前以均匀随机抽样代替真实的降雨/蓄水/需水预测；
//       预测模型实现同一 trait 即可替换，无需改动分级与配水逻辑
// ==========================================

use crate::domain::risk::{CropStage, RainfallOutlook, RiskFactors, TemperatureOutlook};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::ops::Range;
use std::sync::Mutex;

// ===== 采样区间 =====
pub const RISK_SCORE_RANGE: Range<f64> = 0.0..100.0;
pub const RISK_SUPPLY_RANGE: Range<f64> = 5_000.0..15_000.0; // 万吨
pub const RISK_DEMAND_RANGE: Range<f64> = 4_000.0..16_000.0; // 万吨
pub const RAINFALL_FORECAST_RANGE: Range<f64> = 0.0..100.0; // mm
pub const RESERVOIR_STORAGE_RANGE: Range<f64> = 50.0..90.0; // %
pub const AVAILABLE_WATER_RANGE_T: Range<f64> = 30_000.0..80_000.0; // 吨
pub const WATER_DEMAND_RANGE_T: Range<f64> = 25_000.0..85_000.0; // 吨

/// 风险评估输入信号 (未舍入)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSignals {
    pub risk_score: f64,
    pub water_supply: f64,
    pub water_demand: f64,
    pub rainfall_forecast: f64,
    pub reservoir_storage: f64,
    pub factors: RiskFactors,
}

// ==========================================
// WaterSignalSampler Trait
// ==========================================

/// 水情信号来源
pub trait WaterSignalSampler: Send + Sync {
    /// 风险评估信号
    fn sample_risk_signals(&self, district_id: i64) -> RiskSignals;

    /// 可用水量 (吨)，调用方未提供时使用
    fn sample_available_water_t(&self, district_id: i64) -> f64;

    /// 需水量 (吨)，必须为正
    fn sample_water_demand_t(&self, district_id: i64) -> f64;
}

// ==========================================
// UniformSampler - 均匀随机抽样
// ==========================================
pub struct UniformSampler {
    rng: Mutex<ChaCha8Rng>,
}

impl UniformSampler {
    /// 使用系统熵初始化
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// 使用固定种子初始化（相同种子产生相同序列）
    pub fn from_seed_u64(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        // 采样过程中不会 panic，锁中毒时直接沿用内部状态
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }
}

impl WaterSignalSampler for UniformSampler {
    fn sample_risk_signals(&self, _district_id: i64) -> RiskSignals {
        self.with_rng(|rng| {
            let risk_score = rng.gen_range(RISK_SCORE_RANGE);
            let water_supply = rng.gen_range(RISK_SUPPLY_RANGE);
            let water_demand = rng.gen_range(RISK_DEMAND_RANGE);
            let rainfall_forecast = rng.gen_range(RAINFALL_FORECAST_RANGE);
            let reservoir_storage = rng.gen_range(RESERVOIR_STORAGE_RANGE);

            let factors = RiskFactors {
                rainfall: if rng.gen_bool(0.5) {
                    RainfallOutlook::BelowNormal
                } else {
                    RainfallOutlook::Normal
                },
                temperature: if rng.gen_bool(0.5) {
                    TemperatureOutlook::AboveNormal
                } else {
                    TemperatureOutlook::Normal
                },
                crop_stage: CropStage::Growing,
            };

            RiskSignals {
                risk_score,
                water_supply,
                water_demand,
                rainfall_forecast,
                reservoir_storage,
                factors,
            }
        })
    }

    fn sample_available_water_t(&self, _district_id: i64) -> f64 {
        self.with_rng(|rng| rng.gen_range(AVAILABLE_WATER_RANGE_T))
    }

    fn sample_water_demand_t(&self, _district_id: i64) -> f64 {
        self.with_rng(|rng| rng.gen_range(WATER_DEMAND_RANGE_T))
    }
}

// ==========================================
// FixedSampler - 外部提供的固定信号
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler {
    pub risk: RiskSignals,
    pub available_water_t: f64,
    pub water_demand_t: f64,
}

impl WaterSignalSampler for FixedSampler {
    fn sample_risk_signals(&self, _district_id: i64) -> RiskSignals {
        self.risk
    }

    fn sample_available_water_t(&self, _district_id: i64) -> f64 {
        self.available_water_t
    }

    fn sample_water_demand_t(&self, _district_id: i64) -> f64 {
        self.water_demand_t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_stay_in_range() {
        let sampler = UniformSampler::from_seed_u64(7);
        for _ in 0..500 {
            let s = sampler.sample_risk_signals(1);
            assert!(RISK_SCORE_RANGE.contains(&s.risk_score));
            assert!(RISK_SUPPLY_RANGE.contains(&s.water_supply));
            assert!(RISK_DEMAND_RANGE.contains(&s.water_demand));
            assert!(RAINFALL_FORECAST_RANGE.contains(&s.rainfall_forecast));
            assert!(RESERVOIR_STORAGE_RANGE.contains(&s.reservoir_storage));
            assert_eq!(s.factors.crop_stage, CropStage::Growing);

            assert!(AVAILABLE_WATER_RANGE_T.contains(&sampler.sample_available_water_t(1)));
            let demand = sampler.sample_water_demand_t(1);
            assert!(WATER_DEMAND_RANGE_T.contains(&demand));
            assert!(demand > 0.0);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = UniformSampler::from_seed_u64(12345);
        let b = UniformSampler::from_seed_u64(12345);
        for _ in 0..20 {
            assert_eq!(a.sample_risk_signals(3), b.sample_risk_signals(3));
            assert_eq!(a.sample_water_demand_t(3), b.sample_water_demand_t(3));
        }
    }
}
