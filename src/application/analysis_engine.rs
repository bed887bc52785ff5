use crate::application::cache::TtlCache;
use crate::application::indicators;
use crate::application::trendline_detector::TrendlineDetector;
use crate::application::zone_detector::ZoneDetector;
use crate::domain::analysis::{AnalysisMetadata, AnalysisRaw, AnalysisResult, MovingAverages, TechnicalView, ZoneSet};
use crate::domain::candle::{PoolId, Timeframe};
use crate::domain::errors::MarketDataError;
use crate::domain::fibonacci::FibonacciLevels;
use crate::domain::ports::MarketDataClient;
use std::sync::Arc;
use std::time::Duration;

const MAX_CANDLES: u32 = 500;
const ANALYSIS_CACHE_TTL_SECS: u64 = 300;
const ANALYSIS_BUCKET_SECS: i64 = 300;

const TIER1_CAP: usize = 3;
const TIER2_CAP: usize = 3;
const TIER3_CAP: usize = 2;

fn min_series_len(timeframe: Timeframe) -> usize {
    match timeframe {
        Timeframe::Minute => 30,
        Timeframe::Hour => 20,
        Timeframe::Day => 7,
    }
}

/// Keeps the highest-scoring zones when a tier bucket exceeds its cap.
fn cap_by_score(zones: &mut Vec<crate::domain::zone::Zone>, cap: usize) {
    zones.sort_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap_or(std::cmp::Ordering::Equal));
    zones.truncate(cap);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AnalysisCacheKey {
    pool_id: String,
    timeframe: &'static str,
    aggregate: u32,
    bucket: i64,
}

/// Orchestrates IndicatorKit/ZoneDetector/FibonacciCalculator/
/// TrendlineDetector into one AnalysisResult, fronted by a 5-minute
/// cache keyed by `(pool, timeframe, aggregate, time-bucket)`.
pub struct AnalysisEngine {
    market_data: Arc<dyn MarketDataClient>,
    cache: TtlCache<AnalysisCacheKey, Arc<AnalysisResult>>,
}

impl AnalysisEngine {
    pub fn new(market_data: Arc<dyn MarketDataClient>) -> Self {
        Self {
            market_data,
            cache: TtlCache::new(Duration::from_secs(ANALYSIS_CACHE_TTL_SECS)),
        }
    }

    pub async fn perform_analysis(
        &self,
        pool_id: &PoolId,
        timeframe: Timeframe,
        aggregate: u32,
        symbol: &str,
        now: i64,
    ) -> Result<Option<AnalysisResult>, MarketDataError> {
        let bucket = now - now.rem_euclid(ANALYSIS_BUCKET_SECS);
        let key = AnalysisCacheKey {
            pool_id: pool_id.0.clone(),
            timeframe: timeframe.as_str(),
            aggregate,
            bucket,
        };

        if let Some(hit) = self.cache.get(&key) {
            return Ok(Some((*hit).clone()));
        }

        let series = self
            .market_data
            .get_candles(pool_id, timeframe, aggregate, MAX_CANDLES)
            .await?;

        if series.len() < min_series_len(timeframe) {
            return Ok(None);
        }

        let current_price = match series.current_price() {
            Some(price) => price,
            None => return Ok(None),
        };

        let detection = ZoneDetector::detect(&series, timeframe, aggregate);
        let highs = series.highs();
        let lows = series.lows();
        let closes = series.closes();

        let Some(fibonacci) = FibonacciLevels::calculate(&highs, &lows, is_sub_30m(timeframe, aggregate)) else {
            return Ok(None);
        };
        let fibonacci_extensions = Some(fibonacci.calculate_extensions());
        let trendline = TrendlineDetector::detect(&series);

        let ema_50 = indicators::ema(&closes, 50).last().copied();
        let ema_200 = indicators::ema(&closes, 200).last().copied();

        let mut tier1 = Vec::new();
        let mut tier2 = Vec::new();
        let mut tier3 = Vec::new();
        for zone in detection.supply.iter().chain(detection.demand.iter()).cloned() {
            match zone.tier {
                crate::domain::zone::ZoneTier::Tier1 => tier1.push(zone),
                crate::domain::zone::ZoneTier::Tier2 => tier2.push(zone),
                crate::domain::zone::ZoneTier::Tier3 => tier3.push(zone),
            }
        }
        cap_by_score(&mut tier1, TIER1_CAP);
        cap_by_score(&mut tier2, TIER2_CAP);
        cap_by_score(&mut tier3, TIER3_CAP);

        let result = AnalysisResult {
            metadata: AnalysisMetadata {
                pool_id: pool_id.clone(),
                symbol: symbol.to_string(),
                timeframe,
                aggregate,
                timestamp: now,
            },
            raw: AnalysisRaw { series, current_price },
            technical: TechnicalView {
                zones: ZoneSet {
                    tier1,
                    tier2,
                    tier3,
                    supply: detection.supply,
                    demand: detection.demand,
                    origin: detection.origin,
                },
                fibonacci,
                fibonacci_extensions,
                trendline,
                ma: MovingAverages { ema_50, ema_200 },
            },
        };

        self.cache.put(key, Arc::new(result.clone()));
        Ok(Some(result))
    }
}

fn is_sub_30m(timeframe: Timeframe, aggregate: u32) -> bool {
    timeframe == Timeframe::Minute && aggregate < 30
}
