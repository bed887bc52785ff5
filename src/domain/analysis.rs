use crate::domain::candle::{CandleSeries, PoolId, Timeframe};
use crate::domain::fibonacci::{FibRatio, FibonacciLevels};
use crate::domain::trendline::Trendline;
use crate::domain::zone::Zone;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct AnalysisMetadata {
    pub pool_id: PoolId,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub aggregate: u32,
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct AnalysisRaw {
    pub series: CandleSeries,
    pub current_price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneSet {
    pub tier1: Vec<Zone>,
    pub tier2: Vec<Zone>,
    pub tier3: Vec<Zone>,
    pub supply: Vec<Zone>,
    pub demand: Vec<Zone>,
    pub origin: Option<Zone>,
}

#[derive(Debug, Clone, Default)]
pub struct MovingAverages {
    pub ema_50: Option<f64>,
    pub ema_200: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct TechnicalView {
    pub zones: ZoneSet,
    pub fibonacci: FibonacciLevels,
    pub fibonacci_extensions: Option<BTreeMap<FibRatio, f64>>,
    pub trendline: Option<Trendline>,
    pub ma: MovingAverages,
}

/// The structured technical-analysis view for one `(pool, timeframe,
/// aggregate)` snapshot. Produced fresh each scan by AnalysisEngine;
/// only state-store records (ZoneState, AlertRecord) survive restarts.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub metadata: AnalysisMetadata,
    pub raw: AnalysisRaw,
    pub technical: TechnicalView,
}

impl AnalysisResult {
    pub fn current_price(&self) -> f64 {
        self.raw.current_price
    }
}
