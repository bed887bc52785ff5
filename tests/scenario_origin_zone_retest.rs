use dexsentinel::application::strategy_engine::StrategyEngine;
use dexsentinel::application::zone_detector::ZoneDetector;
use dexsentinel::domain::alert::SignalKind;
use dexsentinel::domain::analysis::{
    AnalysisMetadata, AnalysisRaw, AnalysisResult, MovingAverages, TechnicalView, ZoneSet,
};
use dexsentinel::domain::candle::{Candle, CandleSeries, PoolId, Timeframe};
use dexsentinel::domain::fibonacci::FibonacciLevels;
use dexsentinel::domain::repositories::ZoneStateRepository;
use dexsentinel::domain::zone::ZoneTier;
use dexsentinel::infrastructure::mock::InMemoryZoneStateRepository;

const TOKEN_ADDRESS: &str = "YoungPumper";
const SYMBOL: &str = "PUMP";

/// A young token's candle history: a tight consolidation near 0.009,
/// a pump past 0.03, then a pullback that retests the consolidation
/// band at 0.011.
fn pump_and_retest_series() -> CandleSeries {
    let mut candles = Vec::new();

    for i in 0..25 {
        let jitter = 0.009 + 0.003 * ((i % 3) as f64 / 3.0);
        candles.push(Candle {
            timestamp: i as i64 * 900,
            open: jitter,
            high: jitter * 1.02,
            low: 0.009,
            close: jitter,
            volume: 500.0,
        });
    }

    for i in 25..60 {
        let price = 0.012 + 0.018 * ((i - 25) as f64 / 35.0);
        candles.push(Candle {
            timestamp: i as i64 * 900,
            open: price,
            high: price * 1.01,
            low: price * 0.99,
            close: price,
            volume: 800.0,
        });
    }

    for i in 60..75 {
        let peak = 0.012 + 0.018 * (34.0 / 35.0);
        let price = peak - (peak - 0.011) * ((i - 60) as f64 / 14.0);
        candles.push(Candle {
            timestamp: i as i64 * 900,
            open: price,
            high: price * 1.01,
            low: price * 0.99,
            close: price,
            volume: 600.0,
        });
    }

    CandleSeries::from_candles(candles)
}

/// Scenario 4: a young token pumps 200% out of a tight consolidation
/// and then pulls back into the origin band, which should fire an
/// origin-retest signal rather than being treated as a fresh zone.
#[tokio::test]
async fn origin_zone_fires_retest_on_pullback() {
    let series = pump_and_retest_series();
    let current_price = series.current_price().expect("series has candles");
    assert!((current_price - 0.011).abs() < 1e-6);

    let detection = ZoneDetector::detect(&series, Timeframe::Minute, 15);
    let origin = detection.origin.clone().expect("origin zone should be detected");
    assert!(origin.is_origin);
    assert_eq!(origin.tier, ZoneTier::Tier1);
    assert_eq!(origin.final_score, 10.0);
    let detail = origin.origin.expect("origin zone carries its consolidation detail");
    assert!((detail.zone_bottom - 0.009).abs() < 0.001);
    assert!((detail.zone_top - 0.012).abs() < 0.002);
    assert!(detail.pump_percent >= 1.0);

    let highs = series.highs();
    let lows = series.lows();
    let fibonacci = FibonacciLevels::calculate(&highs, &lows, true).expect("fib levels over this range");

    let analysis = AnalysisResult {
        metadata: AnalysisMetadata {
            pool_id: PoolId::new("solana", TOKEN_ADDRESS),
            symbol: SYMBOL.to_string(),
            timeframe: Timeframe::Minute,
            aggregate: 15,
            timestamp: 1_700_000_000,
        },
        raw: AnalysisRaw { series, current_price },
        technical: TechnicalView {
            zones: ZoneSet { origin: Some(origin), ..ZoneSet::default() },
            fibonacci,
            fibonacci_extensions: None,
            trendline: None,
            ma: MovingAverages::default(),
        },
    };

    let zone_states = InMemoryZoneStateRepository::new();
    let strategy = StrategyEngine::new(&zone_states);
    let signal = strategy
        .evaluate(&analysis, TOKEN_ADDRESS, SYMBOL, 1_700_000_000)
        .await
        .unwrap()
        .expect("origin retest signal expected");

    assert_eq!(signal.kind, SignalKind::OriginRetest);
    assert!(signal.origin_multiple.unwrap() > 1.0);

    // ZoneDetector never populated tier1/tier2, so the zone state
    // machine itself never claims a zone at this level.
    assert!(zone_states.get(TOKEN_ADDRESS, analysis.technical.zones.origin.as_ref().map(|z| z.level_price).unwrap_or(0.0)).await.unwrap().is_none());
}
