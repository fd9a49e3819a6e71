// =============================================================================
// Yahoo Finance REST API Client — public quote and chart endpoints
// =============================================================================
//
// Both endpoints are public and unsigned. Yahoo rejects requests without a
// browser-like User-Agent, so one is installed as a default header. Every
// request carries a hard timeout; the signal layer never blocks longer than
// that on upstream data.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument, warn};

use crate::market_data::{InstrumentSnapshot, PriceBar};

/// User-Agent sent with every request. Yahoo returns 403 for the default
/// reqwest agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0";

/// Yahoo-style market data client.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `YahooClient`.
    ///
    /// # Arguments
    /// * `base_url` — provider root, e.g. "https://query1.finance.yahoo.com".
    /// * `timeout`  — hard per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");

        let base_url = base_url.into();
        debug!(base_url, "YahooClient initialised");

        Self { base_url, client }
    }

    // -------------------------------------------------------------------------
    // Quote (instrument snapshot)
    // -------------------------------------------------------------------------

    /// GET /v7/finance/quote — flat key/value attribute mapping for `symbol`.
    ///
    /// Returns `Ok(None)` when the provider knows nothing about the symbol.
    #[instrument(skip(self), name = "yahoo::get_quote")]
    pub async fn get_quote(&self, symbol: &str) -> Result<Option<InstrumentSnapshot>> {
        let url = format!("{}/v7/finance/quote?symbols={}", self.base_url, symbol);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /v7/finance/quote request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse quote response")?;

        if !status.is_success() {
            anyhow::bail!("Yahoo GET /v7/finance/quote returned {}: {}", status, body);
        }

        let snapshot = parse_quote(&body)?;
        debug!(
            symbol,
            found = snapshot.is_some(),
            "quote fetched"
        );
        Ok(snapshot)
    }

    // -------------------------------------------------------------------------
    // Chart (OHLC history)
    // -------------------------------------------------------------------------

    /// GET /v8/finance/chart — OHLC bars for `symbol` over `range` at
    /// `interval` (e.g. range "7d", interval "4h").
    ///
    /// Bars with any missing OHLC component (provider gap entries) are
    /// skipped. Order is chronological ascending as delivered.
    #[instrument(skip(self), name = "yahoo::get_history")]
    pub async fn get_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<PriceBar>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url, symbol, range, interval
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /v8/finance/chart request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse chart response")?;

        if !status.is_success() {
            anyhow::bail!("Yahoo GET /v8/finance/chart returned {}: {}", status, body);
        }

        let bars = parse_chart(&body)?;
        debug!(symbol, range, interval, count = bars.len(), "history fetched");
        Ok(bars)
    }
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Response parsing (pure, fixture-testable)
// =============================================================================

/// Extract the first quote result as an [`InstrumentSnapshot`].
///
/// `Ok(None)` when the result array is empty or missing. An explicit provider
/// error object fails the call.
fn parse_quote(body: &serde_json::Value) -> Result<Option<InstrumentSnapshot>> {
    if let Some(err) = body["quoteResponse"]["error"].as_object() {
        anyhow::bail!("quote response carries an error: {:?}", err);
    }

    let result = match body["quoteResponse"]["result"].as_array() {
        Some(arr) => arr,
        None => return Ok(None),
    };

    let first = match result.first() {
        Some(v) => v,
        None => return Ok(None),
    };

    let map = first
        .as_object()
        .context("quote result entry is not an object")?;

    Ok(Some(InstrumentSnapshot::new(map.clone())))
}

/// Parse the chart response into a [`PriceBar`] sequence.
///
/// Array indices of the chart payload:
///   result[0].timestamp[]                 — UNIX seconds per bar
///   result[0].indicators.quote[0].open[]  — may contain nulls on gap bars
///   (same for high / low / close)
fn parse_chart(body: &serde_json::Value) -> Result<Vec<PriceBar>> {
    if let Some(err) = body["chart"]["error"].as_object() {
        anyhow::bail!("chart response carries an error: {:?}", err);
    }

    let result = match body["chart"]["result"]
        .as_array()
        .and_then(|arr| arr.first())
    {
        Some(v) => v,
        None => return Ok(Vec::new()),
    };

    let timestamps = match result["timestamp"].as_array() {
        Some(arr) => arr,
        None => return Ok(Vec::new()),
    };

    let quote = &result["indicators"]["quote"][0];
    let opens = quote["open"].as_array().context("chart missing open array")?;
    let highs = quote["high"].as_array().context("chart missing high array")?;
    let lows = quote["low"].as_array().context("chart missing low array")?;
    let closes = quote["close"]
        .as_array()
        .context("chart missing close array")?;

    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, ts) in timestamps.iter().enumerate() {
        let secs = match ts.as_i64() {
            Some(s) => s,
            None => {
                warn!(index = i, "skipping bar with non-numeric timestamp");
                continue;
            }
        };

        // Gap bars carry nulls; skip the whole bar if any component is absent.
        let (open, high, low, close) = match (
            opens.get(i).and_then(|v| v.as_f64()),
            highs.get(i).and_then(|v| v.as_f64()),
            lows.get(i).and_then(|v| v.as_f64()),
            closes.get(i).and_then(|v| v.as_f64()),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };

        let timestamp = Utc
            .timestamp_opt(secs, 0)
            .single()
            .with_context(|| format!("invalid bar timestamp {secs}"))?;

        bars.push(PriceBar::new(timestamp, open, high, low, close));
    }

    Ok(bars)
}
