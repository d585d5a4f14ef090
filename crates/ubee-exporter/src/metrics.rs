//! Prometheus exposition of a scrape result.
//!
//! Every request renders into a fresh [`Registry`], so label sets that
//! disappeared from the modem (a channel that lost lock, a firmware
//! upgrade) never linger between scrapes. Only the scrape counters carry
//! state across requests, and they live in the core's `ScrapeCounters`.

use prometheus::{
    Encoder, GaugeVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use ubee_core::models::{
    ChannelMeasurement, CounterKind, CounterMeasurement, ScrapeResult,
};
use ubee_core::stats::CounterSnapshot;

pub const NAMESPACE: &str = "ubee_uvw320b";

const DOWNSTREAM_LABELS: [&str; 4] = ["channel", "lock_status", "modulation", "frequency"];
const UPSTREAM_LABELS: [&str; 4] = ["channel", "lock_status", "channel_type", "frequency"];

/// Content type of the text exposition format.
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

/// Render one scrape, plus the running counters, in the text format.
pub fn render(result: &ScrapeResult, counters: CounterSnapshot) -> Result<String, prometheus::Error> {
    let metrics = ScrapeMetrics::new()?;
    metrics.record(result, counters);
    metrics.encode()
}

struct ScrapeMetrics {
    registry: Registry,
    scrapes: IntCounter,
    scrape_errors: IntCounter,
    field_errors: IntCounter,
    downstream_snr: GaugeVec,
    downstream_power: GaugeVec,
    correctable: IntCounter,
    uncorrectable: IntCounter,
    upstream_power: GaugeVec,
    upstream_symbol_rate: GaugeVec,
    timeouts: IntCounterVec,
    uptime: GaugeVec,
}

fn opts(name: &str, help: &str) -> Opts {
    Opts::new(name, help).namespace(NAMESPACE)
}

impl ScrapeMetrics {
    fn new() -> Result<Self, prometheus::Error> {
        let metrics = Self {
            registry: Registry::new(),
            scrapes: IntCounter::with_opts(opts(
                "status_scrapes_total",
                "Total number of modem scrapes",
            ))?,
            scrape_errors: IntCounter::with_opts(opts(
                "status_scrape_errors_total",
                "Total number of failed modem scrapes",
            ))?,
            field_errors: IntCounter::with_opts(opts(
                "field_decode_errors_total",
                "Total number of table cells that could not be decoded",
            ))?,
            downstream_snr: GaugeVec::new(
                opts("downstream_channel_snr_db", "Downstream channel signal to noise ratio in dB"),
                &DOWNSTREAM_LABELS,
            )?,
            downstream_power: GaugeVec::new(
                opts("downstream_channel_power_dbmv", "Downstream channel power level in dBmV"),
                &DOWNSTREAM_LABELS,
            )?,
            correctable: IntCounter::with_opts(opts(
                "downstream_channel_correctable_errors_total",
                "Correctable codewords reported by the modem",
            ))?,
            uncorrectable: IntCounter::with_opts(opts(
                "downstream_channel_uncorrectable_errors_total",
                "Uncorrectable codewords reported by the modem",
            ))?,
            upstream_power: GaugeVec::new(
                opts("upstream_channel_power_dbmv", "Upstream channel power level in dBmV"),
                &UPSTREAM_LABELS,
            )?,
            upstream_symbol_rate: GaugeVec::new(
                opts("upstream_channel_symbol_rate", "Upstream channel symbol rate per second"),
                &UPSTREAM_LABELS,
            )?,
            timeouts: IntCounterVec::new(
                opts("timeouts_total", "Timeouts reported by the modem"),
                &["name"],
            )?,
            uptime: GaugeVec::new(
                opts("uptime_seconds", "Modem uptime in seconds"),
                &["firmware"],
            )?,
        };

        let r = &metrics.registry;
        r.register(Box::new(metrics.scrapes.clone()))?;
        r.register(Box::new(metrics.scrape_errors.clone()))?;
        r.register(Box::new(metrics.field_errors.clone()))?;
        r.register(Box::new(metrics.downstream_snr.clone()))?;
        r.register(Box::new(metrics.downstream_power.clone()))?;
        r.register(Box::new(metrics.correctable.clone()))?;
        r.register(Box::new(metrics.uncorrectable.clone()))?;
        r.register(Box::new(metrics.upstream_power.clone()))?;
        r.register(Box::new(metrics.upstream_symbol_rate.clone()))?;
        r.register(Box::new(metrics.timeouts.clone()))?;
        r.register(Box::new(metrics.uptime.clone()))?;

        Ok(metrics)
    }

    fn record(&self, result: &ScrapeResult, counters: CounterSnapshot) {
        self.scrapes.inc_by(counters.total_scrapes);
        self.scrape_errors.inc_by(counters.scrape_errors);
        self.field_errors.inc_by(counters.field_errors);

        if !result.is_success() {
            return;
        }

        let m = &result.measurements;
        for channel in &m.channels {
            let labels = channel.labels();
            match channel {
                ChannelMeasurement::Downstream(ch) => {
                    self.downstream_snr.with_label_values(&labels).set(ch.snr_db);
                    self.downstream_power
                        .with_label_values(&labels)
                        .set(ch.power_dbmv);
                }
                ChannelMeasurement::Upstream(ch) => {
                    self.upstream_power
                        .with_label_values(&labels)
                        .set(ch.power_dbmv);
                    self.upstream_symbol_rate
                        .with_label_values(&labels)
                        .set(ch.symbol_rate);
                }
            }
        }

        for counter in &m.counters {
            self.record_counter(counter);
        }

        let uptime = m.uptime.uptime.map(|d| d.as_secs_f64()).unwrap_or_default();
        let firmware = m.uptime.firmware.as_deref().unwrap_or_default();
        self.uptime.with_label_values(&[firmware]).set(uptime);
    }

    /// Counters mirror the modem's own totals; a repeated counter keeps
    /// the last value rather than adding up.
    fn record_counter(&self, counter: &CounterMeasurement) {
        let target = match counter.kind {
            CounterKind::CorrectableErrors => self.correctable.clone(),
            CounterKind::UncorrectableErrors => self.uncorrectable.clone(),
            CounterKind::ReportedTimeouts => {
                let name = counter.name.as_deref().unwrap_or_default();
                self.timeouts.with_label_values(&[name])
            }
        };
        target.reset();
        target.inc_by(counter.value);
    }

    fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
