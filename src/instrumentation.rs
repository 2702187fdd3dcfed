//! Span timing for the search hot path.
//!
//! Enable with `--features instrumentation`. The searcher's node and expansion functions
//! carry `tracing` spans; this layer accumulates how often each ran and for how long.

use std::sync::Mutex;
use std::time::Instant;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use tracing::span;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Span name to (calls, total nanoseconds).
static TIMING_DATA: Lazy<Mutex<FxHashMap<&'static str, (u64, u64)>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));

struct TimingLayer;

impl<S> Layer<S> for TimingLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(Instant::now());
        }
    }

    fn on_exit(&self, id: &span::Id, ctx: Context<'_, S>) {
        let span = match ctx.span(id) {
            Some(span) => span,
            None => return,
        };
        let start = match span.extensions_mut().remove::<Instant>() {
            Some(start) => start,
            None => return,
        };

        let elapsed = start.elapsed().as_nanos() as u64;
        if let Ok(mut data) = TIMING_DATA.lock() {
            let entry = data.entry(span.name()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += elapsed;
        }
    }
}

/// Installs the timing layer, plus a compact span printer when `RUST_LOG` is set.
pub fn init_tracing() {
    let verbose = std::env::var("RUST_LOG")
        .map(|filter| !filter.is_empty() && filter != "off")
        .unwrap_or(false);

    let result = if verbose {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(false)
            .compact();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(TimingLayer)
            .with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("trace"))
            .with(TimingLayer);
        tracing::subscriber::set_global_default(subscriber)
    };

    if let Err(err) = result {
        eprintln!("failed to install tracing subscriber: {}", err);
    }
}

pub fn print_timing_statistics() {
    let data = match TIMING_DATA.lock() {
        Ok(data) => data,
        Err(_) => return,
    };
    if data.is_empty() {
        eprintln!("\nNo timing data collected.");
        return;
    }

    let mut entries: Vec<_> = data.iter().collect();
    entries.sort_by_key(|(_, (_, total))| std::cmp::Reverse(*total));

    eprintln!("\n{:=<72}", "");
    eprintln!(
        "{:<32} {:>12} {:>12} {:>12}",
        "Span", "Calls", "Total (ms)", "Avg (µs)"
    );
    eprintln!("{:-<72}", "");
    for (name, (count, total_nanos)) in entries {
        let total_ms = *total_nanos as f64 / 1_000_000.0;
        let avg_micros = *total_nanos as f64 / (*count).max(1) as f64 / 1_000.0;
        eprintln!(
            "{:<32} {:>12} {:>12.2} {:>12.2}",
            name, count, total_ms, avg_micros
        );
    }
    eprintln!("{:=<72}", "");
}
