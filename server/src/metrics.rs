//! HTTP request metrics for every route, served at `/metrics`.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Paths left out of the request counters.
const UNMEASURED: &[&str] = &["/api/healthz"];

pub static METRICS: Lazy<PrometheusMetrics> = Lazy::new(|| {
    let labels = HashMap::from([("service".to_string(), env!("CARGO_PKG_NAME").to_string())]);
    UNMEASURED
        .iter()
        .fold(
            PrometheusMetricsBuilder::new("bastion")
                .endpoint("/metrics")
                .const_labels(labels),
            |builder, path| builder.exclude(*path),
        )
        .build()
        .expect("metrics builder")
});
