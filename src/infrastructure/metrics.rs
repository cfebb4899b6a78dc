// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

/// 初始化指标系统
///
/// 启用时安装 Prometheus 导出器并注册应用指标；地址无效或端口占用只记录警告
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_counter!(
        "grantsmith_proposals_generated_total",
        "Total number of generated proposals"
    );
    describe_counter!(
        "grantsmith_exports_total",
        "Total number of proposal exports by format"
    );
    describe_counter!(
        "grantsmith_source_papers_total",
        "Papers returned by each research source"
    );
    describe_histogram!(
        "grantsmith_generation_seconds",
        "Duration of comprehensive generation in seconds"
    );

    info!("Metrics exporter listening on {}", addr);
}

pub fn record_source_papers(source: &'static str, count: usize) {
    counter!("grantsmith_source_papers_total", "source" => source).increment(count as u64);
}

pub fn record_export(format: &'static str) {
    counter!("grantsmith_exports_total", "format" => format).increment(1);
}

pub fn record_generation(seconds: f64) {
    counter!("grantsmith_proposals_generated_total").increment(1);
    histogram!("grantsmith_generation_seconds").record(seconds);
}
