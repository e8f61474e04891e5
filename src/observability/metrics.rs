//! Prometheus metrics.
//!
//! Services record through the `metrics` facade; without an installed
//! recorder every call is a no-op. The CLI installs one on demand and
//! writes the rendered exposition text at exit.

use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;

/// Handle to the installed Prometheus recorder.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    prometheus: PrometheusHandle,
}

impl MetricsHandle {
    /// Renders the current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        let mut payload = self.prometheus.render();
        if !payload.ends_with('\n') {
            payload.push('\n');
        }
        payload
    }

    /// Writes the rendered metrics to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_snapshot(&self, path: &Path) -> Result<()> {
        let payload = self.render();
        std::fs::write(path, &payload).map_err(|e| {
            Error::operation("write_metrics_snapshot", format!("{}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), bytes = payload.len(), "wrote metrics snapshot");
        Ok(())
    }
}

/// Installs the global Prometheus recorder.
///
/// # Errors
///
/// Returns an error if a recorder is already installed.
pub fn install_recorder() -> Result<MetricsHandle> {
    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::operation("metrics_recorder_install", e))?;
    Ok(MetricsHandle { prometheus })
}

/// Builds a recorder that is not installed globally.
///
/// Useful with `metrics::with_local_recorder` in tests.
#[must_use]
pub fn local_recorder() -> (metrics_exporter_prometheus::PrometheusRecorder, MetricsHandle) {
    let recorder = PrometheusBuilder::new().build_recorder();
    let prometheus = recorder.handle();
    (recorder, MetricsHandle { prometheus })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_recorder_renders_counters() {
        let (recorder, handle) = local_recorder();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("motif_retrieval_total", "status" => "success").increment(2);
        });
        let rendered = handle.render();
        assert!(rendered.contains("motif_retrieval_total{status=\"success\"} 2"));
    }

    #[test]
    fn test_write_snapshot() {
        let (recorder, handle) = local_recorder();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("edit_distance_timeouts_total").increment(1);
        });
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.prom");
        handle.write_snapshot(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("edit_distance_timeouts_total 1"));
    }
}
