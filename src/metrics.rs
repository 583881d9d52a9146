//! Document counters, exported at `/metrics/documents`.
//!
//! Kept on their own registry; the request middleware owns `/metrics`.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct DocumentMetrics {
    registry: Registry,
    rendered: IntCounterVec,
    failures: IntCounterVec,
    pages: HistogramVec,
}

impl DocumentMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("voucher".to_string()), None)?;

        let rendered = IntCounterVec::new(
            Opts::new("documents_rendered_total", "Vouchers rendered to PDF"),
            &["mode"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new("documents_failed_total", "Voucher renders that failed"),
            &["reason"],
        )?;
        let pages = HistogramVec::new(
            HistogramOpts::new("document_pages", "Pages per rendered voucher")
                .buckets(vec![1.0, 2.0, 3.0, 5.0, 10.0]),
            &["mode"],
        )?;

        registry.register(Box::new(rendered.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(pages.clone()))?;

        Ok(Self {
            registry,
            rendered,
            failures,
            pages,
        })
    }

    pub fn record_render(&self, mode: RenderMode, page_count: usize) {
        self.rendered.with_label_values(&[mode.label()]).inc();
        self.pages
            .with_label_values(&[mode.label()])
            .observe(page_count as f64);
    }

    pub fn record_failure(&self, reason: &str) {
        self.failures.with_label_values(&[reason]).inc();
    }

    pub fn rendered_count(&self, mode: RenderMode) -> u64 {
        self.rendered.with_label_values(&[mode.label()]).get()
    }

    /// Prometheus text exposition of every document metric.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Download,
    Preview,
}

impl RenderMode {
    pub fn from_preview_flag(preview: bool) -> Self {
        if preview {
            RenderMode::Preview
        } else {
            RenderMode::Download
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Download => "download",
            RenderMode::Preview => "preview",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_mode() {
        let metrics = DocumentMetrics::new().unwrap();
        metrics.record_render(RenderMode::Preview, 1);
        metrics.record_render(RenderMode::Preview, 2);
        metrics.record_render(RenderMode::Download, 1);

        assert_eq!(metrics.rendered_count(RenderMode::Preview), 2);
        assert_eq!(metrics.rendered_count(RenderMode::Download), 1);
    }

    #[test]
    fn test_encode_uses_namespace() {
        let metrics = DocumentMetrics::new().unwrap();
        metrics.record_render(RenderMode::Download, 1);
        metrics.record_failure("validation");

        let text = metrics.encode().unwrap();
        assert!(text.contains("voucher_documents_rendered_total{mode=\"download\"} 1"));
        assert!(text.contains("voucher_documents_failed_total{reason=\"validation\"} 1"));
    }
}
