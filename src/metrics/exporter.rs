//! Prometheus text exposition format.

use std::fmt::Write;

use super::store::{MetricName, MetricsSnapshot};

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Label carrying the target name.
pub const TARGET_LABEL: &str = "target";

/// Render a snapshot as Prometheus gauges.
///
/// Metrics without any sample are omitted entirely.
pub fn render(snapshot: &MetricsSnapshot) -> String {
    let mut output = String::new();

    for metric in MetricName::ALL {
        let mut samples = snapshot.metric(metric).peekable();
        if samples.peek().is_none() {
            continue;
        }

        let _ = writeln!(output, "# HELP {} {}", metric, metric.help());
        let _ = writeln!(output, "# TYPE {} gauge", metric);
        for (target, value) in samples {
            let _ = writeln!(
                output,
                "{}{{{}=\"{}\"}} {}",
                metric,
                TARGET_LABEL,
                escape_label_value(target),
                value
            );
        }
    }

    output
}

/// Escape a label value for the exposition format.
pub fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
