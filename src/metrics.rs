// Outcome events for the bootstrap paths
//
// Reporting is a side effect only; nothing reads these events back to make
// decisions.
use crate::adb::{AdbError, AdbResult};
use serde::Serialize;
use std::sync::Mutex;

pub const CREATE_CLIENT: &str = "create_adb_client";
pub const CREATE_CLIENT_SHELL: &str = "create_adb_client.shell";
pub const CREATE_CLIENT_LIBRARY: &str = "create_adb_client.library";

/// A single success-rate sample: `value` is 1 on success, 0 on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessRate {
    pub name: String,
    pub value: u8,
    pub error: Option<String>,
}

impl SuccessRate {
    pub fn success(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: 1,
            error: None,
        }
    }

    pub fn failure(name: &str, error: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: 0,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.value == 1
    }
}

pub trait MetricsSink: Send + Sync {
    fn track(&self, event: SuccessRate);
}

/// Default sink: writes each sample to the `metrics` log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMetrics;

impl MetricsSink for LogMetrics {
    fn track(&self, event: SuccessRate) {
        match &event.error {
            None => log::info!(target: "metrics", "success-rate {} value={}", event.name, event.value),
            Some(error) => log::info!(
                target: "metrics",
                "success-rate {} value={} error={}",
                event.name,
                event.value,
                error
            ),
        }
    }
}

/// Keeps every sample in memory.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    events: Mutex<Vec<SuccessRate>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SuccessRate> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn named(&self, name: &str) -> Vec<SuccessRate> {
        self.events().into_iter().filter(|e| e.name == name).collect()
    }
}

impl MetricsSink for RecordingMetrics {
    fn track(&self, event: SuccessRate) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Records the outcome of `result` under `name`.
pub fn report<T>(sink: &dyn MetricsSink, name: &str, result: &AdbResult<T>) {
    match result {
        Ok(_) => report_ok(sink, name),
        Err(e) => report_err(sink, name, e),
    }
}

pub fn report_ok(sink: &dyn MetricsSink, name: &str) {
    sink.track(SuccessRate::success(name));
}

pub fn report_err(sink: &dyn MetricsSink, name: &str, error: &AdbError) {
    sink.track(SuccessRate::failure(name, error));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_records_success_and_failure() {
        let sink = RecordingMetrics::new();
        report(&sink, CREATE_CLIENT_SHELL, &Ok::<_, AdbError>(()));
        report::<()>(
            &sink,
            CREATE_CLIENT_SHELL,
            &Err(AdbError::NotSupported { feature: "probe" }),
        );

        let events = sink.named(CREATE_CLIENT_SHELL);
        assert_eq!(events.len(), 2);
        assert!(events[0].is_success());
        assert_eq!(events[0].error, None);
        assert!(!events[1].is_success());
        assert_eq!(
            events[1].error.as_deref(),
            Some("probe is not supported in this build")
        );
    }

    #[test]
    fn report_helpers_match_report() {
        let sink = RecordingMetrics::new();
        report_ok(&sink, CREATE_CLIENT_LIBRARY);
        report_err(&sink, CREATE_CLIENT_LIBRARY, &AdbError::LockPoisoned);

        let events = sink.named(CREATE_CLIENT_LIBRARY);
        assert_eq!(events[0], SuccessRate::success(CREATE_CLIENT_LIBRARY));
        assert_eq!(
            events[1],
            SuccessRate::failure(CREATE_CLIENT_LIBRARY, "ADB server handle lock poisoned")
        );
    }

    #[test]
    fn named_filters_other_events() {
        let sink = RecordingMetrics::new();
        sink.track(SuccessRate::success(CREATE_CLIENT));
        sink.track(SuccessRate::success(CREATE_CLIENT_LIBRARY));
        assert_eq!(sink.named(CREATE_CLIENT).len(), 1);
        assert_eq!(sink.events().len(), 2);
    }
}
