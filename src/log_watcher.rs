//! Watch counters for device log lines.
//!
//! Each counter is keyed by its label (the expression text as typed) and
//! counts the log messages its expression matches, case-insensitively.

use crate::adb::{AdbError, AdbResult};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Counter {
    pub label: String,
    #[serde(skip)]
    pub expression: Regex,
    pub count: u64,
    pub notify: bool,
}

impl Counter {
    pub fn new(label: &str) -> AdbResult<Self> {
        let expression = RegexBuilder::new(label)
            .case_insensitive(true)
            .build()
            .map_err(|source| AdbError::InvalidExpression {
                expression: label.to_string(),
                source,
            })?;
        Ok(Self {
            label: label.to_string(),
            expression,
            count: 0,
            notify: false,
        })
    }

    pub fn matches(&self, message: &str) -> bool {
        self.expression.is_match(message)
    }
}

/// Ordered list of counters with unique labels.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CounterList {
    counters: Vec<Counter>,
}

impl CounterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> &[Counter] {
        &self.counters
    }

    pub fn get(&self, label: &str) -> Option<&Counter> {
        self.counters.iter().find(|c| c.label == label)
    }

    /// Adds a counter for `input`. Empty input and duplicate labels are
    /// ignored and return `Ok(false)`.
    pub fn add(&mut self, input: &str) -> AdbResult<bool> {
        if input.is_empty() || self.get(input).is_some() {
            return Ok(false);
        }
        self.counters.push(Counter::new(input)?);
        Ok(true)
    }

    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.counters.len();
        self.counters.retain(|c| c.label != label);
        self.counters.len() != before
    }

    pub fn reset_count(&mut self, label: &str) -> bool {
        self.with_counter(label, |c| c.count = 0)
    }

    pub fn set_notify(&mut self, label: &str, notify: bool) -> bool {
        self.with_counter(label, |c| c.notify = notify)
    }

    /// Counts `message` against every counter; returns the labels that
    /// matched and want a notification.
    pub fn observe(&mut self, message: &str) -> Vec<String> {
        let mut notify = Vec::new();
        for counter in self.counters.iter_mut().filter(|c| c.matches(message)) {
            counter.count += 1;
            if counter.notify {
                notify.push(counter.label.clone());
            }
        }
        notify
    }

    fn with_counter(&mut self, label: &str, update: impl FnOnce(&mut Counter)) -> bool {
        match self.counters.iter_mut().find(|c| c.label == label) {
            Some(counter) => {
                update(counter);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_empty_and_duplicate_labels() {
        let mut list = CounterList::new();
        assert!(list.add("ANR").unwrap());
        assert!(!list.add("ANR").unwrap());
        assert!(!list.add("").unwrap());
        assert_eq!(list.counters().len(), 1);
    }

    #[test]
    fn add_reports_invalid_expression() {
        let mut list = CounterList::new();
        let err = list.add("(unclosed").unwrap_err();
        assert!(matches!(err, AdbError::InvalidExpression { .. }));
        assert!(list.counters().is_empty());
    }

    #[test]
    fn observe_counts_case_insensitive_matches() {
        let mut list = CounterList::new();
        list.add("fatal exception").unwrap();
        list.add(r"gc_\w+").unwrap();

        list.observe("FATAL EXCEPTION: main");
        list.observe("GC_CONCURRENT freed 1024K");
        list.observe("Fatal Exception in thread");
        list.observe("nothing here");

        assert_eq!(list.get("fatal exception").unwrap().count, 2);
        assert_eq!(list.get(r"gc_\w+").unwrap().count, 1);
    }

    #[test]
    fn observe_returns_only_notifying_counters() {
        let mut list = CounterList::new();
        list.add("crash").unwrap();
        list.add("boot").unwrap();
        assert!(list.set_notify("crash", true));

        assert_eq!(list.observe("app crash during boot"), vec!["crash".to_string()]);
        assert_eq!(list.get("boot").unwrap().count, 1);
    }

    #[test]
    fn reset_and_remove() {
        let mut list = CounterList::new();
        list.add("crash").unwrap();
        list.observe("crash");
        list.observe("crash");

        assert!(list.reset_count("crash"));
        assert_eq!(list.get("crash").unwrap().count, 0);
        assert!(!list.reset_count("missing"));

        assert!(list.remove("crash"));
        assert!(!list.remove("crash"));
        assert!(list.counters().is_empty());
    }
}
