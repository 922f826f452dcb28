//! Tool-call lifecycle tracking.
//!
//! Accumulates [`ToolEvent`]s keyed by tool call ID and always hands back
//! the full accumulated list — consumers re-render the whole lifecycle on
//! each update rather than applying deltas. The map lives for one step and
//! is cleared at the start of every iteration; entries are never removed
//! individually.

use std::collections::HashMap;

use kiln_core::events::{ToolEvent, ToolEventKind};

/// Per-step accumulator of tool-call lifecycle events.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    entries: HashMap<String, Vec<ToolEvent>>,
}

impl LifecycleTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and return the full accumulated list for its call id.
    ///
    /// If the first event recorded for an id is not a `start`, an
    /// empty-message `start` is synthesized ahead of it — upstream streams
    /// occasionally omit the start, and consumers rely on the ordering
    /// invariant.
    pub fn process(&mut self, tool_call_id: &str, event: ToolEvent) -> Vec<ToolEvent> {
        let entry = self.entries.entry(tool_call_id.to_owned()).or_default();
        if entry.is_empty() && event.kind != ToolEventKind::Start {
            entry.push(ToolEvent::new(
                ToolEventKind::Start,
                event.tool_name.clone(),
                tool_call_id,
                "",
                event.args.clone(),
            ));
        }
        entry.push(event);
        entry.clone()
    }

    /// The accumulated events for a call id, if any.
    #[must_use]
    pub fn events(&self, tool_call_id: &str) -> Option<&[ToolEvent]> {
        self.entries.get(tool_call_id).map(Vec::as_slice)
    }

    /// Number of tracked call ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any call is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries. Called at the start of each iteration.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(kind: ToolEventKind, id: &str, message: &str) -> ToolEvent {
        ToolEvent::new(kind, "grep", id, message, json!({"pattern": "x"}))
    }

    #[test]
    fn start_creates_singleton_list() {
        let mut tracker = LifecycleTracker::new();
        let events = tracker.process("tc-1", event(ToolEventKind::Start, "tc-1", "grep x"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ToolEventKind::Start);
    }

    #[test]
    fn returns_full_accumulated_list() {
        let mut tracker = LifecycleTracker::new();
        let _ = tracker.process("tc-1", event(ToolEventKind::Start, "tc-1", ""));
        let _ = tracker.process("tc-1", event(ToolEventKind::Update, "tc-1", "50%"));
        let events = tracker.process("tc-1", event(ToolEventKind::End, "tc-1", "done"));
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].kind, ToolEventKind::Update);
        assert_eq!(events[2].kind, ToolEventKind::End);
    }

    #[test]
    fn synthesizes_start_for_update_only_stream() {
        let mut tracker = LifecycleTracker::new();
        let events = tracker.process("tc-1", event(ToolEventKind::Update, "tc-1", "working"));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ToolEventKind::Start);
        assert_eq!(events[0].message, "");
        assert_eq!(events[0].tool_name, "grep");
        assert_eq!(events[1].kind, ToolEventKind::Update);
    }

    #[test]
    fn does_not_synthesize_when_start_exists() {
        let mut tracker = LifecycleTracker::new();
        let _ = tracker.process("tc-1", event(ToolEventKind::Start, "tc-1", "grep x"));
        let events = tracker.process("tc-1", event(ToolEventKind::Update, "tc-1", "working"));
        assert_eq!(events.len(), 2);
        // the original start is preserved, no empty-message duplicate
        assert_eq!(events[0].message, "grep x");
    }

    #[test]
    fn synthesizes_start_for_error_only_stream() {
        let mut tracker = LifecycleTracker::new();
        let events = tracker.process("tc-1", event(ToolEventKind::Error, "tc-1", "boom"));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ToolEventKind::Start);
        assert_eq!(events[1].kind, ToolEventKind::Error);
    }

    #[test]
    fn ids_are_independent() {
        let mut tracker = LifecycleTracker::new();
        let _ = tracker.process("tc-1", event(ToolEventKind::Start, "tc-1", ""));
        let events = tracker.process("tc-2", event(ToolEventKind::Start, "tc-2", ""));
        assert_eq!(events.len(), 1);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn clear_drops_everything() {
        let mut tracker = LifecycleTracker::new();
        let _ = tracker.process("tc-1", event(ToolEventKind::Start, "tc-1", ""));
        tracker.clear();
        assert!(tracker.is_empty());
        assert!(tracker.events("tc-1").is_none());
    }
}
