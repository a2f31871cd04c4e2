//! In-memory event capture for logging assertions
//!
//! One process-wide layer records every event. Tests share it, so queries
//! narrow by `op` and `entity_type`; use a unique entity type tag per test
//! when asserting on counts.

use relwatch_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, FIELD_ENTITY_ID, FIELD_ENTITY_TYPE, FIELD_EVENT, FIELD_OP,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event; every field is kept in its rendered form.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: Option<String>,
    pub event: Option<String>,
    pub entity_type: Option<String>,
    pub message: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn is_terminal(&self) -> bool {
        matches!(self.event.as_deref(), Some(EVENT_END) | Some(EVENT_END_ERROR))
    }
}

#[derive(Default)]
struct Fields(BTreeMap<String, String>);

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

struct RecordingLayer {
    log: EventLog,
}

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let fields = fields.0;

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            entity_type: fields.get(FIELD_ENTITY_TYPE).cloned(),
            message: fields.get("message").cloned(),
            fields,
        };

        if let Ok(mut log) = self.log.lock() {
            log.push(captured);
        }
    }
}

/// Query handle over the captured events
#[derive(Clone)]
pub struct TestCapture {
    log: EventLog,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Events logged for `op`
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.matching(|e| e.op.as_deref() == Some(op))
    }

    /// Events logged for `op` about one entity type
    pub fn events_for(&self, op: &str, entity_type: &str) -> Vec<CapturedEvent> {
        self.matching(|e| {
            e.op.as_deref() == Some(op) && e.entity_type.as_deref() == Some(entity_type)
        })
    }

    /// Latest `end` or `end_error` event of `op` for an entity type
    pub fn terminal_event(&self, op: &str, entity_type: &str) -> Option<CapturedEvent> {
        self.events_for(op, entity_type)
            .into_iter()
            .rev()
            .find(CapturedEvent::is_terminal)
    }

    /// Identifiers warned about as missing for an entity type, in log order
    pub fn missing_ids(&self, entity_type: &str) -> Vec<String> {
        self.matching(|e| {
            e.level == Level::WARN
                && e.entity_type.as_deref() == Some(entity_type)
                && e.message.as_deref() == Some("identifier missing")
        })
        .into_iter()
        .filter_map(|e| e.fields.get(FIELD_ENTITY_ID).cloned())
        .collect()
    }

    pub fn matching<F>(&self, predicate: F) -> Vec<CapturedEvent>
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().into_iter().filter(|e| predicate(e)).collect()
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install (once) and return the shared capture
///
/// ```
/// use relwatch_core::logging_facility::test_capture::init_test_capture;
/// use relwatch_core::{log_op_end, log_op_start};
///
/// let capture = init_test_capture();
/// log_op_start!("doc_example_op", entity_type = "doc-entity");
/// log_op_end!("doc_example_op", duration_ms = 1u64, entity_type = "doc-entity");
/// let end = capture.terminal_event("doc_example_op", "doc-entity").unwrap();
/// assert_eq!(end.field("duration_ms"), Some("1"));
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let log = EventLog::default();
            tracing_subscriber::registry()
                .with(RecordingLayer { log: log.clone() })
                .init();
            TestCapture { log }
        })
        .clone()
}
