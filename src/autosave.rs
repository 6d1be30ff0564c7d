use crate::debounce::{Debouncer, Scheduler};
use crate::error::{EnhanceError, Result};
use crate::storage::{autosave_key, KeyValueStore};
use crate::toast::{Notifier, Toast};
use serde_json::{Map, Value};
use std::rc::Rc;
use std::time::Duration;

/// The named, string-valued fields of a form.
pub trait FormFields {
    /// Successful controls in document order.
    fn entries(&self) -> Vec<(String, String)>;
    /// Writes `value` into the field called `name`; false when there is none.
    fn set_field(&self, name: &str, value: &str) -> bool;
}

impl<F: FormFields + ?Sized> FormFields for Rc<F> {
    fn entries(&self) -> Vec<(String, String)> {
        (**self).entries()
    }

    fn set_field(&self, name: &str, value: &str) -> bool {
        (**self).set_field(name, value)
    }
}

/// Snapshot of a form's field values. A repeated name keeps its first
/// position and its last value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutosaveRecord {
    fields: Map<String, Value>,
}

impl AutosaveRecord {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields = Map::new();
        for (name, value) in entries {
            fields.insert(name.into(), Value::String(value.into()));
        }
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|(name, value)| value.as_str().map(|v| (name.as_str(), v)))
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }

    /// Accepts only a JSON object. Non-string values are stringified so a
    /// record written by hand (`{"age": 3}`) still repopulates its field.
    pub fn parse(key: &str, raw: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|err| EnhanceError::MalformedRecord {
                key: key.to_string(),
                reason: err.to_string(),
            })?;
        let Value::Object(object) = value else {
            return Err(EnhanceError::MalformedRecord {
                key: key.to_string(),
                reason: "expected a JSON object".to_string(),
            });
        };
        let fields = object
            .into_iter()
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (name, Value::String(text))
            })
            .collect();
        Ok(Self { fields })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Absent,
    Malformed,
    Loaded { applied: usize, skipped: usize },
}

/// Load/save/clear of autosave records against a store.
pub struct Autosave<S, N> {
    store: S,
    notifier: N,
    namespace: String,
}

impl<S: KeyValueStore, N: Notifier> Autosave<S, N> {
    pub fn new(store: S, notifier: N, namespace: impl Into<String>) -> Self {
        Self {
            store,
            notifier,
            namespace: namespace.into(),
        }
    }

    pub fn key(&self, form_id: &str) -> String {
        autosave_key(&self.namespace, form_id)
    }

    pub fn save(&self, form: &impl FormFields, form_id: &str) -> Result<()> {
        let record = AutosaveRecord::from_entries(form.entries());
        let key = self.key(form_id);
        self.store.set(&key, &record.to_json())?;
        log::debug!("autosaved {} field(s) under {key}", record.len());
        self.notifier.notify(Toast::draft_saved());
        Ok(())
    }

    pub fn load(&self, form: &impl FormFields, form_id: &str) -> LoadOutcome {
        let key = self.key(form_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Absent,
            Err(err) => {
                log::error!("error reading saved form data: {err}");
                return LoadOutcome::Absent;
            }
        };
        let record = match AutosaveRecord::parse(&key, &raw) {
            Ok(record) => record,
            Err(err) => {
                log::error!("error loading saved form data: {err}");
                return LoadOutcome::Malformed;
            }
        };

        let mut applied = 0;
        let mut skipped = 0;
        for (name, value) in record.iter() {
            if form.set_field(name, value) {
                applied += 1;
            } else {
                skipped += 1;
            }
        }
        self.notifier.notify(Toast::draft_loaded());
        LoadOutcome::Loaded { applied, skipped }
    }

    pub fn clear(&self, form_id: &str) -> Result<()> {
        self.store.remove(&self.key(form_id))
    }
}

/// One autosaving form: debounced saves on input, delayed clear on submit.
pub struct AutosaveSession<S, N, F, Sch: Scheduler> {
    engine: Rc<Autosave<S, N>>,
    form: Rc<F>,
    form_id: Rc<str>,
    debouncer: Debouncer<Sch>,
    scheduler: Sch,
    clear_delay: Duration,
}

impl<S, N, F, Sch> AutosaveSession<S, N, F, Sch>
where
    S: KeyValueStore + 'static,
    N: Notifier + 'static,
    F: FormFields + 'static,
    Sch: Scheduler + Clone,
    Sch::Handle: 'static,
{
    /// Restores any saved draft and returns the session the page wires its
    /// listeners to.
    pub fn initialize(
        engine: Rc<Autosave<S, N>>,
        form: Rc<F>,
        form_id: &str,
        scheduler: Sch,
        debounce: Duration,
        clear_delay: Duration,
    ) -> (Self, LoadOutcome) {
        let outcome = engine.load(&*form, form_id);
        let session = Self {
            engine,
            form,
            form_id: Rc::from(form_id),
            debouncer: Debouncer::new(scheduler.clone(), debounce),
            scheduler,
            clear_delay,
        };
        (session, outcome)
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn on_input(&self) {
        let engine = Rc::clone(&self.engine);
        let form = Rc::clone(&self.form);
        let form_id = Rc::clone(&self.form_id);
        self.debouncer.call(move || {
            if let Err(err) = engine.save(&*form, &form_id) {
                log::error!("autosave failed: {err}");
            }
        });
    }

    /// The clear runs after a short delay so the submission itself goes first.
    pub fn on_submit(&self) {
        self.debouncer.cancel();
        let engine = Rc::clone(&self.engine);
        let form_id = Rc::clone(&self.form_id);
        let armed = self.scheduler.schedule(
            self.clear_delay,
            Box::new(move || {
                if let Err(err) = engine.clear(&form_id) {
                    log::error!("could not clear saved form data: {err}");
                }
            }),
        );
        if armed.is_none() {
            log::warn!("autosave clear for {} could not be scheduled", self.form_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::testing::ManualScheduler;
    use crate::storage::MemoryStore;
    use crate::toast::RecordingNotifier;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeForm {
        fields: RefCell<Vec<(String, String)>>,
    }

    impl FakeForm {
        fn with(fields: &[(&str, &str)]) -> Self {
            Self {
                fields: RefCell::new(
                    fields
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
            }
        }

        fn value(&self, name: &str) -> Option<String> {
            self.fields
                .borrow()
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    impl FormFields for FakeForm {
        fn entries(&self) -> Vec<(String, String)> {
            self.fields.borrow().clone()
        }

        fn set_field(&self, name: &str, value: &str) -> bool {
            let mut fields = self.fields.borrow_mut();
            match fields.iter_mut().find(|(k, _)| k == name) {
                Some(field) => {
                    field.1 = value.to_string();
                    true
                }
                None => false,
            }
        }
    }

    fn engine() -> (Rc<MemoryStore>, Rc<RecordingNotifier>, Autosave<Rc<MemoryStore>, Rc<RecordingNotifier>>) {
        let store = Rc::new(MemoryStore::new());
        let notifier = Rc::new(RecordingNotifier::new());
        let autosave = Autosave::new(Rc::clone(&store), Rc::clone(&notifier), "ns");
        (store, notifier, autosave)
    }

    #[test]
    fn profile_example_round_trips() {
        let (store, notifier, autosave) = engine();
        let form = FakeForm::with(&[("name", "Ann"), ("bio", "hi")]);
        autosave.save(&form, "profile").unwrap();
        assert_eq!(
            store.get("ns_autosave_profile").unwrap().as_deref(),
            Some(r#"{"name":"Ann","bio":"hi"}"#)
        );

        let fresh = FakeForm::with(&[("name", ""), ("bio", "")]);
        let outcome = autosave.load(&fresh, "profile");
        assert_eq!(outcome, LoadOutcome::Loaded { applied: 2, skipped: 0 });
        assert_eq!(fresh.value("name").as_deref(), Some("Ann"));
        assert_eq!(fresh.value("bio").as_deref(), Some("hi"));

        let shown = notifier.take();
        assert_eq!(shown, vec![Toast::draft_saved(), Toast::draft_loaded()]);
    }

    #[test]
    fn repeated_field_keeps_first_position_and_last_value() {
        let record = AutosaveRecord::from_entries([("a", "1"), ("b", "2"), ("a", "3")]);
        assert_eq!(record.to_json(), r#"{"a":"3","b":"2"}"#);
    }

    #[test]
    fn load_skips_unknown_fields() {
        let (store, _, autosave) = engine();
        store
            .set("ns_autosave_f", r#"{"title":"x","gone":"y"}"#)
            .unwrap();
        let form = FakeForm::with(&[("title", "")]);
        assert_eq!(
            autosave.load(&form, "f"),
            LoadOutcome::Loaded { applied: 1, skipped: 1 }
        );
        assert_eq!(form.value("title").as_deref(), Some("x"));
    }

    #[test]
    fn malformed_record_is_ignored_without_notification() {
        let (store, notifier, autosave) = engine();
        store.set("ns_autosave_f", "{oops").unwrap();
        let form = FakeForm::with(&[("title", "keep")]);
        assert_eq!(autosave.load(&form, "f"), LoadOutcome::Malformed);
        assert_eq!(form.value("title").as_deref(), Some("keep"));
        assert!(notifier.take().is_empty());

        store.set("ns_autosave_f", "[1,2]").unwrap();
        assert_eq!(autosave.load(&form, "f"), LoadOutcome::Malformed);
    }

    #[test]
    fn absent_record_is_a_no_op() {
        let (_, notifier, autosave) = engine();
        let form = FakeForm::with(&[("title", "keep")]);
        assert_eq!(autosave.load(&form, "nothing"), LoadOutcome::Absent);
        assert!(notifier.take().is_empty());
    }

    #[test]
    fn non_string_values_are_stringified() {
        let record = AutosaveRecord::parse("k", r#"{"age":3,"ok":true,"n":null}"#).unwrap();
        assert_eq!(record.get("age"), Some("3"));
        assert_eq!(record.get("ok"), Some("true"));
        assert_eq!(record.get("n"), Some(""));
    }

    #[test]
    fn clear_is_idempotent() {
        let (store, _, autosave) = engine();
        autosave.save(&FakeForm::with(&[("a", "1")]), "x").unwrap();
        autosave.clear("x").unwrap();
        autosave.clear("x").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn one_record_per_form_id() {
        let (store, _, autosave) = engine();
        autosave.save(&FakeForm::with(&[("a", "1")]), "x").unwrap();
        autosave.save(&FakeForm::with(&[("a", "2")]), "x").unwrap();
        autosave.save(&FakeForm::with(&[("a", "1")]), "y").unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("ns_autosave_x").unwrap().as_deref(), Some(r#"{"a":"2"}"#));
    }

    #[test]
    fn session_coalesces_input_burst_into_one_write() {
        let (store, notifier, autosave) = engine();
        let scheduler = ManualScheduler::new();
        let form = Rc::new(FakeForm::with(&[("essay", "")]));
        let (session, outcome) = AutosaveSession::initialize(
            Rc::new(autosave),
            Rc::clone(&form),
            "essay",
            scheduler.clone(),
            Duration::from_millis(1000),
            Duration::from_millis(100),
        );
        assert_eq!(outcome, LoadOutcome::Absent);

        for text in ["d", "dr", "dra", "draft"] {
            form.set_field("essay", text);
            session.on_input();
            scheduler.advance_ms(400);
        }
        assert!(store.is_empty());

        scheduler.advance_ms(600);
        assert_eq!(
            store.get("ns_autosave_essay").unwrap().as_deref(),
            Some(r#"{"essay":"draft"}"#)
        );
        assert_eq!(notifier.take().len(), 1);
    }

    #[test]
    fn submit_clears_after_delay_and_drops_pending_save() {
        let (store, _, autosave) = engine();
        store.set("ns_autosave_essay", r#"{"essay":"old"}"#).unwrap();
        let scheduler = ManualScheduler::new();
        let form = Rc::new(FakeForm::with(&[("essay", "")]));
        let (session, outcome) = AutosaveSession::initialize(
            Rc::new(autosave),
            Rc::clone(&form),
            "essay",
            scheduler.clone(),
            Duration::from_millis(1000),
            Duration::from_millis(100),
        );
        assert_eq!(outcome, LoadOutcome::Loaded { applied: 1, skipped: 0 });
        assert_eq!(session.form_id(), "essay");

        session.on_input();
        session.on_submit();
        scheduler.advance_ms(99);
        assert!(!store.is_empty());
        scheduler.advance_ms(1);
        assert!(store.is_empty());
        scheduler.advance_ms(2000);
        assert!(store.is_empty());
    }
}
