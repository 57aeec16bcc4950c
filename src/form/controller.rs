use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::event::SubmitTrigger;
use super::model::{FormModel, decode_values};
use super::value::{FieldValue, ValueMap, maps_equal, merge_into, strictly_differs};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl AsRef<str> for FieldKey {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormOptions {
    pub initial_values: ValueMap,
    /// Re-baseline from [`FormController::sync_initial_values`] when the
    /// supplied initial values differ from the last ones seen.
    pub resync_on_external_change: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormState {
    pub is_dirty: bool,
    pub is_submitted: bool,
    pub values: ValueMap,
    pub is_valid: bool,
}

impl FormState {
    pub fn values_as<T>(&self) -> FormResult<T>
    where
        T: DeserializeOwned,
    {
        decode_values(&self.values)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    UnknownField(String),
    FieldAlreadyMounted(String),
    Model(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::UnknownField(name) => write!(f, "field `{name}` is not mounted"),
            FormError::FieldAlreadyMounted(name) => {
                write!(f, "field `{name}` is already mounted")
            }
            FormError::Model(error) => write!(f, "failed to convert form model: {error}"),
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

pub(super) type OutputFormatterFn<O> = Arc<dyn Fn(&ValueMap) -> O + Send + Sync>;
pub(super) type ChangeListenerFn<O> = Arc<dyn Fn(&O) + Send + Sync>;
pub(super) type StateListenerFn = Arc<dyn Fn(&FormState) + Send + Sync>;
pub type ChangeValuesFn = Arc<dyn Fn(ValueMap) -> FormResult<()> + Send + Sync>;
pub type ChangeInvalidFieldsFn = Arc<dyn Fn(&str, bool) -> FormResult<()> + Send + Sync>;

/// Everything a field needs from its form, bound to one field name.
#[derive(Clone)]
pub struct FieldProps {
    pub is_dirty: bool,
    pub is_submitted: bool,
    pub name: String,
    pub value: Option<FieldValue>,
    pub change_values: ChangeValuesFn,
    pub change_invalid_fields: ChangeInvalidFieldsFn,
}

impl Debug for FieldProps {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldProps")
            .field("is_dirty", &self.is_dirty)
            .field("is_submitted", &self.is_submitted)
            .field("name", &self.name)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

pub(super) struct FormData {
    pub(super) values: ValueMap,
    pub(super) default_values: ValueMap,
    pub(super) written: BTreeSet<String>,
    pub(super) invalid_fields: BTreeSet<String>,
    pub(super) is_dirty: bool,
    pub(super) is_submitted: bool,
    pub(super) last_initial_input: ValueMap,
    pub(super) published: Option<FormState>,
}

impl FormData {
    fn snapshot(&self) -> FormState {
        FormState {
            is_dirty: self.is_dirty,
            is_submitted: self.is_submitted,
            values: self.values.clone(),
            is_valid: self.invalid_fields.is_empty(),
        }
    }

    /// Replaces the baseline and resets the live values to it. Returns whether
    /// the live values changed in content.
    fn apply_new_baseline(&mut self, baseline: ValueMap) -> bool {
        let changed = !maps_equal(&self.values, &baseline);
        self.default_values = baseline.clone();
        self.values = baseline;
        self.written.clear();
        self.is_dirty = false;
        changed
    }
}

/// Single owner of a form's values, baseline, submission flag and invalid
/// field set. Cloning yields another handle to the same form.
pub struct FormController<O = ValueMap>
where
    O: 'static,
{
    pub(super) options: FormOptions,
    pub(super) state: Arc<RwLock<FormData>>,
    pub(super) output_formatter: OutputFormatterFn<O>,
    pub(super) on_change: Arc<RwLock<Option<ChangeListenerFn<O>>>>,
    pub(super) subscribers: Arc<RwLock<BTreeMap<SubscriptionId, StateListenerFn>>>,
    pub(super) next_subscription: Arc<AtomicU64>,
}

impl<O> Clone for FormController<O>
where
    O: 'static,
{
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            state: self.state.clone(),
            output_formatter: self.output_formatter.clone(),
            on_change: self.on_change.clone(),
            subscribers: self.subscribers.clone(),
            next_subscription: self.next_subscription.clone(),
        }
    }
}

impl FormController<ValueMap> {
    pub fn new(options: FormOptions) -> Self {
        Self::with_output_formatter(options, |values: &ValueMap| values.clone())
    }

    pub fn from_model<M>(model: &M, options: FormOptions) -> FormResult<Self>
    where
        M: FormModel,
    {
        let initial_values = model.to_values()?;
        Ok(Self::new(FormOptions {
            initial_values,
            ..options
        }))
    }
}

impl<O> FormController<O>
where
    O: 'static,
{
    pub fn with_output_formatter(
        options: FormOptions,
        output_formatter: impl Fn(&ValueMap) -> O + Send + Sync + 'static,
    ) -> Self {
        let initial = options.initial_values.clone();
        let mut data = FormData {
            values: initial.clone(),
            default_values: initial.clone(),
            written: BTreeSet::new(),
            invalid_fields: BTreeSet::new(),
            is_dirty: false,
            is_submitted: false,
            last_initial_input: initial,
            published: None,
        };
        data.published = Some(data.snapshot());
        Self {
            state: Arc::new(RwLock::new(data)),
            options,
            output_formatter: Arc::new(output_formatter),
            on_change: Arc::new(RwLock::new(None)),
            subscribers: Arc::new(RwLock::new(BTreeMap::new())),
            next_subscription: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// Installs the change listener and hands it the current values once,
    /// then again after every write to the value map.
    pub fn register_on_change(
        &self,
        listener: impl Fn(&O) + Send + Sync + 'static,
    ) -> FormResult<()> {
        *write_lock(&self.on_change, "registering change listener")? = Some(Arc::new(listener));
        self.notify_change()
    }

    pub fn clear_on_change(&self) -> FormResult<()> {
        *write_lock(&self.on_change, "clearing change listener")? = None;
        Ok(())
    }

    /// Registers a listener that receives the form state after every mutating
    /// call whose resulting state differs from the last one published.
    pub fn subscribe(
        &self,
        listener: impl Fn(&FormState) + Send + Sync + 'static,
    ) -> FormResult<SubscriptionId> {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        write_lock(&self.subscribers, "registering state subscriber")?
            .insert(id, Arc::new(listener));
        Ok(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> FormResult<bool> {
        Ok(write_lock(&self.subscribers, "removing state subscriber")?
            .remove(&id)
            .is_some())
    }

    pub fn change_values(&self, delta: ValueMap) -> FormResult<()> {
        let changed = {
            let mut state = write_lock(&self.state, "merging changed values")?;
            state.written.extend(delta.keys().cloned());
            let changed = merge_into(&mut state.values, delta);
            if changed {
                state.is_dirty = !maps_equal(&state.values, &state.default_values);
            }
            changed
        };
        trace!(changed, "merged value delta");

        self.notify_change()?;
        self.publish()
    }

    pub fn change_invalid_fields(&self, name: &str, is_valid: bool) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, "updating invalid fields")?;
            let changed = if is_valid {
                state.invalid_fields.remove(name)
            } else {
                state.invalid_fields.insert(name.to_string())
            };
            if changed {
                debug!(field = name, is_valid, "invalid field set changed");
            }
        }
        self.publish()
    }

    pub fn handle_submit(
        &self,
        callback: impl Fn(&O) + Send + Sync + 'static,
    ) -> SubmitHandler<O> {
        SubmitHandler {
            form: self.clone(),
            callback: Arc::new(callback),
        }
    }

    /// Applies `initial_values` as the new baseline, resets the live values to
    /// it and clears the submitted flag. Touched state and the invalid field
    /// set are left to re-derive from the fields.
    pub fn reset(&self, initial_values: ValueMap) -> FormResult<()> {
        let changed = {
            let mut state = write_lock(&self.state, "resetting form")?;
            state.is_submitted = false;
            state.apply_new_baseline(initial_values)
        };
        debug!(values_changed = changed, "form reset to new baseline");

        self.notify_change()?;
        self.publish()
    }

    /// Feeds the externally owned initial values. With
    /// `resync_on_external_change` enabled, a changed input re-baselines the
    /// form and clears dirtiness; otherwise it is only remembered.
    pub fn sync_initial_values(&self, initial_values: ValueMap) -> FormResult<bool> {
        let changed = {
            let mut state = write_lock(&self.state, "syncing initial values")?;
            if maps_equal(&state.last_initial_input, &initial_values) {
                return Ok(false);
            }
            state.last_initial_input = initial_values.clone();
            if !self.options.resync_on_external_change {
                return Ok(false);
            }
            state.apply_new_baseline(initial_values)
        };
        debug!(values_changed = changed, "form re-synced from external initial values");

        self.notify_change()?;
        self.publish()?;
        Ok(true)
    }

    pub fn get_field_props(&self, name: impl AsRef<str>) -> FormResult<FieldProps> {
        let name = name.as_ref();
        let state = read_lock(&self.state, "reading field props")?;
        let value = state.values.get(name).cloned();
        let is_dirty = strictly_differs(
            name,
            value.as_ref(),
            state.default_values.get(name),
            &state.written,
        );

        let values_form = self.clone();
        let invalid_form = self.clone();
        Ok(FieldProps {
            is_dirty,
            is_submitted: state.is_submitted,
            name: name.to_string(),
            value,
            change_values: Arc::new(move |delta: ValueMap| values_form.change_values(delta)),
            change_invalid_fields: Arc::new(move |name: &str, is_valid: bool| {
                invalid_form.change_invalid_fields(name, is_valid)
            }),
        })
    }

    pub fn form_state(&self) -> FormResult<FormState> {
        Ok(read_lock(&self.state, "reading form state")?.snapshot())
    }

    pub fn values(&self) -> FormResult<ValueMap> {
        Ok(read_lock(&self.state, "reading values")?.values.clone())
    }

    pub fn default_values(&self) -> FormResult<ValueMap> {
        Ok(read_lock(&self.state, "reading default values")?
            .default_values
            .clone())
    }

    pub fn invalid_fields(&self) -> FormResult<BTreeSet<String>> {
        Ok(read_lock(&self.state, "reading invalid fields")?
            .invalid_fields
            .clone())
    }

    /// The values as external consumers see them, after the output formatter.
    pub fn formatted_values(&self) -> FormResult<O> {
        let values = self.values()?;
        Ok((self.output_formatter)(&values))
    }

    fn notify_change(&self) -> FormResult<()> {
        let listener = read_lock(&self.on_change, "reading change listener")?.clone();
        if let Some(listener) = listener {
            let payload = self.formatted_values()?;
            listener(&payload);
        }
        Ok(())
    }

    fn publish(&self) -> FormResult<()> {
        let snapshot = {
            let mut state = write_lock(&self.state, "publishing form state")?;
            let snapshot = state.snapshot();
            if state.published.as_ref() == Some(&snapshot) {
                return Ok(());
            }
            state.published = Some(snapshot.clone());
            snapshot
        };

        let listeners = read_lock(&self.subscribers, "reading state subscribers")?
            .values()
            .cloned()
            .collect::<Vec<_>>();
        for listener in listeners {
            listener(&snapshot);
        }
        Ok(())
    }
}

/// Returned by [`FormController::handle_submit`].
pub struct SubmitHandler<O = ValueMap>
where
    O: 'static,
{
    form: FormController<O>,
    callback: ChangeListenerFn<O>,
}

impl<O> Clone for SubmitHandler<O>
where
    O: 'static,
{
    fn clone(&self) -> Self {
        Self {
            form: self.form.clone(),
            callback: self.callback.clone(),
        }
    }
}

impl<O> SubmitHandler<O>
where
    O: 'static,
{
    /// Marks the form submitted and runs the callback if no field is invalid
    /// at this moment. Returns whether the callback ran.
    pub fn call(&self, mut trigger: SubmitTrigger<'_>) -> FormResult<bool> {
        trigger.prevent_default();

        let valid_values = {
            let mut state = write_lock(&self.form.state, "submitting form")?;
            state.is_submitted = true;
            state
                .invalid_fields
                .is_empty()
                .then(|| state.values.clone())
        };
        self.form.publish()?;

        let Some(values) = valid_values else {
            debug!("submit blocked by invalid fields");
            return Ok(false);
        };
        let payload = (self.form.output_formatter)(&values);
        (self.callback)(&payload);
        Ok(true)
    }
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
