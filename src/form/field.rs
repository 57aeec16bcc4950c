use std::fmt::{self, Debug};
use std::sync::Arc;

use tracing::trace;

use super::controller::{FieldProps, FormResult};
use super::event::ChangeInput;
use super::value::{FieldValue, is_empty_string, is_truthy, is_zero, value_map, values_equal};

pub const DEFAULT_REQUIRED_ERROR_TEXT: &str = "This field is required";

/// Returns an error message for a value, or an empty string when it is valid.
pub trait FieldValidator: Send + Sync {
    fn validate(&self, value: &FieldValue) -> String;
}

impl<F> FieldValidator for F
where
    F: Fn(&FieldValue) -> String + Send + Sync,
{
    fn validate(&self, value: &FieldValue) -> String {
        (self)(value)
    }
}

/// Rewrites a raw input value before it is stored. `after_dot` is the opaque
/// hint configured on the field, typically a number of fraction digits.
pub trait FieldFormatter: Send + Sync {
    fn format(&self, value: FieldValue, after_dot: Option<&FieldValue>) -> FieldValue;
}

impl<F> FieldFormatter for F
where
    F: Fn(FieldValue, Option<&FieldValue>) -> FieldValue + Send + Sync,
{
    fn format(&self, value: FieldValue, after_dot: Option<&FieldValue>) -> FieldValue {
        (self)(value, after_dot)
    }
}

pub type Validator = Arc<dyn FieldValidator>;
pub type Formatter = Arc<dyn FieldFormatter>;

#[derive(Clone)]
pub struct FieldOptions {
    pub required: bool,
    pub required_error_text: String,
    pub formatter: Option<Formatter>,
    pub validate: Option<Validator>,
    pub after_dot: Option<FieldValue>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            required: false,
            required_error_text: DEFAULT_REQUIRED_ERROR_TEXT.to_string(),
            formatter: None,
            validate: None,
            after_dot: None,
        }
    }
}

impl Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("required", &self.required)
            .field("required_error_text", &self.required_error_text)
            .field("formatter", &self.formatter.is_some())
            .field("validate", &self.validate.is_some())
            .field("after_dot", &self.after_dot)
            .finish()
    }
}

impl FieldOptions {
    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    pub fn required_error_text(mut self, value: impl Into<String>) -> Self {
        self.required_error_text = value.into();
        self
    }

    pub fn formatter(
        mut self,
        formatter: impl Fn(FieldValue, Option<&FieldValue>) -> FieldValue + Send + Sync + 'static,
    ) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn validate(
        mut self,
        validator: impl Fn(&FieldValue) -> String + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Arc::new(validator));
        self
    }

    pub fn validate_with(mut self, validator: Validator) -> Self {
        self.validate = Some(validator);
        self
    }

    pub fn after_dot(mut self, value: impl Into<FieldValue>) -> Self {
        self.after_dot = Some(value.into());
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMeta {
    pub is_dirty: bool,
    pub is_touched: bool,
    pub focus: bool,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldInput {
    pub name: String,
    pub value: Option<FieldValue>,
}

// What the last error computation depended on.
struct ValidationInputs {
    value: Option<FieldValue>,
    required: bool,
    validate: Option<Validator>,
}

impl ValidationInputs {
    fn matches(&self, value: Option<&FieldValue>, options: &FieldOptions) -> bool {
        let same_value = match (self.value.as_ref(), value) {
            (None, None) => true,
            (Some(previous), Some(current)) => values_equal(previous, current),
            _ => false,
        };
        same_value
            && self.required == options.required
            && match (&self.validate, &options.validate) {
                (None, None) => true,
                (Some(previous), Some(current)) => Arc::ptr_eq(previous, current),
                _ => false,
            }
    }
}

/// Interaction and validation state of one field, layered over the
/// [`FieldProps`] its form hands out.
pub struct FieldController {
    props: FieldProps,
    options: FieldOptions,
    is_touched: bool,
    focus: bool,
    error: String,
    computed: Option<ValidationInputs>,
    reported_valid: Option<bool>,
}

impl FieldController {
    pub fn new(props: FieldProps, options: FieldOptions) -> FormResult<Self> {
        let mut field = Self {
            props,
            options,
            is_touched: false,
            focus: false,
            error: String::new(),
            computed: None,
            reported_valid: None,
        };
        field.settle()?;
        Ok(field)
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Installs a fresh bundle from the form and re-derives error, reported
    /// validity and touched state from it.
    pub fn refresh(&mut self, props: FieldProps) -> FormResult<()> {
        self.props = props;
        self.settle()
    }

    /// Replaces the field options. A different `required` flag or validator
    /// is picked up by the next [`refresh`](Self::refresh).
    pub fn set_options(&mut self, options: FieldOptions) {
        self.options = options;
    }

    pub fn on_change(&mut self, input: ChangeInput<'_>) -> FormResult<()> {
        let value = input.into_value();
        let value = match &self.options.formatter {
            Some(formatter) => formatter.format(value, self.options.after_dot.as_ref()),
            None => value,
        };
        (self.props.change_values)(value_map([(self.props.name.clone(), value)]))
    }

    pub fn on_focus(&mut self) {
        self.focus = true;
        self.is_touched = true;
    }

    pub fn on_blur(&mut self) {
        self.focus = false;
        self.is_touched = true;
    }

    pub fn input(&self) -> FieldInput {
        FieldInput {
            name: self.props.name.clone(),
            value: self.props.value.clone(),
        }
    }

    pub fn meta(&self) -> FieldMeta {
        FieldMeta {
            is_dirty: self.props.is_dirty,
            is_touched: self.is_touched,
            focus: self.focus,
            error: self.error.clone(),
        }
    }

    pub fn value(&self) -> Option<&FieldValue> {
        self.props.value.as_ref()
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn is_touched(&self) -> bool {
        self.is_touched
    }

    pub fn has_focus(&self) -> bool {
        self.focus
    }

    fn settle(&mut self) -> FormResult<()> {
        let stale = self
            .computed
            .as_ref()
            .is_none_or(|inputs| !inputs.matches(self.props.value.as_ref(), &self.options));
        if stale {
            self.error = self.compute_error();
            self.computed = Some(ValidationInputs {
                value: self.props.value.clone(),
                required: self.options.required,
                validate: self.options.validate.clone(),
            });
            trace!(field = %self.props.name, error = %self.error, "field error recomputed");
        }

        let is_valid = self.error.is_empty();
        if self.reported_valid != Some(is_valid) {
            (self.props.change_invalid_fields)(&self.props.name, is_valid)?;
            self.reported_valid = Some(is_valid);
        }

        if self.props.is_submitted && !self.is_touched {
            self.is_touched = true;
        }
        Ok(())
    }

    fn compute_error(&self) -> String {
        let value = self.props.value.as_ref();
        if !is_truthy(value) && self.options.required {
            return self.options.required_error_text.clone();
        }

        let present =
            is_truthy(value) || is_empty_string(value) || is_zero(value) || self.is_touched;
        match &self.options.validate {
            Some(validator) if present => validator.validate(&value.cloned().unwrap_or_default()),
            _ => String::new(),
        }
    }
}
