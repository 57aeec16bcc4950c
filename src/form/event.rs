use super::value::FieldValue;

pub trait PreventDefault {
    fn prevent_default(&mut self);
}

/// An event that carries the value of the control that raised it.
pub trait InputEvent: PreventDefault {
    fn target_value(&self) -> FieldValue;
}

/// What a field's `on_change` receives: either the value itself or an event
/// the value is read from.
pub enum ChangeInput<'a> {
    Raw(FieldValue),
    Event(&'a mut dyn InputEvent),
}

impl ChangeInput<'_> {
    pub fn raw(value: impl Into<FieldValue>) -> Self {
        ChangeInput::Raw(value.into())
    }

    pub(super) fn into_value(self) -> FieldValue {
        match self {
            ChangeInput::Raw(value) => value,
            ChangeInput::Event(event) => {
                event.prevent_default();
                event.target_value()
            }
        }
    }
}

/// Whatever invoked a submit handler.
#[derive(Default)]
pub enum SubmitTrigger<'a> {
    #[default]
    None,
    Value(FieldValue),
    Event(&'a mut dyn PreventDefault),
}

impl SubmitTrigger<'_> {
    pub(super) fn prevent_default(&mut self) {
        if let SubmitTrigger::Event(event) = self {
            event.prevent_default();
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyntheticEvent {
    pub value: FieldValue,
    pub default_prevented: bool,
}

impl SyntheticEvent {
    pub fn new(value: impl Into<FieldValue>) -> Self {
        Self {
            value: value.into(),
            default_prevented: false,
        }
    }
}

impl PreventDefault for SyntheticEvent {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

impl InputEvent for SyntheticEvent {
    fn target_value(&self) -> FieldValue {
        self.value.clone()
    }
}
