use std::collections::BTreeMap;

use super::controller::{FormController, FormError, FormResult, FormState, SubmitHandler};
use super::event::{ChangeInput, SubmitTrigger};
use super::field::{FieldController, FieldMeta, FieldOptions};
use super::value::ValueMap;

/// Host-side driver: owns a form and its mounted fields and refreshes every
/// field from the form after each mutating call.
pub struct FormSession<O = ValueMap>
where
    O: 'static,
{
    form: FormController<O>,
    fields: BTreeMap<String, FieldController>,
}

impl<O> FormSession<O>
where
    O: 'static,
{
    pub fn new(form: FormController<O>) -> Self {
        Self {
            form,
            fields: BTreeMap::new(),
        }
    }

    pub fn form(&self) -> &FormController<O> {
        &self.form
    }

    pub fn form_state(&self) -> FormResult<FormState> {
        self.form.form_state()
    }

    pub fn mount(
        &mut self,
        name: impl Into<String>,
        options: FieldOptions,
    ) -> FormResult<&mut FieldController> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(FormError::FieldAlreadyMounted(name));
        }
        let field = FieldController::new(self.form.get_field_props(&name)?, options)?;
        Ok(self.fields.entry(name).or_insert(field))
    }

    /// Drops the field's runtime state. Its last reported validity stays in
    /// the form's invalid field set.
    pub fn unmount(&mut self, name: &str) -> FormResult<FieldController> {
        self.fields
            .remove(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn is_mounted(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field(&self, name: &str) -> FormResult<&FieldController> {
        self.fields
            .get(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn field_mut(&mut self, name: &str) -> FormResult<&mut FieldController> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn meta(&self, name: &str) -> FormResult<FieldMeta> {
        Ok(self.field(name)?.meta())
    }

    pub fn set_field_options(&mut self, name: &str, options: FieldOptions) -> FormResult<()> {
        self.field_mut(name)?.set_options(options);
        self.settle()
    }

    pub fn change(&mut self, name: &str, input: ChangeInput<'_>) -> FormResult<()> {
        self.field_mut(name)?.on_change(input)?;
        self.settle()
    }

    pub fn focus(&mut self, name: &str) -> FormResult<()> {
        self.field_mut(name)?.on_focus();
        self.settle()
    }

    pub fn blur(&mut self, name: &str) -> FormResult<()> {
        self.field_mut(name)?.on_blur();
        self.settle()
    }

    pub fn submit(
        &mut self,
        handler: &SubmitHandler<O>,
        trigger: SubmitTrigger<'_>,
    ) -> FormResult<bool> {
        let submitted = handler.call(trigger)?;
        self.settle()?;
        Ok(submitted)
    }

    pub fn reset(&mut self, initial_values: ValueMap) -> FormResult<()> {
        self.form.reset(initial_values)?;
        self.settle()
    }

    pub fn sync_initial_values(&mut self, initial_values: ValueMap) -> FormResult<bool> {
        let applied = self.form.sync_initial_values(initial_values)?;
        self.settle()?;
        Ok(applied)
    }

    /// Refreshes every mounted field, in name order, from the current form
    /// state.
    pub fn settle(&mut self) -> FormResult<()> {
        for (name, field) in self.fields.iter_mut() {
            field.refresh(self.form.get_field_props(name)?)?;
        }
        Ok(())
    }
}
