use serde::Serialize;
use serde::de::DeserializeOwned;

use super::controller::{FieldKey, FormError, FormResult};
use super::value::{FieldValue, ValueMap};

/// A flat struct whose fields map one-to-one onto form fields.
///
/// Usually derived with `#[derive(FormModel)]`, which also generates a
/// `<Model>Fields` type with one [`FieldKey`] accessor per field.
pub trait FormModel: Serialize + DeserializeOwned {
    type Fields;

    fn fields() -> Self::Fields;

    fn field_keys() -> &'static [FieldKey];

    fn to_values(&self) -> FormResult<ValueMap> {
        match serde_json::to_value(self).map_err(|error| FormError::Model(error.to_string()))? {
            FieldValue::Object(object) => Ok(object.into_iter().collect()),
            other => Err(FormError::Model(format!(
                "expected a struct to serialize as an object, got `{other}`"
            ))),
        }
    }

    fn from_values(values: &ValueMap) -> FormResult<Self> {
        decode_values(values)
    }
}

pub(super) fn decode_values<T>(values: &ValueMap) -> FormResult<T>
where
    T: DeserializeOwned,
{
    let object = values.clone().into_iter().collect();
    serde_json::from_value(FieldValue::Object(object))
        .map_err(|error| FormError::Model(error.to_string()))
}
