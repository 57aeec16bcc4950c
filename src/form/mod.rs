mod controller;
mod event;
mod field;
pub mod formatters;
mod model;
mod session;
mod value;


pub use controller::{
    ChangeInvalidFieldsFn, ChangeValuesFn, FieldKey, FieldProps, FormController, FormError,
    FormOptions, FormResult, FormState, SubmitHandler, SubscriptionId,
};
pub use event::{ChangeInput, InputEvent, PreventDefault, SubmitTrigger, SyntheticEvent};
pub use field::{
    DEFAULT_REQUIRED_ERROR_TEXT, FieldController, FieldFormatter, FieldInput, FieldMeta,
    FieldOptions, FieldValidator, Formatter, Validator,
};
pub use formstate_derive::FormModel;
pub use model::FormModel;
pub use session::FormSession;
pub use value::{FieldValue, ValueMap, is_truthy, value_map, values_equal};
