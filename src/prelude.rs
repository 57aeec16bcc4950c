pub use crate::form::{
    ChangeInput, FieldController, FieldMeta, FieldOptions, FieldValue, FormController, FormModel,
    FormOptions, FormResult, FormSession, FormState, SubmitTrigger, SyntheticEvent, ValueMap,
    value_map,
};
