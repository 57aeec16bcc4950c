extern crate self as formstate;

pub mod form;
pub mod prelude;

pub use form::{FieldController, FormController, FormSession};
