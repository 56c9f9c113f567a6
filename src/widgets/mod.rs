mod input_field;

pub use input_field::{Action as InputFieldAction, InputField, Style as InputStyle};
