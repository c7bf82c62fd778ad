mod command_input;
mod form;
mod input;
mod key_result;

pub use command_input::{CommandEvent, CommandInput};
pub use form::{FormEvent, FormInput};
pub use key_result::KeyResult;
