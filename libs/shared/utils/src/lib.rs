pub mod console;
pub mod test_utils;
pub mod validation;

pub use console::Console;
