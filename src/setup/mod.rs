pub mod arguments;
pub mod logging;
