#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate serde;

#[macro_use]
pub mod log;
pub mod common;
pub mod strings;
pub mod parsing;
pub mod model;
pub mod mapping;
pub mod ucf;
pub mod loader;
pub mod exporter;
pub mod session;
