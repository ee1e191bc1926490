//! Interactive browse screen: search the collection, page through results,
//! and feature a record for detailed display.

pub mod app;
pub mod ui;
pub mod worker;

pub use app::run;
