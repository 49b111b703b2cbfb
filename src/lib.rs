// Library for tests to access modules

pub mod bus;
pub mod config;
pub mod differ;
pub mod metrics;
pub mod models;
pub mod panel;
pub mod render;
pub mod runloop;
pub mod version;
