// Library for tests to access modules

pub mod accumulator;
pub mod config;
pub mod error;
pub mod models;
pub mod nfs;
pub mod routes;
pub mod version;
pub mod worker;
