// Library for tests to access modules

pub mod aggregate;
pub mod config;
pub mod models;
pub mod reading_repo;
pub mod routes;
pub mod security;
pub mod sensor;
pub mod version;
pub mod worker;
