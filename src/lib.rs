pub mod ai;
pub mod config;
pub mod db;
pub mod domain;
pub mod export;
pub mod handlers;
pub mod paths;
pub mod routes;
pub mod srs;
pub mod state;
pub mod study;

#[cfg(test)]
pub mod testing;
