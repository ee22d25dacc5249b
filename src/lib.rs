pub mod catalog;
pub mod cli;
pub mod config;
pub mod data_types;
pub mod ddl;
pub mod error;
pub mod repository;
pub mod schema;
pub mod service;
pub mod validation;

extern crate lazy_static;
