pub mod catalog;
pub mod connection;
pub mod dao;
pub mod postgres;
pub mod sqlite;
pub mod statements;
pub mod types;
