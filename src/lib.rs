pub mod app;
pub mod calculator;
pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod submission;
pub mod ui;
