#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod catalog_file;
pub mod log;
pub mod rest;
pub mod settings;
