pub mod convert;
pub mod logger;
pub mod web;
