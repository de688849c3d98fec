// Route handler modules

pub mod analyze;
pub mod health;
pub mod static_files;
pub mod status;
