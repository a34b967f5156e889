/// Email allow-list for the advisory sign-in gate
pub mod access;

/// Database connection and table creation
pub mod database;
