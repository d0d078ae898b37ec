//! SeaORM entity definitions for the PostgreSQL database.

pub mod chat_message;
pub mod code_analysis;
pub mod user;
