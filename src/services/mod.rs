//! Background services and process-local state.

pub mod avatar_cache;

pub use avatar_cache::{AvatarCache, start_sweep_task};
