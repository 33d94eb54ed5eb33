//! In-process caches shared by the bot and the API.

pub mod cooldown;

pub use cooldown::{CooldownCache, CooldownKey, InMemoryCooldownCache};
