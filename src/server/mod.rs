//! Community management backend.
//!
//! Keeps member records (enrollment email, name, roles, linked Discord account) and
//! reconciles them with the members of Discord guilds. Operators drive it through
//! slash commands handled by the bot and through an HTTP API; members link their own
//! account from a direct message.
//!
//! # Architecture
//!
//! - **Command Layer** (`command/`) - Slash command trees, dispatch, and reply state handling
//! - **Bot** (`bot/`) - Discord event handlers adapting interactions and member events
//! - **Controller Layer** (`controller/`) - HTTP request handlers and DTO conversion
//! - **Service Layer** (`service/`) - Member reconciliation engine
//! - **Policy** (`policy/`) - Pure role taxonomy, role transforms, and nickname derivation
//! - **Gateway** (`gateway/`) - Platform operations behind the `PlatformGateway` trait
//! - **Data Layer** (`data/`) - Member store and its SeaORM repository
//! - **Model Layer** (`model/`) - Domain models, parameters, and API payloads
//! - **Error Layer** (`error/`) - Application errors, faults, and HTTP response mapping
//! - **Middleware** (`middleware/`) - API key guard
//!
//! # Infrastructure
//!
//! - **Configuration** (`config`) - Environment-based application configuration
//! - **State** (`state`) - Shared application state (DB, gateway, API keys)
//! - **Startup** (`startup`) - Tracing and database initialization
//! - **Router** (`router`) - Axum route configuration
//! - **Cache** (`cache/`) - Notification cooldowns

pub mod bot;
pub mod cache;
pub mod command;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod model;
pub mod policy;
pub mod router;
pub mod service;
pub mod startup;
pub mod state;
pub mod util;
