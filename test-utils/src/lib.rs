//! Roster Test Utils
//!
//! Provides shared testing utilities for building integration and unit tests for the roster
//! bot. This crate offers a builder pattern for creating test contexts with in-memory
//! SQLite databases, factories for member records, and JSON-backed Serenity model factories.
//!
//! # Overview
//!
//! The test utilities consist of these main components:
//! - **TestBuilder**: Fluent builder for configuring test environments
//! - **TestContext**: Test environment containing the database connection
//! - **TestError**: Error types that can occur during test setup
//! - **factory**: Inserts member records with sensible defaults
//! - **serenity**: Builds Serenity `Role` and `Member` values as Discord would send them
//!
//! # Usage
//!
//! Use `TestBuilder` to create a test context with the required database tables:
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, factory};
//!
//! #[tokio::test]
//! async fn test_member_operations() -> Result<(), sea_orm::DbErr> {
//!     let test = TestBuilder::new()
//!         .with_server_member_tables()
//!         .build()
//!         .await
//!         .unwrap();
//!     let db = test.db.as_ref().unwrap();
//!
//!     let member = factory::create_server_member(db).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
pub mod serenity;
