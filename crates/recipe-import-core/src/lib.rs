//! # Recipe Import Core
//!
//! Pure transformation engine for the recipe importer: it turns parsed
//! keyfile records into a normalized relational statement stream.
//!
//! | Module | Role |
//! |--------|------|
//! | [`models`] | records, entities and the normalized corpus |
//! | [`parse`] | quantity, duration, step and ingredient micro-parsers |
//! | [`media`] | media collaborator trait and path resolution |
//! | [`tables`] | deduplicated reference tables and the resolution context |
//! | [`assemble`] | recipe and author assembly |
//! | [`diet`] | diet masks and intolerance inference |
//! | [`schema`] | target tables and their dependency order |
//! | [`emit`] | statement emission |
//! | [`integrity`] | referential-integrity verification |
//!
//! This crate performs no filesystem I/O; the application supplies media
//! lookups through [`media::MediaStore`] and password hashing through
//! [`emit::PasswordHasher`].

pub mod assemble;
pub mod diet;
pub mod emit;
pub mod integrity;
pub mod media;
pub mod models;
pub mod parse;
pub mod schema;
pub mod tables;
