//! # Recipe Import
//!
//! Converts a legacy flat-file recipe corpus into a normalized relational
//! dataset, emitted as a PostgreSQL load script.
//!
//! The transformation itself lives in the `recipe-import-core` crate; this
//! crate is the I/O shell around it: it reads the keyfile databases, indexes
//! the media tree, hashes passwords, generates demo fixtures, and renders
//! the verified statement stream as SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────┐   ┌─────────────┐
//! │ recipes.db   │──▶│  recipe-import-core  │──▶│  integrity  │
//! │ chefs.db     │   │ parse/resolve/infer  │   │   check     │
//! │ ingredients  │   └──────────▲───────────┘   └──────┬──────┘
//! └──────────────┘              │                      ▼
//!                        ┌──────┴─────┐          ┌───────────┐
//!                        │ media root │          │ SQL text  │
//!                        └────────────┘          └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! recipe-import sources ./data ./media     # check inputs
//! recipe-import stats ./data ./media       # rows per table
//! recipe-import convert ./data ./media --output load.sql
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`keyfile`] | INI-like keyfile reader |
//! | [`load`] | Corpus loading and input checks |
//! | [`media`] | On-disk media index and fingerprints |
//! | [`password`] | Deterministic bcrypt profile passwords |
//! | [`fixtures`] | Seeded fridges, menus and plannings |
//! | [`sql`] | PostgreSQL rendering |
//! | [`convert`] | Pipeline orchestration |
//! | [`stats`] | Per-table counts |
//! | [`export`] | JSON export |
//! | [`sources`] | Input status listing |

pub mod config;
pub mod convert;
pub mod export;
pub mod fixtures;
pub mod keyfile;
pub mod load;
pub mod media;
pub mod password;
pub mod sources;
pub mod sql;
pub mod stats;
