//! Card match (workspace facade crate).
//!
//! Re-exports `card_match::{types, core, adapter}` while the implementation lives in
//! dedicated crates under `crates/`.

pub use card_match_adapter as adapter;
pub use card_match_core as core;
pub use card_match_types as types;
