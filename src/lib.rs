//! Filter-state engine behind the insight dashboard.
//!
//! The [`state::AppState`] pipeline is re-run after every user interaction;
//! only its [`data::store::FilterStore`] carries selections from one pass to
//! the next.

pub mod config;
pub mod data;
pub mod state;
