/// Data layer: table model, loading, classification, filter state and filtering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json upload
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  decode bytes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify │  per column → Numeric / Temporal / Categorical
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  store   │  seed-once defaults, user selections, reset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  AND of per-column predicates → filtered view
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export  │  filtered view → CSV bytes
///   └──────────┘
/// ```

pub mod classify;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod store;
