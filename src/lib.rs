pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::create_router;
pub use api::handlers;

// Export logic helpers
pub use logic::{
    clean_entity_payload, collides, elect_primary, normalize_name, recompute_scores, slugify,
    taken_names, ValidationError,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store, StoreError, StoreResult};
