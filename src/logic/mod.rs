pub mod normalize;
pub mod scores;
pub mod slug;
pub mod validate;

pub use normalize::{collides, normalize_name, taken_names};
pub use scores::recompute_scores;
pub use slug::slugify;
pub use validate::{clean_entity_payload, elect_primary, ValidationError};
