pub mod edge_handlers;
pub mod handlers;
pub mod routes;
pub mod scene_handlers;

pub use routes::create_router;
