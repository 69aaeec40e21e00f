mod server;

pub mod routes;
pub mod state;
pub mod templates;
pub mod utils;

pub use server::{bind, build_app, serve};
pub use state::AppState;
