pub mod dashboard;
pub mod data_health;
pub mod handlers;
pub mod server;
pub mod state;

pub use data_health::DataHealthResponse;
pub use server::ApiServer;
pub use state::AppState;
