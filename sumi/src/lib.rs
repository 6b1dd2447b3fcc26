pub mod app;
pub mod container;
pub mod error;
pub mod provider;
pub mod router;

// repub
pub use http;
pub use serde;
pub use sumi_core;
pub use tracing;

pub use app::Application;
pub use app::config::ApplicationConfig;
pub use container::{ArcAnyExt, Container, Factory, Listener, Value, value};
pub use error::{AppError, AppResult};
pub use provider::ServiceProvider;
pub use router::{Route, RouteArgs, Router};
