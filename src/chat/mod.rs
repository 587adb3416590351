pub mod controller;
pub mod log;
pub mod models;
pub mod state;
pub mod surface;
pub use controller::*;
pub use log::MessageLog;
pub use models::*;
pub use state::UiState;
pub use surface::{BoxedSurface, MemorySurface, Surface, SurfaceEvent, TerminalSurface};
