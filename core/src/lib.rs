pub mod assess;
pub mod context;
pub mod extract;
pub mod interpreter;
pub mod screen;
pub mod service;
pub mod state;
pub mod tracking;

// Re-exports for convenience
pub use interpreter::{ScreenInterpreter, ScreenUpdate, UpdateHandler};
pub use screen::{ScreenObservation, ScreenSnapshot, ScreenType};
pub use service::{RecordSink, ServiceHandle, spawn_service};
pub use state::InterpreterState;
