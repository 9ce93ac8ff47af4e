pub mod handler;
pub mod processor;
pub mod update;

pub use handler::UpdateHandler;
pub use processor::ScreenInterpreter;
pub use update::ScreenUpdate;
