mod cache;

pub use cache::InterpreterState;
