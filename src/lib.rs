pub mod registrar;

pub use registrar::AppState;
