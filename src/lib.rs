// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod catalog;
pub mod celebration;
pub mod lesson;
pub mod logging;
pub mod onboarding;
pub mod runtime;
pub mod settings;
pub mod speech;
pub mod ui;
