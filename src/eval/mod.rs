mod app;

pub use app::{list_models, main, run_app, run_evaluation, Cli};
