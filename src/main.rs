//! Binary entry point: resolve configuration, start logging, open the
//! library and drive the Ratatui event loop until the user exits.
use personal_library_manager::logging::init_tracing;
use personal_library_manager::{run_app, App, Config, JsonStore, Library};

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let _guard = init_tracing(&config.log_dir)?;
    tracing::info!(library = %config.library_path.display(), policy = ?config.write_policy, "starting");

    let (library, load_error) = Library::open(JsonStore::new(&config.library_path), config.write_policy);
    let mut app = App::new(library, load_error);
    let result = run_app(&mut app);

    if let Err(err) = &result {
        tracing::error!(error = %err, "exiting with error");
    } else {
        tracing::info!("exiting");
    }
    result
}
