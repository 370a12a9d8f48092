/// meshview desktop viewer
///
/// Usage: meshview [mesh.obj] [config.toml]
use env_logger::Env;
use log::error;
use meshview_core::ViewerConfig;
use meshview_window::{AppError, WindowApp};

fn run() -> Result<(), AppError> {
    let config = ViewerConfig::from_args(std::env::args().skip(1))?;
    let mesh = config.load_mesh()?;

    let mut app = WindowApp::new(mesh, &config)?;
    app.run()
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
