/// meshview terminal host
///
/// Usage: meshview-terminal [mesh.obj] [config.toml]
/// Controls:
///   - W/S: Forward / backward
///   - A/D, Left/Right: Strafe
///   - Up/Down: Rise / sink
///   - Mouse drag: Look around
///   - R: Reset camera
///   - L: Log camera pose (visible with RUST_LOG=info; the status line shows it live)
///   - Q/ESC: Quit
use env_logger::Env;
use log::error;
use meshview_core::ViewerConfig;
use meshview_terminal::{AppError, TerminalApp};

fn run() -> Result<(), AppError> {
    let config = ViewerConfig::from_args(std::env::args().skip(1))?;
    let mesh = config.load_mesh()?;

    let mut app = TerminalApp::new(mesh, &config)?;
    app.run()?;
    Ok(())
}

fn main() {
    // Anything chattier than warnings would scribble over the frame
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
