/// Pivot3D Terminal Demo - Bouncing Cube
///
/// Renders a spinning, bouncing cube and an orbiting square through the
/// software pipeline, painted back-to-front into terminal cells.
/// Controls:
///   - WASD: Move the camera
///   - Q/E: Yaw the camera
///   - N: Toggle face-normal arrows
///   - ESC: Quit

use clap::Parser;
use std::io;

use pivot3d_terminal::{AppConfig, TerminalApp};

#[derive(Parser)]
#[command(name = "pivot3d-terminal", about = "Terminal demo of the pivot3d software renderer")]
struct Args {
    /// Cube edge length in world units
    #[arg(long, default_value_t = 100.0)]
    size: f64,

    /// Distance from the camera to the scene center
    #[arg(long, default_value_t = 300.0)]
    distance: f64,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u64,

    /// Draw face-normal arrows
    #[arg(long)]
    normals: bool,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let mut app = TerminalApp::new(AppConfig {
        cube_size: args.size,
        distance: args.distance,
        fps: args.fps,
        show_normals: args.normals,
    })?;
    app.run()
}
