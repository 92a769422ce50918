use clap::{Parser, Subcommand};
use mconvshell::{AnimationConfig, AssetPaths, ExampleField, Scene, SceneConfig};
use std::{path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mconvshell")]
#[command(about = "Mantle convection temperature shells animations")]
struct Args {
    /// Directory with xygrid.pkl, radius.pkl and tdata-example.pkl
    #[arg(long, default_value = "data")]
    assets_dir: PathBuf,

    /// Directory where the archives are downloaded and extracted
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Temperature contour level
    #[arg(long, default_value_t = 2425.)]
    level: f64,

    /// Draw every n-th radius layer
    #[arg(long, default_value_t = 50)]
    radius_step: usize,

    /// Frame resolution
    #[arg(long, default_value_t = 80)]
    dpi: u32,

    /// Frame rate
    #[arg(long, default_value_t = 25)]
    fps: u32,

    /// Colormap of the radius layers
    #[arg(long, default_value = "hot")]
    colormap: String,

    /// Keep the shells of the previous frames
    #[arg(long)]
    accumulate: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Rotates around the example temperature field
    Stationary {
        output: PathBuf,
        #[arg(long, default_value_t = 100)]
        frames: usize,
        #[arg(long, default_value_t = 200)]
        full_rotation_frames: usize,
    },
    /// Temperature iterations with a fixed view angle
    Vary {
        output: PathBuf,
        #[arg(long, default_value_t = 9)]
        frames: usize,
    },
    /// Temperature iterations while rotating around the scene
    VaryRotate {
        output: PathBuf,
        #[arg(long, default_value_t = 9)]
        frames: usize,
        #[arg(long, default_value_t = 200)]
        full_rotation_frames: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let scene_config = SceneConfig {
        level: args.level,
        radius_step: args.radius_step,
        dpi: args.dpi,
        colormap: args.colormap.parse()?,
        clear_between_frames: !args.accumulate,
    };
    let assets = AssetPaths::in_dir(&args.assets_dir);

    let now = Instant::now();
    let mut scene = Scene::from_assets(scene_config, &assets)?;
    info!("scene built in {}ms", now.elapsed().as_millis());

    let now = Instant::now();
    match args.mode {
        Mode::Stationary {
            output,
            frames,
            full_rotation_frames,
        } => {
            let field = ExampleField::from_pickle(&assets.example)?;
            let config = AnimationConfig {
                fps: args.fps,
                frames,
                full_rotation_frames,
            };
            scene.animate_rotate_stationary(&field, output, &config)?;
        }
        Mode::Vary { output, frames } => {
            let config = AnimationConfig {
                fps: args.fps,
                frames,
                ..AnimationConfig::time_varying()
            };
            vary(&mut scene, output, &config, args.work_dir, false)?;
        }
        Mode::VaryRotate {
            output,
            frames,
            full_rotation_frames,
        } => {
            let config = AnimationConfig {
                fps: args.fps,
                frames,
                full_rotation_frames,
            };
            vary(&mut scene, output, &config, args.work_dir, true)?;
        }
    }
    info!("animation in {}s", now.elapsed().as_secs());

    Ok(())
}

#[cfg(feature = "netcdf")]
fn vary(
    scene: &mut Scene,
    output: PathBuf,
    config: &AnimationConfig,
    work_dir: PathBuf,
    rotate: bool,
) -> anyhow::Result<()> {
    use mconvshell::{FieldProvider, HttpFetcher, NetCdfReader};

    let provider =
        FieldProvider::new(HttpFetcher::new()?, NetCdfReader::default()).with_work_dir(work_dir);
    if rotate {
        scene.animate_vary_rotate(&provider, output, config)?;
    } else {
        scene.animate_vary(&provider, output, config)?;
    }
    Ok(())
}

#[cfg(not(feature = "netcdf"))]
fn vary(
    _scene: &mut Scene,
    _output: PathBuf,
    _config: &AnimationConfig,
    _work_dir: PathBuf,
    _rotate: bool,
) -> anyhow::Result<()> {
    anyhow::bail!("time varying animations require the `netcdf` feature")
}
