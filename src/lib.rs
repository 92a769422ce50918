mod animation;
pub use animation::{azimuth_sweep, frame_size, AnimationConfig};
mod archive;
pub use archive::{build_url, ArchiveEntry, ArchiveIndex};
mod assets;
pub use assets::{load_pickle, save_pickle, AssetPaths, ExampleField, GridAsset, RadiusSequence};
mod colormap;
pub use colormap::{make_scaler, ColorScaler, Colormap, Rgba};
mod contour;
pub use contour::{fill_band, Band};
mod fetch;
pub use fetch::{extract_archive, fetch_and_extract, Fetch, HttpFetcher, ScratchFile};
mod field;
#[cfg(feature = "netcdf")]
pub use field::NetCdfReader;
pub use field::{dataset_file_name, FieldProvider, FieldSlices, FieldSnapshot, ReadTemperature};
mod mesh;
pub use mesh::Triangulation;
mod scene;
pub use scene::{ContourShell, Scene, SceneConfig, ViewAngle};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("iteration index {0} is outside of the archive index")]
    OutOfRange(usize),
    #[error("failed to read or write file")]
    Read(#[from] std::io::Error),
    #[error("failed to download archive")]
    Download(#[from] reqwest::Error),
    #[cfg(feature = "netcdf")]
    #[error("failed to read NetCDF dataset")]
    NetCdf(#[from] netcdf::Error),
    #[error("failed to (de)serialize pickle data")]
    Pickle(#[from] serde_pickle::Error),
    #[error("array shape mismatch: {0}")]
    Shape(String),
    #[error("unknown colormap: {0}")]
    UnknownColormap(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to draw frame: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, Error>;
