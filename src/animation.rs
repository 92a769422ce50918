use super::{
    colormap::interp, scene::plot_error, Error, Fetch, FieldProvider, FieldSlices,
    ReadTemperature, Result, Scene, ViewAngle,
};
use plotters::{
    coord::Shift,
    prelude::{BitMapBackend, DrawingArea, IntoDrawingArea},
};
use std::path::Path;
use tracing::info;

// Default figure size in inches
const FIGURE_SIZE: (f64, f64) = (6.4, 4.8);
const ELEVATION: f64 = 30.;
const AZIMUTH_SPAN: (f64, f64) = (-65., 295.);

/// Animation parameters
///
/// The frame resolution is the scene's.
#[derive(Debug, Clone)]
pub struct AnimationConfig {
    /// Frame rate
    pub fps: u32,
    /// Number of frames
    pub frames: usize,
    /// Number of frames for a full turn around the scene
    pub full_rotation_frames: usize,
}
impl Default for AnimationConfig {
    fn default() -> Self {
        Self::time_varying()
    }
}
impl AnimationConfig {
    /// 100 frames of the rotating example field
    pub fn stationary() -> Self {
        Self {
            fps: 25,
            frames: 100,
            full_rotation_frames: 200,
        }
    }
    /// The first 9 iterations
    pub fn time_varying() -> Self {
        Self {
            frames: 9,
            ..Self::stationary()
        }
    }
    /// Frame delay in milliseconds
    pub fn frame_delay(&self) -> u32 {
        1000 / self.fps.max(1)
    }
}

/// Frame width and height in pixels at resolution `dpi`
pub fn frame_size(dpi: u32) -> Result<(u32, u32)> {
    if dpi == 0 {
        return Err(Error::InvalidConfig(
            "frame resolution must be at least 1 dpi".to_string(),
        ));
    }
    Ok((
        (FIGURE_SIZE.0 * dpi as f64).round() as u32,
        (FIGURE_SIZE.1 * dpi as f64).round() as u32,
    ))
}

/// Azimuth of frame `frame`, sweeping -65° to 295° over `full_rotation_frames`
pub fn azimuth_sweep(frame: usize, full_rotation_frames: usize) -> f64 {
    interp(
        frame as f64,
        (0., full_rotation_frames as f64),
        AZIMUTH_SPAN,
    )
}

/// Writes an animated GIF, calling `render` for each frame
fn write_gif<F>(
    path: &Path,
    dpi: u32,
    config: &AnimationConfig,
    frames: Vec<usize>,
    mut render: F,
) -> Result<()>
where
    F: FnMut(usize, &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>,
{
    let root = BitMapBackend::gif(path, frame_size(dpi)?, config.frame_delay())
        .map_err(plot_error)?
        .into_drawing_area();
    #[cfg(feature = "progress")]
    let mut progress = linya::Progress::new();
    #[cfg(feature = "progress")]
    let bar = progress.bar(frames.len(), "frames");
    for frame in frames {
        info!("frame: {frame}");
        render(frame, &root)?;
        root.present().map_err(plot_error)?;
        #[cfg(feature = "progress")]
        progress.inc_and_draw(&bar, 1);
    }
    info!("animation saved to {}", path.display());
    Ok(())
}

impl Scene {
    /// Rotates around the stationary `field`, rendering frames 0 to `frames`-1
    pub fn animate_rotate_stationary<S, P>(
        &mut self,
        field: &S,
        path: P,
        config: &AnimationConfig,
    ) -> Result<()>
    where
        S: FieldSlices + ?Sized,
        P: AsRef<Path>,
    {
        let frames = (0..config.frames).collect();
        write_gif(path.as_ref(), self.config().dpi, config, frames, |i, root| {
            let view = ViewAngle::new(
                ELEVATION,
                azimuth_sweep(i, config.full_rotation_frames),
            );
            self.render_frame(field, view)?;
            self.draw(root)
        })
    }
    /// Renders iterations 1 to `frames` with a fixed view angle
    pub fn animate_vary<F, R, P>(
        &mut self,
        provider: &FieldProvider<F, R>,
        path: P,
        config: &AnimationConfig,
    ) -> Result<()>
    where
        F: Fetch,
        R: ReadTemperature,
        P: AsRef<Path>,
    {
        let frames = (1..=config.frames).collect();
        write_gif(path.as_ref(), self.config().dpi, config, frames, |i, root| {
            let field = provider.load_field_data(i)?;
            self.render_frame(&field, ViewAngle::default())?;
            self.draw(root)
        })
    }
    /// Renders iterations 1 to `frames` while rotating around the scene
    pub fn animate_vary_rotate<F, R, P>(
        &mut self,
        provider: &FieldProvider<F, R>,
        path: P,
        config: &AnimationConfig,
    ) -> Result<()>
    where
        F: Fetch,
        R: ReadTemperature,
        P: AsRef<Path>,
    {
        let frames = (1..=config.frames).collect();
        write_gif(path.as_ref(), self.config().dpi, config, frames, |i, root| {
            let field = provider.load_field_data(i)?;
            let view = ViewAngle::new(
                ELEVATION,
                azimuth_sweep(i, config.full_rotation_frames),
            );
            self.render_frame(&field, view)?;
            self.draw(root)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExampleField, GridAsset, RadiusSequence, SceneConfig};
    use std::fs;

    #[test]
    fn azimuth() {
        assert_eq!(azimuth_sweep(0, 200), -65.);
        assert_eq!(azimuth_sweep(100, 200), 115.);
        assert_eq!(azimuth_sweep(200, 200), 295.);
        assert_eq!(azimuth_sweep(300, 200), 295.);
    }

    #[test]
    fn sizes() {
        assert_eq!(frame_size(80).unwrap(), (512, 384));
        assert_eq!(frame_size(100).unwrap(), (640, 480));
        assert!(matches!(frame_size(0), Err(Error::InvalidConfig(_))));
        assert_eq!(AnimationConfig::stationary().frame_delay(), 40);
        assert_eq!(AnimationConfig::default().frames, 9);
    }

    #[test]
    fn stationary_gif() {
        let (x, y): (Vec<f64>, Vec<f64>) = (0..5)
            .flat_map(|j| (0..5).map(move |i| (i as f64, j as f64)))
            .unzip();
        let grid = GridAsset::new(x, y).unwrap();
        let radius = RadiusSequence::new(vec![1., 1.5, 2.]);
        let config = SceneConfig {
            radius_step: 1,
            dpi: 10,
            ..Default::default()
        };
        let mut scene = Scene::new(config, &grid, &radius).unwrap();
        let field = ExampleField::new((0..25).map(|k| 2400. + 2. * k as f64).collect());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotate.gif");
        let config = AnimationConfig {
            frames: 3,
            ..AnimationConfig::stationary()
        };
        scene.animate_rotate_stationary(&field, &path, &config).unwrap();
        let gif = fs::read(&path).unwrap();
        assert_eq!(&gif[..6], b"GIF89a");
        assert_eq!(scene.view(), Some(ViewAngle::new(30., azimuth_sweep(2, 200))));
    }
}
