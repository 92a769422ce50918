use super::{
    contour, AssetPaths, Band, ColorScaler, Colormap, Error, FieldSlices, GridAsset,
    RadiusSequence, Result, Rgba, Triangulation,
};
use plotters::{
    coord::Shift,
    prelude::{ChartBuilder, Color, DrawingArea, DrawingBackend, Polygon, WHITE},
};
use tracing::debug;

// Upper value of the filled contour band
const BAND_CEILING: f64 = 10_000.;
// Zoom factor of the 3D projection
const ZOOM: f64 = 1.2;

pub(crate) fn plot_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

/// Scene rendering parameters
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Temperature above which the shells are drawn
    pub level: f64,
    /// Every `radius_step` radius layer is drawn
    pub radius_step: usize,
    /// Resolution of the rendered frames, in pixels per inch
    pub dpi: u32,
    /// Colormap of the radius layers
    pub colormap: Colormap,
    /// Whether the shells of the previous frame are removed before rendering a new frame
    pub clear_between_frames: bool,
}
impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            level: 2425.,
            radius_step: 50,
            dpi: 80,
            colormap: Colormap::hot(),
            clear_between_frames: true,
        }
    }
}

/// Camera elevation and azimuth in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewAngle {
    pub elevation: f64,
    pub azimuth: f64,
}
impl Default for ViewAngle {
    fn default() -> Self {
        Self {
            elevation: 30.,
            azimuth: -65.,
        }
    }
}
impl ViewAngle {
    pub fn new(elevation: f64, azimuth: f64) -> Self {
        Self {
            elevation,
            azimuth,
        }
    }
}

/// Filled contour of one radius layer
#[derive(Debug, Clone)]
pub struct ContourShell {
    pub layer: usize,
    pub radius: f64,
    pub color: Rgba,
    pub polygons: Vec<Vec<[f64; 2]>>,
}

/// Stack of contour shells over a triangulated grid
pub struct Scene {
    config: SceneConfig,
    band: Band,
    mesh: Triangulation,
    layers: Vec<(usize, f64)>,
    r_min: f64,
    r_max: f64,
    scaler: ColorScaler,
    shells: Vec<ContourShell>,
    z_limits: Option<(f64, f64)>,
    view: Option<ViewAngle>,
}
impl Scene {
    pub fn new(config: SceneConfig, grid: &GridAsset, radius: &RadiusSequence) -> Result<Self> {
        Self::with_mesh(config, Triangulation::from_grid(grid)?, radius)
    }
    /// Scene from a prebuilt triangulation
    pub fn with_mesh(
        config: SceneConfig,
        mesh: Triangulation,
        radius: &RadiusSequence,
    ) -> Result<Self> {
        if config.radius_step == 0 {
            return Err(Error::InvalidConfig(
                "radius step must be at least 1".to_string(),
            ));
        }
        if config.dpi == 0 {
            return Err(Error::InvalidConfig(
                "frame resolution must be at least 1 dpi".to_string(),
            ));
        }
        let (r_min, r_max) = radius
            .min()
            .zip(radius.max())
            .ok_or_else(|| Error::InvalidConfig("empty radius sequence".to_string()))?;
        let layers = radius.as_slice().iter().cloned().enumerate().collect();
        let scaler = ColorScaler::new(r_min, r_max, config.colormap.clone());
        debug!(
            "scene: {} points, {} triangles, {} radius layers in [{r_min},{r_max}]",
            mesh.n_points(),
            mesh.triangles().len(),
            radius.len()
        );
        Ok(Self {
            band: Band::new(config.level, BAND_CEILING),
            config,
            mesh,
            layers,
            r_min,
            r_max,
            scaler,
            shells: Vec::new(),
            z_limits: None,
            view: None,
        })
    }
    /// Loads the grid and the radius from their pickle files
    pub fn from_assets(config: SceneConfig, paths: &AssetPaths) -> Result<Self> {
        let grid = GridAsset::from_pickle(&paths.xygrid)?;
        let radius = RadiusSequence::from_pickle(&paths.radius)?;
        Self::new(config, &grid, &radius)
    }
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
    pub fn mesh(&self) -> &Triangulation {
        &self.mesh
    }
    pub fn shells(&self) -> &[ContourShell] {
        &self.shells
    }
    pub fn z_limits(&self) -> Option<(f64, f64)> {
        self.z_limits
    }
    pub fn view(&self) -> Option<ViewAngle> {
        self.view
    }
    /// Computes the contour shells of `field` and sets the view angle
    ///
    /// Layers without any value above the contour level are skipped.
    pub fn render_frame<S>(&mut self, field: &S, view: ViewAngle) -> Result<()>
    where
        S: FieldSlices + ?Sized,
    {
        if self.config.clear_between_frames {
            self.shells.clear();
        }
        for &(layer, radius) in self.layers.iter().step_by(self.config.radius_step) {
            let slice = field.layer(layer).ok_or_else(|| {
                Error::Shape(format!("no field values for radius layer #{layer}"))
            })?;
            if slice.len() != self.mesh.n_points() {
                return Err(Error::Shape(format!(
                    "radius layer #{layer} has {} values for {} grid points",
                    slice.len(),
                    self.mesh.n_points()
                )));
            }
            if !slice.iter().any(|&v| v > self.band.lower) {
                continue;
            }
            self.shells.push(ContourShell {
                layer,
                radius,
                color: self.scaler.color(radius),
                polygons: contour::fill_band(&self.mesh, &slice, self.band),
            });
        }
        self.z_limits = Some((self.r_min, self.r_max));
        self.view = Some(view);
        Ok(())
    }
    /// Draws the shells into `root`
    ///
    /// The grid is in the horizontal plane and each shell is raised to its radius.
    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(plot_error)?;
        let ([x_min, y_min], [x_max, y_max]) = self.mesh.bounds();
        let (z_min, z_max) = self.z_limits.unwrap_or((self.r_min, self.r_max));
        let view = self.view.unwrap_or_default();
        let mut chart = ChartBuilder::on(root)
            .margin(0)
            .build_cartesian_3d(x_min..x_max, z_min..z_max, y_min..y_max)
            .map_err(plot_error)?;
        chart.with_projection(|mut pb| {
            pb.pitch = view.elevation.to_radians();
            pb.yaw = view.azimuth.to_radians();
            pb.scale = ZOOM;
            pb.into_matrix()
        });
        for shell in &self.shells {
            let style = shell.color.to_rgba_color().filled();
            chart
                .draw_series(shell.polygons.iter().map(|polygon| {
                    Polygon::new(
                        polygon
                            .iter()
                            .map(|&[x, y]| (x, shell.radius, y))
                            .collect::<Vec<_>>(),
                        style,
                    )
                }))
                .map_err(plot_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExampleField;
    use plotters::prelude::{BitMapBackend, IntoDrawingArea};

    fn grid() -> GridAsset {
        let (x, y): (Vec<f64>, Vec<f64>) = (0..6)
            .flat_map(|j| (0..6).map(move |i| (i as f64, j as f64)))
            .unzip();
        GridAsset::new(x, y).unwrap()
    }

    fn scene(config: SceneConfig) -> Scene {
        let radius = RadiusSequence::new((0..10).map(|k| 1. + 0.125 * k as f64).collect());
        Scene::new(config, &grid(), &radius).unwrap()
    }

    fn config() -> SceneConfig {
        SceneConfig {
            radius_step: 3,
            ..Default::default()
        }
    }

    #[test]
    fn cold_field_draws_nothing() {
        let mut scene = scene(config());
        let field = ExampleField::new(vec![2000.; 36]);
        let view = ViewAngle::new(30., 10.);
        scene.render_frame(&field, view).unwrap();
        assert!(scene.shells().is_empty());
        assert_eq!(scene.z_limits(), Some((1., 2.125)));
        assert_eq!(scene.view(), Some(view));
    }

    #[test]
    fn hot_field_draws_every_step() {
        let mut scene = scene(config());
        let field = ExampleField::new((0..36).map(|k| 2400. + k as f64).collect());
        scene.render_frame(&field, ViewAngle::default()).unwrap();
        let layers: Vec<_> = scene.shells().iter().map(|s| s.layer).collect();
        assert_eq!(layers, vec![0, 3, 6, 9]);
        assert!(scene.shells().iter().all(|s| !s.polygons.is_empty()));
        assert_eq!(scene.shells()[0].color, Colormap::hot().sample(0.));
        assert_eq!(scene.shells()[3].color, Colormap::hot().sample(1.));
    }

    #[test]
    fn clears_or_accumulates() {
        let field = ExampleField::new(vec![3000.; 36]);
        let mut cleared = scene(config());
        let mut accumulated = scene(SceneConfig {
            clear_between_frames: false,
            ..config()
        });
        for _ in 0..3 {
            cleared.render_frame(&field, ViewAngle::default()).unwrap();
            accumulated.render_frame(&field, ViewAngle::default()).unwrap();
        }
        assert_eq!(cleared.shells().len(), 4);
        assert_eq!(accumulated.shells().len(), 12);
    }

    #[test]
    fn field_size_mismatch() {
        let mut scene = scene(config());
        let field = ExampleField::new(vec![3000.; 35]);
        assert!(matches!(
            scene.render_frame(&field, ViewAngle::default()),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn invalid_config() {
        let radius = RadiusSequence::new(vec![1., 2.]);
        let config = SceneConfig {
            radius_step: 0,
            ..Default::default()
        };
        assert!(matches!(
            Scene::new(config, &grid(), &radius),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Scene::new(SceneConfig::default(), &grid(), &RadiusSequence::new(vec![])),
            Err(Error::InvalidConfig(_))
        ));
        let config = SceneConfig {
            dpi: 0,
            ..Default::default()
        };
        assert!(matches!(
            Scene::new(config, &grid(), &radius),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn draws_into_bitmap() {
        let mut scene = scene(config());
        let field = ExampleField::new(vec![3000.; 36]);
        scene.render_frame(&field, ViewAngle::default()).unwrap();
        let mut buffer = vec![0u8; 64 * 48 * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (64, 48)).into_drawing_area();
            scene.draw(&root).unwrap();
            root.present().unwrap();
        }
        assert!(buffer.chunks(3).any(|px| px != [255, 255, 255]));
    }
}
