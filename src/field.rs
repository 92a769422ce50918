use super::{fetch_and_extract, ArchiveIndex, Error, ExampleField, Fetch, Result, ScratchFile};
use ndarray::{Array3, Axis};
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};
use tracing::info;

/// Name of the dataset file of iteration `i`
pub fn dataset_file_name(i: usize) -> String {
    format!("spherical{i:03}.nc")
}

/// Source of the field values of each radius layer
pub trait FieldSlices {
    /// Returns the values of radius layer `layer`, aligned with the grid points
    fn layer(&self, layer: usize) -> Option<Cow<'_, [f64]>>;
}

impl FieldSlices for ExampleField {
    /// The example field is the same for all the layers
    fn layer(&self, _layer: usize) -> Option<Cow<'_, [f64]>> {
        Some(Cow::Borrowed(self.values()))
    }
}

/// Temperature field of one iteration
///
/// The radius layers are along the 2nd axis.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    values: Array3<f64>,
}
impl FieldSnapshot {
    /// Builds a snapshot from row-major `values` of shape `shape`
    ///
    /// A 2D shape is read as (point, layer).
    pub fn from_shape_vec(shape: &[usize], values: Vec<f64>) -> Result<Self> {
        let dim = match *shape {
            [n_point, n_layer] => (n_point, n_layer, 1),
            [n0, n_layer, n2] => (n0, n_layer, n2),
            _ => {
                return Err(Error::Shape(format!(
                    "temperature must be 2D or 3D, found shape {shape:?}"
                )))
            }
        };
        let values = Array3::from_shape_vec(dim, values)
            .map_err(|e| Error::Shape(format!("temperature of shape {shape:?}: {e}")))?;
        Ok(Self { values })
    }
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }
    pub fn n_layer(&self) -> usize {
        self.values.len_of(Axis(1))
    }
}
impl FieldSlices for FieldSnapshot {
    fn layer(&self, layer: usize) -> Option<Cow<'_, [f64]>> {
        (layer < self.n_layer()).then(|| {
            Cow::Owned(
                self.values
                    .index_axis(Axis(1), layer)
                    .iter()
                    .cloned()
                    .collect(),
            )
        })
    }
}

/// Interface to the per iteration dataset files
pub trait ReadTemperature {
    /// Reads the temperature variable of the dataset at `path`
    fn read_temperature(&self, path: &Path) -> Result<FieldSnapshot>;
}

/// NetCDF dataset reader
#[cfg(feature = "netcdf")]
#[derive(Debug, Clone)]
pub struct NetCdfReader {
    variable: String,
}
#[cfg(feature = "netcdf")]
impl Default for NetCdfReader {
    fn default() -> Self {
        Self {
            variable: "temperature".to_string(),
        }
    }
}
#[cfg(feature = "netcdf")]
impl NetCdfReader {
    /// Reader of the variable `variable` instead of `temperature`
    pub fn variable<S: Into<String>>(variable: S) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}
#[cfg(feature = "netcdf")]
impl ReadTemperature for NetCdfReader {
    fn read_temperature(&self, path: &Path) -> Result<FieldSnapshot> {
        // a missing file is reported as such rather than as a NetCDF error
        std::fs::metadata(path)?;
        let file = netcdf::open(path)?;
        let var = file.variable(&self.variable).ok_or_else(|| {
            Error::Shape(format!(
                "no variable {} in {}",
                self.variable,
                path.display()
            ))
        })?;
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let values: Vec<f64> = var.get_values(..)?;
        FieldSnapshot::from_shape_vec(&shape, values)
    }
}

/// Loads the field data of each iteration, downloading the archives on demand
pub struct FieldProvider<F, R> {
    index: ArchiveIndex,
    fetcher: F,
    reader: R,
    work_dir: PathBuf,
}
impl<F: Fetch, R: ReadTemperature> FieldProvider<F, R> {
    /// Provider with archives extracted in the current directory
    pub fn new(fetcher: F, reader: R) -> Self {
        Self {
            index: ArchiveIndex::mantle(),
            fetcher,
            reader,
            work_dir: PathBuf::from("."),
        }
    }
    /// Sets the directory where the archives are downloaded and extracted
    pub fn with_work_dir<P: Into<PathBuf>>(self, work_dir: P) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..self
        }
    }
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
    /// Returns the temperature field of iteration `i`
    ///
    /// The archive is downloaded when `i` is the first iteration of the archive,
    /// the dataset file of iteration `i` is deleted once read.
    pub fn load_field_data(&self, i: usize) -> Result<FieldSnapshot> {
        let entry = self.index.lookup(i)?;
        if self.index.is_range_start(i) {
            fetch_and_extract(&self.fetcher, entry.name, &entry.url(), &self.work_dir)?;
        }
        let dataset = ScratchFile::new(self.work_dir.join(dataset_file_name(i)));
        info!("Loading:{}", dataset.path().display());
        self.reader.read_temperature(dataset.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(dataset_file_name(7), "spherical007.nc");
        assert_eq!(dataset_file_name(42), "spherical042.nc");
        assert_eq!(dataset_file_name(251), "spherical251.nc");
    }

    #[test]
    fn layer_slices() {
        // shape (2, 3, 2): value = 100*i + 10*layer + k
        let values: Vec<f64> = (0..2)
            .flat_map(|i| (0..3).flat_map(move |l| (0..2).map(move |k| (100 * i + 10 * l + k) as f64)))
            .collect();
        let snapshot = FieldSnapshot::from_shape_vec(&[2, 3, 2], values).unwrap();
        assert_eq!(snapshot.n_layer(), 3);
        assert_eq!(snapshot.layer(1).unwrap().as_ref(), &[10., 11., 110., 111.]);
        assert!(snapshot.layer(3).is_none());
    }

    #[test]
    fn point_layer_snapshot() {
        let snapshot = FieldSnapshot::from_shape_vec(&[3, 2], vec![0., 1., 2., 3., 4., 5.]).unwrap();
        assert_eq!(snapshot.shape(), &[3, 2, 1]);
        assert_eq!(snapshot.layer(0).unwrap().as_ref(), &[0., 2., 4.]);
        assert_eq!(snapshot.layer(1).unwrap().as_ref(), &[1., 3., 5.]);
    }

    #[test]
    fn bad_shapes() {
        assert!(matches!(
            FieldSnapshot::from_shape_vec(&[6], vec![0.; 6]),
            Err(Error::Shape(_))
        ));
        assert!(matches!(
            FieldSnapshot::from_shape_vec(&[2, 2], vec![0.; 6]),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn example_field_is_layer_independent() {
        let field = ExampleField::new(vec![1., 2.]);
        assert_eq!(field.layer(0), field.layer(500));
    }
}
