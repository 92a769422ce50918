use super::{Error, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

/// Loads a pickle file
pub fn load_pickle<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    Ok(serde_pickle::from_reader(
        BufReader::new(file),
        Default::default(),
    )?)
}

/// Saves `data` into a pickle file
pub fn save_pickle<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let mut file = BufWriter::new(File::create(path)?);
    serde_pickle::to_writer(&mut file, data, Default::default())?;
    Ok(())
}

/// Numeric array stored either flat or as rows
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Values {
    Flat(Vec<f64>),
    Nested(Vec<Vec<f64>>),
}
impl From<Values> for Vec<f64> {
    fn from(values: Values) -> Self {
        match values {
            Values::Flat(data) => data,
            Values::Nested(rows) => rows.into_iter().flatten().collect(),
        }
    }
}

/// Locations of the pickled assets
#[derive(Debug, Clone)]
pub struct AssetPaths {
    pub xygrid: PathBuf,
    pub radius: PathBuf,
    pub example: PathBuf,
}
impl Default for AssetPaths {
    fn default() -> Self {
        Self::in_dir("data")
    }
}
impl AssetPaths {
    /// Asset file names within directory `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            xygrid: dir.join("xygrid.pkl"),
            radius: dir.join("radius.pkl"),
            example: dir.join("tdata-example.pkl"),
        }
    }
}

#[derive(Deserialize)]
struct XyGridRecord {
    xgrid: Values,
    ygrid: Values,
}

/// Unstructured horizontal grid: one (x,y) pair per sample point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridAsset {
    #[serde(rename = "xgrid")]
    x: Vec<f64>,
    #[serde(rename = "ygrid")]
    y: Vec<f64>,
}
impl GridAsset {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::Shape(format!(
                "x grid has {} points but y grid has {}",
                x.len(),
                y.len()
            )));
        }
        Ok(Self { x, y })
    }
    /// Loads the grid from a pickled `{"xgrid": .., "ygrid": ..}` mapping
    pub fn from_pickle<P: AsRef<Path>>(path: P) -> Result<Self> {
        let record: XyGridRecord = load_pickle(path)?;
        Self::new(record.xgrid.into(), record.ygrid.into())
    }
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
    pub fn x(&self) -> &[f64] {
        &self.x
    }
    pub fn y(&self) -> &[f64] {
        &self.y
    }
    /// Iterator over the (x,y) points
    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.x.iter().zip(&self.y).map(|(&x, &y)| [x, y])
    }
}

/// Radii of the field layers, index aligned with the field layer axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RadiusSequence(Vec<f64>);
impl RadiusSequence {
    pub fn new(radius: Vec<f64>) -> Self {
        Self(radius)
    }
    pub fn from_pickle<P: AsRef<Path>>(path: P) -> Result<Self> {
        let values: Values = load_pickle(path)?;
        Ok(Self(values.into()))
    }
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn min(&self) -> Option<f64> {
        self.0.iter().cloned().reduce(f64::min)
    }
    pub fn max(&self) -> Option<f64> {
        self.0.iter().cloned().reduce(f64::max)
    }
}

#[derive(Deserialize)]
struct ExampleRecord {
    tdata: Values,
}

/// A single temperature slice used for every radius layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleField {
    #[serde(rename = "tdata")]
    values: Vec<f64>,
}
impl ExampleField {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }
    /// Loads the field from a pickled `{"tdata": ..}` mapping, flattening it
    pub fn from_pickle<P: AsRef<Path>>(path: P) -> Result<Self> {
        let record: ExampleRecord = load_pickle(path)?;
        Ok(Self::new(record.tdata.into()))
    }
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn grid_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xygrid.pkl");
        let grid = GridAsset::new(vec![0.1, -2.5, 3e-7], vec![1.0 / 3.0, 0.0, f64::MAX]).unwrap();
        save_pickle(&grid, &path).unwrap();
        let loaded = GridAsset::from_pickle(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        for (a, b) in grid.x().iter().chain(grid.y()).zip(loaded.x().iter().chain(loaded.y())) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn radius_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radius.pkl");
        let radius = RadiusSequence::new(vec![1.22, 1.5, 2.0, 2.22]);
        save_pickle(&radius, &path).unwrap();
        let loaded = RadiusSequence::from_pickle(&path).unwrap();
        assert_eq!(loaded, radius);
        assert_eq!(loaded.min(), Some(1.22));
        assert_eq!(loaded.max(), Some(2.22));
    }

    #[test]
    fn example_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tdata-example.pkl");
        let field = ExampleField::new(vec![2400.0, 2500.5, -1.0]);
        save_pickle(&field, &path).unwrap();
        assert_eq!(ExampleField::from_pickle(&path).unwrap(), field);
    }

    #[test]
    fn nested_arrays_are_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xygrid.pkl");
        let mut record = BTreeMap::new();
        record.insert("xgrid", vec![vec![0.0, 1.0], vec![0.0, 1.0]]);
        record.insert("ygrid", vec![vec![0.0, 0.0], vec![1.0, 1.0]]);
        save_pickle(&record, &path).unwrap();
        let grid = GridAsset::from_pickle(&path).unwrap();
        assert_eq!(grid.x(), &[0.0, 1.0, 0.0, 1.0]);
        assert_eq!(grid.y(), &[0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn mismatched_grid() {
        assert!(matches!(
            GridAsset::new(vec![0.0, 1.0], vec![0.0]),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AssetPaths::in_dir(dir.path());
        assert!(matches!(
            RadiusSequence::from_pickle(paths.radius),
            Err(Error::Read(_))
        ));
    }
}
