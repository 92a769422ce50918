use super::Result;
use flate2::read::GzDecoder;
use std::{
    fs::File,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};

/// Interface to a remote archive store
pub trait Fetch {
    /// Downloads the resource at `url` into the file `dest`
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Blocking HTTP(S) download
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}
impl HttpFetcher {
    /// HTTP client without request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}
impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = self.client.get(url).send()?.error_for_status()?;
        let mut file = File::create(dest)?;
        let n_byte = response.copy_to(&mut file)?;
        debug!("{n_byte} bytes written to {}", dest.display());
        Ok(())
    }
}

/// A file that is deleted when dropped, if it exists
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}
impl ScratchFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
}
impl Drop for ScratchFile {
    fn drop(&mut self) {
        debug!("Testing for file {}", self.path.display());
        if self.path.is_file() {
            info!("Deleting file {}", self.path.display());
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("failed to delete {}: {e}", self.path.display());
            }
        }
    }
}

/// Unpacks the gzip compressed tar archive `archive` into directory `dest`
pub fn extract_archive<P, Q>(archive: P, dest: Q) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.unpack(dest)?;
    Ok(())
}

/// Downloads the archive `name` from `url`, unpacks it into `dir` and deletes it
///
/// The archive is deleted whether the download and the extraction succeed or not.
pub fn fetch_and_extract<F, P>(fetcher: &F, name: &str, url: &str, dir: P) -> Result<()>
where
    F: Fetch + ?Sized,
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    let archive = ScratchFile::new(dir.join(name));
    info!("Downloading:{name} @ {url}");
    fetcher.fetch(url, archive.path())?;
    info!("Extracting {name} into {}", dir.display());
    extract_archive(archive.path(), dir)
}
