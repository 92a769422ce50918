use super::{Error, Result};

const URL_TEMPLATE_HEAD: &str = "https://nextcloud.computecanada.ca/index.php/s/";
const URL_TEMPLATE_TAIL: &str = "/download";

/// A compressed archive holding the dataset files of consecutive iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Archive file name
    pub name: &'static str,
    /// First iteration in the archive
    pub first: usize,
    /// Last iteration in the archive (inclusive)
    pub last: usize,
    /// Share code of the archive on the remote host
    pub code: &'static str,
}

impl ArchiveEntry {
    const fn new(name: &'static str, first: usize, last: usize, code: &'static str) -> Self {
        Self {
            name,
            first,
            last,
            code,
        }
    }
    /// Checks if the iteration `i` belongs to the archive
    pub fn contains(&self, i: usize) -> bool {
        self.first <= i && i <= self.last
    }
    /// Returns the download URL of the archive
    pub fn url(&self) -> String {
        build_url(self.code)
    }
}

static MANTLE_ARCHIVES: [ArchiveEntry; 25] = [
    ArchiveEntry::new("mantle01.tgz", 1, 10, "edS6be3sk8oQ58N"),
    ArchiveEntry::new("mantle02.tgz", 11, 20, "infBBW2Rc9TJwf7"),
    ArchiveEntry::new("mantle03.tgz", 21, 30, "76Esj3yDP9EiaGc"),
    ArchiveEntry::new("mantle04.tgz", 31, 40, "AZmt47d48prCZZF"),
    ArchiveEntry::new("mantle05.tgz", 41, 50, "9fZ4A7ENGR6sQrc"),
    ArchiveEntry::new("mantle06.tgz", 51, 60, "B8HC3H4oqwcsWB3"),
    ArchiveEntry::new("mantle07.tgz", 61, 70, "t3zLJWWeirR5zmG"),
    ArchiveEntry::new("mantle08.tgz", 71, 80, "YmkYgxM7xxrNAwj"),
    ArchiveEntry::new("mantle09.tgz", 81, 90, "rMma6W9MBtQH9LX"),
    ArchiveEntry::new("mantle10.tgz", 91, 100, "MzcZBCaxaojTZJx"),
    ArchiveEntry::new("mantle11.tgz", 101, 110, "dfP6NXHmekQQrHR"),
    ArchiveEntry::new("mantle12.tgz", 111, 120, "2GnLRgPi8W2Dt5p"),
    ArchiveEntry::new("mantle13.tgz", 121, 130, "MqtoESg2d9DsF2P"),
    ArchiveEntry::new("mantle14.tgz", 131, 140, "ysGoJK6B3pLYaDB"),
    ArchiveEntry::new("mantle15.tgz", 141, 150, "Ae32XwCpt7bHo9D"),
    ArchiveEntry::new("mantle16.tgz", 151, 160, "AysWSPnxFS6e5B2"),
    ArchiveEntry::new("mantle17.tgz", 161, 170, "4NcnJkPYWpkXrmb"),
    ArchiveEntry::new("mantle18.tgz", 171, 180, "mBRfrnfEEEaKJ9m"),
    ArchiveEntry::new("mantle19.tgz", 181, 190, "J63KxeCppK8ssGc"),
    ArchiveEntry::new("mantle20.tgz", 191, 200, "NeqnHBNPWx4PRwd"),
    ArchiveEntry::new("mantle21.tgz", 201, 210, "JdzZQCKiHaRfL9L"),
    ArchiveEntry::new("mantle22.tgz", 211, 220, "DXnWtA5fymHBsxA"),
    ArchiveEntry::new("mantle23.tgz", 221, 230, "HzgtF42Pf9AnxGm"),
    ArchiveEntry::new("mantle24.tgz", 231, 240, "yy8FASeC8Dm54Sy"),
    ArchiveEntry::new("mantle25.tgz", 241, 251, "TC8QekmjokmBkWA"),
];

/// Lookup table from iteration to archive
///
/// The entries are sorted and their ranges are contiguous, starting at iteration 1.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveIndex {
    entries: &'static [ArchiveEntry],
}

impl Default for ArchiveIndex {
    fn default() -> Self {
        Self::mantle()
    }
}

impl ArchiveIndex {
    /// The 25 archives of the mantle convection run (iterations 1 to 251)
    pub fn mantle() -> Self {
        Self {
            entries: &MANTLE_ARCHIVES,
        }
    }
    pub fn entries(&self) -> &'static [ArchiveEntry] {
        self.entries
    }
    /// Returns the archive holding iteration `i`
    pub fn lookup(&self, i: usize) -> Result<&ArchiveEntry> {
        let k = self.entries.partition_point(|entry| entry.last < i);
        self.entries
            .get(k)
            .filter(|entry| entry.contains(i))
            .ok_or(Error::OutOfRange(i))
    }
    /// Checks if `i` is the first iteration of an archive
    pub fn is_range_start(&self, i: usize) -> bool {
        self.entries.iter().any(|entry| entry.first == i)
    }
    /// Checks if `i` is the last iteration of an archive
    pub fn is_range_end(&self, i: usize) -> bool {
        self.entries.iter().any(|entry| entry.last == i)
    }
    /// First and last iterations covered by the index
    pub fn span(&self) -> Option<(usize, usize)> {
        Some((self.entries.first()?.first, self.entries.last()?.last))
    }
}

/// Formats the download URL of the archive with share `code`
pub fn build_url(code: &str) -> String {
    format!("{URL_TEMPLATE_HEAD}{code}{URL_TEMPLATE_TAIL}")
}
