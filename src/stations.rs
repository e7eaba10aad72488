//! # Stations
//!
//! The station registry lists every station the tide table knows about; the
//! station selection is the (at most six) stations the user wants in the
//! report, remembered between runs as a single comma-joined line.
//!
//! The picker groups stations by the initial consonant of their name so a
//! long list can be browsed one consonant at a time.

use crate::ReportError;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs, io,
    path::Path,
};
use tracing::{debug, info};

/// Most stations a single report can show side by side
pub const MAX_STATIONS: usize = 6;

/// Every valid station, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRegistry {
    stations: Vec<String>,
}

impl StationRegistry {
    pub fn new<I, S>(stations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = StationRegistry::default();
        for station in stations {
            let station = station.into();
            let station = station.trim();
            if !station.is_empty() && !registry.contains(station) {
                registry.stations.push(station.to_string());
            }
        }
        registry
    }

    /// Read a comma-delimited station list. Every non-blank cell is a station.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let unreadable = |reason: String| ReportError::SourceUnreadable {
            path: path.to_path_buf(),
            reason,
        };
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| unreadable(e.to_string()))?;

        let mut cells = Vec::new();
        for result in rdr.records() {
            let row = result.map_err(|e| unreadable(e.to_string()))?;
            cells.extend(row.iter().map(str::to_string));
        }
        let registry = StationRegistry::new(cells);
        debug!(stations = registry.len(), "loaded station list");
        Ok(registry)
    }

    pub fn contains(&self, station: &str) -> bool {
        self.stations.iter().any(|s| s == station)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    /// Stations keyed by initial consonant, keys in dictionary order.
    pub fn groups(&self) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for station in &self.stations {
            groups
                .entry(initial_of(station))
                .or_default()
                .push(station.clone());
        }
        groups
    }
}

/// Initial consonant of the first syllable, double consonants folded
/// (ㄲ → ㄱ). Non-Hangul names group under their first character, uppercased.
///
/// # Example
/// ```
/// use tide_report_lib::stations::initial_of;
///
/// assert_eq!(initial_of("인천"), "ㅇ");
/// assert_eq!(initial_of("때섬"), "ㄷ");
/// assert_eq!(initial_of("busan"), "B");
/// ```
pub fn initial_of(name: &str) -> String {
    const INITIALS: [char; 19] = [
        'ㄱ', 'ㄱ', 'ㄴ', 'ㄷ', 'ㄷ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅂ', 'ㅅ', 'ㅅ', 'ㅇ', 'ㅈ', 'ㅈ', 'ㅊ', 'ㅋ',
        'ㅌ', 'ㅍ', 'ㅎ',
    ];
    const SYLLABLE_BASE: u32 = 0xAC00;
    const SYLLABLE_LAST: u32 = 0xD7A3;
    // 21 vowels × 28 finals per initial consonant
    const SYLLABLES_PER_INITIAL: u32 = 588;

    let Some(first) = name.trim().chars().next() else {
        return String::new();
    };
    let code = first as u32;
    if (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
        let index = ((code - SYLLABLE_BASE) / SYLLABLES_PER_INITIAL) as usize;
        INITIALS[index].to_string()
    } else {
        first.to_uppercase().collect()
    }
}

/// Result of toggling a station in the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Already at [`MAX_STATIONS`]; nothing changed
    Full,
}

/// The user's chosen stations: unique, ordered, at most [`MAX_STATIONS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSelection {
    stations: Vec<String>,
}

impl StationSelection {
    /// Parse the persisted comma-joined line. Blanks and repeats are dropped
    /// and anything past the sixth station is ignored.
    pub fn from_line(line: &str) -> Self {
        let mut selection = StationSelection::default();
        for station in line.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if selection.stations.len() == MAX_STATIONS {
                break;
            }
            if !selection.contains(station) {
                selection.stations.push(station.to_string());
            }
        }
        selection
    }

    pub fn to_line(&self) -> String {
        self.stations.join(",")
    }

    /// Load the saved selection; a missing file is an empty selection.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let line = contents.lines().next().unwrap_or_default();
                Ok(Self::from_line(line))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ReportError::Selection(format!("{}: {e}", path.display()))),
        }
    }

    /// Overwrite the saved selection.
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let write = || -> io::Result<()> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, self.to_line())
        };
        write().map_err(|e| ReportError::Selection(format!("{}: {e}", path.display())))?;
        info!(stations = %self.to_line(), "saved station selection");
        Ok(())
    }

    /// Remove a selected station, or add it when there is room.
    pub fn toggle(&mut self, station: &str) -> Toggle {
        if let Some(pos) = self.stations.iter().position(|s| s == station) {
            self.stations.remove(pos);
            Toggle::Removed
        } else if self.stations.len() < MAX_STATIONS {
            self.stations.push(station.to_string());
            Toggle::Added
        } else {
            Toggle::Full
        }
    }

    /// Drop stations the registry no longer knows, returning them.
    pub fn retain_known(&mut self, registry: &StationRegistry) -> Vec<String> {
        let (kept, dropped): (Vec<String>, Vec<String>) = self
            .stations
            .drain(..)
            .partition(|station| registry.contains(station));
        self.stations = kept;
        dropped
    }

    pub fn contains(&self, station: &str) -> bool {
        self.stations.iter().any(|s| s == station)
    }

    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Button caption: "인천 등 3개 지점".
    pub fn summary(&self) -> String {
        match self.stations.first() {
            None => "추출할 지역을 선택해주세요.".to_string(),
            Some(first) => format!("{first} 등 {}개 지점", self.stations.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn initials_fold_double_consonants() {
        assert_eq!(initial_of("까치섬"), "ㄱ");
        assert_eq!(initial_of("쌍섬"), "ㅅ");
        assert_eq!(initial_of("백령도"), "ㅂ");
        assert_eq!(initial_of("힣"), "ㅎ");
        assert_eq!(initial_of(""), "");
    }

    #[test]
    fn registry_groups_by_initial_in_source_order() {
        let registry = StationRegistry::new(["인천", "연평도", "대청도", "백령도", "안흥", "인천"]);
        assert_eq!(registry.len(), 5);
        let groups = registry.groups();
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec!["ㄷ", "ㅂ", "ㅇ"]);
        assert_eq!(groups["ㅇ"], vec!["인천", "연평도", "안흥"]);
    }

    #[test]
    fn registry_loads_every_cell() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "인천,연평도, 대청도").unwrap();
        writeln!(file, "백령도,,").unwrap();
        let registry = StationRegistry::load(file.path()).unwrap();
        assert_eq!(registry.stations(), ["인천", "연평도", "대청도", "백령도"]);
    }

    #[test]
    fn toggle_caps_at_six() {
        let mut selection = StationSelection::default();
        for station in ["a", "b", "c", "d", "e", "f"] {
            assert_eq!(selection.toggle(station), Toggle::Added);
        }
        assert_eq!(selection.toggle("g"), Toggle::Full);
        assert_eq!(selection.len(), MAX_STATIONS);
        assert_eq!(selection.toggle("c"), Toggle::Removed);
        assert_eq!(selection.toggle("g"), Toggle::Added);
        assert_eq!(selection.to_line(), "a,b,d,e,f,g");
    }

    #[test]
    fn from_line_dedupes_and_truncates() {
        let selection = StationSelection::from_line(" 인천, ,인천,a,b,c,d,e,f");
        assert_eq!(selection.stations(), ["인천", "a", "b", "c", "d", "e"]);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("selected.txt");
        let selection = StationSelection::from_line("인천,백령도");
        selection.save(&path).unwrap();
        assert_eq!(StationSelection::load(&path).unwrap(), selection);
    }

    #[test]
    fn missing_selection_file_is_empty() {
        let selection = StationSelection::load(Path::new("/nonexistent/selected.txt")).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.summary(), "추출할 지역을 선택해주세요.");
    }

    #[test]
    fn retain_known_drops_retired_stations() {
        let registry = StationRegistry::new(["인천", "대청도"]);
        let mut selection = StationSelection::from_line("인천,옛섬,대청도");
        assert_eq!(selection.retain_known(&registry), vec!["옛섬"]);
        assert_eq!(selection.summary(), "인천 등 2개 지점");
    }
}
