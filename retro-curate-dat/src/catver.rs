//! Category index (`catver.ini`).
//!
//! ```text
//! [Category]
//! 1942=Shooter / Flying Vertical
//! mslug=Platform / Run Gun
//!
//! [VerAdded]
//! 1942=0.036
//! ```
//!
//! Only the `[Category]` section is read.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use retro_curate_core::MachineRecord;

use crate::error::DatError;

/// Category assigned to machines the index does not list.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Machine name to category.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    categories: HashMap<String, String>,
}

impl CategoryIndex {
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, DatError> {
        let mut categories = HashMap::new();
        let mut in_category = false;

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }
            if let Some(section) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                in_category = section.trim().eq_ignore_ascii_case("category");
                continue;
            }
            if !in_category {
                continue;
            }
            if let Some((name, category)) = trimmed.split_once('=') {
                let (name, category) = (name.trim(), category.trim());
                if !name.is_empty() && !category.is_empty() {
                    categories.insert(name.to_string(), category.to_string());
                }
            }
        }

        Ok(Self { categories })
    }

    pub fn from_file(path: &Path) -> Result<Self, DatError> {
        let file = std::fs::File::open(path).map_err(|e| DatError::file(path, e))?;
        let index = Self::parse(std::io::BufReader::new(file))?;
        log::debug!("{} categories from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn get(&self, machine: &str) -> Option<&str> {
        self.categories.get(machine).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Set every machine's category, `Unknown` when unlisted.
    pub fn apply(&self, machines: &mut [MachineRecord]) {
        for m in machines {
            m.category = self.get(&m.name).unwrap_or(UNKNOWN_CATEGORY).to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
;; catver.ini 0.262
[Category]
1942=Shooter / Flying Vertical
mslug = Platform / Run Gun

[VerAdded]
1942=0.036
sf2=0.060
";

    #[test]
    fn test_parse_category_section() {
        let index = CategoryIndex::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("1942"), Some("Shooter / Flying Vertical"));
        assert_eq!(index.get("mslug"), Some("Platform / Run Gun"));
        assert_eq!(index.get("sf2"), None);
    }

    #[test]
    fn test_apply_defaults_to_unknown() {
        let index = CategoryIndex::parse(SAMPLE.as_bytes()).unwrap();
        let mut machines = vec![MachineRecord::new("1942"), MachineRecord::new("sf2")];
        index.apply(&mut machines);
        assert_eq!(machines[0].category, "Shooter / Flying Vertical");
        assert_eq!(machines[1].category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_empty_index() {
        let index = CategoryIndex::default();
        assert!(index.is_empty());
        let mut machines = vec![MachineRecord::new("x")];
        index.apply(&mut machines);
        assert_eq!(machines[0].category, "Unknown");
    }
}
