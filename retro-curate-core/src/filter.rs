//! Filter specifications and their compiled, per-record evaluation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CurateError;
use crate::expr::Predicate;
use crate::record::{MachineRecord, Mode, Record};
use crate::score::score;
use crate::year::{YearBounds, YearValue};

/// Record attributes the main filter can require or reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MainFlag {
    Parents,
    Clones,
    Mechanical,
    Bios,
    Samples,
    Working,
    Roms,
    CoinSlot,
    SoftwareLists,
}

impl std::str::FromStr for MainFlag {
    type Err = CurateError;

    /// Case-insensitive; `CoinSlot`, `coin_slot` and `coin-slot` are equivalent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        MainFlag::ALL
            .into_iter()
            .find(|f| f.as_str().to_ascii_lowercase() == folded)
            .ok_or_else(|| CurateError::config(format!("unknown main filter flag '{s}'")))
    }
}

impl MainFlag {
    pub const ALL: [MainFlag; 9] = [
        MainFlag::Parents,
        MainFlag::Clones,
        MainFlag::Mechanical,
        MainFlag::Bios,
        MainFlag::Samples,
        MainFlag::Working,
        MainFlag::Roms,
        MainFlag::CoinSlot,
        MainFlag::SoftwareLists,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MainFlag::Parents => "Parents",
            MainFlag::Clones => "Clones",
            MainFlag::Mechanical => "Mechanical",
            MainFlag::Bios => "BIOS",
            MainFlag::Samples => "Samples",
            MainFlag::Working => "Working",
            MainFlag::Roms => "ROMs",
            MainFlag::CoinSlot => "CoinSlot",
            MainFlag::SoftwareLists => "SoftwareLists",
        }
    }

    /// Flags that only exist on machine records.
    pub fn machine_only(&self) -> bool {
        !matches!(self, MainFlag::Parents | MainFlag::Clones)
    }

    /// The record's value for this attribute.
    pub fn test(&self, record: &Record) -> bool {
        match self {
            MainFlag::Parents => record.is_parent(),
            MainFlag::Clones => !record.is_parent(),
            _ => record.machine().is_some_and(|m| {
                let f = &m.flags;
                match self {
                    MainFlag::Mechanical => f.is_mechanical,
                    MainFlag::Bios => f.is_bios,
                    MainFlag::Samples => f.has_samples,
                    MainFlag::Working => f.is_working,
                    MainFlag::Roms => f.has_roms,
                    MainFlag::CoinSlot => f.has_coin_slot,
                    MainFlag::SoftwareLists => f.has_software_lists,
                    MainFlag::Parents | MainFlag::Clones => false,
                }
            }),
        }
    }
}

/// Whether a main-filter flag keeps or drops matching records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[serde(alias = "Include")]
    Include,
    #[serde(alias = "Exclude")]
    Exclude,
}

/// The rule-bearing part of a filter definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Preferred tags, strongest first.
    pub up_tags: Vec<String>,
    /// Penalised tags, strongest first.
    pub down_tags: Vec<String>,
    pub include_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    pub driver: Option<String>,
    pub category: Option<String>,
    pub display_type: Option<String>,
    pub orientation: Option<String>,
    pub controls: Option<String>,
    pub buttons: Option<String>,
    pub players: Option<String>,
    pub year: Option<String>,
    /// Flag name (`Parents`, `BIOS`, `CoinSlot`, ...) to polarity.
    pub main_filter: BTreeMap<String, Polarity>,
    pub year_wildcard_expansion: bool,
    /// Pre-selection rewrites: when the key would be picked, the value's
    /// archive is used instead, kept under the key's name.
    pub identifier_swap: BTreeMap<String, String>,
}

impl FilterSpec {
    fn has_arcade_predicates(&self) -> Option<&'static str> {
        let fields = [
            ("driver", &self.driver),
            ("category", &self.category),
            ("display_type", &self.display_type),
            ("orientation", &self.orientation),
            ("controls", &self.controls),
            ("buttons", &self.buttons),
            ("players", &self.players),
            ("year", &self.year),
        ];
        fields
            .into_iter()
            .find(|(_, v)| non_empty(v).is_some())
            .map(|(name, _)| name)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Which selection step turned a record away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    DeviceExcluded,
    MainFilter(MainFlag, Polarity),
    Predicate(&'static str),
    TagExcluded,
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible)
    }

    pub fn describe(&self) -> String {
        match self {
            Verdict::Eligible => "eligible".to_string(),
            Verdict::DeviceExcluded => "device".to_string(),
            Verdict::MainFilter(flag, Polarity::Include) => format!("not {}", flag.as_str()),
            Verdict::MainFilter(flag, Polarity::Exclude) => format!("is {}", flag.as_str()),
            Verdict::Predicate(field) => format!("{field} predicate"),
            Verdict::TagExcluded => "excluded tag".to_string(),
        }
    }
}

/// Score and filter verdict for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub score: i64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone)]
struct CompiledPredicates {
    driver: Option<Predicate>,
    category: Option<Predicate>,
    display_type: Option<Predicate>,
    orientation: Option<Predicate>,
    controls: Option<Predicate>,
    buttons: Option<Predicate>,
    players: Option<Predicate>,
    year: Option<Predicate>,
}

/// A filter with every expression parsed, ready to evaluate records.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    spec: FilterSpec,
    mode: Mode,
    bounds: YearBounds,
    main_include: Vec<MainFlag>,
    main_exclude: Vec<MainFlag>,
    predicates: CompiledPredicates,
}

impl CompiledFilter {
    /// Parse all predicate expressions and check the filter is valid for `mode`.
    pub fn compile(spec: &FilterSpec, mode: Mode, bounds: YearBounds) -> Result<Self, CurateError> {
        let mut main_include = Vec::new();
        let mut main_exclude = Vec::new();
        for (name, polarity) in &spec.main_filter {
            let flag: MainFlag = name.parse()?;
            match polarity {
                Polarity::Include => main_include.push(flag),
                Polarity::Exclude => main_exclude.push(flag),
            }
        }

        if mode == Mode::Console {
            if let Some(flag) = main_include.iter().chain(&main_exclude).find(|f| f.machine_only()) {
                return Err(CurateError::config(format!(
                    "main filter flag '{}' only applies to arcade filters",
                    flag.as_str()
                )));
            }
            if let Some(field) = spec.has_arcade_predicates() {
                return Err(CurateError::config(format!(
                    "'{field}' predicates only apply to arcade filters"
                )));
            }
        }
        if bounds.earliest > bounds.latest {
            return Err(CurateError::config(format!(
                "year bounds are inverted ({} > {})",
                bounds.earliest, bounds.latest
            )));
        }

        let set = |field: &'static str, src: &Option<String>| -> Result<Option<Predicate>, CurateError> {
            non_empty(src)
                .map(|s| {
                    Predicate::parse_set(s).map_err(|source| CurateError::Predicate { field, source })
                })
                .transpose()
        };
        let num = |field: &'static str, src: &Option<String>| -> Result<Option<Predicate>, CurateError> {
            non_empty(src)
                .map(|s| {
                    Predicate::parse_numeric(s, field)
                        .map_err(|source| CurateError::Predicate { field, source })
                })
                .transpose()
        };

        let predicates = CompiledPredicates {
            driver: set("driver", &spec.driver)?,
            category: set("category", &spec.category)?,
            display_type: set("display_type", &spec.display_type)?,
            orientation: set("orientation", &spec.orientation)?,
            controls: set("controls", &spec.controls)?,
            buttons: num("buttons", &spec.buttons)?,
            players: num("players", &spec.players)?,
            year: num("year", &spec.year)?,
        };

        Ok(Self {
            spec: spec.clone(),
            mode,
            bounds,
            main_include,
            main_exclude,
            predicates,
        })
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn bounds(&self) -> &YearBounds {
        &self.bounds
    }

    /// Score `record` and run it through every filter stage.
    pub fn evaluate(&self, record: &Record) -> Result<Evaluation, CurateError> {
        let score = self.score(record);
        let verdict = self.verdict(record)?;
        Ok(Evaluation { score, verdict })
    }

    fn verdict(&self, record: &Record) -> Result<Verdict, CurateError> {
        if self.mode == Mode::Arcade && record.machine().is_some_and(|m| m.flags.is_device) {
            return Ok(Verdict::DeviceExcluded);
        }
        if let Some(flag) = self.main_include.iter().find(|f| !f.test(record)) {
            return Ok(Verdict::MainFilter(*flag, Polarity::Include));
        }
        if let Some(flag) = self.main_exclude.iter().find(|f| f.test(record)) {
            return Ok(Verdict::MainFilter(*flag, Polarity::Exclude));
        }
        if let Some(machine) = record.machine() {
            if let Some(field) = self.failed_predicate(machine)? {
                return Ok(Verdict::Predicate(field));
            }
        }
        if !self.passes_tag_filter(record.tags()) {
            return Ok(Verdict::TagExcluded);
        }
        Ok(Verdict::Eligible)
    }

    /// The first attribute predicate the machine fails, if any.
    fn failed_predicate(&self, m: &MachineRecord) -> Result<Option<&'static str>, CurateError> {
        let p = &self.predicates;

        if let Some(pred) = &p.driver {
            if !pred.matches_set(&driver_values(m)) {
                return Ok(Some("driver"));
            }
        }
        if let Some(pred) = &p.category {
            if !pred.matches_set(&category_values(m)) {
                return Ok(Some("category"));
            }
        }
        if let Some(pred) = &p.display_type {
            if !pred.matches_set(&[m.display_type.as_str()]) {
                return Ok(Some("display_type"));
            }
        }
        if let Some(pred) = &p.orientation {
            if !pred.matches_set(&[m.orientation.as_str()]) {
                return Ok(Some("orientation"));
            }
        }
        if let Some(pred) = &p.controls {
            if !pred.matches_set(&m.controls) {
                return Ok(Some("controls"));
            }
        }
        if let Some(pred) = &p.buttons {
            if !pred.matches_value(i64::from(m.buttons)) {
                return Ok(Some("buttons"));
            }
        }
        if let Some(pred) = &p.players {
            if !pred.matches_value(i64::from(m.players)) {
                return Ok(Some("players"));
            }
        }
        if let Some(pred) = &p.year {
            let year = YearValue::parse(&m.year, &self.bounds).map_err(|e| {
                CurateError::metadata(format!("machine '{}': {e}", m.name))
            })?;
            let keep = match year {
                YearValue::Exact(y) => pred.matches_value(y),
                YearValue::Wildcard(range) => {
                    self.spec.year_wildcard_expansion && range.into_iter().any(|y| pred.matches_value(y))
                }
            };
            if !keep {
                return Ok(Some("year"));
            }
        }

        Ok(None)
    }

    /// Up/down tag score.
    pub fn score(&self, record: &Record) -> i64 {
        score(record.tags(), &self.spec.up_tags, &self.spec.down_tags)
    }

    /// Include/exclude tag test: a record is dropped only when it carries an
    /// excluded tag and no included tag.
    pub fn passes_tag_filter(&self, tags: &[String]) -> bool {
        let excluded = has_any_tag(tags, &self.spec.exclude_tags);
        let included = has_any_tag(tags, &self.spec.include_tags);
        !excluded || included
    }
}

/// True when some record tag equals some element of `set`.
pub fn has_any_tag(tags: &[String], set: &[String]) -> bool {
    tags.iter().any(|t| set.contains(t))
}

/// Values a driver predicate matches against: `neogeo.cpp` and `neogeo`.
pub fn driver_values(m: &MachineRecord) -> Vec<&str> {
    let mut values = vec![m.driver_file.as_str()];
    if let Some((stem, _)) = m.driver_file.rsplit_once('.') {
        values.push(stem);
    }
    values
}

/// Values a category predicate matches against: the full category and each
/// `/`-separated component.
pub fn category_values(m: &MachineRecord) -> Vec<&str> {
    let mut values = vec![m.category.as_str()];
    if m.category.contains('/') {
        values.extend(m.category.split('/').map(str::trim).filter(|s| !s.is_empty()));
    }
    values
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
