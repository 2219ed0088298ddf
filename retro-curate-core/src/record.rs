//! Record shapes: console dumps and arcade machines.

use serde::{Deserialize, Serialize};

use crate::tags::extract_tags;

/// Which kind of collection a filter curates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One archive per console game dump, classes from a parent/clone DAT.
    #[default]
    Console,
    /// One archive per emulated machine, attributes from the machine database.
    Arcade,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Console => "console",
            Mode::Arcade => "arcade",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A console game dump, identified by its archive base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRecord {
    pub name: String,
    /// Tags parsed from the parenthesised segments of the name.
    pub tags: Vec<String>,
    /// Class parent, `None` when this dump is the parent.
    pub parent: Option<String>,
}

impl DumpRecord {
    pub fn new(name: impl Into<String>, parent: Option<String>) -> Self {
        let name = name.into();
        let tags = extract_tags(&name);
        Self { name, tags, parent }
    }
}

/// Display hardware of an arcade machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayType {
    Raster,
    Vector,
    Lcd,
    #[default]
    Unknown,
}

impl DisplayType {
    /// Parse the `type` attribute of a `<display>` element.
    pub fn from_xml(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "raster" => DisplayType::Raster,
            "vector" => DisplayType::Vector,
            "lcd" => DisplayType::Lcd,
            _ => DisplayType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayType::Raster => "Raster",
            DisplayType::Vector => "Vector",
            DisplayType::Lcd => "LCD",
            DisplayType::Unknown => "Unknown",
        }
    }
}

/// Screen orientation derived from the display rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
    #[default]
    Unknown,
}

impl Orientation {
    /// Map a `rotate` attribute (degrees) to an orientation.
    pub fn from_rotation(degrees: u32) -> Self {
        match degrees % 360 {
            0 | 180 => Orientation::Horizontal,
            90 | 270 => Orientation::Vertical,
            _ => Orientation::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "Horizontal",
            Orientation::Vertical => "Vertical",
            Orientation::Unknown => "Unknown",
        }
    }
}

/// Boolean attributes of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MachineFlags {
    #[serde(default)]
    pub is_device: bool,
    #[serde(default)]
    pub is_runnable: bool,
    #[serde(default)]
    pub is_mechanical: bool,
    #[serde(default)]
    pub is_bios: bool,
    #[serde(default)]
    pub has_samples: bool,
    #[serde(default)]
    pub has_roms: bool,
    #[serde(default)]
    pub has_software_lists: bool,
    #[serde(default)]
    pub has_coin_slot: bool,
    #[serde(default)]
    pub is_working: bool,
}

/// An arcade machine as retained in the reduced machine database.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MachineRecord {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub flags: MachineFlags,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub driver_file: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub buttons: u32,
    #[serde(default)]
    pub players: u32,
    #[serde(default)]
    pub coins: u32,
    #[serde(default)]
    pub display_type: DisplayType,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub controls: Vec<String>,
    /// BIOS machines this machine boots through.
    #[serde(default)]
    pub bios: Vec<String>,
    /// Referenced device machines (with or without ROMs).
    #[serde(default)]
    pub devices: Vec<String>,
    /// Auxiliary media (CHD) names, stored under a per-machine directory.
    #[serde(default)]
    pub aux_media: Vec<String>,
    /// Tags from the description. Derived, never cached.
    #[serde(skip)]
    pub tags: Vec<String>,
}

impl MachineRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Recompute `tags` from the description.
    pub fn refresh_tags(&mut self) {
        self.tags = extract_tags(&self.description);
    }
}

/// The unit of selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Dump(DumpRecord),
    Machine(MachineRecord),
}

impl Record {
    pub fn id(&self) -> &str {
        match self {
            Record::Dump(d) => &d.name,
            Record::Machine(m) => &m.name,
        }
    }

    pub fn parent(&self) -> Option<&str> {
        match self {
            Record::Dump(d) => d.parent.as_deref(),
            Record::Machine(m) => m.parent.as_deref(),
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Record::Dump(d) => &d.tags,
            Record::Machine(m) => &m.tags,
        }
    }

    pub fn machine(&self) -> Option<&MachineRecord> {
        match self {
            Record::Machine(m) => Some(m),
            Record::Dump(_) => None,
        }
    }

    pub fn is_parent(&self) -> bool {
        self.parent().is_none()
    }

    pub fn mode(&self) -> Mode {
        match self {
            Record::Dump(_) => Mode::Console,
            Record::Machine(_) => Mode::Arcade,
        }
    }
}
