//! Streaming reader for the upstream machine database (`-listxml` output).
//!
//! Only the attributes the filters and the dependency resolver consume are
//! retained; ROM checksums, chips, DIP switches and the like are skipped.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use retro_curate_core::{DisplayType, MachineRecord, Orientation};

use crate::error::DatError;

/// Machines emitted between progress callbacks.
const PROGRESS_INTERVAL: usize = 2000;

/// Parsed machine database.
#[derive(Debug, Clone, Default)]
pub struct MachineXml {
    /// `build` attribute of the root element.
    pub build: String,
    pub machines: Vec<MachineRecord>,
}

/// Raw attributes needed after the whole file is read.
#[derive(Debug, Default)]
struct Pending {
    machine: MachineRecord,
    rom_of: Option<String>,
    sample_of: bool,
    has_display: bool,
    has_driver: bool,
}

/// Parse a machine database, calling `progress` with the running machine
/// count every few thousand machines.
pub fn parse_machine_xml<R: BufRead>(
    reader: R,
    progress: &dyn Fn(usize),
) -> Result<MachineXml, DatError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut build: Option<String> = None;
    let mut pending: Vec<Pending> = Vec::new();
    let mut current: Option<Pending> = None;
    let mut current_tag = String::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag.as_str() {
                    "mame" | "datafile" if build.is_none() => build = Some(root_build(e)?),
                    "machine" | "game" => current = Some(machine_start(e)?),
                    _ => {
                        if let Some(ref mut p) = current {
                            machine_child(p, e)?;
                        }
                    }
                }
                current_tag = tag;
            }
            Event::Empty(ref e) => match e.name().as_ref() {
                b"machine" | b"game" => {
                    pending.push(machine_start(e)?);
                    report(pending.len(), progress);
                }
                _ => {
                    if let Some(ref mut p) = current {
                        machine_child(p, e)?;
                    }
                }
            },
            Event::Text(ref e) => {
                if let Some(ref mut p) = current {
                    let text = e.unescape()?.to_string();
                    match current_tag.as_str() {
                        "description" => p.machine.description = text,
                        "year" => p.machine.year = text,
                        "manufacturer" => p.machine.manufacturer = text,
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => {
                if matches!(e.name().as_ref(), b"machine" | b"game") {
                    if let Some(p) = current.take() {
                        pending.push(p);
                        report(pending.len(), progress);
                    }
                }
                current_tag.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let Some(build) = build else {
        return Err(DatError::invalid_machine_xml(
            "missing <mame> root element",
        ));
    };
    if pending.is_empty() {
        return Err(DatError::invalid_machine_xml("no machines found"));
    }

    Ok(MachineXml {
        build,
        machines: finish(pending),
    })
}

/// Parse a machine database from a file path.
pub fn parse_machine_xml_file(
    path: &Path,
    progress: &dyn Fn(usize),
) -> Result<MachineXml, DatError> {
    let file = std::fs::File::open(path).map_err(|e| DatError::file(path, e))?;
    parse_machine_xml(std::io::BufReader::new(file), progress)
}

/// Read only the `build` attribute of the root element.
///
/// Stops at the first start tag, so this is cheap even for very large files.
pub fn read_build(path: &Path) -> Result<String, DatError> {
    let file = std::fs::File::open(path).map_err(|e| DatError::file(path, e))?;
    let mut xml = Reader::from_reader(std::io::BufReader::new(file));
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => {
                return match e.name().as_ref() {
                    b"mame" | b"datafile" => root_build(e),
                    _ => Err(DatError::invalid_machine_xml(format!(
                        "unexpected root element in {}",
                        path.display()
                    ))),
                };
            }
            Event::Eof => {
                return Err(DatError::invalid_machine_xml(format!(
                    "{} is empty",
                    path.display()
                )));
            }
            _ => {}
        }
        buf.clear();
    }
}

fn report(count: usize, progress: &dyn Fn(usize)) {
    if count % PROGRESS_INTERVAL == 0 {
        progress(count);
    }
}

fn root_build(e: &BytesStart<'_>) -> Result<String, DatError> {
    Ok(attr(e, b"build")?.unwrap_or_default())
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, DatError> {
    for a in e.attributes() {
        let a = a?;
        if a.key.as_ref() == key {
            return Ok(Some(a.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

fn yes(value: &str) -> bool {
    value.eq_ignore_ascii_case("yes")
}

fn machine_start(e: &BytesStart<'_>) -> Result<Pending, DatError> {
    let mut p = Pending::default();
    let m = &mut p.machine;
    m.flags.is_runnable = true;

    for a in e.attributes() {
        let a = a?;
        let value = a.unescape_value()?.to_string();
        match a.key.as_ref() {
            b"name" => m.name = value,
            b"cloneof" => m.parent = Some(value).filter(|v| !v.is_empty()),
            b"romof" => p.rom_of = Some(value).filter(|v| !v.is_empty()),
            b"sampleof" => p.sample_of = true,
            b"sourcefile" => {
                // older builds include the source directory
                m.driver_file = value.rsplit('/').next().unwrap_or_default().to_string();
            }
            b"isbios" => m.flags.is_bios = yes(&value),
            b"isdevice" => m.flags.is_device = yes(&value),
            b"ismechanical" => m.flags.is_mechanical = yes(&value),
            b"runnable" => m.flags.is_runnable = !value.eq_ignore_ascii_case("no"),
            _ => {}
        }
    }

    if m.name.is_empty() {
        return Err(DatError::invalid_machine_xml("machine without a name"));
    }
    Ok(p)
}

fn machine_child(p: &mut Pending, e: &BytesStart<'_>) -> Result<(), DatError> {
    let m = &mut p.machine;
    match e.name().as_ref() {
        b"rom" => {
            let nodump = attr(e, b"status")?.is_some_and(|s| s == "nodump");
            if !nodump {
                m.flags.has_roms = true;
            }
        }
        b"disk" => {
            if let Some(name) = attr(e, b"name")? {
                if !m.aux_media.contains(&name) {
                    m.aux_media.push(name);
                }
            }
        }
        b"device_ref" => {
            if let Some(name) = attr(e, b"name")? {
                if name != m.name && !m.devices.contains(&name) {
                    m.devices.push(name);
                }
            }
        }
        b"sample" => m.flags.has_samples = true,
        b"softwarelist" => m.flags.has_software_lists = true,
        b"display" => {
            // the first screen decides
            if !p.has_display {
                p.has_display = true;
                m.display_type = DisplayType::from_xml(&attr(e, b"type")?.unwrap_or_default());
                let rotate = attr(e, b"rotate")?
                    .and_then(|r| r.parse::<u32>().ok())
                    .unwrap_or(0);
                m.orientation = Orientation::from_rotation(rotate);
            }
        }
        b"input" => {
            m.players = parse_u32(attr(e, b"players")?);
            m.coins = parse_u32(attr(e, b"coins")?);
            m.flags.has_coin_slot = m.coins > 0;
        }
        b"control" => {
            if let Some(kind) = attr(e, b"type")? {
                if !m.controls.contains(&kind) {
                    m.controls.push(kind);
                }
            }
            m.buttons = m.buttons.max(parse_u32(attr(e, b"buttons")?));
        }
        b"driver" => {
            p.has_driver = true;
            let status = attr(e, b"status")?.unwrap_or_default();
            m.flags.is_working = status != "preliminary";
        }
        _ => {}
    }
    Ok(())
}

fn parse_u32(value: Option<String>) -> u32 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Resolve cross-machine attributes once every machine is known.
fn finish(pending: Vec<Pending>) -> Vec<MachineRecord> {
    let rom_of: HashMap<String, String> = pending
        .iter()
        .filter_map(|p| Some((p.machine.name.clone(), p.rom_of.clone()?)))
        .collect();
    let bios: HashMap<String, bool> = pending
        .iter()
        .map(|p| (p.machine.name.clone(), p.machine.flags.is_bios))
        .collect();

    pending
        .into_iter()
        .map(|p| {
            let mut m = p.machine;
            if p.sample_of {
                m.flags.has_samples = true;
            }
            if !p.has_driver {
                m.flags.is_working = false;
            }
            if let Some(b) = bios_of(&m.name, &rom_of, &bios) {
                m.bios = vec![b];
            }
            m
        })
        .collect()
}

/// Follow the `romof` chain to the first BIOS machine.
fn bios_of(
    name: &str,
    rom_of: &HashMap<String, String>,
    bios: &HashMap<String, bool>,
) -> Option<String> {
    let mut cursor = rom_of.get(name)?;
    // chains are two links at most in practice; the bound guards malformed input
    for _ in 0..8 {
        if bios.get(cursor).copied().unwrap_or(false) {
            return (cursor != name).then(|| cursor.clone());
        }
        cursor = rom_of.get(cursor)?;
    }
    None
}

#[cfg(test)]
#[path = "tests/mame_tests.rs"]
mod tests;
