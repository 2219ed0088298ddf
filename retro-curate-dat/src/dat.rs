use std::io::{BufRead, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use retro_curate_core::{DumpRecord, Universe};

use crate::error::DatError;

/// A parsed parent/clone DAT file (Logiqx XML or ClrMamePro).
#[derive(Debug, Clone, Default)]
pub struct DatFile {
    pub name: String,
    pub version: String,
    pub games: Vec<DatGame>,
}

/// A single game entry from a DAT file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatGame {
    pub name: String,
    /// Parent game, when this entry is a clone.
    pub clone_of: Option<String>,
}

impl DatFile {
    /// Build a console universe with one record per game, in DAT order.
    pub fn into_universe(self) -> Result<Universe, DatError> {
        let source = if self.version.is_empty() {
            self.name
        } else {
            format!("{} ({})", self.name, self.version)
        };
        let dumps = self
            .games
            .into_iter()
            .map(|g| DumpRecord::new(g.name, g.clone_of))
            .collect();
        Ok(Universe::from_dumps(dumps, source)?)
    }
}

/// Parse a DAT file, auto-detecting format (XML or ClrMamePro).
pub fn parse_dat<R: BufRead>(mut reader: R) -> Result<DatFile, DatError> {
    // Peek at the first non-whitespace content to detect format
    let mut first_bytes = Vec::new();
    let mut buf = [0u8; 1];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Err(DatError::invalid_dat("Empty DAT file"));
        }
        first_bytes.push(buf[0]);
        if !buf[0].is_ascii_whitespace() {
            break;
        }
    }

    let chain = std::io::Cursor::new(first_bytes).chain(reader);
    let buffered = std::io::BufReader::new(chain);

    if buf[0] == b'<' {
        parse_xml(buffered)
    } else {
        parse_clrmamepro(buffered)
    }
}

/// Parse a DAT file from a file path.
pub fn parse_dat_file(path: &Path) -> Result<DatFile, DatError> {
    let file = std::fs::File::open(path).map_err(|e| DatError::file(path, e))?;
    let dat = parse_dat(std::io::BufReader::new(file))?;
    log::debug!(
        "Parsed {} ({} games) from {}",
        dat.name,
        dat.games.len(),
        path.display()
    );
    Ok(dat)
}

/// Parse a DAT file and build its universe.
pub fn load_dat_universe(path: &Path) -> Result<Universe, DatError> {
    parse_dat_file(path)?.into_universe()
}

// ---------------------------------------------------------------------------
// Logiqx XML parser
// ---------------------------------------------------------------------------

fn parse_xml<R: BufRead>(reader: R) -> Result<DatFile, DatError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut dat = DatFile::default();

    let mut in_header = false;
    let mut current_tag = String::new();
    let mut current_game: Option<DatGame> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag_name.as_str() {
                    "header" => in_header = true,
                    // MAME-derived DATs use <machine>
                    "game" | "machine" => current_game = Some(parse_game_attributes(e)?),
                    _ => current_tag = tag_name,
                }
            }
            Event::Empty(ref e) => {
                let tag_name = e.name();
                if matches!(tag_name.as_ref(), b"game" | b"machine") {
                    dat.games.push(parse_game_attributes(e)?);
                }
            }
            Event::Text(ref e) => {
                let text = e.unescape()?.to_string();
                if in_header {
                    match current_tag.as_str() {
                        "name" => dat.name = text,
                        "version" => dat.version = text,
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag_name.as_str() {
                    "header" => in_header = false,
                    "game" | "machine" => {
                        if let Some(game) = current_game.take() {
                            dat.games.push(game);
                        }
                    }
                    _ => current_tag.clear(),
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if dat.name.is_empty() && dat.games.is_empty() {
        return Err(DatError::invalid_dat(
            "No header or games found in XML DAT file",
        ));
    }

    Ok(dat)
}

fn parse_game_attributes(e: &quick_xml::events::BytesStart<'_>) -> Result<DatGame, DatError> {
    let mut game = DatGame::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.to_string();
        match attr.key.as_ref() {
            b"name" => game.name = value,
            b"cloneof" => game.clone_of = Some(value).filter(|v| !v.is_empty()),
            _ => {}
        }
    }
    if game.name.is_empty() {
        return Err(DatError::invalid_dat("game entry without a name"));
    }
    Ok(game)
}

// ---------------------------------------------------------------------------
// ClrMamePro DAT parser
// ---------------------------------------------------------------------------

/// Parse a ClrMamePro format DAT file.
///
/// Format:
/// ```text
/// clrmamepro (
///     name "System Name"
///     version 20240101-000000
/// )
///
/// game (
///     name "Game Name (Region)"
///     cloneof "Game Name (USA)"
///     rom ( name "Game Name (Region).ext" size 12345 crc AABBCCDD )
/// )
/// ```
fn parse_clrmamepro<R: BufRead>(reader: R) -> Result<DatFile, DatError> {
    let mut dat = DatFile::default();

    let mut in_block: Option<String> = None; // "clrmamepro" or "game"
    let mut current_game: Option<DatGame> = None;

    for line_result in reader.lines() {
        let line = line_result?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let Some(block_type) = in_block.as_deref() else {
            if let Some(block_type) = detect_block_start(trimmed) {
                if block_type == "game" {
                    current_game = Some(DatGame::default());
                }
                in_block = Some(block_type);
            }
            continue;
        };

        if trimmed == ")" {
            if block_type == "game" {
                if let Some(game) = current_game.take() {
                    if game.name.is_empty() {
                        return Err(DatError::invalid_dat("game block without a name"));
                    }
                    dat.games.push(game);
                }
            }
            in_block = None;
            continue;
        }

        let Some((key, value)) = parse_kv(trimmed) else {
            continue;
        };
        match block_type {
            "clrmamepro" => match key.as_str() {
                "name" => dat.name = value,
                "version" => dat.version = value,
                _ => {}
            },
            "game" => {
                if let Some(ref mut game) = current_game {
                    match key.as_str() {
                        "name" => game.name = value,
                        "cloneof" => game.clone_of = Some(value).filter(|v| !v.is_empty()),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    if dat.name.is_empty() && dat.games.is_empty() {
        return Err(DatError::invalid_dat(
            "No header or games found in ClrMamePro DAT file",
        ));
    }

    Ok(dat)
}

/// Detect a block start like `clrmamepro (` or `game (`.
fn detect_block_start(line: &str) -> Option<String> {
    let block_type = line.trim_end().strip_suffix('(')?.trim();
    if !block_type.is_empty() && block_type.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Some(block_type.to_lowercase());
    }
    None
}

/// Parse a key-value line like `name "Some Value"` or `version 20240101`.
fn parse_kv(line: &str) -> Option<(String, String)> {
    let mut parts = line.trim().splitn(2, |c: char| c.is_ascii_whitespace());
    let key = parts.next()?.trim().to_string();
    let raw_value = parts.next()?.trim();

    let value = raw_value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw_value)
        .to_string();

    Some((key, value))
}

#[cfg(test)]
#[path = "tests/dat_tests.rs"]
mod tests;
