use super::*;

use retro_curate_core::{ErrorKind, Polarity};

const SAMPLE: &str = r#"
[arcade]
machine_xml = "/data/mame.xml"
catver = "/data/catver.ini"

[year_bounds]
latest = 2020

[[filter]]
name = "snes"
source_dir = "/roms/snes"
dest_dir = "/out/snes"
dat = "/dats/snes.dat"
platform = "Super Nintendo"
up_tags = ["USA", "Europe"]
exclude_tags = ["Beta"]
main_filter = { Parents = "include" }

[filter.thumbs]
source = "/art/snes/box"
dest = "/out/snes/images"

[[filter]]
name = "vertical"
mode = "arcade"
source_dir = "/roms/mame"
dest_dir = "/out/mame"
orientation = "'Vertical'"
year = "year >= 1980 and year < 1990"
year_wildcard_expansion = true
main_filter = { bios = "exclude", coin_slot = "include" }
identifier_swap = { pacman = "puckman" }

[filter.aux]
source = "/chd/mame"
dest = "/out/mame-chd"
"#;

#[test]
fn test_parse_sample() {
    let config = Config::parse(SAMPLE).unwrap();
    assert_eq!(config.filters.len(), 2);
    assert_eq!(config.year_bounds.latest, 2020);
    assert_eq!(config.year_bounds.earliest, 1970);

    let snes = config.filter("snes").unwrap();
    assert_eq!(snes.mode, Mode::Console);
    assert_eq!(snes.rom_extensions, vec!["zip"]);
    assert_eq!(snes.spec.up_tags, vec!["USA", "Europe"]);
    assert_eq!(snes.spec.main_filter.get("Parents"), Some(&Polarity::Include));
    assert_eq!(
        snes.artwork_dirs(ArtworkKind::Thumb).unwrap().dest,
        PathBuf::from("/out/snes/images")
    );
    assert!(snes.artwork_dirs(ArtworkKind::Fanart).is_none());
    assert_eq!(snes.sidecar_dir(), Path::new("/out/snes"));

    let arcade = config.filter("vertical").unwrap();
    assert_eq!(arcade.mode, Mode::Arcade);
    assert!(arcade.spec.year_wildcard_expansion);
    assert_eq!(arcade.spec.identifier_swap.get("pacman").unwrap(), "puckman");
    assert!(arcade.aux.is_some());
}

#[test]
fn test_unknown_filter() {
    let config = Config::parse(SAMPLE).unwrap();
    let err = config.filter("n64").unwrap_err();
    assert!(matches!(err, LibError::UnknownFilter(_)));
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_arcade_sources_keep_explicit_cache() {
    let text = r#"
[arcade]
machine_xml = "/data/mame.xml"
reduced_cache = "/tmp/machines.json"
"#;
    let config = Config::parse(text).unwrap();
    let sources = config.arcade_sources().unwrap();
    assert_eq!(sources.reduced_cache, PathBuf::from("/tmp/machines.json"));
    assert!(sources.catver.is_none());
}

#[test]
fn test_arcade_filter_needs_arcade_section() {
    let text = r#"
[[filter]]
name = "mame"
mode = "arcade"
source_dir = "/roms/mame"
dest_dir = "/out/mame"
"#;
    let err = Config::parse(text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("[arcade]"));
}

#[test]
fn test_duplicate_names_rejected() {
    let text = r#"
[[filter]]
name = "a"
source_dir = "/x"
dest_dir = "/y"

[[filter]]
name = "a"
source_dir = "/x"
dest_dir = "/z"
"#;
    let err = Config::parse(text).unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn test_predicate_syntax_error_is_config_error() {
    let text = r#"
[arcade]
machine_xml = "/data/mame.xml"

[[filter]]
name = "broken"
mode = "arcade"
source_dir = "/x"
dest_dir = "/y"
buttons = "buttons >="
"#;
    let err = Config::parse(text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("broken"));
}

#[test]
fn test_console_filter_rejects_machine_flags() {
    let text = r#"
[[filter]]
name = "snes"
source_dir = "/x"
dest_dir = "/y"
main_filter = { BIOS = "exclude" }
"#;
    let err = Config::parse(text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_console_filter_rejects_aux() {
    let text = r#"
[[filter]]
name = "snes"
source_dir = "/x"
dest_dir = "/y"

[filter.aux]
source = "/a"
dest = "/b"
"#;
    let err = Config::parse(text).unwrap_err();
    assert!(err.to_string().contains("arcade"));
}

#[test]
fn test_same_source_and_dest_rejected() {
    let text = r#"
[[filter]]
name = "snes"
source_dir = "/x"
dest_dir = "/x"
"#;
    assert!(Config::parse(text).is_err());
}

#[test]
fn test_malformed_toml_is_config_error() {
    let err = Config::parse("[[filter]\nname=").unwrap_err();
    assert!(matches!(err, LibError::Toml(_)));
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(&dir.path().join("filters.toml")).unwrap_err();
    assert!(matches!(err, LibError::File { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_extension_set_normalised() {
    let text = r#"
[[filter]]
name = "psx"
source_dir = "/x"
dest_dir = "/y"
rom_extensions = [".CHD", "zip"]
"#;
    let config = Config::parse(text).unwrap();
    let exts = config.filter("psx").unwrap().rom_extension_set();
    assert!(exts.contains("chd"));
    assert!(exts.contains("zip"));
    assert_eq!(exts.len(), 2);
}

#[test]
fn test_misspelled_filter_key_rejected() {
    let text = r#"
[[filter]]
name = "snes"
source_dir = "/roms/snes"
dest_dir = "/out/snes"
up_tag = ["USA"]
"#;
    let err = Config::parse(text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    let msg = err.to_string();
    assert!(msg.contains("'snes'"), "{msg}");
    assert!(msg.contains("unknown key 'up_tag'"), "{msg}");
}

#[test]
fn test_polarity_accepts_capitalised_spelling() {
    let text = r#"
[[filter]]
name = "snes"
source_dir = "/roms/snes"
dest_dir = "/out/snes"
main_filter = { Parents = "Include", Clones = "Exclude" }
"#;
    let config = Config::parse(text).unwrap();
    let main = &config.filter("snes").unwrap().spec.main_filter;
    assert_eq!(main.get("Parents"), Some(&Polarity::Include));
    assert_eq!(main.get("Clones"), Some(&Polarity::Exclude));
}
