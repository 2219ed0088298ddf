use super::*;
use crate::record::{DisplayType, DumpRecord, MachineFlags, Orientation};
use crate::ErrorKind;

fn machine(name: &str, parent: Option<&str>) -> Record {
    let mut m = MachineRecord::new(name);
    m.parent = parent.map(String::from);
    m.flags = MachineFlags {
        is_runnable: true,
        has_roms: true,
        is_working: true,
        has_coin_slot: true,
        ..Default::default()
    };
    m.year = "1991".to_string();
    m.driver_file = "cps1.cpp".to_string();
    m.category = "Fighter / Versus".to_string();
    m.display_type = DisplayType::Raster;
    m.orientation = Orientation::Horizontal;
    m.controls = vec!["joy".to_string()];
    m.buttons = 6;
    m.players = 2;
    Record::Machine(m)
}

fn with_machine(record: Record, f: impl FnOnce(&mut MachineRecord)) -> Record {
    match record {
        Record::Machine(mut m) => {
            f(&mut m);
            Record::Machine(m)
        }
        other => other,
    }
}

fn arcade(spec: FilterSpec) -> CompiledFilter {
    CompiledFilter::compile(&spec, Mode::Arcade, YearBounds::default()).unwrap()
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// -- main filter --

#[test]
fn devices_are_always_excluded_in_arcade_mode() {
    let f = arcade(FilterSpec::default());
    let dev = with_machine(machine("z80", None), |m| m.flags.is_device = true);
    assert_eq!(f.evaluate(&dev).unwrap().verdict, Verdict::DeviceExcluded);
}

#[test]
fn include_parents_drops_clones() {
    let mut spec = FilterSpec::default();
    spec.main_filter.insert("Parents".to_string(), Polarity::Include);
    let f = arcade(spec);
    assert!(f.evaluate(&machine("sf2", None)).unwrap().verdict.is_eligible());
    assert_eq!(
        f.evaluate(&machine("sf2ua", Some("sf2"))).unwrap().verdict,
        Verdict::MainFilter(MainFlag::Parents, Polarity::Include)
    );
}

#[test]
fn exclude_flag_drops_matching_records() {
    let mut spec = FilterSpec::default();
    spec.main_filter.insert("Mechanical".to_string(), Polarity::Exclude);
    let f = arcade(spec);
    let mech = with_machine(machine("pinball", None), |m| m.flags.is_mechanical = true);
    assert_eq!(
        f.evaluate(&mech).unwrap().verdict,
        Verdict::MainFilter(MainFlag::Mechanical, Polarity::Exclude)
    );
}

#[test]
fn main_filter_flags_commute() {
    let mut a = FilterSpec::default();
    a.main_filter.insert("Parents".to_string(), Polarity::Include);
    a.main_filter.insert("working".to_string(), Polarity::Include);
    a.main_filter.insert("Samples".to_string(), Polarity::Exclude);
    let mut b = FilterSpec::default();
    b.main_filter.insert("parents".to_string(), Polarity::Include);
    b.main_filter.insert("Working".to_string(), Polarity::Include);
    b.main_filter.insert("samples".to_string(), Polarity::Exclude);
    let (fa, fb) = (arcade(a), arcade(b));

    let records = [
        machine("a", None),
        machine("b", Some("a")),
        with_machine(machine("c", None), |m| m.flags.is_working = false),
        with_machine(machine("d", None), |m| m.flags.has_samples = true),
        with_machine(machine("e", Some("a")), |m| m.flags.is_working = false),
    ];
    for r in &records {
        assert_eq!(
            fa.evaluate(r).unwrap().verdict.is_eligible(),
            fb.evaluate(r).unwrap().verdict.is_eligible(),
            "{}",
            r.id()
        );
    }
}

#[test]
fn flag_names_parse_loosely() {
    assert_eq!("coin_slot".parse::<MainFlag>().unwrap(), MainFlag::CoinSlot);
    assert_eq!("BIOS".parse::<MainFlag>().unwrap(), MainFlag::Bios);
    assert_eq!("software-lists".parse::<MainFlag>().unwrap(), MainFlag::SoftwareLists);
    assert!("Colour".parse::<MainFlag>().is_err());
}

#[test]
fn machine_only_flags_rejected_for_console() {
    let mut spec = FilterSpec::default();
    spec.main_filter.insert("Working".to_string(), Polarity::Include);
    let err = CompiledFilter::compile(&spec, Mode::Console, YearBounds::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let mut ok = FilterSpec::default();
    ok.main_filter.insert("Clones".to_string(), Polarity::Exclude);
    assert!(CompiledFilter::compile(&ok, Mode::Console, YearBounds::default()).is_ok());
}

#[test]
fn arcade_predicates_rejected_for_console() {
    let spec = FilterSpec {
        year: Some("year > 1990".to_string()),
        ..Default::default()
    };
    let err = CompiledFilter::compile(&spec, Mode::Console, YearBounds::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

// -- attribute predicates --

#[test]
fn syntax_error_is_a_config_error() {
    let spec = FilterSpec {
        driver: Some("'cps1.cpp' and".to_string()),
        ..Default::default()
    };
    let err = CompiledFilter::compile(&spec, Mode::Arcade, YearBounds::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("driver"));
}

#[test]
fn blank_predicates_are_ignored() {
    let spec = FilterSpec {
        category: Some("   ".to_string()),
        ..Default::default()
    };
    let f = arcade(spec);
    assert!(f.evaluate(&machine("sf2", None)).unwrap().verdict.is_eligible());
}

#[test]
fn driver_matches_with_or_without_extension() {
    let f = arcade(FilterSpec {
        driver: Some("'cps1'".to_string()),
        ..Default::default()
    });
    assert!(f.evaluate(&machine("sf2", None)).unwrap().verdict.is_eligible());
    let g = arcade(FilterSpec {
        driver: Some("not 'cps1.cpp'".to_string()),
        ..Default::default()
    });
    assert_eq!(
        g.evaluate(&machine("sf2", None)).unwrap().verdict,
        Verdict::Predicate("driver")
    );
}

#[test]
fn category_matches_components() {
    let f = arcade(FilterSpec {
        category: Some("'Fighter'".to_string()),
        ..Default::default()
    });
    assert!(f.evaluate(&machine("sf2", None)).unwrap().verdict.is_eligible());
    let g = arcade(FilterSpec {
        category: Some("'Fighter / Versus' and not 'Shooter'".to_string()),
        ..Default::default()
    });
    assert!(g.evaluate(&machine("sf2", None)).unwrap().verdict.is_eligible());
}

#[test]
fn display_orientation_and_controls() {
    let f = arcade(FilterSpec {
        display_type: Some("'Raster'".to_string()),
        orientation: Some("'Vertical'".to_string()),
        controls: Some("'joy'".to_string()),
        ..Default::default()
    });
    assert_eq!(
        f.evaluate(&machine("sf2", None)).unwrap().verdict,
        Verdict::Predicate("orientation")
    );
    let vert = with_machine(machine("1942", None), |m| m.orientation = Orientation::Vertical);
    assert!(f.evaluate(&vert).unwrap().verdict.is_eligible());
}

#[test]
fn all_predicates_must_hold() {
    let f = arcade(FilterSpec {
        buttons: Some("buttons <= 4".to_string()),
        players: Some("players >= 2".to_string()),
        ..Default::default()
    });
    assert_eq!(
        f.evaluate(&machine("sf2", None)).unwrap().verdict,
        Verdict::Predicate("buttons")
    );
    let four = with_machine(machine("ffight", None), |m| m.buttons = 2);
    assert!(f.evaluate(&four).unwrap().verdict.is_eligible());
}

#[test]
fn year_wildcard_expansion() {
    let spec = FilterSpec {
        year: Some("year >= 1995".to_string()),
        ..Default::default()
    };
    let wild = with_machine(machine("mystery", None), |m| m.year = "19??".to_string());

    let off = arcade(spec.clone());
    assert_eq!(off.evaluate(&wild).unwrap().verdict, Verdict::Predicate("year"));

    let on = arcade(FilterSpec {
        year_wildcard_expansion: true,
        ..spec
    });
    assert!(on.evaluate(&wild).unwrap().verdict.is_eligible());
}

#[test]
fn wildcard_outside_predicate_still_dropped() {
    let f = arcade(FilterSpec {
        year: Some("year >= 2000".to_string()),
        year_wildcard_expansion: true,
        ..Default::default()
    });
    let wild = with_machine(machine("old", None), |m| m.year = "197?".to_string());
    assert_eq!(f.evaluate(&wild).unwrap().verdict, Verdict::Predicate("year"));
}

#[test]
fn uncertain_year_is_literal() {
    let f = arcade(FilterSpec {
        year: Some("year == 1998".to_string()),
        ..Default::default()
    });
    let uncertain = with_machine(machine("m", None), |m| m.year = "1998?".to_string());
    assert!(f.evaluate(&uncertain).unwrap().verdict.is_eligible());
}

#[test]
fn malformed_year_is_a_metadata_error() {
    let f = arcade(FilterSpec {
        year: Some("year > 0".to_string()),
        ..Default::default()
    });
    let bad = with_machine(machine("m", None), |m| m.year = "19x5".to_string());
    assert_eq!(f.evaluate(&bad).unwrap_err().kind(), ErrorKind::Metadata);
}

// -- tag filter --

#[test]
fn exclude_and_include_keeps_record() {
    let spec = FilterSpec {
        include_tags: strings(&["USA"]),
        exclude_tags: strings(&["Beta"]),
        ..Default::default()
    };
    let f = CompiledFilter::compile(&spec, Mode::Console, YearBounds::default()).unwrap();
    let both = Record::Dump(DumpRecord::new("Demo (USA, Beta)", None));
    let excluded = Record::Dump(DumpRecord::new("Demo (Europe, Beta)", None));
    let plain = Record::Dump(DumpRecord::new("Demo (Europe)", None));
    assert!(f.evaluate(&both).unwrap().verdict.is_eligible());
    assert_eq!(f.evaluate(&excluded).unwrap().verdict, Verdict::TagExcluded);
    assert!(f.evaluate(&plain).unwrap().verdict.is_eligible());
}

#[test]
fn include_tags_alone_do_not_restrict() {
    let spec = FilterSpec {
        include_tags: strings(&["USA"]),
        ..Default::default()
    };
    let f = CompiledFilter::compile(&spec, Mode::Console, YearBounds::default()).unwrap();
    assert!(f.passes_tag_filter(&strings(&["Japan"])));
}

#[test]
fn has_any_tag_semantics() {
    assert!(has_any_tag(&strings(&["a", "b"]), &strings(&["b"])));
    assert!(!has_any_tag(&strings(&["a"]), &strings(&["b"])));
    assert!(!has_any_tag(&[], &strings(&["b"])));
}

#[test]
fn evaluation_carries_score() {
    let spec = FilterSpec {
        up_tags: strings(&["Rev 1", "USA"]),
        ..Default::default()
    };
    let f = CompiledFilter::compile(&spec, Mode::Console, YearBounds::default()).unwrap();
    let r = Record::Dump(DumpRecord::new("G (USA, Rev 1)", None));
    assert_eq!(f.evaluate(&r).unwrap().score, 3);
}
