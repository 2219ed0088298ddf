use std::collections::BTreeMap;

use super::*;
use crate::filter::{FilterSpec, Polarity};
use crate::record::{DumpRecord, MachineFlags, MachineRecord};
use crate::year::YearBounds;
use crate::ErrorKind;

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Console universe from `(name, parent)` pairs in loader order.
fn console(records: &[(&str, Option<&str>)]) -> Universe {
    let dumps = records
        .iter()
        .map(|(name, parent)| DumpRecord::new(*name, parent.map(String::from)))
        .collect();
    Universe::from_dumps(dumps, "test").unwrap()
}

fn compile(spec: FilterSpec, mode: Mode) -> CompiledFilter {
    CompiledFilter::compile(&spec, mode, YearBounds::default()).unwrap()
}

fn inventory(ids: &[&str]) -> OnDiskInventory {
    ids.iter().copied().collect()
}

fn no_art() -> BTreeMap<ArtworkKind, OnDiskInventory> {
    BTreeMap::new()
}

fn run(universe: &Universe, filter: &CompiledFilter, roms: &[&str]) -> SelectionPlan {
    Selector::new(universe, filter)
        .unwrap()
        .select(&inventory(roms), &no_art())
        .unwrap()
}

fn picked(plan: &SelectionPlan) -> Vec<&str> {
    plan.primaries.iter().map(|e| e.destination.as_str()).collect()
}

fn two_regions() -> Universe {
    console(&[
        ("Game (USA)", None),
        ("Game (Europe)", Some("Game (USA)")),
    ])
}

// -- end-to-end scenarios --

#[test]
fn basic_preference() {
    let u = two_regions();
    let f = compile(
        FilterSpec {
            up_tags: strings(&["USA"]),
            ..Default::default()
        },
        Mode::Console,
    );
    let plan = run(&u, &f, &["Game (USA)", "Game (Europe)"]);
    assert_eq!(picked(&plan), vec!["Game (USA)"]);
    assert!(plan.warnings.is_empty());
}

#[test]
fn preference_loses_to_availability() {
    let u = two_regions();
    let f = compile(
        FilterSpec {
            up_tags: strings(&["USA"]),
            ..Default::default()
        },
        Mode::Console,
    );
    let plan = run(&u, &f, &["Game (Europe)"]);
    assert_eq!(picked(&plan), vec!["Game (Europe)"]);
    assert_eq!(
        plan.warnings,
        vec![InventoryWarning::PreferredMissing {
            preferred: "Game (USA)".to_string(),
            fallback: Some("Game (Europe)".to_string()),
        }]
    );
}

#[test]
fn exclude_and_include_retention() {
    let u = console(&[("Demo (USA, Beta)", None)]);
    let f = compile(
        FilterSpec {
            exclude_tags: strings(&["Beta"]),
            include_tags: strings(&["USA"]),
            ..Default::default()
        },
        Mode::Console,
    );
    let plan = run(&u, &f, &["Demo (USA, Beta)"]);
    assert_eq!(picked(&plan), vec!["Demo (USA, Beta)"]);
}

#[test]
fn weighted_tag_order() {
    let u = console(&[("G (USA, Rev 1)", None), ("G (USA)", Some("G (USA, Rev 1)"))]);
    let f = compile(
        FilterSpec {
            up_tags: strings(&["Rev 1", "USA"]),
            ..Default::default()
        },
        Mode::Console,
    );
    let sel = Selector::new(&u, &f).unwrap();
    let ranked = sel.rank().unwrap();
    let scores: Vec<(&str, i64)> = ranked[0]
        .members
        .iter()
        .map(|m| (m.id.as_str(), m.score))
        .collect();
    assert_eq!(scores, vec![("G (USA, Rev 1)", 3), ("G (USA)", 1)]);

    let plan = run(&u, &f, &["G (USA, Rev 1)", "G (USA)"]);
    assert_eq!(picked(&plan), vec!["G (USA, Rev 1)"]);
}

fn arcade_machine(name: &str, parent: Option<&str>, year: &str) -> MachineRecord {
    let mut m = MachineRecord::new(name);
    m.parent = parent.map(String::from);
    m.year = year.to_string();
    m.flags = MachineFlags {
        is_runnable: true,
        has_roms: true,
        is_working: true,
        ..Default::default()
    };
    m
}

#[test]
fn year_wildcard_on_arcade() {
    let u = Universe::from_machines(vec![arcade_machine("mystery", None, "19??")], "test").unwrap();
    let spec = FilterSpec {
        year: Some("year >= 1995".to_string()),
        ..Default::default()
    };

    let off = compile(spec.clone(), Mode::Arcade);
    assert!(run(&u, &off, &["mystery"]).primaries.is_empty());

    let on = compile(
        FilterSpec {
            year_wildcard_expansion: true,
            ..spec
        },
        Mode::Arcade,
    );
    assert_eq!(picked(&run(&u, &on, &["mystery"])), vec!["mystery"]);
}

fn neogeo_universe() -> Universe {
    let mut neogeo = arcade_machine("neogeo", None, "1990");
    neogeo.flags.is_bios = true;
    neogeo.flags.is_runnable = false;
    let mut mslug = arcade_machine("mslug", None, "1996");
    mslug.bios = vec!["neogeo".to_string()];
    let mut mslugx = arcade_machine("mslugx", Some("mslug"), "1999");
    mslugx.bios = vec!["neogeo".to_string()];
    Universe::from_machines(vec![neogeo, mslug, mslugx], "test").unwrap()
}

#[test]
fn dependency_pull_in() {
    let u = neogeo_universe();
    let mut spec = FilterSpec::default();
    spec.main_filter.insert("Parents".to_string(), Polarity::Include);
    spec.main_filter.insert("BIOS".to_string(), Polarity::Exclude);
    let f = compile(spec, Mode::Arcade);

    let plan = run(&u, &f, &["neogeo", "mslug", "mslugx"]);
    assert_eq!(picked(&plan), vec!["mslug"]);
    assert!(plan.dependencies.contains("neogeo"));
    assert!(plan.is_selected("neogeo"));
    plan.verify(&u).unwrap();
}

#[test]
fn dependency_absent_from_disk_is_a_warning() {
    let u = neogeo_universe();
    let mut spec = FilterSpec::default();
    spec.main_filter.insert("BIOS".to_string(), Polarity::Exclude);
    let f = compile(spec, Mode::Arcade);

    let plan = run(&u, &f, &["mslug"]);
    assert!(plan.dependencies.contains("neogeo"));
    assert!(plan.warnings.contains(&InventoryWarning::DependencyNotOnDisk {
        machine: "mslug".to_string(),
        dependency: "neogeo".to_string(),
    }));
}

#[test]
fn unresolvable_dependency_aborts() {
    let mut m = arcade_machine("mslug", None, "1996");
    m.bios = vec!["neogeo".to_string()];
    let u = Universe::from_machines(vec![m], "test").unwrap();
    let f = compile(FilterSpec::default(), Mode::Arcade);
    let err = Selector::new(&u, &f)
        .unwrap()
        .select(&inventory(&["mslug"]), &no_art())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DependencyMissing);
}

#[test]
fn aux_media_follow_primaries() {
    let mut game = arcade_machine("kinst", None, "1994");
    game.aux_media = vec!["kinst".to_string()];
    let mut unpicked = arcade_machine("other", None, "1994");
    unpicked.aux_media = vec!["other".to_string()];
    let u = Universe::from_machines(vec![game, unpicked], "test").unwrap();
    let f = compile(FilterSpec::default(), Mode::Arcade);
    let plan = run(&u, &f, &["kinst"]);
    assert_eq!(plan.aux_media.len(), 1);
    assert_eq!(plan.aux_media["kinst"], vec!["kinst".to_string()]);
}

// -- artwork --

#[test]
fn artwork_substitutes_from_class() {
    let u = two_regions();
    let f = compile(
        FilterSpec {
            up_tags: strings(&["Europe"]),
            ..Default::default()
        },
        Mode::Console,
    );
    let mut art = BTreeMap::new();
    art.insert(ArtworkKind::Thumb, inventory(&["Game (USA)"]));
    art.insert(ArtworkKind::Fanart, inventory(&[]));
    let plan = Selector::new(&u, &f)
        .unwrap()
        .select(&inventory(&["Game (USA)", "Game (Europe)"]), &art)
        .unwrap();

    assert_eq!(picked(&plan), vec!["Game (Europe)"]);
    let thumbs: Vec<_> = plan.artwork_pairs(ArtworkKind::Thumb).collect();
    assert_eq!(thumbs, vec![("Game (Europe)", "Game (USA)")]);
    assert_eq!(plan.missing_artwork[&ArtworkKind::Fanart], vec!["Game (Europe)"]);
}

#[test]
fn artwork_does_not_change_the_pick() {
    let u = two_regions();
    let f = compile(
        FilterSpec {
            up_tags: strings(&["USA"]),
            ..Default::default()
        },
        Mode::Console,
    );
    let mut art = BTreeMap::new();
    art.insert(ArtworkKind::Thumb, inventory(&["Game (Europe)"]));
    let sel = Selector::new(&u, &f).unwrap();
    let roms = inventory(&["Game (USA)", "Game (Europe)"]);
    let with_art = sel.select(&roms, &art).unwrap();
    let without = sel.select(&roms, &no_art()).unwrap();
    assert_eq!(with_art.primaries, without.primaries);
}

// -- identifier swap --

#[test]
fn identifier_swap_sources_other_archive() {
    let u = two_regions();
    let mut spec = FilterSpec {
        up_tags: strings(&["USA"]),
        ..Default::default()
    };
    spec.identifier_swap
        .insert("Game (USA)".to_string(), "Game (Europe)".to_string());
    let f = compile(spec, Mode::Console);

    let plan = run(&u, &f, &["Game (Europe)"]);
    assert_eq!(
        plan.primaries,
        vec![PlanEntry {
            source: "Game (Europe)".to_string(),
            destination: "Game (USA)".to_string(),
        }]
    );
    assert!(plan.warnings.is_empty());
}

#[test]
fn swapped_in_bios_still_lands_as_dependency() {
    let mut neogeo = arcade_machine("neogeo", None, "1990");
    neogeo.flags.is_bios = true;
    neogeo.flags.is_runnable = false;
    let mut mslug = arcade_machine("mslug", None, "1996");
    mslug.bios = vec!["neogeo".to_string()];
    let aes = arcade_machine("aes", None, "1990");
    let u = Universe::from_machines(vec![neogeo, mslug, aes], "test").unwrap();

    let mut spec = FilterSpec::default();
    spec.main_filter.insert("BIOS".to_string(), Polarity::Exclude);
    spec.identifier_swap
        .insert("aes".to_string(), "neogeo".to_string());
    let f = compile(spec, Mode::Arcade);

    let plan = run(&u, &f, &["neogeo", "mslug"]);
    let destinations: Vec<_> = plan.primaries.iter().map(|e| e.destination.as_str()).collect();
    assert_eq!(destinations, vec!["aes", "mslug"]);
    assert!(plan.dependencies.contains("neogeo"));
    assert!(plan.is_selected("neogeo"));
}

#[test]
fn identifier_swap_to_unknown_record_is_a_config_error() {
    let u = two_regions();
    let mut spec = FilterSpec::default();
    spec.identifier_swap
        .insert("Game (USA)".to_string(), "Game (Japan)".to_string());
    let f = compile(spec, Mode::Console);
    let err = Selector::new(&u, &f).err().map(|e| e.kind());
    assert_eq!(err, Some(ErrorKind::Config));
}

// -- properties --

#[test]
fn mode_mismatch_is_internal() {
    let u = two_regions();
    let f = compile(FilterSpec::default(), Mode::Arcade);
    let err = Selector::new(&u, &f).err().map(|e| e.kind());
    assert_eq!(err, Some(ErrorKind::Internal));
}

#[test]
fn class_with_nothing_on_disk_contributes_nothing() {
    let u = two_regions();
    let f = compile(FilterSpec::default(), Mode::Console);
    let plan = run(&u, &f, &[]);
    assert!(plan.is_empty());
    assert_eq!(
        plan.warnings,
        vec![InventoryWarning::PreferredMissing {
            preferred: "Game (USA)".to_string(),
            fallback: None,
        }]
    );
}

fn four_member_universe() -> Universe {
    console(&[
        ("Quest (USA)", None),
        ("Quest (Europe)", Some("Quest (USA)")),
        ("Quest (Japan) (Beta)", Some("Quest (USA)")),
        ("Quest (USA, Europe) (Rev 1)", Some("Quest (USA)")),
        ("Other (Japan)", None),
        ("Other (World)", Some("Other (Japan)")),
    ])
}

fn ranking_filter() -> CompiledFilter {
    compile(
        FilterSpec {
            up_tags: strings(&["Rev 1", "USA", "World"]),
            down_tags: strings(&["Beta", "Japan"]),
            exclude_tags: strings(&["Beta"]),
            ..Default::default()
        },
        Mode::Console,
    )
}

#[test]
fn selection_is_deterministic() {
    let u = four_member_universe();
    let f = ranking_filter();
    let sel = Selector::new(&u, &f).unwrap();
    let roms: OnDiskInventory = u.iter().map(|r| r.id().to_string()).collect();
    assert_eq!(sel.select(&roms, &no_art()).unwrap(), sel.select(&roms, &no_art()).unwrap());
}

#[test]
fn pick_is_the_best_available_in_every_inventory() {
    let u = four_member_universe();
    let f = ranking_filter();
    let sel = Selector::new(&u, &f).unwrap();
    let ids: Vec<&str> = u.iter().map(|r| r.id()).collect();

    // every subset of the universe as the on-disk inventory
    for mask in 0u32..(1 << ids.len()) {
        let on_disk: Vec<&str> = ids
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, id)| *id)
            .collect();
        let roms = inventory(&on_disk);
        let plan = sel.select(&roms, &no_art()).unwrap();
        plan.verify(&u).unwrap();

        for entry in &plan.primaries {
            let class = u.class_of(&entry.destination).unwrap();
            let best = f.evaluate(u.get(&entry.destination).unwrap()).unwrap().score;
            for other in class.members() {
                let eval = f.evaluate(u.get(other).unwrap()).unwrap();
                if roms.contains(other) && eval.verdict.is_eligible() {
                    assert!(best >= eval.score, "mask {mask:b}: {other} beats {}", entry.destination);
                }
            }
        }
    }
}

#[test]
fn excluded_members_are_never_picked() {
    let u = four_member_universe();
    let f = ranking_filter();
    let plan = run(&u, &f, &["Quest (Japan) (Beta)"]);
    assert!(plan.primaries.is_empty());
}

#[test]
fn ties_break_by_class_order() {
    let u = console(&[("Tie (Europe)", None), ("Tie (Germany)", Some("Tie (Europe)"))]);
    let f = compile(FilterSpec::default(), Mode::Console);
    let plan = run(&u, &f, &["Tie (Germany)", "Tie (Europe)"]);
    assert_eq!(picked(&plan), vec!["Tie (Europe)"]);
}

#[test]
fn primaries_sorted_by_destination() {
    let u = console(&[("Zeta (USA)", None), ("Alpha (USA)", None), ("Mu (USA)", None)]);
    let f = compile(FilterSpec::default(), Mode::Console);
    let plan = run(&u, &f, &["Zeta (USA)", "Alpha (USA)", "Mu (USA)"]);
    assert_eq!(picked(&plan), vec!["Alpha (USA)", "Mu (USA)", "Zeta (USA)"]);
}

#[test]
fn devices_are_not_primaries() {
    let mut dev = arcade_machine("ym2151", None, "");
    dev.flags.is_device = true;
    let game = arcade_machine("sf2", None, "1991");
    let u = Universe::from_machines(vec![dev, game], "test").unwrap();
    let f = compile(FilterSpec::default(), Mode::Arcade);
    let plan = run(&u, &f, &["ym2151", "sf2"]);
    assert_eq!(picked(&plan), vec!["sf2"]);
}

#[test]
fn verify_rejects_two_picks_from_one_class() {
    let u = two_regions();
    let plan = SelectionPlan {
        primaries: vec![
            PlanEntry::identity("Game (Europe)"),
            PlanEntry::identity("Game (USA)"),
        ],
        ..Default::default()
    };
    assert_eq!(plan.verify(&u).unwrap_err().kind(), ErrorKind::Internal);
}
