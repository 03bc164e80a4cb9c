use super::*;
use crate::loader::{BUILTIN_BOARDS, BUILTIN_WINGS};

fn builtin_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    let boards = catalog.load_source(BUILTIN_BOARDS, BoardKind::Board).unwrap();
    assert!(boards.diagnostic.is_none());
    let wings = catalog.load_source(BUILTIN_WINGS, BoardKind::Wing).unwrap();
    assert!(wings.diagnostic.is_none());
    catalog
}

fn physical_names(catalog: &Catalog, board: BoardId, bus: &str) -> Vec<String> {
    let bus = catalog.bus_by_name(board, bus).unwrap();
    (0 .. catalog.bus(bus).pin_count())
        .map(|index| {
            catalog.pin_view(PinRef { slot: bus, index })
                .physical_name()
                .unwrap_or("")
                .to_string()
        })
        .collect()
}

fn collect(range: BusRange) -> Vec<String> {
    range.collect()
}

#[test]
fn test_bus_range_directions() {
    let ascending = collect(BusRange::new("A", 0, 7));
    assert_eq!(ascending, (0 .. 8).map(|i| format!("A{}", i)).collect::<Vec<_>>());

    let descending = collect(BusRange::new("A", 7, 0));
    assert_eq!(descending, (0 .. 8).rev().map(|i| format!("A{}", i)).collect::<Vec<_>>());

    assert_eq!(collect(BusRange::new("B", 5, 5)), vec!["B5".to_string()]);
}

#[test]
fn test_bus_range_shorthands() {
    assert_eq!(BusRange::parse("AL").unwrap(), BusRange::new("A", 0, 7));
    assert_eq!(BusRange::parse("ah").unwrap(), BusRange::new("a", 8, 15));
    assert_eq!(BusRange::parse("A").unwrap(), BusRange::new("A", 0, 15));
    assert_eq!(BusRange::parse("A[15:0]").unwrap(), BusRange::new("A", 15, 0));
    assert_eq!(BusRange::parse(" C [ 2 : 4 ] ").unwrap(), BusRange::new("C", 2, 4));

    let range = BusRange::parse("BH").unwrap();
    assert_eq!(range.len(), 8);
    assert_eq!(range.to_string(), "B[8:15]");
}

#[test]
fn test_bus_range_errors() {
    assert_eq!(
        BusRange::parse("A[0:3"),
        Err(BusRangeError::UnclosedBracket("A[0:3".to_string()))
    );
    assert_eq!(
        BusRange::parse("A[3]"),
        Err(BusRangeError::MissingColon("A[3]".to_string()))
    );
    assert!(matches!(
        BusRange::parse("A[x:3]"),
        Err(BusRangeError::InvalidBound { bound, .. }) if bound == "x"
    ));
}

#[test]
fn test_catalog_lookup_is_caseless() {
    let catalog = builtin_catalog();

    let p1 = catalog.find(BoardKind::Board, "Papilio One").unwrap();
    assert_eq!(catalog.find(BoardKind::Board, "P1"), Some(p1));
    assert_eq!(catalog.find(BoardKind::Board, "PAPILIO one"), Some(p1));
    assert_eq!(catalog.find(BoardKind::Wing, "p1"), None);

    let bled = catalog.find_any("BLED").unwrap();
    assert!(catalog.board(bled).is_wing);
    assert_eq!(catalog.find(BoardKind::Wing, "b/led"), Some(bled));

    assert_eq!(catalog.boards(BoardKind::Board).len(), 4);
    assert_eq!(catalog.boards(BoardKind::Wing).len(), 3);
}

#[test]
fn test_catalog_reregistration_moves_names_only() {
    let mut catalog = builtin_catalog();
    let old = catalog.find(BoardKind::Board, "pram").unwrap();

    let summary = catalog.load_source("pram { X : P1 }", BoardKind::Board).unwrap();
    let new = summary.registered[0];

    assert_ne!(old, new);
    assert_eq!(catalog.find(BoardKind::Board, "pram"), Some(new));
    /* still reachable through its other name */
    assert_eq!(catalog.find(BoardKind::Board, "Papilio RAM"), Some(old));
    assert_eq!(catalog.board(old).buses.len(), 7);
    assert_eq!(catalog.boards(BoardKind::Board).len(), 5);
}

#[test]
fn test_inherited_views_come_root_first() {
    let catalog = builtin_catalog();
    let p1 = catalog.find(BoardKind::Board, "p1").unwrap();
    let p1_500 = catalog.find(BoardKind::Board, "p1_500").unwrap();

    assert_eq!(catalog.parent(p1_500), Some(p1));
    assert_eq!(catalog.inheritance_chain(p1_500), vec![p1, p1_500]);
    assert_eq!(catalog.bus_names(p1_500), catalog.bus_names(p1));
    assert_eq!(catalog.bus_count(p1_500), 6);
    assert_eq!(catalog.pins(p1_500).len(), 3 + 16 * 3);
    assert_eq!(catalog.header(p1_500), "# Papilio One 500K\n# Spartan 3E XC3S500E-VQ100\n");
    assert_eq!(catalog.header(p1), "");
    assert_eq!(catalog.configs(p1_500).len(), 1);
    assert!(catalog.configs(p1).is_empty());
}

#[test]
fn test_child_buses_append_to_parent_buses() {
    let mut catalog = Catalog::new();
    catalog.load_source(
        "Base { A : P1, P2  X : P9 }\nChild : Base { a : Q1, Q2, Q3 }",
        BoardKind::Board,
    ).unwrap();
    let child = catalog.find(BoardKind::Board, "child").unwrap();

    let names: Vec<_> = catalog.buses(child).into_iter()
        .map(|bus| catalog.bus(bus).name.clone())
        .collect();
    assert_eq!(names, vec!["A", "X", "a"]);
    assert_eq!(catalog.bus_names(child), vec!["A".to_string(), "X".to_string()]);
    assert_eq!(catalog.bus_count(child), 3);

    /* the most derived declaration answers name lookups */
    assert_eq!(catalog.bus_index(child, "A"), Some(2));
    assert_eq!(catalog.bus(catalog.bus_by_name(child, "a").unwrap()).pin_count(), 3);
    assert!(catalog.contains_bus_name(child, "x"));
    assert!(!catalog.contains_bus_name(child, "Y"));
    assert_eq!(catalog.bus_index(child, "Y"), None);
}

#[test]
fn test_wing_parent_falls_back_to_boards() {
    let mut catalog = builtin_catalog();
    catalog.load_source("Shield : p1 { EXTRA : LED(0) }", BoardKind::Wing).unwrap();
    let shield = catalog.find(BoardKind::Wing, "shield").unwrap();

    assert_eq!(catalog.parent(shield), catalog.find(BoardKind::Board, "p1"));
}

#[test]
fn test_inheritance_cycle_is_cut() {
    let mut catalog = Catalog::new();
    let err = catalog.load_source(
        "One : Two { A : P1 }\nTwo : One { B : P2 }\nThree : Two { }",
        BoardKind::Board,
    ).unwrap_err();

    assert!(matches!(&err, CatalogError::InheritanceCycle(names) if !names.is_empty()));

    /* every chain terminates once cut */
    for name in ["One", "Two", "Three"] {
        let id = catalog.find(BoardKind::Board, name).unwrap();
        assert!(catalog.inheritance_chain(id).len() <= 3);
    }
}

#[test]
fn test_inheritance_cycle_keeps_grammar_diagnostic() {
    let mut catalog = Catalog::new();
    let err = catalog.load_source("One : Two { A : P1 }\nTwo : One { B : P2 }\nThree {", BoardKind::Board)
        .unwrap_err();

    match &err {
        CatalogError::PartialWithCycle { cycle, diagnostic } => {
            assert!(matches!(**cycle, CatalogError::InheritanceCycle(_)));
            assert!(diagnostic.rendered.contains("Three {"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.to_string().starts_with("cyclic board inheritance involving: "));
    assert!(catalog.contains(BoardKind::Board, "One"));
}

#[test]
fn test_pin_view_names() {
    let mut catalog = Catalog::new();
    catalog.load_source(
        "Board { CLK { PERIOD = 20ns } : P1  DATA { IOSTANDARD = LVTTL } : P2, P3 { IOSTANDARD = LVCMOS33, PULLUP }, , P4 }",
        BoardKind::Board,
    ).unwrap();
    let board = catalog.find(BoardKind::Board, "board").unwrap();
    let pins = catalog.pins(board);
    assert_eq!(pins.len(), 5);

    let clk = catalog.pin_view(pins[0]);
    assert_eq!(clk.canonical_name(), "CLK");
    assert_eq!(clk.constraint_name(), "CLK");
    assert_eq!(clk.net_name().as_deref(), Some("CLK"));
    assert_eq!(clk.physical_name(), Some("P1"));
    assert!(!clk.is_wing());

    let data1 = catalog.pin_view(pins[2]);
    assert_eq!(data1.canonical_name(), "DATA1");
    assert_eq!(data1.net_name().as_deref(), Some("DATA(1)"));
    let additions: Vec<_> = data1.additions().iter().cloned().collect();
    assert_eq!(additions, vec![
        ("IOSTANDARD".to_string(), Some("LVCMOS33".to_string())),
        ("PULLUP".to_string(), None),
    ]);

    let unwired = catalog.pin_view(pins[3]);
    assert_eq!(unwired.physical_name(), None);
    assert_eq!(unwired.canonical_name(), "DATA2");
}

#[test]
fn test_bus_alias_renames_nets() {
    let mut catalog = Catalog::new();
    catalog.load_source("Board { DATA : P1, P2 }", BoardKind::Board).unwrap();
    let board = catalog.find(BoardKind::Board, "board").unwrap();
    catalog.board_mut(board).buses[0].alias = Some("D".to_string());
    catalog.board_mut(board).buses[0].pins[1].alias = Some("STROBE".to_string());

    let pins = catalog.pins(board);
    let first = catalog.pin_view(pins[0]);
    let second = catalog.pin_view(pins[1]);

    assert_eq!(first.net_name().as_deref(), Some("D(0)"));
    assert_eq!(first.constraint_name(), "D0");
    assert_eq!(second.net_name().as_deref(), Some("STROBE(1)"));
    /* pin aliases do not change the pairing key */
    assert_eq!(second.constraint_name(), "D1");
    assert_eq!(second.canonical_name(), "DATA1");
}

#[test]
fn test_place_wing_stacks_pins() {
    let mut catalog = builtin_catalog();
    let p1 = catalog.find(BoardKind::Board, "p1").unwrap();
    let bled = catalog.find(BoardKind::Wing, "B/LED").unwrap();
    let before = physical_names(&catalog, p1, "A");

    assert_eq!(place_wing(&mut catalog, p1, bled, "A8"), 1);

    /* physical identity survives the overlay */
    assert_eq!(physical_names(&catalog, p1, "A"), before);

    let a = catalog.bus_by_name(p1, "A").unwrap();
    let view = catalog.pin_view(PinRef { slot: a, index: 8 });
    assert!(view.is_wing());
    assert_eq!(view.net_name().as_deref(), Some("LED(0)"));
    assert_eq!(view.canonical_name(), "A8");
    assert_eq!(view.physical_name(), Some("P60"));
    assert_eq!(view.additions().get("DRIVE"), Some(&Some("8".to_string())));
    assert_eq!(catalog.pin(view.pin_ref()).stack_depth(), 1);

    let untouched = catalog.pin_view(PinRef { slot: a, index: 7 });
    assert!(!untouched.is_wing());
    assert_eq!(untouched.net_name().as_deref(), Some("A(7)"));
}

#[test]
fn test_place_wing_skips_what_does_not_fit() {
    let mut catalog = builtin_catalog();
    let p1 = catalog.find(BoardKind::Board, "p1").unwrap();
    let bled = catalog.find(BoardKind::Wing, "bled").unwrap();
    let a = catalog.bus_by_name(p1, "A").unwrap();
    let before = catalog.bus(a).clone();

    assert_eq!(place_wing(&mut catalog, p1, bled, "A9"), 0);
    assert_eq!(catalog.bus(a), &before);

    /* CLK has a single pin */
    let clk = catalog.bus_by_name(p1, "CLK").unwrap();
    let before = catalog.bus(clk).clone();
    assert_eq!(place_wing(&mut catalog, p1, bled, "CLK"), 0);
    assert_eq!(catalog.bus(clk), &before);

    assert_eq!(place_wing(&mut catalog, p1, bled, "Q"), 0);
}

#[test]
fn test_place_wing_skips_offsets_past_usize() {
    let mut catalog = builtin_catalog();
    let p1 = catalog.find(BoardKind::Board, "p1").unwrap();
    let bled = catalog.find(BoardKind::Wing, "bled").unwrap();
    let a = catalog.bus_by_name(p1, "A").unwrap();
    let before = catalog.bus(a).clone();

    let mut placements = WingPlacements::new();
    placements.add_directive("bled->A1844674407370955161");
    let slots: Vec<_> = placements.iter().map(|(slot, _)| slot.to_string()).collect();
    assert_eq!(slots, vec!["A18446744073709551610"]);

    assert_eq!(place_wing(&mut catalog, p1, bled, &slots[0]), 0);
    assert_eq!(place_wing(&mut catalog, p1, bled, &format!("A{}", usize::MAX)), 0);
    assert_eq!(catalog.bus(a), &before);
}

#[test]
fn test_place_wing_spans_consecutive_buses() {
    let mut catalog = builtin_catalog();
    let p1 = catalog.find(BoardKind::Board, "Papilio One").unwrap();
    let arcade = catalog.find(BoardKind::Wing, "Arcade").unwrap();

    assert_eq!(place_wing(&mut catalog, p1, arcade, "A"), 3);

    let nets: Vec<_> = ["A", "B", "C"].iter()
        .map(|bus| {
            let slot = catalog.bus_by_name(p1, bus).unwrap();
            catalog.pin_view(PinRef { slot, index: 0 }).net_name()
        })
        .collect();
    assert_eq!(nets, vec![
        Some("J1_UP".to_string()),
        Some("VGA_RED(0)".to_string()),
        Some("AUDIO_LEFT".to_string()),
    ]);

    /* empty wing positions leave the slot without a net */
    let a = catalog.bus_by_name(p1, "A").unwrap();
    assert_eq!(catalog.pin_view(PinRef { slot: a, index: 6 }).net_name(), None);
    assert_eq!(catalog.pin_view(PinRef { slot: a, index: 6 }).physical_name(), Some("P53"));
}

#[test]
fn test_place_wing_onto_inherited_bus() {
    let mut catalog = builtin_catalog();
    let p1_500 = catalog.find(BoardKind::Board, "p1_500").unwrap();
    let ps2 = catalog.find(BoardKind::Wing, "ps2").unwrap();

    assert_eq!(place_wing(&mut catalog, p1_500, ps2, "B8"), 1);

    let b = catalog.bus_by_name(p1_500, "B").unwrap();
    let view = catalog.pin_view(PinRef { slot: b, index: 12 });
    assert_eq!(view.net_name().as_deref(), Some("PS2_DATA2"));
    assert_eq!(view.physical_name(), Some("P34"));
    assert_eq!(view.additions().get("PULLUP"), Some(&None));
}

#[test]
fn test_wing_placement_directives() {
    assert_eq!(WingPlacements::normalize_destination("AL"), "A0");
    assert_eq!(WingPlacements::normalize_destination("bh"), "b8");
    assert_eq!(WingPlacements::normalize_destination("C"), "C0");
    assert_eq!(WingPlacements::normalize_destination("B12"), "B120");

    let mut placements = WingPlacements::new();
    placements.add_directive("B/LED->AL,AH ; PS/2->BH");
    placements.add_directive("Arcade->a; ignored");

    let entries: Vec<_> = placements.iter().collect();
    assert_eq!(entries, vec![
        ("A0", "Arcade"),
        ("A8", "B/LED"),
        ("B8", "PS/2"),
    ]);
}

#[test]
fn test_additions_keep_order_and_override() {
    let base: Additions = vec![
        ("A".to_string(), Some("1".to_string())),
        ("B".to_string(), None),
    ].into_iter().collect();
    let local: Additions = vec![("A".to_string(), Some("2".to_string()))].into_iter().collect();

    let merged = base.merged_with(&local);
    let keys: Vec<_> = merged.iter().map(|(k, v)| (k.as_str(), v.as_deref())).collect();
    assert_eq!(keys, vec![("A", Some("2")), ("B", None)]);
}
