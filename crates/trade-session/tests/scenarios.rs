// End-to-end scenarios through the public session API.

use rust_decimal::Decimal;
use trade_core::{validate_event, ConversionDirection, ConverterId, ConverterSpec};
use trade_session::{
    describe_entry, entry_result, ConverterField, Session, SessionAction, SessionConfig,
    SessionEvent,
};

fn seeded() -> Session {
    Session::new(SessionConfig {
        rng_seed: Some(42),
        ..SessionConfig::default()
    })
    .unwrap()
}

fn gralats() -> ConverterId {
    ConverterSpec::gralats().id
}

fn rocks() -> ConverterId {
    ConverterSpec::rocks().id
}

#[test]
fn mushrooms_through_gralat_converter_into_log() {
    let mut s = seeded();
    s.set_quantity("Mushrooms", "20");
    assert_eq!(s.inventory_total(), Decimal::new(100, 0));

    let events = s.calculate(&gralats());
    let logged = match events.last() {
        Some(SessionEvent::ConversionLogged(e)) => e.clone(),
        other => panic!("expected a logged conversion, got {other:?}"),
    };
    assert_eq!(logged.direction, ConversionDirection::ForwardToTro);
    assert_eq!(logged.input_amount, Decimal::new(100, 0));
    assert_eq!(logged.ratio, Decimal::new(20, 1));
    assert_eq!(logged.tro_amount, Decimal::new(5000, 2));
    assert_eq!(logged.input_unit_label, "gralats");
    validate_event(&logged).unwrap();

    let g = s.converter(&gralats()).unwrap();
    assert_eq!(g.field(ConverterField::Tro), "50.00");
    assert_eq!(g.result_message(), Some("100 Gralats = 50.00 Tro"));
    assert_eq!(s.log().len(), 1);
    assert_eq!(s.total_tro(), Decimal::new(50, 0));
    assert_eq!(describe_entry(&logged), "100 gralats @ 2:1");
    assert_eq!(entry_result(&logged), "= 50.00 Tro");
}

#[test]
fn rocks_reverse_from_tro() {
    let mut s = seeded();
    s.edit_field(&rocks(), ConverterField::Tro, "10");
    // Editing alone never converts.
    assert!(s.log().is_empty());
    s.confirm(&rocks(), ConverterField::Tro);

    let entry = &s.log().arrival_order()[0];
    assert_eq!(entry.direction, ConversionDirection::ReverseFromTro);
    assert_eq!(entry.input_amount, Decimal::new(1300, 2));
    assert_eq!(entry.input_unit_label, "rocks");
    let r = s.converter(&rocks()).unwrap();
    assert_eq!(r.field(ConverterField::Amount), "13.00");
    assert_eq!(r.result_message(), Some("10 Tro = 13.00 Rocks"));
}

#[test]
fn zero_inventory_clears_bound_converter_entirely() {
    let mut s = seeded();
    s.set_quantity("Starfish", "2");
    s.calculate(&gralats());
    assert_eq!(
        s.converter(&gralats()).unwrap().field(ConverterField::Tro),
        "7.00"
    );

    s.set_quantity("Starfish", "");
    let g = s.converter(&gralats()).unwrap();
    assert_eq!(g.field(ConverterField::Amount), "");
    assert_eq!(g.field(ConverterField::Tro), "");
    assert_eq!(g.result_message(), None);
}

#[test]
fn nonzero_change_overwrites_amount_and_drops_stale_result() {
    let mut s = seeded();
    s.set_quantity("Paper", "10");
    s.calculate(&gralats());
    s.set_quantity("Paper", "11");
    let g = s.converter(&gralats()).unwrap();
    assert_eq!(g.field(ConverterField::Amount), "44");
    assert_eq!(g.field(ConverterField::Tro), "");
    assert_eq!(g.result_message(), None);
    // Earlier log entries are untouched.
    assert_eq!(s.log().arrival_order()[0].input_amount, Decimal::new(40, 0));
}

#[test]
fn running_total_tracks_appends_and_clear() {
    let mut s = seeded();
    let actions = vec![
        SessionAction::EditField {
            converter: rocks(),
            field: ConverterField::Amount,
            text: "13".into(),
        },
        SessionAction::Confirm {
            converter: rocks(),
            field: ConverterField::Amount,
        },
        SessionAction::SetQuantity {
            item: "Gold / Diamonds".into(),
            text: "3".into(),
        },
        SessionAction::Confirm {
            converter: gralats(),
            field: ConverterField::Ratio,
        },
        SessionAction::ClearInventory,
        SessionAction::Confirm {
            converter: rocks(),
            field: ConverterField::Amount,
        },
    ];
    for a in actions {
        s.dispatch(a);
    }
    // 10 + 15 + 10
    assert_eq!(s.log().len(), 3);
    assert_eq!(s.total_tro(), Decimal::new(35, 0));
    let newest: Vec<_> = s.log().newest_first().map(|e| e.tro_amount).collect();
    assert_eq!(newest[1], Decimal::new(15, 0));

    let events = s.clear_log();
    assert_eq!(events, vec![SessionEvent::LogCleared]);
    assert_eq!(s.total_tro(), Decimal::ZERO);
    assert_eq!(s.log().newest_first().count(), 0);
}

#[test]
fn config_file_drives_the_session() {
    let yaml = r#"
rng_seed: 5
ratios:
  - { name: Shells, ratio: 2 }
converters:
  - id: shells
    title: "Shells ⇄ Tro"
    category: secondary_unit
    unit_label: Gralats
    default_ratio: 4
    binding: inventory_total
"#;
    let mut s = Session::new(SessionConfig::from_yaml_str(yaml).unwrap()).unwrap();
    s.set_quantity("Shells", "6");
    s.calculate(&ConverterId::new("shells"));
    assert_eq!(s.total_tro(), Decimal::new(3, 0));
}
