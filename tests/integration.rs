use cdfepoch::{
    epoch, epoch16, range_search, tt2000, CalendarDateTime, Epoch, Epoch16, LeapSecondCache, LeapSecondTable,
    Provenance, SystemHost, TableConfig, TableLoadError, TimeValue, Tt2000,
};
use std::io::Write;

fn at(y: i64, m: i64, d: i64, h: i64, mi: i64, s: i64) -> CalendarDateTime {
    CalendarDateTime::new(y, m, d).with_time(h, mi, s)
}

fn table_file(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const FIVE_COLUMN_ROW: &str = "; year month day delta mjd rate\n\
    1972 1 1 10.0 0.0 0.0\n\
    1972 7 1 11.0 0.0\n\
    1973 1 1 12.0 0.0 0.0\n";

// ─── TT2000 ───────────────────────────────────────────────────────────────

#[test]
fn tt2000_text_round_trips() {
    let table = LeapSecondTable::builtin();
    let readings = [
        at(1993, 10, 10, 23, 45, 49).with_subsecond(999, 999, 999),
        at(2016, 12, 31, 23, 59, 60).with_subsecond(500, 0, 1),
        at(1972, 1, 1, 0, 0, 0),
        at(2291, 6, 30, 12, 0, 0).with_subsecond(0, 0, 7),
    ];
    for dt in readings {
        let t = tt2000::compute_parts(&table, &dt);
        for style in [0, 3, 4] {
            let text = tt2000::encode(&table, t, style);
            assert_eq!(tt2000::parse(&table, &text), t, "{text}");
        }
    }
    let whole = tt2000::compute_parts(&table, &at(2005, 7, 14, 3, 4, 5));
    assert_eq!(tt2000::parse(&table, &tt2000::encode(&table, whole, 2)), whole);
    let noon = tt2000::compute_parts(&table, &at(2005, 7, 14, 12, 0, 0));
    assert_eq!(tt2000::parse(&table, &tt2000::encode(&table, noon, 1)), noon);
}

#[test]
fn tt2000_breakdown_inverts_compute() {
    let table = LeapSecondTable::builtin();
    let sweep = (0..2000_i64).map(|i| -800_000_000_000_000_000 + i * 4_600_000_000_000_123);
    let leap_seconds = table.thresholds()[cdfepoch::leap_seconds::DRIFT_ROWS + 1..]
        .iter()
        .flat_map(|&th| [th - 1_000_000_001, th - 1_000_000_000, th - 500_000_000, th - 1, th]);
    for t in sweep.chain(leap_seconds).map(Tt2000::new) {
        let dt = tt2000::breakdown_parts(&table, t);
        assert_eq!(tt2000::compute_parts(&table, &dt), t, "{dt:?}");
    }
}

#[test]
fn leap_second_is_counted() {
    let table = LeapSecondTable::builtin();
    let before = tt2000::compute_parts(&table, &at(2016, 12, 31, 23, 59, 59));
    let after = tt2000::compute_parts(&table, &at(2017, 1, 1, 0, 0, 0));
    assert_eq!(after.value() - before.value(), 2_000_000_000);
    let ordinary_before = tt2000::compute_parts(&table, &at(2016, 6, 30, 23, 59, 59));
    let ordinary_after = tt2000::compute_parts(&table, &at(2016, 7, 1, 0, 0, 0));
    assert_eq!(ordinary_after.value() - ordinary_before.value(), 1_000_000_000);
}

#[test]
fn sentinels_are_idempotent() {
    let table = LeapSecondTable::builtin();
    let nines = at(9999, 12, 31, 23, 59, 59).with_subsecond(999, 999, 999);
    assert_eq!(tt2000::compute_parts(&table, &nines), Tt2000::FILL);
    assert_eq!(tt2000::breakdown_parts(&table, Tt2000::FILL), nines);

    let nines_ms = at(9999, 12, 31, 23, 59, 59).with_subsecond(999, 0, 0);
    assert_eq!(epoch::compute(&nines_ms), Epoch::FILL);
    assert_eq!(epoch::breakdown(Epoch::FILL), nines_ms);

    let nines_ps = nines.with_picosecond(999);
    assert_eq!(epoch16::compute(&nines_ps), Epoch16::FILL);
    assert_eq!(epoch16::breakdown(Epoch16::FILL), nines_ps);

    let zero = CalendarDateTime::new(0, 1, 1);
    assert_eq!(tt2000::compute_parts(&table, &zero), Tt2000::PAD);
    assert_eq!(tt2000::breakdown_parts(&table, Tt2000::PAD), zero);
    assert_eq!(epoch::compute(&zero), Epoch::PAD);
    assert_eq!(epoch::breakdown(Epoch::PAD), zero);
    assert_eq!(epoch16::compute(&zero), Epoch16::PAD);
    assert_eq!(epoch16::breakdown(Epoch16::PAD), zero);
}

// ─── EPOCH / EPOCH16 ──────────────────────────────────────────────────────

#[test]
fn epoch_family_text_round_trips() {
    for day in [1, 59, 60, 200, 366] {
        let dt = at(2000, 0, day, 12, 0, 0);
        let e = epoch::compute(&dt);
        let e16 = epoch16::compute(&dt);
        for style in 0..5 {
            assert_eq!(epoch::parse(&epoch::encode(e, style)), e, "EPOCH style {style}");
            assert_eq!(epoch16::parse(&epoch16::encode(e16, style)), e16, "EPOCH16 style {style}");
        }
    }
}

#[test]
fn encodings_agree_through_tt2000() {
    let table = LeapSecondTable::builtin();
    let dt = at(2010, 3, 14, 15, 9, 26).with_subsecond(535, 897, 932);
    let t = tt2000::compute_parts(&table, &dt);
    assert_eq!(tt2000::to_epoch(&table, t), epoch::compute(&dt.with_subsecond(535, 0, 0)));
    assert_eq!(tt2000::to_epoch16(&table, t), epoch16::compute(&dt));
    let unix_ms = epoch::to_unix(tt2000::to_epoch(&table, t));
    let unix_us = epoch16::to_unix(tt2000::to_epoch16(&table, t));
    assert!((unix_ms - unix_us).abs() < 1e-3);
}

// ─── Range search ─────────────────────────────────────────────────────────

#[test]
fn range_search_over_encoded_series() {
    let table = LeapSecondTable::builtin();
    let base = tt2000::compute_parts(&table, &at(2016, 12, 31, 23, 59, 30));
    let series: Vec<Tt2000> = (0..60).map(|s| Tt2000::new(base.value() + s * 1_000_000_000)).collect();
    let leap = tt2000::compute_parts(&table, &at(2016, 12, 31, 23, 59, 60));
    let start = tt2000::compute_parts(&table, &at(2016, 12, 31, 23, 59, 58));
    let (first, last) = range_search(&series, start, leap).unwrap();
    assert_eq!((first, last), (28, 30));
    assert_eq!(series[30], leap);
    assert_eq!(range_search(&[1.0, 3.0, 5.0, 7.0, 9.0], 4.0, 8.0), Some((2, 3)));
    assert_eq!(range_search(&[1.0, 3.0, 5.0, 7.0, 9.0], 10.0, 20.0), None);
    assert_eq!(range_search(&[1.0, 3.0, 5.0, 7.0, 9.0], 1.0, 9.0), Some((0, 4)));
}

// ─── Leap-second tables ───────────────────────────────────────────────────

#[test]
fn table_file_is_read_from_disk() {
    let file = table_file("1972 1 1 10.0 0.0 0.0\n\n1972 7 1 11.0 0.0 0.0\n");
    let table = LeapSecondTable::from_file(file.path()).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.provenance(), Provenance::File);
    assert_eq!(table.source_path(), Some(file.path()));
    assert_eq!(table.last_entry_date().yyyymmdd(), 19720701);
}

#[test]
fn malformed_file_is_rejected_whole() {
    let file = table_file(FIVE_COLUMN_ROW);
    match LeapSecondTable::from_file(file.path()) {
        Err(TableLoadError::Columns { line, found }) => assert_eq!((line, found), (3, 5)),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        LeapSecondTable::from_file(file.path().with_extension("missing")),
        Err(TableLoadError::Io { .. })
    ));
}

#[test]
fn cache_falls_back_on_malformed_file() {
    let file = table_file(FIVE_COLUMN_ROW);
    let var = "CDFEPOCH_TEST_MALFORMED_TABLE";
    std::env::set_var(var, file.path());
    let cache = LeapSecondCache::new(SystemHost, TableConfig { env_var: var.to_owned() });
    let table = cache.table();
    assert_eq!(table.provenance(), Provenance::BuiltIn);
    assert_eq!(table.row_count(), LeapSecondTable::builtin().row_count());
    std::env::remove_var(var);
}

#[test]
fn cache_reload_follows_variable_unless_open() {
    let short = table_file("1972 1 1 10.0 0.0 0.0\n1972 7 1 11.0 0.0 0.0\n");
    let var = "CDFEPOCH_TEST_RELOAD_TABLE";
    std::env::remove_var(var);
    let cache = LeapSecondCache::new(SystemHost, TableConfig { env_var: var.to_owned() });
    let builtin_rows = cache.table().row_count();

    std::env::set_var(var, short.path());
    assert_eq!(cache.table().row_count(), 2);

    let handle = cache.open();
    std::env::remove_var(var);
    assert_eq!(handle.table().row_count(), 2);
    assert!(!cache.reload_if_changed());
    drop(handle);

    assert_eq!(cache.open_count(), 0);
    assert_eq!(cache.table().row_count(), builtin_rows);
}

#[test]
fn codecs_accept_a_file_table() {
    let builtin = LeapSecondTable::builtin();
    let rows: String = builtin.entries()[..37]
        .iter()
        .map(|e| format!("{} {} {} {} {} {}\n", e.year, e.month, e.day, e.delta_at, e.drift_reference_mjd, e.drift_rate))
        .collect();
    let file = table_file(&rows);
    let table = LeapSecondTable::from_file(file.path()).unwrap();
    assert_eq!(table.last_entry_date().yyyymmdd(), 19990101);

    let dt = at(2020, 1, 1, 0, 0, 0);
    let short = tt2000::compute_parts(&table, &dt);
    let full = tt2000::compute_parts(&builtin, &dt);
    assert_eq!(full.value() - short.value(), 5_000_000_000);
    assert_eq!(tt2000::breakdown_parts(&table, short), dt);
    let older = at(1985, 1, 1, 0, 0, 0);
    assert_eq!(tt2000::compute_parts(&table, &older), tt2000::compute_parts(&builtin, &older));
}

// ─── serde ────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
#[test]
fn serde_value_shapes() {
    let e16 = Epoch16::new(63_113_904_000.0, 5.0);
    assert_eq!(serde_json::to_string(&e16).unwrap(), "[63113904000.0,5.0]");
    assert_eq!(serde_json::to_string(&Tt2000::J2000).unwrap(), "0");
    assert_eq!(serde_json::to_string(&Epoch::new(1.5)).unwrap(), "1.5");
    let back: Epoch16 = serde_json::from_str("[1.0,2.0]").unwrap();
    assert_eq!(back, Epoch16::new(1.0, 2.0));
}

#[cfg(feature = "serde")]
#[test]
fn serde_table_rows() {
    let table = LeapSecondTable::builtin();
    let json = serde_json::to_string(table.entries()).unwrap();
    let rows: Vec<cdfepoch::LeapSecondEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(rows, table.entries());
    assert!(json.contains("\"delta_at\":37.0"));
    let dt = at(2000, 1, 1, 0, 0, 0);
    let round: CalendarDateTime = serde_json::from_str(&serde_json::to_string(&dt).unwrap()).unwrap();
    assert_eq!(round, dt);
}
