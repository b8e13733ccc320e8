#![cfg(test)]

use approx::assert_abs_diff_eq;

use super::kernel::{DEFAULT_TABLE_LEN, KernelOptions, KernelTable};

#[test]
fn default_table_has_301_entries_and_unit_peak() {
    let table = KernelTable::gaussian(&KernelOptions::default()).unwrap();
    assert_eq!(table.values().len(), DEFAULT_TABLE_LEN);
    assert_eq!(table.values()[0], 1.0);
    assert_eq!(table.support(), 2);
    assert_eq!(table.support_area(), 25);
}

#[test]
fn table_decays_monotonically() {
    let table = KernelTable::default();
    for pair in table.values().windows(2) {
        assert!(pair[1] < pair[0], "table must strictly decrease: {pair:?}");
    }
}

#[test]
fn weight_halves_at_hwhm() {
    let table = KernelTable::default();
    let half = table.weight(0.7);
    assert_abs_diff_eq!(half, 0.5, epsilon = 1e-2);
}

#[test]
fn weight_is_symmetric_and_uses_rounded_slots() {
    let table = KernelTable::default();
    assert_eq!(table.weight(0.3), table.weight(-0.3));
    // offsets under half a slot round to the first entry
    let eps = 0.4 / table.table_scale();
    assert_eq!(table.weight(eps), table.values()[0]);
}

#[test]
fn weight_clamps_beyond_table_end() {
    let table = KernelTable::default();
    let last = *table.values().last().unwrap();
    assert_eq!(table.weight(2.5), last);
    assert_eq!(table.weight(10.0), last);
}

#[test]
fn invalid_options_are_rejected() {
    let bad_len = KernelOptions {
        table_len: 1,
        ..KernelOptions::default()
    };
    assert!(KernelTable::gaussian(&bad_len).is_err());

    let bad_hwhm = KernelOptions {
        hwhm: 0.0,
        ..KernelOptions::default()
    };
    assert!(KernelTable::gaussian(&bad_hwhm).is_err());
}

#[test]
fn dump_writes_one_line_per_entry() {
    let table = KernelTable::default();
    let mut out = Vec::new();
    table.dump(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), DEFAULT_TABLE_LEN);
    assert!(lines[0].starts_with("0\t1.000e0"), "first line: {}", lines[0]);
}
