//! Sheets whose formulas chain across the whole grid

use pretty_assertions::assert_eq;
use tabula::prelude::*;
use tabula::MAX_ROWS;

/// Fill column A with `A1 = 1` and `A(r+1) = A(r) + 1` down to row `rows`
///
/// Links are set in order of their trailing zero bits so each set joins two
/// short segments, keeping both cycle walks and invalidations cheap.
fn column_chain(rows: u32) -> Sheet {
    let mut sheet = Sheet::new();
    let mut links: Vec<u32> = (1..rows).collect();
    links.sort_by_key(|row| row.trailing_zeros());

    for row in links {
        let formula = format!("={}+1", Position::new(row - 1, 0));
        sheet.set_cell(Position::new(row, 0), &formula).unwrap();
    }
    sheet.set_cell(Position::new(0, 0), "1").unwrap();
    sheet
}

#[test]
fn test_full_height_chain_evaluates() {
    let mut sheet = column_chain(MAX_ROWS);
    let last = Position::new(MAX_ROWS - 1, 0);
    assert_eq!(sheet.cell_count(), MAX_ROWS as usize);

    assert_eq!(sheet.value(last).unwrap(), Value::Number(f64::from(MAX_ROWS)));
    assert_eq!(sheet.stats().evaluations, u64::from(MAX_ROWS - 1));

    // Every link is cached now
    let view = sheet.cell(Position::new(MAX_ROWS / 2, 0)).unwrap().unwrap();
    let expected = Value::Number(f64::from(MAX_ROWS / 2 + 1));
    assert_eq!(view.cell().cached_value(), Some(&expected));
    assert_eq!(sheet.value(last).unwrap(), Value::Number(f64::from(MAX_ROWS)));
    assert_eq!(sheet.stats().evaluations, u64::from(MAX_ROWS - 1));

    // Changing the head invalidates the whole column
    sheet.set_cell(Position::new(0, 0), "2").unwrap();
    assert_eq!(sheet.value(last).unwrap(), Value::Number(f64::from(MAX_ROWS) + 1.0));
}

#[test]
fn test_full_height_chain_prints() {
    let sheet = column_chain(MAX_ROWS);
    let mut out = Vec::new();
    sheet.print_values(&mut out).unwrap();

    let out = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), MAX_ROWS as usize);
    assert_eq!(lines[0], "1");
    assert_eq!(lines[lines.len() - 1], MAX_ROWS.to_string());
}

#[test]
fn test_error_travels_down_full_chain() {
    let mut sheet = column_chain(MAX_ROWS);
    sheet.set_cell(Position::new(0, 0), "=1/0").unwrap();

    let last = sheet.cell(Position::new(MAX_ROWS - 1, 0)).unwrap().unwrap();
    assert_eq!(last.value(), Value::Error(CellError::Div0));
    assert_eq!(last.value(), sheet.value(last.position()).unwrap());
}

#[test]
fn test_deeply_nested_formula_is_rejected() {
    let mut sheet = Sheet::new();
    let a1 = Position::new(0, 0);

    let nested = format!("={}1{}", "(".repeat(100_000), ")".repeat(100_000));
    assert!(matches!(sheet.set_cell(a1, &nested), Err(Error::FormulaParse(_))));

    let signs = format!("={}1", "-".repeat(100_000));
    assert!(matches!(sheet.set_cell(a1, &signs), Err(Error::FormulaParse(_))));

    let sum = format!("={}", vec!["B1"; 100_000].join("+"));
    assert!(matches!(sheet.set_cell(a1, &sum), Err(Error::FormulaParse(_))));

    assert!(!sheet.contains(a1));
    assert_eq!(sheet.cell_count(), 0);
}
