use super::ui;
use crate::core::money::{MonetaryDecomposition, decompose, validate_amounts};
use anyhow::{Result, bail};
use comfy_table::{Cell, CellAlignment};
use rust_decimal::Decimal;

pub fn run(total: Decimal, rate: Decimal) -> Result<MonetaryDecomposition> {
    let errors = validate_amounts(total, rate);
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        bail!("{}", messages.join("; "));
    }

    let split = decompose(total, rate);
    display(&split);
    Ok(split)
}

fn display(split: &MonetaryDecomposition) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Item"), ui::header_cell("Amount")]);

    let rows = [
        ("Total", split.total.to_string()),
        ("Advance rate", format!("{}%", split.advance_rate_percent)),
        ("Advance", split.advance.to_string()),
        ("Balance", split.balance.to_string()),
    ];
    for (label, amount) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(amount).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_returns_split() {
        let split = run(Decimal::from(72000), Decimal::from(50)).unwrap();
        assert_eq!(split.advance, Decimal::from(36000));
        assert_eq!(split.balance, Decimal::from(36000));
    }

    #[test]
    fn test_run_rejects_bad_amounts() {
        let err = run(Decimal::from(-1), Decimal::from(50)).unwrap_err();
        assert_eq!(err.to_string(), "total amount cannot be negative");
        assert!(run(Decimal::from(10), Decimal::from(120)).is_err());
    }
}
