use super::ui;
use crate::core::derivation::DateRange;
use crate::core::forms::Form;
use crate::core::money::MonetaryDecomposition;
use comfy_table::Cell;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Mandate,
    Stage,
    MissionOrder,
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RecordKind::Mandate => "Mandate",
                RecordKind::Stage => "Stage",
                RecordKind::MissionOrder => "Mission order",
            }
        )
    }
}

/// One line of a validation report.
#[derive(Debug, Clone)]
pub struct ValidationRow {
    pub kind: RecordKind,
    pub label: String,
    pub range: Option<DateRange>,
    pub duration: Option<i64>,
    pub amounts: Option<MonetaryDecomposition>,
    pub problems: Vec<String>,
}

impl ValidationRow {
    pub fn from_form<F: Form>(
        kind: RecordKind,
        label: impl Into<String>,
        range: Option<DateRange>,
        form: &F,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            range,
            duration: form.duration(),
            amounts: None,
            problems: form.errors().iter().map(|e| e.to_string()).collect(),
        }
    }

    /// A record that could not be validated, e.g. because a fetch failed.
    pub fn failed(kind: RecordKind, label: impl Into<String>, problem: impl Display) -> Self {
        Self {
            kind,
            label: label.into(),
            range: None,
            duration: None,
            amounts: None,
            problems: vec![problem.to_string()],
        }
    }

    pub fn with_amounts(mut self, amounts: MonetaryDecomposition) -> Self {
        self.amounts = Some(amounts);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

pub fn invalid_count(rows: &[ValidationRow]) -> usize {
    rows.iter().filter(|row| !row.is_valid()).count()
}

pub fn display_rows(title: &str, rows: &[ValidationRow]) {
    println!("\n{}", ui::style_text(title, ui::StyleType::Title));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Kind"),
        ui::header_cell("Record"),
        ui::header_cell("Dates"),
        ui::header_cell("Days"),
        ui::header_cell("Advance"),
        ui::header_cell("Balance"),
        ui::header_cell("Status"),
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(row.kind.to_string()),
            Cell::new(&row.label),
            ui::format_optional_cell(row.range, |r| r.to_string()),
            ui::format_optional_cell(row.duration, |d| d.to_string()),
            ui::format_optional_cell(row.amounts, |a| a.advance.to_string()),
            ui::format_optional_cell(row.amounts, |a| a.balance.to_string()),
            ui::problems_cell(&row.problems),
        ]);
    }

    println!("{table}");

    let invalid = invalid_count(rows);
    let summary = format!("{} record(s), {} invalid", rows.len(), invalid);
    if invalid > 0 {
        println!("{}", ui::style_text(&summary, ui::StyleType::Error));
    } else {
        println!("{}", ui::style_text(&summary, ui::StyleType::Subtle));
    }
}
