use super::ui;
use crate::core::backend::MandateSource;
use crate::core::derivation::{DateRange, RangeDerivation, RangeRules, derive_range, join_errors};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use tracing::debug;

/// Where the optional parent range of a validation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentSource {
    None,
    Explicit(DateRange),
    Mandate(u64),
}

impl ParentSource {
    pub fn from_args(
        parent_start: Option<NaiveDate>,
        parent_end: Option<NaiveDate>,
        mandate_id: Option<u64>,
    ) -> Result<Self> {
        match (parent_start, parent_end, mandate_id) {
            (None, None, None) => Ok(ParentSource::None),
            (None, None, Some(id)) => Ok(ParentSource::Mandate(id)),
            (Some(start), Some(end), None) => {
                if start > end {
                    bail!("Parent range starts after it ends ({start} > {end})");
                }
                Ok(ParentSource::Explicit(DateRange::new(start, end)))
            }
            (_, _, Some(_)) => bail!("Use either a parent range or a mandate id, not both"),
            _ => bail!("A parent range needs both a start and an end date"),
        }
    }

    pub async fn resolve(
        &self,
        source: &(dyn MandateSource + Send + Sync),
    ) -> Result<Option<DateRange>> {
        match self {
            ParentSource::None => Ok(None),
            ParentSource::Explicit(range) => Ok(Some(*range)),
            ParentSource::Mandate(id) => {
                let mandate = source
                    .get_mandate(*id)
                    .await
                    .with_context(|| format!("Failed to load parent mandate {id}"))?;
                let range = mandate.range();
                if range.duration_days().is_none() {
                    bail!("Mandate {} has an inverted date range ({range})", mandate.label());
                }
                debug!(mandate = %mandate.label(), %range, "Resolved parent range");
                Ok(Some(range))
            }
        }
    }
}

pub fn run_duration(start: NaiveDate, end: NaiveDate) -> Result<()> {
    let derived = derive_range(Some(start), Some(end), start, None, RangeRules::edit());
    match derived.duration {
        Some(days) => {
            println!(
                "{} {}",
                ui::style_text("Duration:", ui::StyleType::TotalLabel),
                ui::style_text(&format!("{days} day(s)"), ui::StyleType::TotalValue)
            );
            Ok(())
        }
        None => bail!("{}", join_errors(&derived.errors)),
    }
}

pub fn run_validate(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
    parent: Option<DateRange>,
    rules: RangeRules,
) -> Result<()> {
    let derived = derive_range(start, end, today, parent.as_ref(), rules);
    display_derivation(start, end, parent, &derived);

    if !derived.is_valid() {
        bail!(
            "{} validation error(s): {}",
            derived.errors.len(),
            join_errors(&derived.errors)
        );
    }
    Ok(())
}

fn display_derivation(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    parent: Option<DateRange>,
    derived: &RangeDerivation,
) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Start"),
        ui::header_cell("End"),
        ui::header_cell("Parent"),
        ui::header_cell("Days"),
        ui::header_cell("Status"),
    ]);
    let problems: Vec<String> = derived.errors.iter().map(|e| e.to_string()).collect();
    table.add_row(vec![
        ui::format_optional_cell(start, |d| d.to_string()),
        ui::format_optional_cell(end, |d| d.to_string()),
        ui::format_optional_cell(parent, |p| p.to_string()),
        ui::format_optional_cell(derived.duration, |d| d.to_string()),
        ui::problems_cell(&problems),
    ]);
    println!("{table}");
    if derived.duration.is_none() && derived.is_valid() {
        println!(
            "{}",
            ui::style_text("Both dates are needed for a duration", ui::StyleType::Subtle)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Mandate, Stage};
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct SingleMandate(Mandate);

    #[async_trait]
    impl MandateSource for SingleMandate {
        async fn list_mandates(&self) -> Result<Vec<Mandate>> {
            Ok(vec![self.0.clone()])
        }

        async fn get_mandate(&self, id: u64) -> Result<Mandate> {
            if self.0.id == Some(id) {
                Ok(self.0.clone())
            } else {
                Err(anyhow!("Mandate {id} not found"))
            }
        }

        async fn list_stages(&self, _mandate_id: u64) -> Result<Vec<Stage>> {
            Ok(vec![])
        }
    }

    fn mandate(start: &str, end: &str) -> Mandate {
        Mandate {
            id: Some(5),
            reference: "MD-5".to_string(),
            object: String::new(),
            start_date: date(start),
            end_date: date(end),
            duration_days: None,
            status: Default::default(),
            team: vec![],
            resources: vec![],
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_run_duration() {
        assert!(run_duration(date("2024-06-01"), date("2024-06-05")).is_ok());
        let err = run_duration(date("2024-06-05"), date("2024-06-01")).unwrap_err();
        assert_eq!(err.to_string(), "start date must not be after end date");
    }

    #[test]
    fn test_run_validate_reports_all_errors() {
        let parent = DateRange::new(date("2024-05-01"), date("2024-05-15"));
        let err = run_validate(
            Some(date("2024-04-30")),
            Some(date("2024-05-16")),
            date("2024-01-01"),
            Some(parent),
            RangeRules::edit(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "2 validation error(s): start date precedes parent range; end date exceeds parent range"
        );

        assert!(
            run_validate(
                Some(date("2024-05-02")),
                None,
                date("2024-01-01"),
                Some(parent),
                RangeRules::create(),
            )
            .is_ok()
        );
    }

    #[test]
    fn test_parent_source_from_args() {
        assert_eq!(
            ParentSource::from_args(None, None, None).unwrap(),
            ParentSource::None
        );
        assert_eq!(
            ParentSource::from_args(None, None, Some(3)).unwrap(),
            ParentSource::Mandate(3)
        );
        assert_eq!(
            ParentSource::from_args(Some(date("2024-05-01")), Some(date("2024-05-15")), None)
                .unwrap(),
            ParentSource::Explicit(DateRange::new(date("2024-05-01"), date("2024-05-15")))
        );
        assert!(ParentSource::from_args(Some(date("2024-05-01")), None, None).is_err());
        assert!(
            ParentSource::from_args(Some(date("2024-05-15")), Some(date("2024-05-01")), None)
                .is_err()
        );
        assert!(
            ParentSource::from_args(Some(date("2024-05-01")), Some(date("2024-05-15")), Some(1))
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_parent_source_resolves_mandate() {
        let source = SingleMandate(mandate("2024-05-01", "2024-05-15"));
        let range = ParentSource::Mandate(5).resolve(&source).await.unwrap();
        assert_eq!(
            range,
            Some(DateRange::new(date("2024-05-01"), date("2024-05-15")))
        );

        let err = ParentSource::Mandate(6).resolve(&source).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load parent mandate 6"));
    }

    #[tokio::test]
    async fn test_parent_source_rejects_inverted_mandate() {
        let source = SingleMandate(mandate("2024-05-15", "2024-05-01"));
        assert!(ParentSource::Mandate(5).resolve(&source).await.is_err());
    }
}
