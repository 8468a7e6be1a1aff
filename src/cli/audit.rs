//! Validates every stage stored on the backend against its mandate.

use super::report::{self, RecordKind, ValidationRow};
use super::ui;
use crate::core::backend::MandateSource;
use crate::core::forms::{FormContext, MandateForm, StageForm};
use crate::core::model::Stage;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, info};

pub async fn audit_mandates(
    source: &(dyn MandateSource + Send + Sync),
    today: NaiveDate,
) -> Result<Vec<ValidationRow>> {
    let mandates = source.list_mandates().await?;
    info!(count = mandates.len(), "Auditing mandates");
    if mandates.is_empty() {
        return Ok(Vec::new());
    }

    // Stored records are audited as edits, never against today's date
    let ctx = FormContext::edit(today);

    let ids: Vec<u64> = mandates.iter().filter_map(|m| m.id).collect();
    let pb = ui::new_progress_bar(ids.len() as u64, true);
    pb.set_message("Fetching stages...");
    let stage_futures = ids.iter().map(|id| {
        let pb_clone = pb.clone();
        async move {
            let res = source.list_stages(*id).await;
            pb_clone.inc(1);
            (*id, res)
        }
    });
    let stage_results: HashMap<u64, Result<Vec<Stage>>> =
        join_all(stage_futures).await.into_iter().collect();
    pb.finish_and_clear();

    let mut rows = Vec::new();
    for mandate in &mandates {
        let form = MandateForm::from_record(mandate, &ctx);
        rows.push(ValidationRow::from_form(
            RecordKind::Mandate,
            mandate.label(),
            Some(mandate.range()),
            &form,
        ));

        let Some(id) = mandate.id else {
            debug!(reference = %mandate.reference, "Mandate without id, skipping stages");
            continue;
        };

        match stage_results.get(&id) {
            Some(Ok(stages)) => {
                for stage in stages {
                    rows.push(audit_stage(source, stage, id, &ctx).await);
                }
            }
            Some(Err(e)) => rows.push(ValidationRow::failed(
                RecordKind::Stage,
                format!("{} / *", mandate.reference),
                format!("Failed to fetch stages: {e}"),
            )),
            None => rows.push(ValidationRow::failed(
                RecordKind::Stage,
                format!("{} / *", mandate.reference),
                "Stage data not available",
            )),
        }
    }

    Ok(rows)
}

async fn audit_stage(
    source: &(dyn MandateSource + Send + Sync),
    stage: &Stage,
    listed_under: u64,
    ctx: &FormContext,
) -> ValidationRow {
    // A stage may point at another mandate than the one it was listed under
    let parent_id = stage.mandate_id.unwrap_or(listed_under);
    match source.get_mandate(parent_id).await {
        Ok(parent) => {
            let form = StageForm::from_record(stage, Some(parent.range()), ctx);
            ValidationRow::from_form(
                RecordKind::Stage,
                format!("{} / {}", parent.reference, stage.city.name),
                Some(stage.range()),
                &form,
            )
        }
        Err(e) => ValidationRow::failed(
            RecordKind::Stage,
            format!("#{parent_id} / {}", stage.city.name),
            format!("Failed to load mandate: {e}"),
        ),
    }
}

pub async fn run(source: &(dyn MandateSource + Send + Sync), today: NaiveDate) -> Result<()> {
    let rows = audit_mandates(source, today).await?;
    if rows.is_empty() {
        println!("No mandates found on the backend.");
        return Ok(());
    }

    report::display_rows("Backend audit", &rows);

    let invalid = report::invalid_count(&rows);
    if invalid > 0 {
        bail!("{invalid} record(s) failed validation");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{City, Mandate};
    use anyhow::anyhow;
    use async_trait::async_trait;

    // In-memory backend keyed by mandate id
    struct MockSource {
        mandates: Vec<Mandate>,
        stages: HashMap<u64, Vec<Stage>>,
        failing_stages: Vec<u64>,
    }

    #[async_trait]
    impl MandateSource for MockSource {
        async fn list_mandates(&self) -> Result<Vec<Mandate>> {
            Ok(self.mandates.clone())
        }

        async fn get_mandate(&self, id: u64) -> Result<Mandate> {
            self.mandates
                .iter()
                .find(|m| m.id == Some(id))
                .cloned()
                .ok_or_else(|| anyhow!("Mandate {} not found", id))
        }

        async fn list_stages(&self, mandate_id: u64) -> Result<Vec<Stage>> {
            if self.failing_stages.contains(&mandate_id) {
                return Err(anyhow!("Backend unavailable"));
            }
            Ok(self.stages.get(&mandate_id).cloned().unwrap_or_default())
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn mandate(id: u64, start: &str, end: &str) -> Mandate {
        Mandate {
            id: Some(id),
            reference: format!("MD-{id}"),
            object: String::new(),
            start_date: date(start),
            end_date: date(end),
            duration_days: None,
            status: Default::default(),
            team: vec![],
            resources: vec![],
        }
    }

    fn stage(mandate_id: Option<u64>, city: &str, start: &str, end: &str) -> Stage {
        Stage {
            id: None,
            mandate_id,
            city: City {
                id: None,
                name: city.to_string(),
            },
            start_date: date(start),
            end_date: date(end),
            duration_days: None,
        }
    }

    #[tokio::test]
    async fn test_audit_reports_out_of_range_stages() {
        let source = MockSource {
            mandates: vec![
                mandate(1, "2024-05-01", "2024-05-15"),
                mandate(2, "2024-06-01", "2024-06-30"),
            ],
            stages: HashMap::from([
                (
                    1,
                    vec![
                        stage(Some(1), "Oran", "2024-05-02", "2024-05-04"),
                        stage(Some(1), "Setif", "2024-05-10", "2024-05-16"),
                    ],
                ),
                (2, vec![stage(None, "Bejaia", "2024-06-03", "2024-06-01")]),
            ]),
            failing_stages: vec![],
        };

        // Today is after every start date; audits never apply the past-date rule
        let rows = audit_mandates(&source, date("2024-12-01")).await.unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows[0].is_valid());
        assert!(rows[1].is_valid());
        assert_eq!(rows[1].duration, Some(3));
        assert_eq!(
            rows[2].problems,
            vec!["end date exceeds parent range".to_string()]
        );
        assert_eq!(rows[3].label, "MD-2 (#2)");
        assert_eq!(rows[4].label, "MD-2 / Bejaia");
        assert_eq!(
            rows[4].problems,
            vec!["start date must not be after end date".to_string()]
        );
        assert_eq!(report::invalid_count(&rows), 2);
    }

    #[tokio::test]
    async fn test_audit_records_fetch_failures() {
        let source = MockSource {
            mandates: vec![mandate(1, "2024-05-01", "2024-05-15")],
            stages: HashMap::from([(1, vec![stage(Some(7), "Oran", "2024-05-02", "2024-05-04")])]),
            failing_stages: vec![],
        };
        let rows = audit_mandates(&source, date("2024-01-01")).await.unwrap();
        assert_eq!(rows[1].label, "#7 / Oran");
        assert!(rows[1].problems[0].contains("Failed to load mandate"));

        let source = MockSource {
            mandates: vec![mandate(1, "2024-05-01", "2024-05-15")],
            stages: HashMap::new(),
            failing_stages: vec![1],
        };
        let rows = audit_mandates(&source, date("2024-01-01")).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1].problems,
            vec!["Failed to fetch stages: Backend unavailable".to_string()]
        );
    }

    #[tokio::test]
    async fn test_run_with_empty_backend() {
        let source = MockSource {
            mandates: vec![],
            stages: HashMap::new(),
            failing_stages: vec![],
        };
        assert!(run(&source, date("2024-01-01")).await.is_ok());
    }
}
