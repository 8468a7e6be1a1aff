//! Validates a local plan file of mandates with their stages and mission
//! orders by replaying every record through its form.

use super::report::{self, RecordKind, ValidationRow};
use crate::core::config::FormsConfig;
use crate::core::forms::{Form, FormContext, MandateForm, MissionOrderForm, StageForm};
use crate::core::model::{Mandate, MissionOrder, Stage};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct PlanFile {
    #[serde(default)]
    pub mandates: Vec<PlannedMandate>,
}

#[derive(Debug, Deserialize)]
pub struct PlannedMandate {
    #[serde(flatten)]
    pub mandate: Mandate,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub mission_orders: Vec<MissionOrder>,
}

pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<PlanFile> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file: {}", path.display()))?;
    let plan: PlanFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse plan file: {}", path.display()))?;
    debug!(mandates = plan.mandates.len(), "Loaded plan file");
    Ok(plan)
}

// New records go through the create flow, existing ones through the edit flow
fn context_for(id: Option<u64>, today: NaiveDate, forms: &FormsConfig) -> FormContext {
    if id.is_none() && forms.reject_past_start_on_create {
        FormContext::create(today)
    } else {
        FormContext::edit(today)
    }
}

pub fn check_plan(plan: &PlanFile, today: NaiveDate, forms: &FormsConfig) -> Vec<ValidationRow> {
    let mut rows = Vec::new();

    for planned in &plan.mandates {
        let mandate = &planned.mandate;
        let ctx = context_for(mandate.id, today, forms);
        let mandate_form = MandateForm::from_record(mandate, &ctx);
        // Children are held to the declared dates even when they are inverted
        let parent = Some(mandate.range());
        info!(mandate = %mandate.label(), "Checking mandate");

        let mut row = ValidationRow::from_form(
            RecordKind::Mandate,
            mandate.label(),
            Some(mandate.range()),
            &mandate_form,
        );
        row.problems.extend(stored_duration_mismatch(
            mandate.duration_days,
            mandate_form.duration(),
        ));
        rows.push(row);

        for stage in &planned.stages {
            let ctx = context_for(stage.id, today, forms);
            let form = StageForm::from_record(stage, parent, &ctx);
            let mut row = ValidationRow::from_form(
                RecordKind::Stage,
                format!("{} / {}", mandate.reference, stage.city.name),
                Some(stage.range()),
                &form,
            );
            row.problems
                .extend(stored_duration_mismatch(stage.duration_days, form.duration()));
            rows.push(row);
        }

        for order in &planned.mission_orders {
            let ctx = context_for(order.id, today, forms);
            let form = MissionOrderForm::from_record(order, parent, &ctx);
            let split = *form.decomposition();
            let mut row = ValidationRow::from_form(
                RecordKind::MissionOrder,
                format!("{} / {}", mandate.reference, order.holder),
                Some(order.range()),
                &form,
            )
            .with_amounts(split);
            row.problems
                .extend(stored_duration_mismatch(order.duration_days, form.duration()));
            if order.advance.is_some_and(|stored| stored != split.advance) {
                row.problems.push(format!(
                    "stored advance differs from computed {}",
                    split.advance
                ));
            }
            if order.balance.is_some_and(|stored| stored != split.balance) {
                row.problems.push(format!(
                    "stored balance differs from computed {}",
                    split.balance
                ));
            }
            rows.push(row);
        }
    }

    rows
}

fn stored_duration_mismatch(stored: Option<i64>, computed: Option<i64>) -> Option<String> {
    match (stored, computed) {
        (Some(stored), Some(computed)) if stored != computed => Some(format!(
            "stored duration {stored} differs from computed {computed}"
        )),
        _ => None,
    }
}

pub fn run<P: AsRef<Path>>(path: P, today: NaiveDate, forms: &FormsConfig) -> Result<()> {
    let plan = load_plan(&path)?;
    if plan.mandates.is_empty() {
        println!("No mandates found in plan file.");
        return Ok(());
    }

    let rows = check_plan(&plan, today, forms);
    report::display_rows(
        &format!("Plan: {}", path.as_ref().display()),
        &rows,
    );

    let invalid = report::invalid_count(&rows);
    if invalid > 0 {
        bail!("{invalid} record(s) failed validation");
    }
    Ok(())
}
