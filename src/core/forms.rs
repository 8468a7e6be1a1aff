//! Form state for mandates, stages and mission orders.
//!
//! A form is an immutable value. Every field change goes through `reduce`,
//! which returns a new form with the derived fields (duration, errors, and for
//! mission orders the advance/balance split) recomputed from scratch.

use super::derivation::{DateRange, RangeError, RangeRules, derive_range, join_errors};
use super::model::{City, Grade, Mandate, MissionOrder, Stage, TeamMember};
use super::money::{AmountError, MonetaryDecomposition, decompose, validate_amounts};
use super::status::{MandateStatus, MissionOrderStatus};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::Display;
use tracing::debug;

/// Inputs a reducer needs besides the event itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormContext {
    pub today: NaiveDate,
    pub rules: RangeRules,
}

impl FormContext {
    pub fn create(today: NaiveDate) -> Self {
        Self {
            today,
            rules: RangeRules::create(),
        }
    }

    pub fn edit(today: NaiveDate) -> Self {
        Self {
            today,
            rules: RangeRules::edit(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormError {
    Range(RangeError),
    Amount(AmountError),
}

impl Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::Range(e) => write!(f, "{e}"),
            FormError::Amount(e) => write!(f, "{e}"),
        }
    }
}

impl From<RangeError> for FormError {
    fn from(e: RangeError) -> Self {
        FormError::Range(e)
    }
}

impl From<AmountError> for FormError {
    fn from(e: AmountError) -> Self {
        FormError::Amount(e)
    }
}

pub trait Form: Sized {
    type Event: std::fmt::Debug;
    type Record;

    /// Applies one field change and recomputes every derived field.
    fn reduce(&self, event: Self::Event, ctx: &FormContext) -> Self;

    fn duration(&self) -> Option<i64>;

    fn errors(&self) -> &[FormError];

    /// Builds the record to submit. Fails while the form cannot be submitted.
    fn to_record(&self) -> Result<Self::Record>;

    fn can_submit(&self) -> bool {
        self.errors().is_empty() && self.duration().is_some()
    }

    fn replay<I>(self, events: I, ctx: &FormContext) -> Self
    where
        I: IntoIterator<Item = Self::Event>,
    {
        events
            .into_iter()
            .fold(self, |form, event| form.reduce(event, ctx))
    }
}

fn derive_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    parent: Option<&DateRange>,
    today: NaiveDate,
    rules: RangeRules,
) -> (Option<i64>, Vec<FormError>) {
    let derived = derive_range(start, end, today, parent, rules);
    let errors = derived.errors.into_iter().map(FormError::from).collect();
    (derived.duration, errors)
}

fn required_dates(
    kind: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    errors: &[FormError],
) -> Result<(NaiveDate, NaiveDate)> {
    if !errors.is_empty() {
        bail!("{kind} form has validation errors: {}", join_errors(errors));
    }
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => bail!("{kind} form is missing its start or end date"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MandateEvent {
    SetReference(String),
    SetObject(String),
    SetStart(Option<NaiveDate>),
    SetEnd(Option<NaiveDate>),
    SetStatus(MandateStatus),
    AddMember(TeamMember),
    AddResource(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MandateForm {
    id: Option<u64>,
    reference: String,
    object: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    status: MandateStatus,
    team: Vec<TeamMember>,
    resources: Vec<String>,
    duration: Option<i64>,
    errors: Vec<FormError>,
}

impl MandateForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an existing mandate for editing.
    pub fn from_record(mandate: &Mandate, ctx: &FormContext) -> Self {
        Self {
            id: mandate.id,
            reference: mandate.reference.clone(),
            object: mandate.object.clone(),
            start: Some(mandate.start_date),
            end: Some(mandate.end_date),
            status: mandate.status,
            team: mandate.team.clone(),
            resources: mandate.resources.clone(),
            duration: None,
            errors: Vec::new(),
        }
        .recompute(ctx)
    }

    pub fn status(&self) -> MandateStatus {
        self.status
    }

    pub fn range(&self) -> Option<DateRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end => Some(DateRange::new(start, end)),
            _ => None,
        }
    }

    fn recompute(mut self, ctx: &FormContext) -> Self {
        let (duration, errors) = derive_dates(self.start, self.end, None, ctx.today, ctx.rules);
        self.duration = duration;
        self.errors = errors;
        self
    }
}

impl Form for MandateForm {
    type Event = MandateEvent;
    type Record = Mandate;

    fn reduce(&self, event: MandateEvent, ctx: &FormContext) -> Self {
        debug!(?event, reference = %self.reference, "Mandate form event");
        let mut next = self.clone();
        match event {
            MandateEvent::SetReference(reference) => next.reference = reference,
            MandateEvent::SetObject(object) => next.object = object,
            MandateEvent::SetStart(date) | MandateEvent::SetEnd(date)
                if !self.status.is_editable() =>
            {
                debug!(?date, status = %self.status, "Ignoring date change on locked mandate");
            }
            MandateEvent::SetStart(start) => next.start = start,
            MandateEvent::SetEnd(end) => next.end = end,
            MandateEvent::SetStatus(status) => {
                if self.status.can_transition_to(status) {
                    next.status = status;
                } else {
                    debug!(from = %self.status, to = %status, "Rejected mandate status change");
                }
            }
            MandateEvent::AddMember(member) if !self.status.is_editable() => {
                debug!(
                    member = %member.name,
                    status = %self.status,
                    "Ignoring team change on locked mandate"
                );
            }
            MandateEvent::AddMember(member) => next.team.push(member),
            MandateEvent::AddResource(resource) => next.resources.push(resource),
        }
        next.recompute(ctx)
    }

    fn duration(&self) -> Option<i64> {
        self.duration
    }

    fn errors(&self) -> &[FormError] {
        &self.errors
    }

    fn to_record(&self) -> Result<Mandate> {
        if self.reference.trim().is_empty() {
            bail!("Mandate form is missing its reference");
        }
        let (start_date, end_date) = required_dates("Mandate", self.start, self.end, &self.errors)?;
        Ok(Mandate {
            id: self.id,
            reference: self.reference.clone(),
            object: self.object.clone(),
            start_date,
            end_date,
            duration_days: self.duration,
            status: self.status,
            team: self.team.clone(),
            resources: self.resources.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    SetCity(City),
    SetStart(Option<NaiveDate>),
    SetEnd(Option<NaiveDate>),
    SetParent(Option<DateRange>),
}

/// A stage is always checked against its mandate. The past-date rule never
/// applies to stages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageForm {
    id: Option<u64>,
    mandate_id: Option<u64>,
    city: Option<City>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    parent: Option<DateRange>,
    duration: Option<i64>,
    errors: Vec<FormError>,
}

impl StageForm {
    pub fn new(mandate_id: Option<u64>, parent: Option<DateRange>) -> Self {
        Self {
            mandate_id,
            parent,
            ..Self::default()
        }
    }

    pub fn from_record(stage: &Stage, parent: Option<DateRange>, ctx: &FormContext) -> Self {
        Self {
            id: stage.id,
            mandate_id: stage.mandate_id,
            city: Some(stage.city.clone()),
            start: Some(stage.start_date),
            end: Some(stage.end_date),
            parent,
            duration: None,
            errors: Vec::new(),
        }
        .recompute(ctx)
    }

    pub fn parent(&self) -> Option<DateRange> {
        self.parent
    }

    fn recompute(mut self, ctx: &FormContext) -> Self {
        let (duration, errors) = derive_dates(
            self.start,
            self.end,
            self.parent.as_ref(),
            ctx.today,
            RangeRules::edit(),
        );
        self.duration = duration;
        self.errors = errors;
        self
    }
}

impl Form for StageForm {
    type Event = StageEvent;
    type Record = Stage;

    fn reduce(&self, event: StageEvent, ctx: &FormContext) -> Self {
        debug!(?event, "Stage form event");
        let mut next = self.clone();
        match event {
            StageEvent::SetCity(city) => next.city = Some(city),
            StageEvent::SetStart(start) => next.start = start,
            StageEvent::SetEnd(end) => next.end = end,
            StageEvent::SetParent(parent) => next.parent = parent,
        }
        next.recompute(ctx)
    }

    fn duration(&self) -> Option<i64> {
        self.duration
    }

    fn errors(&self) -> &[FormError] {
        &self.errors
    }

    fn to_record(&self) -> Result<Stage> {
        let Some(city) = &self.city else {
            bail!("Stage form is missing its city");
        };
        let (start_date, end_date) = required_dates("Stage", self.start, self.end, &self.errors)?;
        Ok(Stage {
            id: self.id,
            mandate_id: self.mandate_id,
            city: city.clone(),
            start_date,
            end_date,
            duration_days: self.duration,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissionOrderEvent {
    SetHolder(String),
    SetGrade(Option<Grade>),
    SetStart(Option<NaiveDate>),
    SetEnd(Option<NaiveDate>),
    SetParent(Option<DateRange>),
    SetTotal(Decimal),
    SetRate(Decimal),
    SetStatus(MissionOrderStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionOrderForm {
    id: Option<u64>,
    mandate_id: Option<u64>,
    holder: String,
    grade: Option<Grade>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    parent: Option<DateRange>,
    total: Decimal,
    rate: Decimal,
    status: MissionOrderStatus,
    duration: Option<i64>,
    errors: Vec<FormError>,
    decomposition: MonetaryDecomposition,
}

impl MissionOrderForm {
    pub fn new(mandate_id: Option<u64>, parent: Option<DateRange>, default_rate: Decimal) -> Self {
        Self {
            id: None,
            mandate_id,
            holder: String::new(),
            grade: None,
            start: None,
            end: None,
            parent,
            total: Decimal::ZERO,
            rate: default_rate,
            status: MissionOrderStatus::default(),
            duration: None,
            errors: Vec::new(),
            decomposition: decompose(Decimal::ZERO, default_rate),
        }
    }

    pub fn from_record(
        order: &MissionOrder,
        parent: Option<DateRange>,
        ctx: &FormContext,
    ) -> Self {
        Self {
            id: order.id,
            mandate_id: order.mandate_id,
            holder: order.holder.clone(),
            grade: order.grade.clone(),
            start: Some(order.start_date),
            end: Some(order.end_date),
            parent,
            total: order.total_amount,
            rate: order.advance_rate,
            status: order.status,
            duration: None,
            errors: Vec::new(),
            decomposition: decompose(order.total_amount, order.advance_rate),
        }
        .recompute(ctx)
    }

    pub fn decomposition(&self) -> &MonetaryDecomposition {
        &self.decomposition
    }

    pub fn status(&self) -> MissionOrderStatus {
        self.status
    }

    fn recompute(mut self, ctx: &FormContext) -> Self {
        let (duration, mut errors) = derive_dates(
            self.start,
            self.end,
            self.parent.as_ref(),
            ctx.today,
            ctx.rules,
        );
        errors.extend(
            validate_amounts(self.total, self.rate)
                .into_iter()
                .map(FormError::from),
        );
        self.duration = duration;
        self.errors = errors;
        self.decomposition = decompose(self.total, self.rate);
        self
    }
}

impl Form for MissionOrderForm {
    type Event = MissionOrderEvent;
    type Record = MissionOrder;

    fn reduce(&self, event: MissionOrderEvent, ctx: &FormContext) -> Self {
        debug!(?event, holder = %self.holder, "Mission order form event");
        let mut next = self.clone();
        match event {
            MissionOrderEvent::SetHolder(holder) => next.holder = holder,
            MissionOrderEvent::SetGrade(grade) => next.grade = grade,
            MissionOrderEvent::SetStart(start) => next.start = start,
            MissionOrderEvent::SetEnd(end) => next.end = end,
            MissionOrderEvent::SetParent(parent) => next.parent = parent,
            MissionOrderEvent::SetTotal(total) => next.total = total,
            MissionOrderEvent::SetRate(rate) => next.rate = rate,
            MissionOrderEvent::SetStatus(status) => {
                if self.status.can_transition_to(status) {
                    next.status = status;
                } else {
                    debug!(from = %self.status, to = %status, "Rejected mission order status change");
                }
            }
        }
        next.recompute(ctx)
    }

    fn duration(&self) -> Option<i64> {
        self.duration
    }

    fn errors(&self) -> &[FormError] {
        &self.errors
    }

    fn to_record(&self) -> Result<MissionOrder> {
        if self.holder.trim().is_empty() {
            bail!("Mission order form is missing its holder");
        }
        let (start_date, end_date) =
            required_dates("Mission order", self.start, self.end, &self.errors)?;
        Ok(MissionOrder {
            id: self.id,
            mandate_id: self.mandate_id,
            holder: self.holder.clone(),
            grade: self.grade.clone(),
            start_date,
            end_date,
            duration_days: self.duration,
            total_amount: self.total,
            advance_rate: self.decomposition.advance_rate_percent,
            advance: Some(self.decomposition.advance),
            balance: Some(self.decomposition.balance),
            status: self.status,
        })
    }
}
