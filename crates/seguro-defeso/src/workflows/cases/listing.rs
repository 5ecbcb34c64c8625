use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Case, CaseStatus, Claimant, Process, ProcessStatus, Solicitation, SolicitationStatus};

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Status,
    Documents,
    #[default]
    CreatedAt,
    ProcessNumber,
    Tribunal,
    FiledOn,
    Movements,
    LastMovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Comparable projection of one record for one sort field. Absent values sort as `""` or `0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Text(String),
    Number(i64),
}

fn text(value: Option<&str>) -> SortKey {
    SortKey::Text(value.unwrap_or_default().to_string())
}

fn instant(value: Option<DateTime<Utc>>) -> SortKey {
    SortKey::Number(value.map(|at| at.timestamp_millis()).unwrap_or(0))
}

fn day(value: Option<NaiveDate>) -> SortKey {
    instant(value.and_then(|date| date.and_hms_opt(0, 0, 0)).map(|at| at.and_utc()))
}

/// Record shape shared by the case, solicitation and process list views.
pub trait Listable {
    type Status: Copy + PartialEq;

    fn status(&self) -> Self::Status;
    fn status_code(&self) -> &'static str;
    fn claimant(&self) -> &Claimant;
    fn document_count(&self) -> usize;
    fn created_at(&self) -> DateTime<Utc>;

    fn process_number(&self) -> Option<&str> {
        None
    }

    fn tribunal(&self) -> Option<&str> {
        None
    }

    fn filed_on(&self) -> Option<NaiveDate> {
        None
    }

    fn movements(&self) -> Option<u32> {
        None
    }

    fn last_movement(&self) -> Option<NaiveDate> {
        None
    }

    /// Name and tribunal match case-insensitively; CPF and process number match verbatim.
    fn matches_search(&self, needle: &str) -> bool {
        let lowered = needle.to_lowercase();
        self.claimant().name.to_lowercase().contains(&lowered)
            || self.claimant().cpf.contains(needle)
            || self
                .process_number()
                .is_some_and(|number| number.contains(needle))
            || self
                .tribunal()
                .is_some_and(|tribunal| tribunal.to_lowercase().contains(&lowered))
    }

    fn sort_key(&self, field: SortField) -> SortKey {
        match field {
            SortField::Name => SortKey::Text(self.claimant().name.to_lowercase()),
            SortField::Status => SortKey::Text(self.status_code().to_string()),
            SortField::Documents => SortKey::Number(self.document_count() as i64),
            SortField::CreatedAt => instant(Some(self.created_at())),
            SortField::ProcessNumber => text(self.process_number()),
            SortField::Tribunal => text(self.tribunal()),
            SortField::FiledOn => day(self.filed_on()),
            SortField::Movements => SortKey::Number(i64::from(self.movements().unwrap_or(0))),
            SortField::LastMovement => day(self.last_movement()),
        }
    }
}

impl Listable for Case {
    type Status = CaseStatus;

    fn status(&self) -> CaseStatus {
        self.status
    }

    fn status_code(&self) -> &'static str {
        self.status.code()
    }

    fn claimant(&self) -> &Claimant {
        &self.claimant
    }

    fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn process_number(&self) -> Option<&str> {
        self.court.process_number.as_deref()
    }

    fn tribunal(&self) -> Option<&str> {
        self.court.tribunal.as_deref()
    }

    fn filed_on(&self) -> Option<NaiveDate> {
        self.court.filed_on
    }

    fn movements(&self) -> Option<u32> {
        self.court.movements
    }

    fn last_movement(&self) -> Option<NaiveDate> {
        self.court.last_movement
    }
}

impl Listable for Solicitation {
    type Status = SolicitationStatus;

    fn status(&self) -> SolicitationStatus {
        self.status
    }

    fn status_code(&self) -> &'static str {
        self.status.code()
    }

    fn claimant(&self) -> &Claimant {
        &self.claimant
    }

    fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Listable for Process {
    type Status = ProcessStatus;

    fn status(&self) -> ProcessStatus {
        self.status
    }

    fn status_code(&self) -> &'static str {
        self.status.code()
    }

    fn claimant(&self) -> &Claimant {
        &self.claimant
    }

    fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn process_number(&self) -> Option<&str> {
        Some(&self.process_number)
    }

    fn tribunal(&self) -> Option<&str> {
        Some(&self.tribunal)
    }

    fn filed_on(&self) -> Option<NaiveDate> {
        Some(self.filed_on)
    }

    fn movements(&self) -> Option<u32> {
        self.movements
    }

    fn last_movement(&self) -> Option<NaiveDate> {
        self.last_movement
    }
}

/// Filter, sort and page request for a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery<S> {
    pub search: String,
    pub status: Option<S>,
    pub sort: SortField,
    pub order: SortOrder,
    pub page: usize,
}

impl<S> Default for ListQuery<S> {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: None,
            sort: SortField::default(),
            order: SortOrder::default(),
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<S> ListQuery<S>
where
    S: Copy + PartialEq,
{
    pub fn filter<'a, T>(&self, records: &'a [T]) -> Vec<&'a T>
    where
        T: Listable<Status = S>,
    {
        records
            .iter()
            .filter(|record| {
                record.matches_search(&self.search)
                    && self.status.map_or(true, |status| record.status() == status)
            })
            .collect()
    }

    /// Filtered records in sort order. Ties keep their filtered order.
    pub fn sorted<'a, T>(&self, records: &'a [T]) -> Vec<&'a T>
    where
        T: Listable<Status = S>,
    {
        let mut keyed: Vec<(SortKey, &'a T)> = self
            .filter(records)
            .into_iter()
            .map(|record| (record.sort_key(self.sort), record))
            .collect();

        keyed.sort_by(|(left, _), (right, _)| compare(left, right, self.order));
        keyed.into_iter().map(|(_, record)| record).collect()
    }

    /// filter → sort → paginate.
    pub fn apply<T>(&self, records: &[T]) -> Page<T>
    where
        T: Listable<Status = S> + Clone,
    {
        let sorted = self.sorted(records);
        let total_items = sorted.len();
        let page = self.page.max(1);
        let start = (page - 1).saturating_mul(PAGE_SIZE);

        Page {
            items: sorted
                .into_iter()
                .skip(start)
                .take(PAGE_SIZE)
                .cloned()
                .collect(),
            page,
            page_size: PAGE_SIZE,
            total_items,
            total_pages: total_items.div_ceil(PAGE_SIZE),
        }
    }
}

fn compare(left: &SortKey, right: &SortKey, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => left.cmp(right),
        SortOrder::Desc => right.cmp(left),
    }
}

/// Interactive list controls: filters reset the page, re-selecting a sort column flips it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState<S> {
    query: ListQuery<S>,
}

impl<S> Default for ListState<S> {
    fn default() -> Self {
        Self {
            query: ListQuery::default(),
        }
    }
}

impl<S> ListState<S>
where
    S: Copy + PartialEq,
{
    pub fn query(&self) -> &ListQuery<S> {
        &self.query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.query.page = 1;
    }

    pub fn set_status(&mut self, status: Option<S>) {
        self.query.status = status;
        self.query.page = 1;
    }

    pub fn reset_filters(&mut self) {
        self.query.search.clear();
        self.query.status = None;
        self.query.page = 1;
    }

    pub fn sort_by(&mut self, field: SortField) {
        if self.query.sort == field {
            self.query.order = self.query.order.flipped();
        } else {
            self.query.sort = field;
            self.query.order = SortOrder::Asc;
        }
    }

    pub fn go_to(&mut self, page: usize) {
        self.query.page = page.max(1);
    }
}
