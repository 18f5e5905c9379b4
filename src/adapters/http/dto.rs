//! Request and response bodies, query parameters and input validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::models::{
    Condition, ConditionKind, Meal, MealInput, NewCondition, Page, PageRequest, Progress,
    ProgressInput, Workout, WorkoutInput,
};
use crate::domain::ports::{MealFilter, ProgressFilter, WorkoutFilter};

/// Default number of records per entity produced by `/generate`.
pub const DEFAULT_GENERATE_COUNT: usize = 10;

/// Upper bound on records per entity produced by `/generate`.
pub const MAX_GENERATE_COUNT: usize = 1000;

const MIN_CONDITION_NAME_LEN: usize = 2;

// Query values arrive as raw strings so that garbage falls back to the
// default instead of failing the request.

fn parse_i64(raw: Option<&String>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn parse_date(raw: Option<&String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

fn non_empty(raw: Option<&String>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).cloned()
}

#[derive(Debug, Default, Deserialize)]
pub struct MealQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub q: Option<String>,
    pub min_calories: Option<String>,
    pub max_calories: Option<String>,
}

impl MealQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::clamped(parse_i64(self.limit.as_ref()), parse_i64(self.offset.as_ref()))
    }

    /// Negative or unparseable calorie bounds mean unbounded.
    pub fn filter(&self) -> MealFilter {
        MealFilter::from_sentinels(
            self.q.as_deref().unwrap_or_default(),
            parse_i64(self.min_calories.as_ref()).unwrap_or(-1),
            parse_i64(self.max_calories.as_ref()).unwrap_or(-1),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkoutQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl WorkoutQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::clamped(parse_i64(self.limit.as_ref()), parse_i64(self.offset.as_ref()))
    }

    pub fn filter(&self) -> WorkoutFilter {
        WorkoutFilter {
            kind: non_empty(self.kind.as_ref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl ProgressQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::clamped(parse_i64(self.limit.as_ref()), parse_i64(self.offset.as_ref()))
    }

    pub fn filter(&self) -> ProgressFilter {
        ProgressFilter {
            date_from: parse_date(self.date_from.as_ref()),
            date_to: parse_date(self.date_to.as_ref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    pub count: Option<String>,
}

impl GenerateQuery {
    pub fn count(&self) -> usize {
        parse_i64(self.count.as_ref()).map_or(DEFAULT_GENERATE_COUNT, |n| {
            usize::try_from(n.max(1))
                .unwrap_or(DEFAULT_GENERATE_COUNT)
                .min(MAX_GENERATE_COUNT)
        })
    }
}

/// Body of a condition create or update.
///
/// `type` stays a string here so an unknown kind is reported as a field
/// complaint rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConditionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Field-level checks applied to request bodies before they reach the
/// repository. Returns every complaint, not just the first.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, Vec<String>>;
}

impl Validate for ConditionRequest {
    type Output = NewCondition;

    fn validate(self) -> Result<NewCondition, Vec<String>> {
        let mut complaints = Vec::new();
        let name = self.name.trim();
        if name.chars().count() < MIN_CONDITION_NAME_LEN {
            complaints.push(format!(
                "name: must be at least {MIN_CONDITION_NAME_LEN} characters"
            ));
        }
        let kind = ConditionKind::parse_known(&self.kind);
        if kind.is_none() {
            complaints.push("type: must be one of disease, injury".to_string());
        }

        match kind {
            Some(kind) if complaints.is_empty() => Ok(NewCondition {
                name: name.to_string(),
                kind,
            }),
            _ => Err(complaints),
        }
    }
}

fn check_non_negative(complaints: &mut Vec<String>, field: &str, value: i64) {
    if value < 0 {
        complaints.push(format!("{field}: must not be negative"));
    }
}

impl Validate for MealInput {
    type Output = Self;

    fn validate(self) -> Result<Self, Vec<String>> {
        let mut complaints = Vec::new();
        if self.name.trim().is_empty() {
            complaints.push("name: is required".to_string());
        }
        check_non_negative(&mut complaints, "calories", self.calories);
        check_non_negative(&mut complaints, "protein", self.protein);
        check_non_negative(&mut complaints, "carbs", self.carbs);
        check_non_negative(&mut complaints, "fat", self.fat);

        if complaints.is_empty() {
            Ok(self)
        } else {
            Err(complaints)
        }
    }
}

impl Validate for WorkoutInput {
    type Output = Self;

    fn validate(self) -> Result<Self, Vec<String>> {
        let mut complaints = Vec::new();
        if self.name.trim().is_empty() {
            complaints.push("name: is required".to_string());
        }
        check_non_negative(&mut complaints, "duration", self.duration);
        check_non_negative(&mut complaints, "calories_burned", self.calories_burned);

        if complaints.is_empty() {
            Ok(self)
        } else {
            Err(complaints)
        }
    }
}

impl Validate for Vec<ProgressInput> {
    type Output = Self;

    fn validate(self) -> Result<Self, Vec<String>> {
        let complaints: Vec<String> = self
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.weight.is_finite())
            .map(|(index, _)| format!("[{index}].weight: must be a finite number"))
            .collect();

        if complaints.is_empty() {
            Ok(self)
        } else {
            Err(complaints)
        }
    }
}

/// Reply to a create or update.
#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredResponse {
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConditionsResponse {
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MealsResponse {
    pub meals: Vec<Meal>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl MealsResponse {
    pub fn new(page: Page<Meal>, request: PageRequest) -> Self {
        Self {
            meals: page.items,
            total: page.total,
            limit: request.limit,
            offset: request.offset,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkoutsResponse {
    pub workouts: Vec<Workout>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl WorkoutsResponse {
    pub fn new(page: Page<Workout>, request: PageRequest) -> Self {
        Self {
            workouts: page.items,
            total: page.total,
            limit: request.limit,
            offset: request.offset,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub progress: Vec<Progress>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl ProgressResponse {
    pub fn new(page: Page<Progress>, request: PageRequest) -> Self {
        Self {
            progress: page.items,
            total: page.total,
            limit: request.limit,
            offset: request.offset,
        }
    }
}

/// Number of records `/generate` stored per entity kind.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub count: usize,
    pub meals: usize,
    pub workouts: usize,
    pub progress: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub endpoints: Vec<String>,
}
