//! Student record model

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Raw, already typed field values for one student.
#[derive(Debug, Clone, Validate)]
pub struct NewStudent {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub student_id: String,

    #[validate(range(min = 0.0, max = 5.0, message = "must be between 0.0 and 5.0"))]
    pub cumulative_gpa: f64,

    #[validate(range(min = 0, max = 100, message = "must be between 0 and 100"))]
    pub attendance_percentage: i32,

    // Survey-based features
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub lab_access_rating: i32,

    #[validate(range(min = 0, message = "must not be negative"))]
    pub weekly_coding_hours: i32,

    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub commute_impact: i32,
}

/// One anonymized student whose fields satisfy every constraint.
///
/// Fields are private so a record can only come from
/// [`StudentRecord::new`], [`TryFrom<NewStudent>`], a JSON object or
/// deserialization, all of which validate first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct StudentRecord {
    student_id: String,
    cumulative_gpa: f64,
    attendance_percentage: i32,
    lab_access_rating: i32,
    weekly_coding_hours: i32,
    commute_impact: i32,
}

impl StudentRecord {
    pub fn new(
        student_id: impl Into<String>,
        cumulative_gpa: f64,
        attendance_percentage: i32,
        lab_access_rating: i32,
        weekly_coding_hours: i32,
        commute_impact: i32,
    ) -> Result<Self, RecordError> {
        Self::try_from(NewStudent {
            student_id: student_id.into(),
            cumulative_gpa,
            attendance_percentage,
            lab_access_rating,
            weekly_coding_hours,
            commute_impact,
        })
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn cumulative_gpa(&self) -> f64 {
        self.cumulative_gpa
    }

    pub fn attendance_percentage(&self) -> i32 {
        self.attendance_percentage
    }
}

impl TryFrom<NewStudent> for StudentRecord {
    type Error = RecordError;

    fn try_from(raw: NewStudent) -> Result<Self, Self::Error> {
        let mut errors = match raw.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        // NaN slips through range comparisons
        if raw.cumulative_gpa.is_nan() {
            let mut error = ValidationError::new("range");
            error.message = Some("must be between 0.0 and 5.0".into());
            errors.add("cumulative_gpa", error);
        }

        if !errors.errors().is_empty() {
            return Err(RecordError::from(errors));
        }

        Ok(Self {
            student_id: raw.student_id,
            cumulative_gpa: raw.cumulative_gpa,
            attendance_percentage: raw.attendance_percentage,
            lab_access_rating: raw.lab_access_rating,
            weekly_coding_hours: raw.weekly_coding_hours,
            commute_impact: raw.commute_impact,
        })
    }
}

/// Pull one field out of a JSON object, recording a `required` or `type`
/// violation when it is absent or of the wrong kind.
fn extract<'a, T>(
    entry: &'a Map<String, Value>,
    field: &str,
    kind: &str,
    parse: impl Fn(&'a Value) -> Option<T>,
    violations: &mut Vec<FieldViolation>,
) -> Option<T> {
    match entry.get(field) {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new(field, "required", "is required"));
            None
        }
        Some(value) => {
            let parsed = parse(value);
            if parsed.is_none() {
                violations.push(FieldViolation::new(field, "type", format!("must be {}", kind)));
            }
            parsed
        }
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|n| i32::try_from(n).ok())
}

impl TryFrom<&Map<String, Value>> for StudentRecord {
    type Error = RecordError;

    /// Missing and mistyped fields are reported together with the range
    /// violations of the fields that did parse.
    fn try_from(entry: &Map<String, Value>) -> Result<Self, Self::Error> {
        let mut violations = Vec::new();

        let student_id = extract(entry, "student_id", "a string", Value::as_str, &mut violations);
        let cumulative_gpa = extract(entry, "cumulative_gpa", "a number", Value::as_f64, &mut violations);
        let attendance_percentage =
            extract(entry, "attendance_percentage", "an integer", as_i32, &mut violations);
        let lab_access_rating =
            extract(entry, "lab_access_rating", "an integer", as_i32, &mut violations);
        let weekly_coding_hours =
            extract(entry, "weekly_coding_hours", "an integer", as_i32, &mut violations);
        let commute_impact = extract(entry, "commute_impact", "an integer", as_i32, &mut violations);

        // Absent fields take in-range stand-ins so the present ones still get checked
        let raw = NewStudent {
            student_id: student_id.unwrap_or("-").to_string(),
            cumulative_gpa: cumulative_gpa.unwrap_or(0.0),
            attendance_percentage: attendance_percentage.unwrap_or(0),
            lab_access_rating: lab_access_rating.unwrap_or(1),
            weekly_coding_hours: weekly_coding_hours.unwrap_or(0),
            commute_impact: commute_impact.unwrap_or(1),
        };

        match StudentRecord::try_from(raw) {
            Ok(record) if violations.is_empty() => Ok(record),
            Ok(_) => Err(RecordError::from_violations(violations)),
            Err(err) => {
                violations.extend(err.violations);
                Err(RecordError::from_violations(violations))
            }
        }
    }
}

impl TryFrom<Map<String, Value>> for StudentRecord {
    type Error = RecordError;

    fn try_from(entry: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::try_from(&entry)
    }
}

/// A single violated field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Every constraint a candidate record violated, ordered by field name.
#[derive(Debug, Clone, Error)]
#[error(
    "invalid student record: {}",
    .violations.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
)]
pub struct RecordError {
    violations: Vec<FieldViolation>,
}

impl RecordError {
    fn from_violations(mut violations: Vec<FieldViolation>) -> Self {
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        Self { violations }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }
}

impl From<ValidationErrors> for RecordError {
    fn from(errors: ValidationErrors) -> Self {
        let violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| FieldViolation {
                    field: field.clone(),
                    code: e.code.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();

        Self::from_violations(violations)
    }
}
