//! Employee records as served by the backend.
//!
//! Two record shapes exist. [`SourceEmployee`] comes straight from one
//! origin system and never carries provenance; [`UnifiedEmployee`] comes
//! from the merged view built by the ETL job and always carries its
//! [`Source`] and last-write timestamp. Keeping them as distinct types makes
//! the provenance invariant structural.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::source::Source;
use crate::timefmt;
use crate::{CalendarDate, Timestamp};

/// Identifier of a record, unique within the collection it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Boundary validation applied by the gateway after decoding.
pub trait ValidateRecord {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn check_salary(salary: Option<f64>) -> Result<(), ValidationError> {
    match salary {
        Some(value) if !value.is_finite() || value < 0.0 => Err(ValidationError::InvalidValue {
            field: "salaire".to_string(),
            reason: format!("must be a non-negative amount, got {}", value),
        }),
        _ => Ok(()),
    }
}

// ============================================================================
// SOURCE RECORD
// ============================================================================

/// A record read directly from one origin system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEmployee {
    pub id: EmployeeId,
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    #[serde(rename = "departement", default)]
    pub department: Option<String>,
    #[serde(rename = "salaire", default, deserialize_with = "timefmt::optional_number")]
    pub salary: Option<f64>,
    #[serde(rename = "date_embauche", default, deserialize_with = "timefmt::optional_date")]
    pub hire_date: Option<CalendarDate>,
}

impl ValidateRecord for SourceEmployee {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("nom", &self.name)?;
        require_text("email", &self.email)?;
        check_salary(self.salary)
    }
}

impl SourceEmployee {
    /// Pre-fill an edit form from an existing record.
    pub fn to_draft(&self) -> EmployeeDraft {
        EmployeeDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
            salary: self.salary,
            hire_date: self.hire_date,
        }
    }
}

// ============================================================================
// UNIFIED RECORD
// ============================================================================

/// A record from the merged view produced by the ETL job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedEmployee {
    pub id: EmployeeId,
    pub source: Source,
    /// Identifier of the record in its origin system, when the backend
    /// reports it.
    #[serde(default, deserialize_with = "timefmt::optional_identifier")]
    pub source_id: Option<String>,
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    #[serde(rename = "departement", default)]
    pub department: Option<String>,
    #[serde(rename = "salaire", default, deserialize_with = "timefmt::optional_number")]
    pub salary: Option<f64>,
    #[serde(rename = "date_embauche", default, deserialize_with = "timefmt::optional_date")]
    pub hire_date: Option<CalendarDate>,
    #[serde(deserialize_with = "timefmt::timestamp")]
    pub updated_at: Timestamp,
}

impl ValidateRecord for UnifiedEmployee {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("nom", &self.name)?;
        require_text("email", &self.email)?;
        check_salary(self.salary)
    }
}

// ============================================================================
// DRAFT (create / update body)
// ============================================================================

/// Request body for creating or fully replacing a record in a mutable
/// source. Carries every field except `id` and `source`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    #[serde(rename = "departement")]
    pub department: Option<String>,
    #[serde(rename = "salaire")]
    pub salary: Option<f64>,
    #[serde(rename = "date_embauche")]
    pub hire_date: Option<CalendarDate>,
}

impl EmployeeDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("nom", &self.name)?;
        require_text("email", &self.email)?;
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidValue {
                field: "email".to_string(),
                reason: "must contain '@'".to_string(),
            });
        }
        check_salary(self.salary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unified_record_requires_provenance() {
        let without_source = json!({
            "id": 1, "nom": "Awa", "email": "awa@example.com",
            "updated_at": "2024-01-01 10:00:00"
        });
        assert!(serde_json::from_value::<UnifiedEmployee>(without_source).is_err());

        let complete = json!({
            "id": 1, "source": "CSV", "source_id": "7", "nom": "Awa",
            "email": "awa@example.com", "departement": "IT",
            "salaire": "450000.00", "date_embauche": "2020-02-01",
            "updated_at": "2024-01-01 10:00:00"
        });
        let record: UnifiedEmployee = serde_json::from_value(complete).unwrap();
        assert_eq!(record.source, Source::Csv);
        assert_eq!(record.salary, Some(450000.0));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_source_record_tolerates_missing_optionals() {
        let record: SourceEmployee = serde_json::from_value(json!({
            "id": 3, "nom": "Koffi", "email": "k@example.com",
            "salaire": null, "date_embauche": ""
        }))
        .unwrap();
        assert_eq!(record.salary, None);
        assert_eq!(record.hire_date, None);
        assert_eq!(record.department, None);
    }

    #[test]
    fn test_blank_name_fails_validation() {
        let record: SourceEmployee = serde_json::from_value(json!({
            "id": 3, "nom": "  ", "email": "k@example.com"
        }))
        .unwrap();
        assert!(matches!(
            record.validate(),
            Err(ValidationError::RequiredFieldMissing { field }) if field == "nom"
        ));
    }

    #[test]
    fn test_draft_serializes_wire_names() {
        let draft = EmployeeDraft {
            name: "Fatou".to_string(),
            email: "fatou@example.com".to_string(),
            department: Some("RH".to_string()),
            salary: Some(300000.0),
            hire_date: CalendarDate::from_ymd_opt(2022, 9, 1),
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["nom"], "Fatou");
        assert_eq!(value["date_embauche"], "2022-09-01");
        assert!(value.get("id").is_none());
        assert!(value.get("source").is_none());
    }

    #[test]
    fn test_draft_rejects_negative_salary() {
        let draft = EmployeeDraft {
            name: "Fatou".to_string(),
            email: "fatou@example.com".to_string(),
            salary: Some(-1.0),
            ..EmployeeDraft::default()
        };
        assert!(draft.validate().is_err());
    }
}
