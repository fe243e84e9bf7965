//! Car model
//!
//! Declared auditable but carries the not-auditable override, which wins:
//! car mutations never produce audit entries. The type is also marked
//! sensitive as a whole.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ids::CarId;
use crate::audit::{Entity, EntityDescriptor, FieldDef, FieldSnapshot};

const CAR_FIELDS: &[FieldDef] = &[
    FieldDef::plain("ID"),
    FieldDef::plain("Make"),
    FieldDef::plain("Model"),
    FieldDef::plain("Year"),
    FieldDef::plain("VIN"),
];

/// Length of a modern vehicle identification number
pub const VIN_LENGTH: usize = 17;

/// A car
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Car {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: String,
}

impl Car {
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: CarId::new(),
            make: make.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Validate the car
    pub fn validate(&self) -> Result<(), CarValidationError> {
        if self.make.trim().is_empty() {
            return Err(CarValidationError::EmptyMake);
        }

        if !self.vin.is_empty() && self.vin.chars().count() != VIN_LENGTH {
            return Err(CarValidationError::InvalidVin(self.vin.clone()));
        }

        Ok(())
    }
}

impl Entity for Car {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor::new("Car", "Cars")
        .auditable()
        .not_auditable()
        .type_sensitive()
        .id_field("ID")
        .fields(CAR_FIELDS);

    fn key(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new()
            .with("ID", *self.id.as_uuid())
            .with("Make", self.make.as_str())
            .with("Model", self.model.as_str())
            .with("Year", self.year)
            .with("VIN", self.vin.as_str())
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year > 0 {
            write!(f, "{} {} {}", self.year, self.make, self.model)
        } else {
            write!(f, "{} {}", self.make, self.model)
        }
    }
}

/// Validation errors for cars
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarValidationError {
    EmptyMake,
    InvalidVin(String),
}

impl fmt::Display for CarValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMake => write!(f, "Car make cannot be empty"),
            Self::InvalidVin(vin) => {
                write!(f, "VIN must be {} characters, got '{}'", VIN_LENGTH, vin)
            }
        }
    }
}

impl std::error::Error for CarValidationError {}
