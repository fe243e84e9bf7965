//! Car service
//!
//! Same lifecycle as books. Cars carry the not-auditable override, so their
//! commits never add audit entries.

use tracing::instrument;

use crate::audit::{CommitHook, Entity};
use crate::error::{AuditError, AuditResult};
use crate::models::{Car, CarId};
use crate::storage::Store;

/// Partial update of a car; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct CarUpdate {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
}

impl CarUpdate {
    pub fn is_empty(&self) -> bool {
        self.make.is_none() && self.model.is_none() && self.year.is_none() && self.vin.is_none()
    }

    pub fn apply(self, car: &mut Car) {
        if let Some(v) = self.make {
            car.make = v;
        }
        if let Some(v) = self.model {
            car.model = v;
        }
        if let Some(v) = self.year {
            car.year = v;
        }
        if let Some(v) = self.vin {
            car.vin = v;
        }
    }
}

/// Service for car management
pub struct CarService<'a> {
    store: &'a Store,
    hook: &'a CommitHook<'a>,
}

impl<'a> CarService<'a> {
    pub fn new(store: &'a Store, hook: &'a CommitHook<'a>) -> Self {
        Self { store, hook }
    }

    #[instrument(skip_all, fields(make = %car.make))]
    pub fn create(&self, mut car: Car) -> AuditResult<Car> {
        if car.id.as_uuid().is_nil() {
            car.id = CarId::new();
        }
        car.validate()
            .map_err(|e| AuditError::Validation(e.to_string()))?;

        let mut session = self.store.begin()?;
        session.add(&car)?;
        self.hook.commit(session)?;

        Ok(car)
    }

    #[instrument(skip_all, fields(car = %id))]
    pub fn update(&self, id: CarId, update: CarUpdate) -> AuditResult<Car> {
        let mut car = self
            .get(id)?
            .ok_or_else(|| AuditError::car_not_found(id.to_string()))?;

        update.apply(&mut car);
        car.validate()
            .map_err(|e| AuditError::Validation(e.to_string()))?;

        let mut session = self.store.begin()?;
        session.update(&car)?;
        self.hook.commit(session)?;

        Ok(car)
    }

    #[instrument(skip_all, fields(car = %id))]
    pub fn delete(&self, id: CarId) -> AuditResult<Car> {
        let mut session = self.store.begin()?;
        let car: Car = session
            .find(*id.as_uuid())?
            .ok_or_else(|| AuditError::car_not_found(id.to_string()))?;

        session.remove::<Car>(car.key())?;
        self.hook.commit(session)?;

        Ok(car)
    }

    pub fn get(&self, id: CarId) -> AuditResult<Option<Car>> {
        self.store.get(*id.as_uuid())
    }

    /// Find a car by id, short id (`car-1a2b3c4d`) or VIN
    pub fn find(&self, identifier: &str) -> AuditResult<Option<Car>> {
        if let Ok(id) = identifier.parse::<CarId>() {
            return self.get(id);
        }

        let needle = identifier.trim();
        Ok(self.list()?.into_iter().find(|c| {
            c.id.to_string() == needle.to_lowercase() || (!c.vin.is_empty() && c.vin == needle)
        }))
    }

    /// All cars, sorted by make, model and year
    pub fn list(&self) -> AuditResult<Vec<Car>> {
        let mut cars: Vec<Car> = self.store.list()?;
        cars.sort_by(|a, b| {
            a.make
                .cmp(&b.make)
                .then_with(|| a.model.cmp(&b.model))
                .then(a.year.cmp(&b.year))
        });
        Ok(cars)
    }
}
