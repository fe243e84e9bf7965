//! Car CLI commands

use clap::Subcommand;

use crate::audit::CommitHook;
use crate::display::{format_car_details, format_car_list};
use crate::error::{AuditError, AuditResult};
use crate::models::Car;
use crate::services::{CarService, CarUpdate};
use crate::storage::Store;

/// Car subcommands
#[derive(Subcommand, Debug)]
pub enum CarCommands {
    /// Add a car
    Add {
        make: String,
        model: String,
        #[arg(long)]
        year: Option<i32>,
        /// 17-character vehicle identification number
        #[arg(long)]
        vin: Option<String>,
    },
    /// Update a car
    Update {
        /// Car ID or VIN
        car: String,
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        vin: Option<String>,
    },
    /// Delete a car
    Delete {
        /// Car ID or VIN
        car: String,
    },
    /// List all cars
    List,
    /// Show car details
    Show {
        /// Car ID or VIN
        car: String,
    },
}

/// Handle a car command
pub fn handle_car_command(store: &Store, hook: &CommitHook<'_>, cmd: CarCommands) -> AuditResult<()> {
    let service = CarService::new(store, hook);

    match cmd {
        CarCommands::Add {
            make,
            model,
            year,
            vin,
        } => {
            let mut car = Car::new(make, model);
            car.year = year.unwrap_or_default();
            car.vin = vin.unwrap_or_default();

            let car = service.create(car)?;
            println!("Added car: {}", car);
            println!("  ID: {}", car.id);
        }

        CarCommands::Update {
            car,
            make,
            model,
            year,
            vin,
        } => {
            let found = service
                .find(&car)?
                .ok_or_else(|| AuditError::car_not_found(&car))?;

            let update = CarUpdate {
                make,
                model,
                year,
                vin,
            };
            if update.is_empty() {
                println!("No changes specified. Use --make, --model, --year or --vin.");
                return Ok(());
            }

            let updated = service.update(found.id, update)?;
            println!("Updated car: {}", updated);
        }

        CarCommands::Delete { car } => {
            let found = service
                .find(&car)?
                .ok_or_else(|| AuditError::car_not_found(&car))?;
            let deleted = service.delete(found.id)?;
            println!("Deleted car: {}", deleted);
        }

        CarCommands::List => {
            print!("{}", format_car_list(&service.list()?));
        }

        CarCommands::Show { car } => {
            let found = service
                .find(&car)?
                .ok_or_else(|| AuditError::car_not_found(&car))?;
            print!("{}", format_car_details(&found));
        }
    }

    Ok(())
}
