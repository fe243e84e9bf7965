//! Car display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Car;

#[derive(Tabled)]
struct CarRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Make")]
    make: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "VIN")]
    vin: String,
}

/// Format a list of cars as a table
pub fn format_car_list(cars: &[Car]) -> String {
    if cars.is_empty() {
        return "No cars found.\n".to_string();
    }

    let mut table = Table::new(cars.iter().map(|c| CarRow {
        id: c.id.to_string(),
        make: c.make.clone(),
        model: c.model.clone(),
        year: c.year,
        vin: c.vin.clone(),
    }));
    table.with(Style::psql());
    format!("{}\n", table)
}

pub fn format_car_details(car: &Car) -> String {
    format!(
        "Car: {}\n  ID:    {}\n  Make:  {}\n  Model: {}\n  Year:  {}\n  VIN:   {}\n",
        car,
        car.id.as_uuid(),
        car.make,
        car.model,
        car.year,
        car.vin
    )
}
