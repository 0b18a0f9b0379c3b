//! Interactive `nowcast configure`.

use anyhow::{Context, Result};
use inquire::{CustomType, Password, PasswordDisplayMode, Select};
use nowcast_core::{Config, Coordinates, LocationMode, TemperatureUnit};

pub fn run() -> Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(if config.api_key.is_some() {
            "Leave empty to keep the current key"
        } else {
            "Get one at https://www.weatherapi.com/my/"
        })
        .prompt()
        .context("Failed to read API key")?;
    if !key.trim().is_empty() {
        config.set_api_key(key);
    }

    let units = vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    let cursor = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    config.unit = Select::new("Default temperature unit:", units)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read temperature unit")?;

    let modes = LocationMode::all().to_vec();
    let cursor = modes.iter().position(|m| *m == config.location.mode).unwrap_or(0);
    let mode = Select::new("Location source for `nowcast here`:", modes)
        .with_starting_cursor(cursor)
        .with_help_message("ip: look up by public IP, fixed: enter coordinates, disabled: never")
        .prompt()
        .context("Failed to read location source")?;

    match mode {
        LocationMode::Fixed => {
            let coords = prompt_coordinates(&config)?;
            config.set_fixed_location(coords.latitude, coords.longitude);
        }
        other => config.location.mode = other,
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn prompt_coordinates(config: &Config) -> Result<Coordinates> {
    loop {
        let mut latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Enter a decimal number, e.g. 51.5");
        if let Some(lat) = config.location.latitude {
            latitude = latitude.with_default(lat);
        }
        let latitude = latitude.prompt().context("Failed to read latitude")?;

        let mut longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Enter a decimal number, e.g. -0.12");
        if let Some(lon) = config.location.longitude {
            longitude = longitude.with_default(lon);
        }
        let longitude = longitude.prompt().context("Failed to read longitude")?;

        let coords = Coordinates::new(latitude, longitude);
        match coords.validate() {
            Ok(()) => return Ok(coords),
            Err(e) => eprintln!("{e}; latitude must be within ±90 and longitude within ±180."),
        }
    }
}
