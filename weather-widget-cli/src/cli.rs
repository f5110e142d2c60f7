use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode};
use weather_widget_core::{
    CityId, CityList, Config, Coordinates, MountError, OpenWeatherClient, WidgetError,
    config::API_KEY_ENV,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Current weather for your saved cities")]
pub struct Cli {
    /// API key to use instead of the configured one.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional home location.
    Configure,

    /// Fetch and show the weather for every saved city.
    Show,

    /// Add a city by name.
    Add {
        /// City name, e.g. "Lisbon" or "Portland,US".
        name: String,
    },

    /// Add the city at the current location.
    AddHere {
        /// Latitude; defaults to the configured home location.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude; defaults to the configured home location.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Remove a saved city by id or name.
    Remove {
        city: String,
    },

    /// Print the image URL for a provider icon code.
    Icon {
        code: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Icon { code } => {
                println!("{}", OpenWeatherClient::icon_url_for(&code));
                Ok(())
            }
            Command::Show => {
                let list = mount(load_config(self.api_key)?)?;
                list.initialize();
                tracing::debug!(cities = list.len(), "waiting for weather");
                list.settled().await;
                print_list(&list);
                Ok(())
            }
            Command::Add { name } => {
                let list = mount(load_config(self.api_key)?)?;
                list.initialize();
                list.add_by_name(&name)?;
                list.settled().await;
                print_list(&list);
                Ok(())
            }
            Command::AddHere { lat, lon } => {
                let mut config = load_config(self.api_key)?;
                if let (Some(lat), Some(lon)) = (lat, lon) {
                    config.home = Some(Coordinates::new(lat, lon));
                }

                let list = mount(config)?;
                list.initialize();
                let added = list.add_by_location().await.map_err(location_hint)?;
                list.settled().await;

                if let Some(city) = list.city(&added) {
                    println!("Added {}", city.name);
                }
                print_list(&list);
                Ok(())
            }
            Command::Remove { city } => {
                let list = mount(load_config(self.api_key)?)?;
                list.restore();

                let id = list
                    .find_by_name(&city)
                    .map(|c| c.id)
                    .unwrap_or_else(|| CityId::from(city.trim()));

                if !list.remove(&id) {
                    bail!("No saved city matches '{city}'.");
                }
                println!("Removed {city}");
                Ok(())
            }
        }
    }
}

fn load_config(api_key: Option<String>) -> Result<Config> {
    let mut config = Config::load()?.with_env_overrides();
    config.override_api_key(api_key);
    Ok(config)
}

/// Build the city list, reporting a missing key separately from everything else.
fn mount(config: Config) -> Result<CityList> {
    CityList::from_config(&config).map_err(|err| match err {
        MountError::MissingApiKey => anyhow!(
            "No API key configured.\n\
             Hint: run `weather-widget configure`, pass --api-key or set {API_KEY_ENV}."
        ),
        other => anyhow!(other).context("Failed to start the weather widget"),
    })
}

fn location_hint(err: WidgetError) -> anyhow::Error {
    match err {
        WidgetError::Location(inner) => anyhow!(
            "{inner}\nHint: pass --lat/--lon or set a home location with `weather-widget configure`."
        ),
        other => other.into(),
    }
}

fn print_list(list: &CityList) {
    let cities = list.cities();
    if cities.is_empty() {
        println!("No cities yet. Add one with `weather-widget add <NAME>`.");
        return;
    }

    for city in &cities {
        println!("{}", render::city(city));
    }
}

fn configure() -> Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);
    config.api_key().map_err(|_| anyhow!("The API key must not be empty."))?;

    let set_home = Confirm::new("Set a home location for `add-here`?")
        .with_default(config.home.is_some())
        .prompt()
        .context("Failed to read answer")?;

    if set_home {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number, e.g. 52.52")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number, e.g. 13.405")
            .prompt()
            .context("Failed to read longitude")?;
        config.home = Some(Coordinates::new(latitude, longitude));
    } else {
        config.home = None;
    }

    config.save()?;
    tracing::debug!(path = %path.display(), "configuration saved");
    println!("Configuration saved to {}", path.display());
    Ok(())
}
