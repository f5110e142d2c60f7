use weather_widget_core::{City, CityStatus, OpenWeatherClient, WeatherRecord};

/// One block of text per city: a headline plus detail lines when loaded.
pub fn city(city: &City) -> String {
    let header = format!("{} [{}]", city.name, city.id);

    match (city.status(), &city.weather) {
        (CityStatus::Loading, _) => format!("{header}\n  loading..."),
        (CityStatus::Failed, _) => {
            format!("{header}\n  error: {}", city.error.as_deref().unwrap_or_default())
        }
        (CityStatus::Loaded, Some(record)) => format!("{header}\n{}", weather(record)),
        _ => format!("{header}\n  no data yet"),
    }
}

fn weather(record: &WeatherRecord) -> String {
    let main = &record.main;
    let mut lines = Vec::new();

    let condition = record
        .primary_condition()
        .map(|c| c.description.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let place = match record.sys.country.as_deref() {
        Some(country) if !country.is_empty() => format!("{}, {}", record.name, country),
        _ => record.name.clone(),
    };
    lines.push(format!(
        "  {place}: {:.1}°C (feels like {:.1}°C), {condition}",
        main.temp, main.feels_like
    ));
    lines.push(format!(
        "  min {:.1}°C / max {:.1}°C, humidity {}%, pressure {} hPa",
        main.temp_min, main.temp_max, main.humidity, main.pressure
    ));

    let mut wind = format!("  wind {:.1} m/s", record.wind.speed);
    if let Some(deg) = record.wind.deg {
        wind.push_str(&format!(" from {deg:.0}°"));
    }
    if let Some(clouds) = &record.clouds {
        wind.push_str(&format!(", clouds {}%", clouds.all));
    }
    if let Some(visibility) = record.visibility {
        wind.push_str(&format!(", visibility {:.1} km", f64::from(visibility) / 1000.0));
    }
    lines.push(wind);

    let sun: Vec<String> = [("sunrise", record.sunrise_at()), ("sunset", record.sunset_at())]
        .into_iter()
        .filter_map(|(label, at)| Some(format!("{label} {}", at?.format("%H:%M"))))
        .collect();
    if !sun.is_empty() {
        lines.push(format!("  {}", sun.join(", ")));
    }
    if let Some(observed) = record.local_observed_at() {
        lines.push(format!("  observed {}", observed.format("%Y-%m-%d %H:%M (UTC%:z)")));
    }
    if let Some(condition) = record.primary_condition() {
        lines.push(format!("  icon {}", OpenWeatherClient::icon_url_for(&condition.icon)));
    }

    lines.join("\n")
}
