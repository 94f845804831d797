//! Synthetic weather series used as model input.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Hours between consecutive samples of [`simulated_series`].
pub const SAMPLE_SPACING_HOURS: u32 = 4;
const SAMPLES_PER_DAY: usize = (24 / SAMPLE_SPACING_HOURS) as usize;

/// `days` daily readings drawn uniformly from [-10, 45] °C.
pub fn historical_temperatures(days: usize, rng: &mut impl Rng) -> Vec<f64> {
    let dist = Uniform::new_inclusive(-10.0, 45.0);
    (0..days).map(|_| dist.sample(rng)).collect()
}

/// Calendar position of the first sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStart {
    /// 1..=365
    pub day_of_year: u32,
    /// 0..24
    pub hour: u32,
}

impl Default for SeriesStart {
    fn default() -> Self {
        Self {
            day_of_year: 1,
            hour: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSeries {
    /// Offset of each sample from the first one.
    pub hours: Vec<u32>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub thunderstorm_chance: Vec<f64>,
}

impl WeatherSeries {
    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

/// Six samples a day over `days_past + days_future` days, shaped by a diurnal
/// cycle, a seasonal cycle peaking at day 172 and latitude.
pub fn simulated_series(
    latitude: f64,
    days_past: usize,
    days_future: usize,
    start: SeriesStart,
    rng: &mut impl Rng,
) -> Result<WeatherSeries> {
    if !(1..=365).contains(&start.day_of_year) || start.hour >= 24 {
        return Err(ForecastError::Config(format!(
            "invalid series start day {} hour {}",
            start.day_of_year, start.hour
        )));
    }
    let noise = |sd: f64| Normal::new(0.0, sd).map_err(|e| ForecastError::Internal(e.to_string()));
    let temp_noise = noise(1.0)?;
    let humid_noise = noise(5.0)?;
    let storm_noise = noise(0.05)?;

    let base_temp = 30.0 - latitude.abs() / 2.0;
    let total = (days_past + days_future) * SAMPLES_PER_DAY;
    let mut series = WeatherSeries::default();

    for i in 0..total as u32 {
        let offset = i * SAMPLE_SPACING_HOURS;
        let absolute = start.hour + offset;
        let hour = (absolute % 24) as f64;
        let yday = ((start.day_of_year - 1 + absolute / 24) % 365 + 1) as f64;

        let hour_factor = -((hour - 14.0) * 2.0 * PI / 24.0).cos() * 5.0;
        let seasonal_factor = ((yday - 172.0) * 2.0 * PI / 365.0).cos() * 10.0;
        let temperature = base_temp + hour_factor + seasonal_factor + temp_noise.sample(rng);

        let humidity = 60.0 + (hour * 2.0 * PI / 24.0).sin() * 10.0 + humid_noise.sample(rng);

        let storm = 0.1 * (hour * 2.0 * PI / 24.0).cos().abs() + storm_noise.sample(rng);

        series.hours.push(offset);
        series.temperature.push(temperature);
        series.humidity.push(humidity);
        series.thunderstorm_chance.push(storm.clamp(0.0, 1.0) * 100.0);
    }
    Ok(series)
}

/// Independent station observations, one row per sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationReadings {
    pub temperature: Vec<f64>,
    /// hPa
    pub pressure: Vec<f64>,
    /// Percent, clamped to [0, 100].
    pub humidity: Vec<f64>,
    /// km/h
    pub wind_speed: Vec<f64>,
}

impl StationReadings {
    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }

    /// Rows of `[temperature, pressure, humidity, wind_speed]`.
    pub fn rows(&self) -> impl Iterator<Item = [f64; 4]> + '_ {
        (0..self.len()).map(|i| {
            [
                self.temperature[i],
                self.pressure[i],
                self.humidity[i],
                self.wind_speed[i],
            ]
        })
    }
}

/// `samples` observations with no time structure. Temperature and humidity
/// fall off linearly with distance from the equator.
pub fn station_readings(samples: usize, latitude: f64, rng: &mut impl Rng) -> Result<StationReadings> {
    let normal = |mean: f64, sd: f64| {
        Normal::new(mean, sd).map_err(|e| ForecastError::Internal(e.to_string()))
    };
    let temperature = normal(25.0 - latitude.abs() * 0.5, 5.0)?;
    let pressure = normal(1013.0, 10.0)?;
    let humidity = normal(60.0 - latitude.abs() * 0.3, 10.0)?;
    let wind = normal(15.0, 5.0)?;

    let mut readings = StationReadings::default();
    for _ in 0..samples {
        readings.temperature.push(temperature.sample(rng));
        readings.pressure.push(pressure.sample(rng));
        readings.humidity.push(humidity.sample(rng).clamp(0.0, 100.0));
        readings.wind_speed.push(wind.sample(rng));
    }
    Ok(readings)
}
