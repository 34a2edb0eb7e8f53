//! Sensor reading types.
//!
//! A reading carries one sample of each physiological channel at a single
//! instant. Channels are a closed set, so per-channel work goes through
//! [`Channel`] rather than through field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the preprocessed sensor export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the sample was taken
    pub timestamp: DateTime<Utc>,
    /// Heart rate in beats per minute
    pub value_hr: f64,
    /// Electrodermal activity in microsiemens
    pub value_eda: f64,
    /// Skin temperature in degrees Celsius
    pub temp: f64,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, value_hr: f64, value_eda: f64, temp: f64) -> Self {
        Self {
            timestamp,
            value_hr,
            value_eda,
            temp,
        }
    }

    /// Value of a single channel.
    pub fn value(&self, channel: Channel) -> f64 {
        channel.value(self)
    }

    /// Smallest value across all channels.
    pub fn min_value(&self) -> f64 {
        self.value_hr.min(self.value_eda).min(self.temp)
    }

    /// Largest value across all channels.
    pub fn max_value(&self) -> f64 {
        self.value_hr.max(self.value_eda).max(self.temp)
    }
}

/// Physiological channel plotted on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    HeartRate,
    Eda,
    Temperature,
}

impl Channel {
    /// All channels in drawing order.
    pub const ALL: [Channel; 3] = [Channel::HeartRate, Channel::Eda, Channel::Temperature];

    /// Accessor for this channel's value.
    pub fn value(self, reading: &Reading) -> f64 {
        match self {
            Channel::HeartRate => reading.value_hr,
            Channel::Eda => reading.value_eda,
            Channel::Temperature => reading.temp,
        }
    }

    /// Column name in the CSV export.
    pub fn key(self) -> &'static str {
        match self {
            Channel::HeartRate => "value_hr",
            Channel::Eda => "value_eda",
            Channel::Temperature => "temp",
        }
    }

    /// Stroke and marker color.
    pub fn color(self) -> &'static str {
        match self {
            Channel::HeartRate => "red",
            Channel::Eda => "blue",
            Channel::Temperature => "green",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::HeartRate => "HR",
            Channel::Eda => "EDA",
            Channel::Temperature => "Temp",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Channel::HeartRate => "BPM",
            Channel::Eda => "µS",
            Channel::Temperature => "°C",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Reading {
        Reading::new(Utc.timestamp_opt(0, 0).unwrap(), 72.0, 0.8, 36.4)
    }

    #[test]
    fn test_channel_accessors() {
        let reading = sample();
        assert_eq!(Channel::HeartRate.value(&reading), 72.0);
        assert_eq!(Channel::Eda.value(&reading), 0.8);
        assert_eq!(Channel::Temperature.value(&reading), 36.4);
    }

    #[test]
    fn test_cross_channel_extent() {
        let reading = sample();
        assert_eq!(reading.min_value(), 0.8);
        assert_eq!(reading.max_value(), 72.0);
    }

    #[test]
    fn test_channel_colors_are_distinct() {
        let colors: Vec<&str> = Channel::ALL.iter().map(|c| c.color()).collect();
        assert_eq!(colors, vec!["red", "blue", "green"]);
    }
}
