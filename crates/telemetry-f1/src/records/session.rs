//! Session packet (ID 1).
//!
//! Body offsets (from the end of the header):
//! - 0-18: weather, temperatures, laps, track length, session type, track id,
//!   formula, time left/duration, pit speed limit, paused, spectating flags
//! - 18: numMarshalZones, 19-123: 21 × MarshalZone (5 bytes)
//! - 124-126: safetyCarStatus, networkGame, numWeatherForecastSamples
//! - 127-638: 64 × WeatherForecastSample (8 bytes)
//! - 639-655: forecast accuracy, AI difficulty, link ids, pit window
//! - 676-678: safety car / VSC / red flag period counts
//! - 716-723: sector 2/3 start distances
//!
//! The assist and rule-set bytes in between are skipped.

use serde::{Deserialize, Serialize};

use crate::byte_reader::ByteReader;
use crate::catalog::{HEADER_SIZE, track_name_from_id};
use crate::error::Result;

const MAX_MARSHAL_ZONES: usize = 21;
const MAX_FORECAST_SAMPLES: usize = 64;
const PERIOD_COUNTS_OFFSET: usize = 676;
const SECTOR_STARTS_OFFSET: usize = 716;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarshalZone {
    /// Fraction (0..1) of the way through the lap the zone starts.
    pub zone_start: f32,
    /// −1 invalid, 0 none, 1 green, 2 blue, 3 yellow.
    pub zone_flag: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherForecastSample {
    pub session_type: u8,
    /// Minutes.
    pub time_offset: u8,
    /// 0 clear .. 5 storm.
    pub weather: u8,
    pub track_temperature: i8,
    /// 0 up, 1 down, 2 no change.
    pub track_temperature_change: i8,
    pub air_temperature: i8,
    pub air_temperature_change: i8,
    pub rain_percentage: u8,
}

impl WeatherForecastSample {
    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            session_type: r.u8()?,
            time_offset: r.u8()?,
            weather: r.u8()?,
            track_temperature: r.i8()?,
            track_temperature_change: r.i8()?,
            air_temperature: r.i8()?,
            air_temperature_change: r.i8()?,
            rain_percentage: r.u8()?,
        })
    }
}

/// Session-level data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub weather: u8,
    pub track_temperature: i8,
    pub air_temperature: i8,
    pub total_laps: u8,
    /// Metres.
    pub track_length: u16,
    pub session_type: u8,
    /// −1 = unknown.
    pub track_id: i8,
    pub formula: u8,
    /// Seconds.
    pub session_time_left: u16,
    /// Seconds.
    pub session_duration: u16,
    /// km/h.
    pub pit_speed_limit: u8,
    pub game_paused: u8,
    pub is_spectating: u8,
    pub spectator_car_index: u8,
    pub marshal_zones: Vec<MarshalZone>,
    /// 0 none, 1 full, 2 virtual, 3 formation lap.
    pub safety_car_status: u8,
    pub network_game: u8,
    pub weather_forecast_samples: Vec<WeatherForecastSample>,
    /// 0 perfect, 1 approximate.
    pub forecast_accuracy: u8,
    pub ai_difficulty: u8,
    pub season_link_identifier: u32,
    pub weekend_link_identifier: u32,
    pub session_link_identifier: u32,
    pub pit_stop_window_ideal_lap: u8,
    pub pit_stop_window_latest_lap: u8,
    pub pit_stop_rejoin_position: u8,
    pub num_safety_car_periods: u8,
    pub num_virtual_safety_car_periods: u8,
    pub num_red_flag_periods: u8,
    /// Metres.
    pub sector2_lap_distance_start: f32,
    /// Metres.
    pub sector3_lap_distance_start: f32,
}

impl SessionData {
    /// Decode the session body. Counts larger than the fixed arrays are
    /// clamped; the arrays are always read in full so offsets stay fixed.
    pub(crate) fn decode(raw: &[u8]) -> Result<Self> {
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let weather = r.u8()?;
        let track_temperature = r.i8()?;
        let air_temperature = r.i8()?;
        let total_laps = r.u8()?;
        let track_length = r.u16_le()?;
        let session_type = r.u8()?;
        let track_id = r.i8()?;
        let formula = r.u8()?;
        let session_time_left = r.u16_le()?;
        let session_duration = r.u16_le()?;
        let pit_speed_limit = r.u8()?;
        let game_paused = r.u8()?;
        let is_spectating = r.u8()?;
        let spectator_car_index = r.u8()?;
        r.skip(1)?; // sliProNativeSupport
        let num_marshal_zones = usize::from(r.u8()?).min(MAX_MARSHAL_ZONES);

        let mut marshal_zones = Vec::with_capacity(num_marshal_zones);
        for idx in 0..MAX_MARSHAL_ZONES {
            let zone = MarshalZone {
                zone_start: r.f32_le()?,
                zone_flag: r.i8()?,
            };
            if idx < num_marshal_zones {
                marshal_zones.push(zone);
            }
        }

        let safety_car_status = r.u8()?;
        let network_game = r.u8()?;
        let num_samples = usize::from(r.u8()?).min(MAX_FORECAST_SAMPLES);
        let mut weather_forecast_samples = Vec::with_capacity(num_samples);
        for idx in 0..MAX_FORECAST_SAMPLES {
            let sample = WeatherForecastSample::read(&mut r)?;
            if idx < num_samples {
                weather_forecast_samples.push(sample);
            }
        }

        let forecast_accuracy = r.u8()?;
        let ai_difficulty = r.u8()?;
        let season_link_identifier = r.u32_le()?;
        let weekend_link_identifier = r.u32_le()?;
        let session_link_identifier = r.u32_le()?;
        let pit_stop_window_ideal_lap = r.u8()?;
        let pit_stop_window_latest_lap = r.u8()?;
        let pit_stop_rejoin_position = r.u8()?;

        let mut periods = ByteReader::at(raw, HEADER_SIZE + PERIOD_COUNTS_OFFSET);
        let num_safety_car_periods = periods.u8()?;
        let num_virtual_safety_car_periods = periods.u8()?;
        let num_red_flag_periods = periods.u8()?;

        let mut sectors = ByteReader::at(raw, HEADER_SIZE + SECTOR_STARTS_OFFSET);
        let sector2_lap_distance_start = sectors.f32_le()?;
        let sector3_lap_distance_start = sectors.f32_le()?;

        Ok(Self {
            weather,
            track_temperature,
            air_temperature,
            total_laps,
            track_length,
            session_type,
            track_id,
            formula,
            session_time_left,
            session_duration,
            pit_speed_limit,
            game_paused,
            is_spectating,
            spectator_car_index,
            marshal_zones,
            safety_car_status,
            network_game,
            weather_forecast_samples,
            forecast_accuracy,
            ai_difficulty,
            season_link_identifier,
            weekend_link_identifier,
            session_link_identifier,
            pit_stop_window_ideal_lap,
            pit_stop_window_latest_lap,
            pit_stop_rejoin_position,
            num_safety_car_periods,
            num_virtual_safety_car_periods,
            num_red_flag_periods,
            sector2_lap_distance_start,
            sector3_lap_distance_start,
        })
    }

    pub fn track_name(&self) -> &'static str {
        track_name_from_id(self.track_id)
    }
}

/// Parse a Session packet body.
pub fn parse_session_data(raw: &[u8]) -> Result<SessionData> {
    SessionData::decode(raw)
}
