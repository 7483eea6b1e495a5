use chrono::{DateTime, Utc};

/// A parsed training-center document: the root namespace declarations plus the
/// single activity it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub schema: SchemaAttributes,
    pub activity: Activity,
}

/// Root attributes, kept verbatim so the output re-declares exactly what the
/// master input declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaAttributes {
    pub schema_location: String,
    pub ns5: String,
    pub ns4: String,
    pub ns3: String,
    pub ns2: String,
    pub default_ns: String,
    pub xsi: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activity {
    pub sport: String,
    pub id: String,
    pub laps: Vec<Lap>,
}

impl Activity {
    pub fn trackpoint_count(&self) -> usize {
        self.laps.iter().map(|lap| lap.trackpoints.len()).sum()
    }
}

/// One lap. Scalar aggregates other than heart rate are carried as the text
/// they were read with and are never recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct Lap {
    pub start_time: DateTime<Utc>,
    pub total_time_seconds: Option<String>,
    pub distance_meters: Option<String>,
    pub maximum_speed: Option<String>,
    pub calories: Option<String>,
    pub average_heart_rate_bpm: Option<u16>,
    pub maximum_heart_rate_bpm: Option<u16>,
    pub intensity: Option<String>,
    pub trigger_method: Option<String>,
    pub trackpoints: Vec<TrackPoint>,
}

impl Lap {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            total_time_seconds: None,
            distance_meters: None,
            maximum_speed: None,
            calories: None,
            average_heart_rate_bpm: None,
            maximum_heart_rate_bpm: None,
            intensity: None,
            trigger_method: None,
            trackpoints: Vec::new(),
        }
    }

    /// Copy of the lap-level fields with no trackpoints and no heart-rate
    /// aggregates.
    pub fn header(&self) -> Self {
        Self {
            start_time: self.start_time,
            total_time_seconds: self.total_time_seconds.clone(),
            distance_meters: self.distance_meters.clone(),
            maximum_speed: self.maximum_speed.clone(),
            calories: self.calories.clone(),
            average_heart_rate_bpm: None,
            maximum_heart_rate_bpm: None,
            intensity: self.intensity.clone(),
            trigger_method: self.trigger_method.clone(),
            trackpoints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub time: DateTime<Utc>,
    pub position: Option<Position>,
    pub altitude_meters: Option<String>,
    pub distance_meters: Option<String>,
    pub heart_rate: Option<u16>,
    pub extensions: Option<Tpx>,
}

impl TrackPoint {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time,
            position: None,
            altitude_meters: None,
            distance_meters: None,
            heart_rate: None,
            extensions: None,
        }
    }

    /// A point that only carries a heart-rate sample, placed at the given
    /// position.
    pub fn heart_rate_only(
        time: DateTime<Utc>,
        heart_rate: Option<u16>,
        position: Option<Position>,
    ) -> Self {
        Self {
            heart_rate,
            position,
            ..Self::new(time)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    pub latitude_degrees: Option<String>,
    pub longitude_degrees: Option<String>,
}

/// Speed/cadence extension. Field names are unprefixed; the writer adds the
/// namespace prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tpx {
    pub speed: Option<String>,
    pub run_cadence: Option<String>,
}
