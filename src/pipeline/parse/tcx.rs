use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::activity::{
    Activity, Document, Lap, Position, SchemaAttributes, TrackPoint, Tpx,
};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const ROOT: &str = "TrainingCenterDatabase";

/// Reads training-center documents. Element names are matched on their local
/// part only, so `ns3:TPX` and `TPX` are the same element.
pub struct TcxParser;

impl Parser for TcxParser {
    fn parse(&self, bytes: &[u8]) -> Result<Document, ParseError> {
        let mut reader = Reader::from_reader(bytes);

        let mut state = ParseState::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = local_name(&e)?;
                    state.open(&name, &e)?;
                    state.path.push(name);
                    state.content.clear();
                }
                Ok(Event::Empty(e)) => {
                    let name = local_name(&e)?;
                    state.open(&name, &e)?;
                    state.close(&name)?;
                    state.content.clear();
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| ParseError::InvalidTcx(e.to_string()))?;
                    state.content.push_str(&text);
                }
                Ok(Event::CData(e)) => {
                    let text = std::str::from_utf8(&e)
                        .map_err(|e| ParseError::InvalidTcx(e.to_string()))?;
                    state.content.push_str(text);
                }
                Ok(Event::End(e)) => {
                    let name = std::str::from_utf8(e.local_name().as_ref())
                        .map_err(|e| ParseError::InvalidTcx(e.to_string()))?
                        .to_string();
                    let content = std::mem::take(&mut state.content);
                    let content = content.trim();
                    if !content.is_empty() {
                        state.text(content)?;
                    }
                    state.path.pop();
                    state.close(&name)?;
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::InvalidTcx(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        state.finish()
    }
}

#[derive(Default)]
struct ParseState {
    path: Vec<String>,
    /// Character data of the innermost open element; comments may split it
    /// across several events.
    content: String,
    seen_root: bool,
    schema: SchemaAttributes,
    activity: Option<Activity>,
    in_activity: bool,
    skipping_activity: bool,
    lap: Option<Lap>,
    point: Option<PointDraft>,
}

/// A trackpoint before its `Time` child has been seen.
#[derive(Default)]
struct PointDraft {
    time: Option<DateTime<Utc>>,
    position: Option<Position>,
    altitude_meters: Option<String>,
    distance_meters: Option<String>,
    heart_rate: Option<u16>,
    extensions: Option<Tpx>,
}

impl PointDraft {
    fn build(self) -> Result<TrackPoint, ParseError> {
        let time = self.time.ok_or(ParseError::MissingField("Trackpoint Time"))?;
        Ok(TrackPoint {
            time,
            position: self.position.filter(|p| {
                p.latitude_degrees.is_some() || p.longitude_degrees.is_some()
            }),
            altitude_meters: self.altitude_meters,
            distance_meters: self.distance_meters,
            heart_rate: self.heart_rate,
            extensions: self.extensions,
        })
    }
}

impl ParseState {
    fn open(&mut self, name: &str, e: &BytesStart) -> Result<(), ParseError> {
        if !self.seen_root {
            if name != ROOT {
                return Err(ParseError::UnexpectedRoot(name.to_string()));
            }
            self.seen_root = true;
            self.schema = read_schema(e)?;
            return Ok(());
        }

        if self.skipping_activity {
            return Ok(());
        }

        match name {
            "Activity" => {
                if self.activity.is_some() {
                    tracing::warn!("Document holds more than one activity, ignoring the extra ones");
                    self.skipping_activity = true;
                } else {
                    let sport = attribute(e, "Sport")?.unwrap_or_default();
                    self.activity = Some(Activity {
                        sport,
                        ..Activity::default()
                    });
                    self.in_activity = true;
                }
            }
            "Lap" if self.in_activity => {
                let raw = attribute(e, "StartTime")?
                    .ok_or(ParseError::MissingField("Lap StartTime"))?;
                self.lap = Some(Lap::new(parse_time("Lap StartTime", &raw)?));
            }
            "Trackpoint" if self.lap.is_some() => {
                self.point = Some(PointDraft::default());
            }
            "Position" => {
                if let Some(point) = self.point.as_mut() {
                    point.position.get_or_insert_with(Position::default);
                }
            }
            "TPX" => {
                if let Some(point) = self.point.as_mut() {
                    point.extensions.get_or_insert_with(Tpx::default);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), ParseError> {
        if self.skipping_activity {
            if name == "Activity" {
                self.skipping_activity = false;
            }
            return Ok(());
        }

        match name {
            "Activity" => self.in_activity = false,
            "Lap" => {
                if let (Some(lap), Some(activity)) = (self.lap.take(), self.activity.as_mut()) {
                    activity.laps.push(lap);
                }
            }
            "Trackpoint" => {
                if let (Some(point), Some(lap)) = (self.point.take(), self.lap.as_mut()) {
                    lap.trackpoints.push(point.build()?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), ParseError> {
        if self.skipping_activity || !self.in_activity {
            return Ok(());
        }

        let (parent, leaf) = match self.path.as_slice() {
            [.., parent, leaf] => (parent.as_str(), leaf.as_str()),
            _ => return Ok(()),
        };
        let value = text.to_string();

        if let Some(point) = self.point.as_mut() {
            match (parent, leaf) {
                ("Trackpoint", "Time") => {
                    point.time = Some(parse_time("Trackpoint Time", &value)?)
                }
                ("Trackpoint", "AltitudeMeters") => point.altitude_meters = Some(value),
                ("Trackpoint", "DistanceMeters") => point.distance_meters = Some(value),
                ("Position", "LatitudeDegrees") => {
                    point
                        .position
                        .get_or_insert_with(Position::default)
                        .latitude_degrees = Some(value)
                }
                ("Position", "LongitudeDegrees") => {
                    point
                        .position
                        .get_or_insert_with(Position::default)
                        .longitude_degrees = Some(value)
                }
                ("HeartRateBpm", "Value") => {
                    point.heart_rate = Some(parse_bpm("Trackpoint HeartRateBpm", &value)?)
                }
                ("TPX", "Speed") => {
                    point.extensions.get_or_insert_with(Tpx::default).speed = Some(value)
                }
                ("TPX", "RunCadence") => {
                    point.extensions.get_or_insert_with(Tpx::default).run_cadence = Some(value)
                }
                _ => {}
            }
            return Ok(());
        }

        if let Some(lap) = self.lap.as_mut() {
            match (parent, leaf) {
                ("Lap", "TotalTimeSeconds") => lap.total_time_seconds = Some(value),
                ("Lap", "DistanceMeters") => lap.distance_meters = Some(value),
                ("Lap", "MaximumSpeed") => lap.maximum_speed = Some(value),
                ("Lap", "Calories") => lap.calories = Some(value),
                ("Lap", "Intensity") => lap.intensity = Some(value),
                ("Lap", "TriggerMethod") => lap.trigger_method = Some(value),
                ("AverageHeartRateBpm", "Value") => {
                    lap.average_heart_rate_bpm = Some(parse_bpm("Lap AverageHeartRateBpm", &value)?)
                }
                ("MaximumHeartRateBpm", "Value") => {
                    lap.maximum_heart_rate_bpm = Some(parse_bpm("Lap MaximumHeartRateBpm", &value)?)
                }
                _ => {}
            }
            return Ok(());
        }

        if let ("Activity", "Id") = (parent, leaf) {
            if let Some(activity) = self.activity.as_mut() {
                activity.id = value;
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Document, ParseError> {
        if !self.seen_root {
            return Err(ParseError::InvalidTcx("document is empty".to_string()));
        }
        let activity = self.activity.ok_or(ParseError::MissingActivity)?;
        tracing::debug!(
            "Parsed {} activity with {} laps and {} trackpoints",
            activity.sport,
            activity.laps.len(),
            activity.trackpoint_count()
        );
        Ok(Document {
            schema: self.schema,
            activity,
        })
    }
}

fn local_name(e: &BytesStart) -> Result<String, ParseError> {
    std::str::from_utf8(e.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| ParseError::InvalidTcx(e.to_string()))
}

fn attribute(e: &BytesStart, wanted: &str) -> Result<Option<String>, ParseError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidTcx(e.to_string()))?;
        if attr.key.local_name().as_ref() == wanted.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| ParseError::InvalidTcx(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn read_schema(e: &BytesStart) -> Result<SchemaAttributes, ParseError> {
    let mut schema = SchemaAttributes::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidTcx(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| ParseError::InvalidTcx(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::InvalidTcx(e.to_string()))?
            .into_owned();

        match key {
            "xsi:schemaLocation" => schema.schema_location = value,
            "xmlns:ns5" => schema.ns5 = value,
            "xmlns:ns4" => schema.ns4 = value,
            "xmlns:ns3" => schema.ns3 = value,
            "xmlns:ns2" => schema.ns2 = value,
            "xmlns" => schema.default_ns = value,
            "xmlns:xsi" => schema.xsi = value,
            _ => {}
        }
    }
    Ok(schema)
}

fn parse_time(field: &'static str, value: &str) -> Result<DateTime<Utc>, ParseError> {
    value
        .trim()
        .parse::<DateTime<Utc>>()
        .map_err(|_| ParseError::InvalidTime {
            field,
            value: value.to_string(),
        })
}

fn parse_bpm(field: &'static str, value: &str) -> Result<u16, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
