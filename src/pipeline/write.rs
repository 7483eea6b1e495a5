use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::SerializationError;
use crate::types::activity::{Document, Lap, Position, TrackPoint, Tpx};

/// Prefix the speed/cadence extension is written under, whatever it was read as.
const EXTENSION_PREFIX: &str = "ns3";

type XmlWriter = Writer<Vec<u8>>;
type XmlResult = Result<(), quick_xml::Error>;

/// Serializes a document with two-space indentation and no XML declaration.
pub fn write(document: &Document) -> Result<String, SerializationError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_document(&mut writer, document)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_document(w: &mut XmlWriter, document: &Document) -> XmlResult {
    let schema = &document.schema;
    let root = BytesStart::new("TrainingCenterDatabase").with_attributes([
        ("xsi:schemaLocation", schema.schema_location.as_str()),
        ("xmlns:ns5", schema.ns5.as_str()),
        ("xmlns:ns4", schema.ns4.as_str()),
        ("xmlns:ns3", schema.ns3.as_str()),
        ("xmlns:ns2", schema.ns2.as_str()),
        ("xmlns", schema.default_ns.as_str()),
        ("xmlns:xsi", schema.xsi.as_str()),
    ]);
    w.write_event(Event::Start(root))?;
    open(w, "Activities")?;

    let activity = &document.activity;
    let start = BytesStart::new("Activity").with_attributes([("Sport", activity.sport.as_str())]);
    w.write_event(Event::Start(start))?;
    leaf(w, "Id", &activity.id)?;
    for lap in &activity.laps {
        write_lap(w, lap)?;
    }
    close(w, "Activity")?;

    close(w, "Activities")?;
    close(w, "TrainingCenterDatabase")
}

fn write_lap(w: &mut XmlWriter, lap: &Lap) -> XmlResult {
    let start_time = timestamp(&lap.start_time);
    let start = BytesStart::new("Lap").with_attributes([("StartTime", start_time.as_str())]);
    w.write_event(Event::Start(start))?;

    optional_leaf(w, "TotalTimeSeconds", lap.total_time_seconds.as_deref())?;
    optional_leaf(w, "DistanceMeters", lap.distance_meters.as_deref())?;
    optional_leaf(w, "MaximumSpeed", lap.maximum_speed.as_deref())?;
    optional_leaf(w, "Calories", lap.calories.as_deref())?;
    bpm(w, "AverageHeartRateBpm", lap.average_heart_rate_bpm)?;
    bpm(w, "MaximumHeartRateBpm", lap.maximum_heart_rate_bpm)?;
    optional_leaf(w, "Intensity", lap.intensity.as_deref())?;
    optional_leaf(w, "TriggerMethod", lap.trigger_method.as_deref())?;

    if !lap.trackpoints.is_empty() {
        open(w, "Track")?;
        for point in &lap.trackpoints {
            write_trackpoint(w, point)?;
        }
        close(w, "Track")?;
    }

    close(w, "Lap")
}

fn write_trackpoint(w: &mut XmlWriter, point: &TrackPoint) -> XmlResult {
    open(w, "Trackpoint")?;
    leaf(w, "Time", &timestamp(&point.time))?;
    if let Some(position) = &point.position {
        write_position(w, position)?;
    }
    optional_leaf(w, "AltitudeMeters", point.altitude_meters.as_deref())?;
    optional_leaf(w, "DistanceMeters", point.distance_meters.as_deref())?;
    bpm(w, "HeartRateBpm", point.heart_rate)?;
    if let Some(tpx) = &point.extensions {
        open(w, "Extensions")?;
        write_tpx(w, tpx)?;
        close(w, "Extensions")?;
    }
    close(w, "Trackpoint")
}

fn write_position(w: &mut XmlWriter, position: &Position) -> XmlResult {
    open(w, "Position")?;
    optional_leaf(w, "LatitudeDegrees", position.latitude_degrees.as_deref())?;
    optional_leaf(w, "LongitudeDegrees", position.longitude_degrees.as_deref())?;
    close(w, "Position")
}

fn write_tpx(w: &mut XmlWriter, tpx: &Tpx) -> XmlResult {
    let name = prefixed("TPX");
    open(w, &name)?;
    optional_leaf(w, &prefixed("RunCadence"), tpx.run_cadence.as_deref())?;
    optional_leaf(w, &prefixed("Speed"), tpx.speed.as_deref())?;
    close(w, &name)
}

fn prefixed(name: &str) -> String {
    format!("{EXTENSION_PREFIX}:{name}")
}

/// RFC 3339 in UTC with as many fractional digits as needed and no trailing
/// zeros, so `.500` is written as `.5`.
fn timestamp(time: &DateTime<Utc>) -> String {
    let seconds = time.to_rfc3339_opts(SecondsFormat::Secs, true);
    let nanos = time.timestamp_subsec_nanos();
    if nanos == 0 {
        return seconds;
    }
    let fraction = format!("{nanos:09}");
    let fraction = fraction.trim_end_matches('0');
    format!("{}.{fraction}Z", seconds.trim_end_matches('Z'))
}

fn open(w: &mut XmlWriter, name: &str) -> XmlResult {
    w.write_event(Event::Start(BytesStart::new(name)))
}

fn close(w: &mut XmlWriter, name: &str) -> XmlResult {
    w.write_event(Event::End(BytesEnd::new(name)))
}

fn leaf(w: &mut XmlWriter, name: &str, text: &str) -> XmlResult {
    open(w, name)?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    close(w, name)
}

fn optional_leaf(w: &mut XmlWriter, name: &str, text: Option<&str>) -> XmlResult {
    match text {
        Some(text) => leaf(w, name, text),
        None => Ok(()),
    }
}

fn bpm(w: &mut XmlWriter, name: &str, value: Option<u16>) -> XmlResult {
    let Some(value) = value else {
        return Ok(());
    };
    open(w, name)?;
    leaf(w, "Value", &value.to_string())?;
    close(w, name)
}
