use crate::types::activity::{Document, TrackPoint};

/// All trackpoints of a document, lap by lap, in document order.
pub fn trackpoints(document: &Document) -> impl Iterator<Item = &TrackPoint> + '_ {
    document
        .activity
        .laps
        .iter()
        .flat_map(|lap| lap.trackpoints.iter())
}
