pub mod laps;
pub mod merge;
pub mod parse;
pub mod read;
pub mod stream;
pub mod write;

use crate::error::MergeError;
use crate::types::activity::{Activity, Document};

/// Adds the heart-rate samples of `heart_rate` to `master`, returning a new
/// document with the master's laps rebuilt around the merged trackpoints.
pub fn merge_documents(master: &Document, heart_rate: &Document) -> Result<Document, MergeError> {
    let merged = merge::merge(stream::trackpoints(master), stream::trackpoints(heart_rate))?;
    let laps = laps::rebuild_laps(&master.activity.laps, merged)?;

    Ok(Document {
        schema: master.schema.clone(),
        activity: Activity {
            sport: master.activity.sport.clone(),
            id: master.activity.id.clone(),
            laps,
        },
    })
}
