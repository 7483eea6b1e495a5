use std::cmp::Ordering;

use crate::error::{MergeError, Stream};
use crate::types::activity::TrackPoint;

/// Head of one input stream. Advancing checks that times never go backwards.
struct Cursor<'a, I> {
    stream: Stream,
    rest: I,
    head: Option<&'a TrackPoint>,
}

impl<'a, I> Cursor<'a, I>
where
    I: Iterator<Item = &'a TrackPoint>,
{
    fn new(stream: Stream, mut rest: I) -> Self {
        let head = rest.next();
        Self { stream, rest, head }
    }

    fn advance(&mut self) -> Result<(), MergeError> {
        let next = self.rest.next();
        if let (Some(previous), Some(next)) = (self.head, next) {
            if next.time < previous.time {
                return Err(MergeError::OutOfOrder {
                    stream: self.stream,
                    previous: previous.time,
                    next: next.time,
                });
            }
        }
        self.head = next;
        Ok(())
    }
}

/// Merges the master trackpoints with heart-rate samples from a second
/// recording.
///
/// Both inputs must be sorted by time. Master points are copied as they are,
/// except that a heart-rate sample at exactly the same time replaces the
/// master's heart rate. A sample with no master point at its time becomes a new
/// point holding only the time, the heart rate and the position of the point
/// emitted just before it.
pub fn merge<'a, M, S>(master: M, secondary: S) -> Result<Vec<TrackPoint>, MergeError>
where
    M: IntoIterator<Item = &'a TrackPoint>,
    S: IntoIterator<Item = &'a TrackPoint>,
{
    let mut master = Cursor::new(Stream::Master, master.into_iter());
    let mut secondary = Cursor::new(Stream::HeartRate, secondary.into_iter());

    match (master.head, secondary.head) {
        (None, _) => return Err(MergeError::EmptyMaster),
        (Some(m), Some(b)) if b.time < m.time => {
            return Err(MergeError::SecondaryBeforeMaster {
                secondary: b.time,
                master: m.time,
            })
        }
        _ => {}
    }

    let mut merged: Vec<TrackPoint> = Vec::new();
    let mut matched = 0usize;

    loop {
        match (master.head, secondary.head) {
            (None, None) => break,
            (Some(m), None) => {
                merged.push(m.clone());
                master.advance()?;
            }
            (None, Some(b)) => {
                let point = carry_forward(&merged, b);
                merged.push(point);
                secondary.advance()?;
            }
            (Some(m), Some(b)) => match m.time.cmp(&b.time) {
                Ordering::Less => {
                    merged.push(m.clone());
                    master.advance()?;
                }
                Ordering::Greater => {
                    let point = carry_forward(&merged, b);
                    merged.push(point);
                    secondary.advance()?;
                }
                Ordering::Equal => {
                    let mut point = m.clone();
                    point.heart_rate = b.heart_rate;
                    merged.push(point);
                    matched += 1;
                    master.advance()?;
                    secondary.advance()?;
                }
            },
        }
    }

    tracing::debug!(
        "Merged into {} trackpoints, {} heart-rate samples matched a master timestamp",
        merged.len(),
        matched
    );

    Ok(merged)
}

fn carry_forward(merged: &[TrackPoint], sample: &TrackPoint) -> TrackPoint {
    let position = merged.last().and_then(|last| last.position.clone());
    TrackPoint::heart_rate_only(sample.time, sample.heart_rate, position)
}
