use chrono::{DateTime, Utc};

use crate::error::MergeError;
use crate::types::activity::{Lap, TrackPoint};

/// Running heart-rate totals for the lap being filled.
#[derive(Debug, Default)]
struct HeartRateStats {
    count: u64,
    sum: u64,
    max: u16,
}

impl HeartRateStats {
    fn add(&mut self, heart_rate: Option<u16>) {
        // zero is a recorded value but not a usable sample
        if let Some(bpm) = heart_rate.filter(|bpm| *bpm > 0) {
            self.count += 1;
            self.sum += u64::from(bpm);
            self.max = self.max.max(bpm);
        }
    }

    /// Writes the aggregates into `lap` and resets the totals.
    fn close(&mut self, lap: &mut Lap) {
        let stats = std::mem::take(self);
        if stats.count > 0 {
            lap.average_heart_rate_bpm = Some((stats.sum / stats.count) as u16);
            lap.maximum_heart_rate_bpm = Some(stats.max);
        } else {
            lap.average_heart_rate_bpm = None;
            lap.maximum_heart_rate_bpm = None;
        }
    }
}

/// Start of the lap after `index`, or `None` for the last lap, which takes
/// every remaining point.
fn next_boundary(laps: &[Lap], index: usize) -> Option<DateTime<Utc>> {
    laps.get(index + 1).map(|lap| lap.start_time)
}

/// Splits the merged trackpoints back into the master's laps and recomputes
/// each lap's average and maximum heart rate.
///
/// A lap window runs from its own start time up to, but not including, the
/// next lap's start time. Lap count, start times and every other lap field
/// come from `master_laps` unchanged.
pub fn rebuild_laps(master_laps: &[Lap], merged: Vec<TrackPoint>) -> Result<Vec<Lap>, MergeError> {
    if master_laps.is_empty() {
        return Err(MergeError::NoLaps);
    }

    let mut laps: Vec<Lap> = master_laps.iter().map(Lap::header).collect();
    let mut index = 0;
    let mut stats = HeartRateStats::default();

    for point in merged {
        while let Some(boundary) = next_boundary(master_laps, index) {
            if point.time < boundary {
                break;
            }
            stats.close(&mut laps[index]);
            index += 1;
        }

        stats.add(point.heart_rate);
        laps[index].trackpoints.push(point);
    }
    stats.close(&mut laps[index]);

    for (lap, master) in laps.iter().zip(master_laps) {
        if lap.trackpoints.is_empty() && !master.trackpoints.is_empty() {
            tracing::warn!("Lap starting at {} ended up without trackpoints", lap.start_time);
        }
    }

    Ok(laps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn point(seconds: i64, heart_rate: Option<u16>) -> TrackPoint {
        let mut point = TrackPoint::new(at(seconds));
        point.heart_rate = heart_rate;
        point
    }

    fn lap(seconds: i64) -> Lap {
        let mut lap = Lap::new(at(seconds));
        lap.calories = Some("42".to_string());
        lap.average_heart_rate_bpm = Some(1);
        lap.maximum_heart_rate_bpm = Some(2);
        lap
    }

    #[test]
    fn partitions_on_exclusive_boundaries() {
        let laps = vec![lap(0), lap(20)];
        let merged = vec![
            point(0, None),
            point(5, Some(100)),
            point(10, None),
            point(20, Some(110)),
            point(25, Some(120)),
            point(30, None),
        ];
        let rebuilt = rebuild_laps(&laps, merged.clone()).unwrap();

        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt[0].trackpoints, merged[..3]);
        assert_eq!(rebuilt[1].trackpoints, merged[3..]);
        assert_eq!(rebuilt[0].average_heart_rate_bpm, Some(100));
        assert_eq!(rebuilt[1].average_heart_rate_bpm, Some(115));
        assert_eq!(rebuilt[1].maximum_heart_rate_bpm, Some(120));
        assert_eq!(rebuilt[1].calories.as_deref(), Some("42"));
    }

    #[test]
    fn average_is_floored_and_ignores_zero() {
        let laps = vec![lap(0)];
        let merged = vec![point(0, Some(100)), point(1, Some(0)), point(2, Some(101))];
        let rebuilt = rebuild_laps(&laps, merged).unwrap();

        assert_eq!(rebuilt[0].average_heart_rate_bpm, Some(100));
        assert_eq!(rebuilt[0].maximum_heart_rate_bpm, Some(101));
        assert_eq!(rebuilt[0].trackpoints.len(), 3);
    }

    #[test]
    fn lap_without_samples_has_no_aggregates() {
        let laps = vec![lap(0), lap(10)];
        let merged = vec![point(0, None), point(10, Some(130))];
        let rebuilt = rebuild_laps(&laps, merged).unwrap();

        assert_eq!(rebuilt[0].average_heart_rate_bpm, None);
        assert_eq!(rebuilt[0].maximum_heart_rate_bpm, None);
        assert_eq!(rebuilt[1].average_heart_rate_bpm, Some(130));
    }

    #[test]
    fn point_skipping_a_lap_leaves_it_empty() {
        let laps = vec![lap(0), lap(10), lap(20)];
        let merged = vec![point(0, Some(90)), point(25, Some(150))];
        let rebuilt = rebuild_laps(&laps, merged).unwrap();

        assert_eq!(rebuilt.len(), 3);
        assert_eq!(rebuilt[0].trackpoints.len(), 1);
        assert!(rebuilt[1].trackpoints.is_empty());
        assert_eq!(rebuilt[1].average_heart_rate_bpm, None);
        assert_eq!(rebuilt[2].trackpoints.len(), 1);
        assert_eq!(rebuilt[2].maximum_heart_rate_bpm, Some(150));
    }

    #[test]
    fn no_laps_is_an_error() {
        assert_eq!(rebuild_laps(&[], vec![point(0, None)]), Err(MergeError::NoLaps));
    }
}
