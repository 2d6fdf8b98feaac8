use std::collections::{BTreeMap, HashMap};

use super::join::JoinedRow;

/// Running in-time ratio per priority class, sampled at every event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InTimeSeries {
    pub timestamps: Vec<f64>,
    /// One value per timestamp for each requested class
    pub ratios: BTreeMap<u32, Vec<f64>>,
}

impl InTimeSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Ratio after the last event, if the class was requested.
    pub fn last_ratio(&self, class: u32) -> Option<f64> {
        self.ratios.get(&class).and_then(|r| r.last().copied())
    }

    pub fn points(&self, class: u32) -> Vec<(f64, f64)> {
        match self.ratios.get(&class) {
            Some(ratios) => self
                .timestamps
                .iter()
                .copied()
                .zip(ratios.iter().copied())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Walk `rows` (already in timestamp order) keeping `seen` / `intime`
/// counters per class and emit `intime / seen` for each of `classes` after
/// every event. A class with nothing seen yet reports `default_ratio`.
pub fn intime_series(rows: &[JoinedRow], classes: &[u32], default_ratio: f64) -> InTimeSeries {
    let mut seen: HashMap<u32, u64> = HashMap::new();
    let mut intime: HashMap<u32, u64> = HashMap::new();

    let mut series = InTimeSeries {
        timestamps: Vec::with_capacity(rows.len()),
        ratios: classes
            .iter()
            .map(|&c| (c, Vec::with_capacity(rows.len())))
            .collect(),
    };

    for row in rows {
        *seen.entry(row.priority).or_insert(0) += 1;
        if row.intime {
            *intime.entry(row.priority).or_insert(0) += 1;
        }

        series.timestamps.push(row.timestamp);
        for (class, values) in series.ratios.iter_mut() {
            let ratio = match seen.get(class) {
                Some(&count) if count > 0 => {
                    intime.get(class).copied().unwrap_or(0) as f64 / count as f64
                }
                _ => default_ratio,
            };
            values.push(ratio);
        }
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(priority: u32, intime: bool, timestamp: f64) -> JoinedRow {
        JoinedRow {
            block_id: 0,
            priority,
            deadline: 200,
            start: 0.0,
            bct: 0.0,
            duration: 0,
            intime,
            timestamp,
        }
    }

    #[test]
    fn test_running_ratio() {
        let rows = vec![
            row(1, true, 0.1),
            row(1, false, 0.2),
            row(2, false, 0.3),
            row(1, true, 0.4),
        ];
        let series = intime_series(&rows, &[1, 2], 1.0);

        assert_eq!(series.timestamps, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(series.ratios[&1], vec![1.0, 0.5, 0.5, 2.0 / 3.0]);
        // class 2 uses the placeholder until its first block
        assert_eq!(series.ratios[&2], vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(series.last_ratio(1), Some(2.0 / 3.0));
    }

    #[test]
    fn test_zero_placeholder() {
        let rows = vec![row(1, true, 0.1)];
        let series = intime_series(&rows, &[1, 2], 0.0);
        assert_eq!(series.ratios[&2], vec![0.0]);
    }

    #[test]
    fn test_ratios_stay_in_bounds() {
        let rows: Vec<JoinedRow> = (0..200)
            .map(|i| row(i % 3, i % 7 != 0, i as f64 * 0.01))
            .collect();
        let series = intime_series(&rows, &[0, 1, 2, 5], 1.0);
        for values in series.ratios.values() {
            assert_eq!(values.len(), rows.len());
            assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
        }
        assert!(series.ratios[&5].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_empty_input() {
        let series = intime_series(&[], &[1, 2], 1.0);
        assert!(series.is_empty());
        assert_eq!(series.last_ratio(1), None);
        assert!(series.points(1).is_empty());
    }
}
