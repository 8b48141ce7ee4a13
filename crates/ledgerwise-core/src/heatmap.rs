//! Spending intensity by weekday and time of day

use chrono::{Datelike, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::Transaction;

pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
pub const TIME_BLOCKS: [&str; 4] = ["Morning", "Afternoon", "Evening", "Night"];

/// Transaction counts on a Sun..Sat by Morning..Night grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heatmap {
    /// `grid[weekday][block]`, weekday 0 = Sunday
    pub grid: [[u32; 4]; 7],
    /// Records with no time of day, which cannot be placed on the grid
    pub untimed: usize,
    pub max_intensity: u32,
}

impl Heatmap {
    /// Cell value relative to the busiest cell, 0.0..=1.0
    pub fn intensity(&self, weekday: usize, block: usize) -> f64 {
        if self.max_intensity == 0 {
            return 0.0;
        }
        let value = self.grid.get(weekday).and_then(|row| row.get(block)).copied().unwrap_or(0);
        f64::from(value) / f64::from(self.max_intensity)
    }
}

/// Morning [6,12), Afternoon [12,17), Evening [17,22), Night otherwise
pub fn time_block(time: NaiveTime) -> usize {
    match time.hour() {
        6..=11 => 0,
        12..=16 => 1,
        17..=21 => 2,
        _ => 3,
    }
}

pub fn build_heatmap(transactions: &[Transaction]) -> Heatmap {
    let mut heatmap = Heatmap::default();

    for tx in transactions {
        match tx.time {
            Some(time) => {
                let day = tx.date.weekday().num_days_from_sunday() as usize;
                heatmap.grid[day][time_block(time)] += 1;
            }
            None => heatmap.untimed += 1,
        }
    }

    heatmap.max_intensity = heatmap.grid.iter().flatten().copied().max().unwrap_or(0);
    heatmap
}
