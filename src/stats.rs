//! Home-screen statistics: today's totals and the overall step total, which
//! is counted over the contest window when one is underway.

use chrono::NaiveDate;

use crate::{db::models::Contest, fitness::DailyTotal};

/// Picks the totals for one day out of a fetched range; zero if the provider
/// reported nothing for that day.
pub fn totals_for_day(date: NaiveDate, totals: &[DailyTotal]) -> DailyTotal {
    totals
        .iter()
        .copied()
        .find(|total| total.date == date)
        .unwrap_or(DailyTotal {
            date,
            steps: 0,
            distance_meters: 0.0,
        })
}

/// The date range the overall step total is counted over.
///
/// Inside or after a contest, count from the contest start to today or the
/// contest end, whichever comes first. Before the contest (or with no contest
/// at all), fall back to counting from the day the user joined. With neither
/// a usable contest nor a user there is nothing to count.
pub fn step_total_window(
    contest: Option<&Contest>,
    user_joined_on: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    if let Some(contest) = contest {
        if contest.starts_on <= today {
            let to = if contest.ends_on >= today {
                today
            } else {
                contest.ends_on
            };
            return Some((contest.starts_on, to));
        }
    }

    user_joined_on.map(|joined| (joined, today))
}

pub fn total_steps(totals: &[DailyTotal]) -> u64 {
    totals.iter().map(|total| total.steps).sum()
}
