use std::collections::HashSet;

use super::super::domain::{PollingStation, Region, Submission};
use super::views::{
    percent_label, unsubmitted_view, AnalyticsView, OverallStatEntry, RegionFilter,
    RegionStatEntry, UnsubmittedView,
};

/// Per-region submission coverage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionStat {
    pub region: Region,
    pub submission_count: usize,
    pub total_attendance: u64,
    pub submitted_stations: usize,
    pub total_stations: usize,
}

impl CompletionStat {
    pub fn completion_pct(&self) -> f64 {
        completion_pct(self.submitted_stations, self.total_stations)
    }
}

/// Sum of every [`CompletionStat`] in a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionTotals {
    pub submission_count: usize,
    pub total_attendance: u64,
    pub submitted_stations: usize,
    pub total_stations: usize,
}

impl CompletionTotals {
    pub fn completion_pct(&self) -> f64 {
        completion_pct(self.submitted_stations, self.total_stations)
    }

    fn absorb(&mut self, stat: &CompletionStat) {
        self.submission_count += stat.submission_count;
        self.total_attendance += stat.total_attendance;
        self.submitted_stations += stat.submitted_stations;
        self.total_stations += stat.total_stations;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionReport {
    pub regions: Vec<CompletionStat>,
    pub overall: CompletionTotals,
    /// Stations in input order that have no submission under their (LAC, name) key.
    pub unsubmitted: Vec<PollingStation>,
    /// Submissions whose LAC is not among the analyzed regions.
    pub unrecognized_submissions: usize,
}

impl CompletionReport {
    pub fn analytics(&self) -> AnalyticsView {
        let regions = self
            .regions
            .iter()
            .map(|stat| {
                let pct = stat.completion_pct();
                RegionStatEntry {
                    region: stat.region,
                    region_label: stat.region.label(),
                    submissions: stat.submission_count,
                    attendance: stat.total_attendance,
                    submitted_stations: stat.submitted_stations,
                    total_stations: stat.total_stations,
                    completion_pct: pct,
                    completion_label: percent_label(pct),
                }
            })
            .collect();

        let pct = self.overall.completion_pct();
        AnalyticsView {
            regions,
            overall: OverallStatEntry {
                submissions: self.overall.submission_count,
                attendance: self.overall.total_attendance,
                submitted_stations: self.overall.submitted_stations,
                total_stations: self.overall.total_stations,
                completion_pct: pct,
                completion_label: percent_label(pct),
            },
            unrecognized_submissions: self.unrecognized_submissions,
        }
    }

    pub fn unsubmitted_view(&self, filter: RegionFilter) -> UnsubmittedView {
        unsubmitted_view(&self.unsubmitted, filter)
    }
}

/// Derive coverage statistics from already-fetched stations and submissions.
///
/// `regions` fixes both which regions are reported and their order. Overall
/// totals only include those regions; anything else is counted in
/// `unrecognized_submissions`.
pub fn analyze(
    regions: &[Region],
    stations: &[PollingStation],
    submissions: &[Submission],
) -> CompletionReport {
    let mut overall = CompletionTotals::default();
    let stats: Vec<CompletionStat> = regions
        .iter()
        .map(|&region| {
            let stat = region_stat(region, stations, submissions);
            overall.absorb(&stat);
            stat
        })
        .collect();

    let unrecognized_submissions = submissions
        .iter()
        .filter(|submission| {
            !submission
                .region()
                .is_some_and(|region| regions.contains(&region))
        })
        .count();

    CompletionReport {
        regions: stats,
        overall,
        unsubmitted: unsubmitted_stations(stations, submissions),
        unrecognized_submissions,
    }
}

fn region_stat(
    region: Region,
    stations: &[PollingStation],
    submissions: &[Submission],
) -> CompletionStat {
    let code = region.label();
    let mut submission_count = 0;
    let mut total_attendance = 0;
    let mut station_names = HashSet::new();

    for submission in submissions.iter().filter(|s| s.lac == code) {
        submission_count += 1;
        total_attendance += submission.attendance();
        station_names.insert(submission.polling_station.as_str());
    }

    CompletionStat {
        region,
        submission_count,
        total_attendance,
        submitted_stations: station_names.len(),
        total_stations: stations.iter().filter(|s| s.lac == code).count(),
    }
}

/// Stations whose exact (LAC, station name) pair never appears in `submissions`.
pub fn unsubmitted_stations(
    stations: &[PollingStation],
    submissions: &[Submission],
) -> Vec<PollingStation> {
    let submitted: HashSet<(&str, &str)> = submissions
        .iter()
        .map(|s| (s.lac.as_str(), s.polling_station.as_str()))
        .collect();

    stations
        .iter()
        .filter(|station| {
            !submitted.contains(&(station.lac.as_str(), station.station_name.as_str()))
        })
        .cloned()
        .collect()
}

fn completion_pct(submitted: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (submitted as f64 / total as f64 * 100.0).min(100.0)
}
