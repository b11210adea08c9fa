//! Chronological ordering, running totals and windowed statistics.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use logbook_core::config::{StatsConfig, WindowAnchor};
use logbook_core::models::{
    AircraftStat, FlightEntry, LogbookStats, RunningTotals, StatsWindow,
};
use tracing::debug;

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Everything the aggregator derives from one set of entries.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Entries in chronological order with running totals attached.
    pub entries: Vec<FlightEntry>,
    pub all_time: LogbookStats,
    pub current_period: LogbookStats,
    pub recent: LogbookStats,
    pub aircraft_stats: Vec<AircraftStat>,
}

// ── LogbookAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that orders entries and sums them.
pub struct LogbookAggregator;

impl LogbookAggregator {
    /// Run every aggregation step over `entries`.
    ///
    /// Flagged entries take part like any other.
    pub fn aggregate(mut entries: Vec<FlightEntry>, config: &StatsConfig) -> Aggregation {
        Self::sort_chronologically(&mut entries);
        Self::attach_running_totals(&mut entries);

        let anchor = Self::anchor_date(&entries, config);
        let all_time = Self::window_stats(&entries, StatsWindow::AllTime, None, None);
        let current_period = Self::window_stats(
            &entries,
            StatsWindow::CurrentPeriod,
            Some(year_start(anchor)),
            Some(anchor),
        );
        let recent = Self::window_stats(
            &entries,
            StatsWindow::RecentExperience,
            Some(days_before(anchor, config.recent_window_days)),
            Some(anchor),
        );
        let aircraft_stats = Self::aircraft_stats(&entries);

        debug!(
            "Aggregated {} entries (anchor {}, {} aircraft)",
            entries.len(),
            anchor,
            aircraft_stats.len()
        );

        Aggregation {
            entries,
            all_time,
            current_period,
            recent,
            aircraft_stats,
        }
    }

    /// Stable sort by date ascending. Entries without a date go last, in
    /// their original order.
    pub fn sort_chronologically(entries: &mut [FlightEntry]) {
        entries.sort_by_key(|e| (e.date.is_none(), e.date));
    }

    /// Attach cumulative totals, inclusive of each entry, in slice order.
    pub fn attach_running_totals(entries: &mut [FlightEntry]) {
        let mut running = RunningTotals::default();
        for entry in entries.iter_mut() {
            running.add_entry(entry);
            entry.running_totals = Some(running);
        }
    }

    /// Date the current-period and recent windows end on.
    pub fn anchor_date(entries: &[FlightEntry], config: &StatsConfig) -> NaiveDate {
        match config.anchor {
            WindowAnchor::LatestEntry => entries
                .iter()
                .filter_map(|e| e.date)
                .max()
                .unwrap_or_else(|| config.processing_date()),
            WindowAnchor::ProcessingDate => config.processing_date(),
        }
    }

    /// Sum every entry inside `[start, end]`. With no bounds, undated entries
    /// are included too.
    pub fn window_stats(
        entries: &[FlightEntry],
        window: StatsWindow,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> LogbookStats {
        let mut stats = LogbookStats::empty(window, start, end);
        let unbounded = start.is_none() && end.is_none();
        for entry in entries {
            let included = match entry.date {
                Some(date) => stats.contains(date),
                None => unbounded,
            };
            if included {
                stats.add_entry(entry);
            }
        }
        stats.finish();
        stats
    }

    /// One summary per registration, busiest first.
    pub fn aircraft_stats(entries: &[FlightEntry]) -> Vec<AircraftStat> {
        let mut order: Vec<String> = Vec::new();
        let mut by_registration: HashMap<String, (AircraftStat, bool)> = HashMap::new();

        for entry in entries {
            let registration = &entry.aircraft.registration;
            if registration.is_empty() {
                continue;
            }
            let (stat, has_designator) = by_registration
                .entry(registration.clone())
                .or_insert_with(|| {
                    order.push(registration.clone());
                    (
                        AircraftStat {
                            registration: registration.clone(),
                            aircraft_type: entry.aircraft.type_text.clone(),
                            flights: 0,
                            total_time: 0.0,
                        },
                        false,
                    )
                });
            if !*has_designator {
                if let Some(designator) = &entry.aircraft.type_designator {
                    stat.aircraft_type = designator.clone();
                    *has_designator = true;
                } else if stat.aircraft_type.is_empty() {
                    stat.aircraft_type = entry.aircraft.type_text.clone();
                }
            }
            stat.flights += 1;
            stat.total_time += entry.total_time;
        }

        let mut stats: Vec<AircraftStat> = order
            .into_iter()
            .filter_map(|reg| by_registration.remove(&reg).map(|(stat, _)| stat))
            .collect();
        stats.sort_by(|a, b| {
            b.flights
                .cmp(&a.flights)
                .then_with(|| b.total_time.total_cmp(&a.total_time))
                .then_with(|| a.registration.cmp(&b.registration))
        });
        stats
    }
}

fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
