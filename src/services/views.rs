//! Read-only views computed from the current record list.
//!
//! Every function here preserves the input order. Callers that display
//! lists pick an explicit [`SortKey`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::constants::limits;
use crate::identifiers::serial_suffix;
use crate::models::{Beehive, HealthStatus};

/// Case-insensitive substring match over serial, dates and notes.
#[must_use]
pub fn search<'a>(hives: &'a [Beehive], query: &str) -> Vec<&'a Beehive> {
    let needle = query.trim().to_lowercase();
    hives.iter().filter(|h| matches_text(h, &needle)).collect()
}

fn matches_text(hive: &Beehive, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    hive.serial_number.to_lowercase().contains(needle)
        || hive.import_date.to_string().contains(needle)
        || hive
            .split_date
            .is_some_and(|d| d.to_string().contains(needle))
        || hive
            .notes
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(needle))
}

/// Splits into `(active, sold)`.
#[must_use]
pub fn partition_sold(hives: &[Beehive]) -> (Vec<&Beehive>, Vec<&Beehive>) {
    hives.iter().partition(|h| !h.is_sold)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthTally {
    pub good: usize,
    pub normal: usize,
    pub weak: usize,
}

impl HealthTally {
    #[must_use]
    pub const fn get(&self, status: HealthStatus) -> usize {
        match status {
            HealthStatus::Good => self.good,
            HealthStatus::Normal => self.normal,
            HealthStatus::Weak => self.weak,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.good + self.normal + self.weak
    }
}

#[must_use]
pub fn health_tally<'a, I>(hives: I) -> HealthTally
where
    I: IntoIterator<Item = &'a Beehive>,
{
    hives
        .into_iter()
        .fold(HealthTally::default(), |mut tally, hive| {
            match hive.health_status {
                HealthStatus::Good => tally.good += 1,
                HealthStatus::Normal => tally.normal += 1,
                HealthStatus::Weak => tally.weak += 1,
            }
            tally
        })
}

/// Dashboard counters. `healthy` counts active hives in good health.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveStats {
    pub total: usize,
    pub active: usize,
    pub sold: usize,
    pub healthy: usize,
}

#[must_use]
pub fn stats(hives: &[Beehive]) -> HiveStats {
    let (active, sold) = partition_sold(hives);
    HiveStats {
        total: hives.len(),
        active: active.len(),
        sold: sold.len(),
        healthy: active
            .iter()
            .filter(|h| h.health_status == HealthStatus::Good)
            .count(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SoldState {
    #[default]
    Any,
    Active,
    Sold,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiveFilter {
    pub text: Option<String>,
    pub import_date: Option<NaiveDate>,
    pub split_date: Option<NaiveDate>,
    pub sold_date: Option<NaiveDate>,
    pub sold: SoldState,
}

impl HiveFilter {
    #[must_use]
    pub fn matches(&self, hive: &Beehive) -> bool {
        let sold_ok = match self.sold {
            SoldState::Any => true,
            SoldState::Active => !hive.is_sold,
            SoldState::Sold => hive.is_sold,
        };

        sold_ok
            && self
                .text
                .as_deref()
                .is_none_or(|t| matches_text(hive, &t.trim().to_lowercase()))
            && self.import_date.is_none_or(|d| hive.import_date == d)
            && self.split_date.is_none_or(|d| hive.split_date == Some(d))
            && self.sold_date.is_none_or(|d| hive.sold_date == Some(d))
    }

    #[must_use]
    pub fn apply<'a>(&self, hives: &'a [Beehive]) -> Vec<&'a Beehive> {
        hives.iter().filter(|h| self.matches(h)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    SerialNumber,
    CreatedAt,
    ImportDate,
    SplitDate,
    SoldDate,
    HealthStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Stable sort. Missing optional dates sort first in ascending order.
pub fn sort(hives: &mut [Beehive], key: SortKey, order: SortOrder) {
    hives.sort_by(|a, b| {
        let ord = compare(a, b, key);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

fn compare(a: &Beehive, b: &Beehive, key: SortKey) -> Ordering {
    match key {
        SortKey::SerialNumber => compare_serials(&a.serial_number, &b.serial_number),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::ImportDate => a.import_date.cmp(&b.import_date),
        SortKey::SplitDate => a.split_date.cmp(&b.split_date),
        SortKey::SoldDate => a.sold_date.cmp(&b.sold_date),
        SortKey::HealthStatus => a.health_status.cmp(&b.health_status),
    }
}

/// Orders `TO999` before `TO1000`; falls back to plain text comparison.
fn compare_serials(a: &str, b: &str) -> Ordering {
    let split = |s: &str| {
        let idx = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (prefix, _) = s.split_at(idx);
        (prefix.to_string(), serial_suffix(s, prefix))
    };

    let (pa, na) = split(a);
    let (pb, nb) = split(b);
    pa.cmp(&pb)
        .then_with(|| na.cmp(&nb))
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// `page` starts at 1; `per_page` is clamped to `1..=100`.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.clamp(1, limits::MAX_PAGE_SIZE);
    let page = page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = (start + per_page).min(total);

    Page {
        items: items[start..end].to_vec(),
        page,
        per_page,
        total,
        total_pages,
    }
}

/// `dd/mm/yyyy`, the format used on printed labels and the dashboard.
#[must_use]
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hive(serial: &str, status: HealthStatus, sold: Option<NaiveDate>) -> Beehive {
        Beehive {
            serial_number: serial.to_string(),
            qr_token: format!("TOKEN{serial}"),
            import_date: date(2024, 1, 15),
            split_date: None,
            health_status: status,
            species: None,
            notes: None,
            is_sold: sold.is_some(),
            sold_date: sold,
            user_id: "user-1".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn fixture() -> Vec<Beehive> {
        let mut a = hive("TO001", HealthStatus::Good, None);
        a.notes = Some("Strong QUEEN, high honey yield".to_string());
        a.split_date = Some(date(2024, 2, 20));
        let b = hive("TO002", HealthStatus::Normal, None);
        let c = hive("TO003", HealthStatus::Good, Some(date(2024, 5, 2)));
        let mut d = hive("TO004", HealthStatus::Weak, None);
        d.import_date = date(2024, 2, 10);
        vec![a, b, c, d]
    }

    fn serials(hives: &[&Beehive]) -> Vec<String> {
        hives.iter().map(|h| h.serial_number.clone()).collect()
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let hives = fixture();
        assert_eq!(serials(&search(&hives, "queen")), vec!["TO001"]);
        assert_eq!(serials(&search(&hives, "to00")).len(), 4);
        assert_eq!(serials(&search(&hives, "2024-02-20")), vec!["TO001"]);
        assert_eq!(serials(&search(&hives, "2024-02")), vec!["TO001", "TO004"]);
        assert_eq!(search(&hives, "   ").len(), 4);
        assert!(search(&hives, "nothing-like-this").is_empty());
    }

    #[test]
    fn partition_splits_active_and_sold() {
        let hives = fixture();
        let (active, sold) = partition_sold(&hives);
        assert_eq!(serials(&active), vec!["TO001", "TO002", "TO004"]);
        assert_eq!(serials(&sold), vec!["TO003"]);
    }

    #[test]
    fn tally_counts_each_status() {
        let hives = fixture();
        let tally = health_tally(&hives);
        assert_eq!(tally.get(HealthStatus::Good), 2);
        assert_eq!(tally.get(HealthStatus::Normal), 1);
        assert_eq!(tally.get(HealthStatus::Weak), 1);
        assert_eq!(tally.total(), 4);
    }

    #[test]
    fn stats_count_healthy_among_active_only() {
        let s = stats(&fixture());
        assert_eq!(
            s,
            HiveStats {
                total: 4,
                active: 3,
                sold: 1,
                healthy: 1,
            }
        );
    }

    #[test]
    fn filter_combines_criteria() {
        let hives = fixture();
        let filter = HiveFilter {
            import_date: Some(date(2024, 1, 15)),
            sold: SoldState::Active,
            ..HiveFilter::default()
        };
        assert_eq!(serials(&filter.apply(&hives)), vec!["TO001", "TO002"]);

        let filter = HiveFilter {
            sold_date: Some(date(2024, 5, 2)),
            ..HiveFilter::default()
        };
        assert_eq!(serials(&filter.apply(&hives)), vec!["TO003"]);
    }

    #[test]
    fn sort_by_serial_is_numeric_aware() {
        let mut hives = vec![
            hive("TO1000", HealthStatus::Good, None),
            hive("TO002", HealthStatus::Good, None),
            hive("TO999", HealthStatus::Good, None),
        ];
        sort(&mut hives, SortKey::SerialNumber, SortOrder::Asc);
        let order: Vec<_> = hives.iter().map(|h| h.serial_number.as_str()).collect();
        assert_eq!(order, vec!["TO002", "TO999", "TO1000"]);

        sort(&mut hives, SortKey::SerialNumber, SortOrder::Desc);
        assert_eq!(hives[0].serial_number, "TO1000");
    }

    #[test]
    fn sort_by_health_then_stable() {
        let mut hives = fixture();
        sort(&mut hives, SortKey::HealthStatus, SortOrder::Asc);
        let order: Vec<_> = hives.iter().map(|h| h.serial_number.as_str()).collect();
        assert_eq!(order, vec!["TO001", "TO003", "TO002", "TO004"]);
    }

    #[test]
    fn paginate_reports_bounds() {
        let items: Vec<u32> = (1..=45).collect();
        let page = paginate(&items, 3, 20);
        assert_eq!(page.items, (41..=45).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert!(page.has_prev());
        assert!(!page.has_next());

        let beyond = paginate(&items, 9, 20);
        assert!(beyond.items.is_empty());

        let clamped = paginate(&items, 0, 500);
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.per_page, 100);
        assert_eq!(clamped.items.len(), 45);
    }

    #[test]
    fn display_date_is_day_first() {
        assert_eq!(format_display_date(date(2024, 3, 5)), "05/03/2024");
    }
}
