//! VAT filing periods.

use chrono::{Datelike, Days, Months, NaiveDate};
use consolidator_shared::config::VatCadence;
use serde::{Deserialize, Serialize};

/// A filing period: an inclusive date range aligned to the cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VatPeriod {
    /// Filing cadence.
    pub cadence: VatCadence,
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

impl VatPeriod {
    /// Returns the period of `cadence` that contains `date`.
    #[must_use]
    pub fn containing(date: NaiveDate, cadence: VatCadence) -> Self {
        let month_start = date - Days::new(u64::from(date.day0()));
        let back = match cadence {
            VatCadence::Monthly => 0,
            VatCadence::Quarterly => date.month0() % 3,
            VatCadence::Yearly => date.month0(),
        };
        Self::starting(month_start - Months::new(back), cadence)
    }

    /// Returns the period immediately before this one.
    #[must_use]
    pub fn previous(&self) -> Self {
        Self::starting(self.start - Months::new(Self::length(self.cadence)), self.cadence)
    }

    /// Returns true if `date` falls inside the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Short label, e.g. `2025-06`, `2025-Q2` or `2025`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.cadence {
            VatCadence::Monthly => self.start.format("%Y-%m").to_string(),
            VatCadence::Quarterly => {
                format!("{}-Q{}", self.start.year(), self.start.month0() / 3 + 1)
            }
            VatCadence::Yearly => self.start.year().to_string(),
        }
    }

    fn starting(start: NaiveDate, cadence: VatCadence) -> Self {
        let end = start + Months::new(Self::length(cadence)) - Days::new(1);
        Self {
            cadence,
            start,
            end,
        }
    }

    const fn length(cadence: VatCadence) -> u32 {
        match cadence {
            VatCadence::Monthly => 1,
            VatCadence::Quarterly => 3,
            VatCadence::Yearly => 12,
        }
    }
}
