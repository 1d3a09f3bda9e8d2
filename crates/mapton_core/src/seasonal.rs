//! Calendar rules for the seasonal globe decorations.
//!
//! Only the date logic lives here; drawing the decorations is up to the
//! rendering layer that receives the active set.

use crate::dispatch::{spawn_delayed, DispatchHandle};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::io;
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    /// First Sunday of Advent through Christmas Eve.
    AdventCandles,
    /// December 1 through Epiphany (January 6).
    ChristmasTree,
    /// October 24 through All Saints' Day.
    Halloween,
    /// The week ending on Fat Tuesday.
    MardiGras,
}

impl Decoration {
    pub const ALL: [Decoration; 4] = [
        Decoration::AdventCandles,
        Decoration::ChristmasTree,
        Decoration::Halloween,
        Decoration::MardiGras,
    ];

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        let (month, day) = (date.month(), date.day());
        match self {
            Self::AdventCandles => first_advent(date.year())
                .is_some_and(|first| first <= date && (month, day) <= (12, 24)),
            Self::ChristmasTree => month == 12 || (month == 1 && day <= 6),
            Self::Halloween => (month == 10 && day >= 24) || (month == 11 && day == 1),
            Self::MardiGras => fat_tuesday(date.year()).is_some_and(|tuesday| {
                tuesday
                    .checked_sub_days(Days::new(6))
                    .is_some_and(|start| start <= date && date <= tuesday)
            }),
        }
    }
}

/// Decorations to show on `date`, in declaration order.
pub fn active_decorations(date: NaiveDate) -> Vec<Decoration> {
    Decoration::ALL
        .into_iter()
        .filter(|decoration| decoration.is_active_on(date))
        .collect()
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

/// Mardi Gras: 47 days before Easter Sunday.
pub fn fat_tuesday(year: i32) -> Option<NaiveDate> {
    easter_sunday(year)?.checked_sub_days(Days::new(47))
}

/// First Sunday of Advent: four Sundays before Christmas Day.
pub fn first_advent(year: i32) -> Option<NaiveDate> {
    let christmas = NaiveDate::from_ymd_opt(year, 12, 25)?;
    let back_to_sunday = match christmas.weekday() {
        Weekday::Sun => 7,
        other => u64::from(other.num_days_from_sunday()),
    };
    christmas.checked_sub_days(Days::new(back_to_sunday + 21))
}

/// Posts the decorations active on `today` after `delay`, off the owner thread.
pub fn schedule_decorations<M, C>(
    handle: DispatchHandle<M>,
    delay: Duration,
    today: NaiveDate,
    into_message: C,
) -> io::Result<JoinHandle<()>>
where
    M: Send + 'static,
    C: FnOnce(Vec<Decoration>) -> M + Send + 'static,
{
    spawn_delayed(
        "seasonal",
        handle,
        delay,
        move || active_decorations(today),
        into_message,
    )
}
