use std::fmt::Formatter;

use chrono::{DateTime, NaiveTime, TimeZone, Timelike};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::rules::bitset::BitSet;
use crate::rules::errors::Error;
use crate::rules::keywords::BindKeyword;
use crate::rules::Result;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Day {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Sunday,
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Bit position, Sunday first.
    pub fn bit(&self) -> u32 {
        *self as u32
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Day::Sunday => "Sun",
            Day::Monday => "Mon",
            Day::Tuesday => "Tue",
            Day::Wednesday => "Wed",
            Day::Thursday => "Thu",
            Day::Friday => "Fri",
            Day::Saturday => "Sat",
        }
    }

    fn full_name(&self) -> &'static str {
        match self {
            Day::Sunday => "sunday",
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
        }
    }

    /// Full name, three letter abbreviation, the `tues`/`thur`/`thurs`
    /// forms, or ordinal `1`-`7` with Sunday as `1`.
    pub fn parse(token: &str) -> Option<Day> {
        let token = token.trim().to_ascii_lowercase();
        if let Ok(ordinal) = token.parse::<usize>() {
            return (1..=7).contains(&ordinal).then(|| Day::ALL[ordinal - 1]);
        }
        match token.as_str() {
            "tues" => return Some(Day::Tuesday),
            "thur" | "thurs" => return Some(Day::Thursday),
            _ => {}
        }
        Day::ALL
            .iter()
            .copied()
            .find(|day| token == day.full_name() || token == day.full_name()[..3])
    }
}

///
/// Set of days, one bit per [`Day`]
///
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayOfWeek(BitSet<u8>);

impl DayOfWeek {
    pub fn new() -> Self {
        DayOfWeek::default()
    }

    /// Folds comma separated day tokens into the set. Tokens that name no day
    /// are skipped; at least one must resolve.
    pub fn parse(raw: &str) -> Result<DayOfWeek> {
        let mut days = DayOfWeek::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match Day::parse(token) {
                Some(day) => {
                    days.shift(day);
                }
                None => debug!("skipping unrecognized day token `{token}`"),
            }
        }
        if days.is_empty() {
            return Err(Error::invalid_value(
                BindKeyword::DayOfWeek,
                format!("no day of week in `{raw}`"),
            ));
        }
        Ok(days)
    }

    pub fn shift(&mut self, day: Day) -> &mut Self {
        self.0.shift(day.bit());
        self
    }

    pub fn unshift(&mut self, day: Day) -> &mut Self {
        self.0.unshift(day.bit());
        self
    }

    pub fn positive(&self, day: Day) -> bool {
        self.0.positive(day.bit())
    }

    pub fn days(&self) -> Vec<Day> {
        Day::ALL.iter().copied().filter(|d| self.positive(*d)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromIterator<Day> for DayOfWeek {
    fn from_iter<T: IntoIterator<Item = Day>>(iter: T) -> Self {
        let mut days = DayOfWeek::new();
        for day in iter {
            days.shift(day);
        }
        days
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let days = self
            .days()
            .iter()
            .map(|d| d.abbreviation())
            .collect::<Vec<&str>>();
        f.write_str(&days.join(","))
    }
}

///
/// 24 hour clock value `HHMM` packed big-endian into two bytes. `2400` is
/// accepted as end of day and kept distinct from `0000`.
///
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash, Serialize, Deserialize)]
pub struct TimeOfDay([u8; 2]);

impl TimeOfDay {
    pub const END_OF_DAY: u16 = 2400;

    pub fn new(hour: u8, minute: u8) -> Result<TimeOfDay> {
        let hhmm = u16::from(hour) * 100 + u16::from(minute);
        if hhmm == Self::END_OF_DAY || (hour < 24 && minute < 60) {
            return Ok(TimeOfDay(hhmm.to_be_bytes()));
        }
        Err(Error::invalid_value(
            BindKeyword::TimeOfDay,
            format!("{hour:02}{minute:02} is not a clock time"),
        ))
    }

    pub fn parse(raw: &str) -> Result<TimeOfDay> {
        let raw = raw.trim();
        if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_value(
                BindKeyword::TimeOfDay,
                format!("`{raw}` is not a four digit HHMM value"),
            ));
        }
        let hour = raw[..2].parse::<u8>().unwrap_or(u8::MAX);
        let minute = raw[2..].parse::<u8>().unwrap_or(u8::MAX);
        TimeOfDay::new(hour, minute)
    }

    pub fn from_time(time: NaiveTime) -> TimeOfDay {
        let hhmm = time.hour() as u16 * 100 + time.minute() as u16;
        TimeOfDay(hhmm.to_be_bytes())
    }

    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> TimeOfDay {
        TimeOfDay::from_time(datetime.time())
    }

    pub fn value(&self) -> u16 {
        u16::from_be_bytes(self.0)
    }

    pub fn is_end_of_day(&self) -> bool {
        self.value() == Self::END_OF_DAY
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.value())
    }
}
