// src/common/time.rs

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Meia-noite local de `date`, em UTC. Se o fuso pula a meia-noite (horário de
/// verão), vale o primeiro minuto local que existe depois dela.
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=MINUTES_PER_DAY)
        .filter_map(|minute| midnight.checked_add_signed(TimeDelta::minutes(minute)))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        // Nenhum fuso real perde mais de um dia
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Janela `[meia-noite, próxima meia-noite)` do dia no fuso informado.
pub fn day_window<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(date, tz);
    let end = local_midnight(date.succ_opt().unwrap_or(date), tz);
    (start, end)
}

/// Janela que termina na próxima meia-noite e começa `days` dias antes de hoje.
pub fn trailing_window<Tz: TimeZone>(today: NaiveDate, days: u64, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = today
        .checked_sub_days(chrono::Days::new(days))
        .unwrap_or(today);
    let (_, end) = day_window(today, tz);
    (local_midnight(first, tz), end)
}

/// Limites de um intervalo de datas inclusivo; cada lado é opcional.
pub fn date_range_bounds<Tz: TimeZone>(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    tz: &Tz,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    (
        start.map(|d| day_window(d, tz).0),
        end.map(|d| day_window(d, tz).1),
    )
}

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, MappedLocalTime, NaiveDateTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_window_spans_one_day_in_utc() {
        let (start, end) = day_window(date(2025, 3, 14), &Utc);
        assert_eq!(start.to_rfc3339(), "2025-03-14T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-03-15T00:00:00+00:00");
    }

    #[test]
    fn day_window_follows_local_midnight() {
        let berlin_winter = FixedOffset::east_opt(3600).unwrap();
        let (start, end) = day_window(date(2025, 1, 10), &berlin_winter);
        assert_eq!(start.to_rfc3339(), "2025-01-09T23:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-10T23:00:00+00:00");
    }

    #[test]
    fn trailing_window_covers_previous_days_and_today() {
        let (start, end) = trailing_window(date(2025, 3, 14), 7, &Utc);
        assert_eq!(start.to_rfc3339(), "2025-03-07T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-03-15T00:00:00+00:00");
    }

    #[test]
    fn date_range_is_inclusive_of_the_end_day() {
        let (start, end) = date_range_bounds(Some(date(2025, 3, 1)), Some(date(2025, 3, 31)), &Utc);
        assert_eq!(start.unwrap().to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert_eq!(end.unwrap().to_rfc3339(), "2025-04-01T00:00:00+00:00");

        let (start, end) = date_range_bounds(None, None, &Utc);
        assert!(start.is_none() && end.is_none());
    }

    /// Fuso UTC-4 que adianta para UTC-3 à meia-noite de 2025-09-07:
    /// 00:00 a 00:59 não existem nesse dia.
    #[derive(Debug, Clone, Copy)]
    struct MidnightJump;

    impl MidnightJump {
        fn gap_start() -> NaiveDateTime {
            date(2025, 9, 7).and_time(NaiveTime::MIN)
        }

        fn before() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn after() -> FixedOffset {
            FixedOffset::west_opt(3 * 3600).unwrap()
        }
    }

    impl TimeZone for MidnightJump {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            MidnightJump
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> MappedLocalTime<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> MappedLocalTime<FixedOffset> {
            let gap_end = Self::gap_start() + TimeDelta::hours(1);
            if *local < Self::gap_start() {
                MappedLocalTime::Single(Self::before())
            } else if *local < gap_end {
                MappedLocalTime::None
            } else {
                MappedLocalTime::Single(Self::after())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            // 2025-09-07 00:00 em UTC-4
            if *utc < Self::gap_start() + TimeDelta::hours(4) {
                Self::before()
            } else {
                Self::after()
            }
        }
    }

    #[test]
    fn skipped_midnight_starts_the_day_at_the_first_local_minute() {
        let start = local_midnight(date(2025, 9, 7), &MidnightJump);
        // 01:00 em UTC-3
        assert_eq!(start.to_rfc3339(), "2025-09-07T04:00:00+00:00");

        let (previous_start, previous_end) = day_window(date(2025, 9, 6), &MidnightJump);
        assert_eq!(previous_start.to_rfc3339(), "2025-09-06T04:00:00+00:00");
        assert_eq!(previous_end, start);
    }
}
