//! When does each truck leave? Departures cluster around a morning and an afternoon peak.

use rand::Rng;
use rand_distr::StandardNormal;
use rand_xorshift::XorShiftRng;

use crate::config::SECONDS_PER_DAY;
use crate::Config;

const MORNING_PEAK_HOURS: f64 = 9.0;
const AFTERNOON_PEAK_HOURS: f64 = 16.0;
const PEAK_SPREAD_HOURS: f64 = 2.5;

const SECONDS_PER_HOUR: u64 = 3600;
/// Draws before midnight are replaced with something in the small hours.
const EARLY_WINDOW: (u64, u64) = (0, 6 * SECONDS_PER_HOUR);
/// Draws past the end of the day are replaced with something in the evening.
const LATE_WINDOW: (u64, u64) = (18 * SECONDS_PER_HOUR, SECONDS_PER_DAY);

/// Which day of the horizon the truck departs on, starting from 0.
///
/// With more than one day, this draws from `[0, number_days - 1)`, so the final day never gets a
/// departure unless `include_final_day` is set.
pub fn sample_day(cfg: &Config, rng: &mut XorShiftRng) -> u32 {
    if cfg.number_days == 1 {
        return 0;
    }
    if cfg.include_final_day {
        rng.gen_range(0..cfg.number_days)
    } else {
        rng.gen_range(0..cfg.number_days - 1)
    }
}

/// Seconds after midnight, always in `[0, 86400)`.
pub fn sample_time_of_day(rng: &mut XorShiftRng) -> u64 {
    let mean = if rng.gen_bool(0.5) {
        AFTERNOON_PEAK_HOURS
    } else {
        MORNING_PEAK_HOURS
    };
    let z: f64 = rng.sample(StandardNormal);
    let hours = mean + PEAK_SPREAD_HOURS * z;

    if hours < 0.0 {
        return rng.gen_range(EARLY_WINDOW.0..EARLY_WINDOW.1);
    }
    let seconds = (hours * SECONDS_PER_HOUR as f64).floor();
    if seconds >= SECONDS_PER_DAY as f64 {
        return rng.gen_range(LATE_WINDOW.0..LATE_WINDOW.1);
    }
    seconds as u64
}

/// Seconds since the start of the simulated horizon.
pub fn sample_departure(cfg: &Config, rng: &mut XorShiftRng) -> u64 {
    let day = sample_day(cfg, rng);
    u64::from(day) * SECONDS_PER_DAY + sample_time_of_day(rng)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use truckutil::seeded_rng;

    use super::*;

    #[test]
    fn one_day_horizon() {
        let cfg = Config::default();
        let mut rng = seeded_rng(42);
        for _ in 0..10_000 {
            assert_eq!(sample_day(&cfg, &mut rng), 0);
            let t = sample_departure(&cfg, &mut rng);
            assert!(t < cfg.horizon_seconds());
        }
    }

    #[test]
    fn final_day_excluded_by_default() {
        let mut cfg = Config {
            number_days: 3,
            ..Default::default()
        };
        let mut rng = seeded_rng(42);
        let days: BTreeSet<u32> = (0..10_000).map(|_| sample_day(&cfg, &mut rng)).collect();
        assert_eq!(days, vec![0, 1].into_iter().collect());

        cfg.include_final_day = true;
        let days: BTreeSet<u32> = (0..10_000).map(|_| sample_day(&cfg, &mut rng)).collect();
        assert_eq!(days, vec![0, 1, 2].into_iter().collect());
    }

    #[test]
    fn departures_stay_in_horizon() {
        for number_days in [1, 2, 7, 365] {
            for include_final_day in [false, true] {
                let cfg = Config {
                    number_days,
                    include_final_day,
                    ..Default::default()
                };
                let mut rng = seeded_rng(u64::from(number_days));
                for _ in 0..10_000 {
                    assert!(sample_departure(&cfg, &mut rng) < cfg.horizon_seconds());
                }
            }
        }
    }

    #[test]
    fn bimodal_time_of_day() {
        let mut rng = seeded_rng(42);
        let draws = 20_000;
        let mut morning = 0;
        let mut afternoon = 0;
        for _ in 0..draws {
            let t = sample_time_of_day(&mut rng);
            assert!(t < SECONDS_PER_DAY);
            let hour = t / SECONDS_PER_HOUR;
            if (7..=11).contains(&hour) {
                morning += 1;
            } else if (14..=18).contains(&hour) {
                afternoon += 1;
            }
        }
        // Each peak holds roughly a third of all draws; the midday trough between them much less
        let third = draws / 3;
        assert!(morning > third * 8 / 10, "{} morning departures", morning);
        assert!(afternoon > third * 8 / 10, "{} afternoon departures", afternoon);
    }
}
