use std::f64::consts::PI;

use time::OffsetDateTime;

/// Position within the current UTC day, in `[0, 1)`.
pub fn day_fraction(now: OffsetDateTime) -> f64 {
    let seconds = u32::from(now.hour()) * 3600 + u32::from(now.minute()) * 60 + u32::from(now.second());
    f64::from(seconds) / 86400.0
}

pub fn simulated_light(day_fraction: f64) -> f64 {
    const MAX_SUNLIGHT_LUX: f64 = 500.0;
    const MAX_MOONLIGHT_LUX: f64 = 5.0;

    const SUNRISE_START: f64 = 0.23;
    const SUNRISE_END: f64 = 0.25;
    const SUNSET_START: f64 = 0.73;
    const SUNSET_END: f64 = 0.75;

    if (SUNRISE_START..=SUNRISE_END).contains(&day_fraction) {
        let progress = (day_fraction - SUNRISE_START) / (SUNRISE_END - SUNRISE_START);
        (progress * PI / 2.0).sin() * MAX_SUNLIGHT_LUX
    } else if (SUNSET_START..=SUNSET_END).contains(&day_fraction) {
        let progress = (day_fraction - SUNSET_START) / (SUNSET_END - SUNSET_START);
        (progress * PI / 2.0).cos() * MAX_SUNLIGHT_LUX
    } else if day_fraction > SUNRISE_END && day_fraction < SUNSET_START {
        MAX_SUNLIGHT_LUX
    } else {
        // moonlight peaks at midnight
        let radians = day_fraction * 2.0 * PI;
        radians.cos().max(0.0) * (MAX_MOONLIGHT_LUX - 0.01) + 0.01
    }
}

/// Coolest before dawn, warmest mid afternoon.
pub fn simulated_temperature(day_fraction: f64) -> f64 {
    let radians = (day_fraction - 0.375) * 2.0 * PI;
    22.0 + radians.sin() * 6.0
}

pub fn simulated_humidity(day_fraction: f64) -> f64 {
    let radians = day_fraction * 2.0 * PI;

    if (0.3..=0.7).contains(&day_fraction) {
        radians.sin().max(0.0) * 25.0 + 40.0
    } else {
        radians.cos().max(0.0) * 30.0 + 55.0
    }
}
