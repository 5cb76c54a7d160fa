//! Reasonableness check on the AQI conversion.
//!
//! Print a table of PM2.5 concentrations across the whole scale, with the AQI
//! under both rounding policies: for each band, its edges and midpoint,
//! plus the values in the gap between adjacent bands.

use aqi::{classify_with, Rounding, BREAKPOINTS};

fn row(pm25: f64) {
    match (
        classify_with(pm25, Rounding::HalfEven),
        classify_with(pm25, Rounding::Truncate),
    ) {
        (Ok(rounded), Ok(truncated)) => {
            let marker = if rounded.aqi != truncated.aqi { "*" } else { "" };
            println!(
                "{pm25:>7.2} {:>5} {:>5}{marker:1} {}",
                rounded.aqi, truncated.aqi, rounded.category
            );
        }
        (Err(e), _) | (_, Err(e)) => println!("{pm25:>7.2} {e}"),
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    println!("{:>7} {:>5} {:>5}  category", "pm2.5", "round", "trunc");
    for band in BREAKPOINTS.iter() {
        let mid = (band.pm_low + band.pm_high) / 2.0;
        for pm25 in [band.pm_low, mid, band.pm_high, band.pm_high + 0.05] {
            row(pm25);
        }
    }
    row(-1.0);
}
