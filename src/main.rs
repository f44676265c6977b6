use chrono::{Datelike, Days, Local, NaiveDate};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use therapy_scheduler::{
    config::{database, scheduling::load_default_config},
    core::{SchedulingEngine, SlotAllocator},
    errors::{Error, Result},
    models::DEFAULT_DURATION_MINUTES,
    store::{DatabaseBookingStore, TracingNotifier},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Monday of the week given as `YYYY-MM-DD` on the command line, or of the current week.
fn requested_week() -> Result<NaiveDate> {
    let day = match env::args().nth(1) {
        Some(arg) => NaiveDate::parse_from_str(&arg, "%Y-%m-%d")
            .map_err(|e| Error::validation(format!("invalid date '{arg}': {e}")))?,
        None => Local::now().date_naive(),
    };
    day.checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
        .ok_or_else(|| Error::validation(format!("no week around {day}")))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();

    let config = load_default_config().inspect_err(|e| error!("Failed to load config: {e}"))?;
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;
    info!("Database ready");

    let week_start = requested_week()?;
    let mut engine = SchedulingEngine::new(
        Arc::new(DatabaseBookingStore::new(db)),
        Arc::new(TracingNotifier),
        &config,
    );
    engine.load_week(week_start).await?;

    for offset in 0..7 {
        let Some(day) = week_start.checked_add_days(Days::new(offset)) else {
            break;
        };
        let holiday = engine
            .calendar()
            .holiday_name(day)
            .map(|name| format!(" ({name})"))
            .unwrap_or_default();
        println!("{} {day}{holiday}", day.format("%a"));

        let bookings = engine.bookings_on(day);
        for booking in &bookings {
            println!(
                "  {}  #{} patient {} therapy {} [{}]",
                booking.start_label(),
                booking.id,
                booking.patient_id,
                booking.therapy_id,
                booking.status
            );
        }

        let owned: Vec<_> = bookings.into_iter().cloned().collect();
        match SlotAllocator::new(engine.calendar(), engine.catalog()).next_slot(
            &owned,
            DEFAULT_DURATION_MINUTES,
            day,
        ) {
            Ok(next) => println!("  next free slot: {}", next.format("%H:%M")),
            Err(e) => println!("  day is full: {e}"),
        }
    }

    Ok(())
}
