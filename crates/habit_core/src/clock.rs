use crate::error::AppError;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

const TODAY_ENV_VAR: &str = "HABITGRID_TODAY";
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub trait Clock {
    fn today(&self) -> Date;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        OffsetDateTime::now_utc().to_offset(offset).date()
    }
}

pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

pub fn parse_iso_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), DATE_FORMAT)
        .map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD"))
}

pub fn clock_from_env() -> Result<Box<dyn Clock>, AppError> {
    if let Ok(raw) = std::env::var(TODAY_ENV_VAR)
        && !raw.trim().is_empty()
    {
        let pinned = Date::parse(raw.trim(), DATE_FORMAT)
            .map_err(|_| AppError::invalid_data("HABITGRID_TODAY must be YYYY-MM-DD"))?;
        return Ok(Box::new(FixedClock(pinned)));
    }

    Ok(Box::new(SystemClock))
}
