use chrono::{DateTime, Datelike, NaiveDate};

/// Parse a stored date-of-birth string. Profiles written by older clients
/// carry either a plain `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_dob(dob: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(dob, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(dob).ok().map(|dt| dt.date_naive()))
}

/// Whole years of age on `today`, one less before the birthday. `None`
/// when the date string does not parse or the result is not positive.
pub fn age_on(dob: &str, today: NaiveDate) -> Option<u32> {
    let birth = parse_dob(dob)?;
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    (age > 0).then_some(age as u32)
}

/// Great-circle distance in miles between two coordinates.
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const R: f64 = 3958.8; // Earth radius in miles
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    R * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_on_the_birthday_is_exact() {
        assert_eq!(age_on("1990-06-15", date(2020, 6, 15)), Some(30));
    }

    #[test]
    fn age_the_day_before_the_birthday_is_one_less() {
        assert_eq!(age_on("1990-06-15", date(2020, 6, 14)), Some(29));
    }

    #[test]
    fn unparsable_dob_is_none() {
        assert_eq!(age_on("not a date", date(2020, 6, 15)), None);
        assert_eq!(age_on("15/06/1990", date(2020, 6, 15)), None);
    }

    #[test]
    fn future_dob_is_none() {
        assert_eq!(age_on("2030-01-01", date(2020, 6, 15)), None);
    }

    #[test]
    fn rfc3339_dob_parses() {
        assert_eq!(age_on("1990-06-15T00:00:00Z", date(2020, 6, 16)), Some(30));
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        let miles = haversine_miles(0.0, 0.0, 0.0, 1.0);
        assert!((miles - 69.17).abs() < 0.05, "got {miles}");
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_identity() {
        let forward = haversine_miles(40.7128, -74.0060, 34.0522, -118.2437);
        let backward = haversine_miles(34.0522, -118.2437, 40.7128, -74.0060);
        assert!((forward - backward).abs() < 1e-9);
        assert_eq!(haversine_miles(40.7128, -74.0060, 40.7128, -74.0060), 0.0);
    }
}
