//! Salary arithmetic for the monthly attendance summary.

const WORKING_DAYS_PER_MONTH: f64 = 26.0;
const HOURS_PER_DAY: f64 = 8.0;

/// Estimated pay for `total_hours` worked against a monthly salary, using
/// a 26-day, 8-hour working month, rounded to the nearest whole unit.
pub fn salary_estimate(monthly_salary: f64, total_hours: f64) -> i64 {
    let daily = monthly_salary / WORKING_DAYS_PER_MONTH;
    let hourly = daily / HOURS_PER_DAY;
    (total_hours * hourly).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_month_of_hours_earns_the_monthly_salary() {
        assert_eq!(salary_estimate(52_000.0, 26.0 * 8.0), 52_000);
    }

    #[test]
    fn zero_hours_earns_nothing() {
        assert_eq!(salary_estimate(52_000.0, 0.0), 0);
    }

    #[test]
    fn partial_hours_round_to_whole_units() {
        // 52000 / 26 / 8 = 250 per hour.
        assert_eq!(salary_estimate(52_000.0, 7.5), 1_875);
        assert_eq!(salary_estimate(52_000.0, 0.001), 0);
    }
}
