pub mod calendar;
pub mod clock;
pub mod clock_flow;
pub mod day_state;
pub mod payroll;
