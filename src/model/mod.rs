pub mod attendance;
pub mod cash_advance;
pub mod employee;
pub mod envelope;
pub mod live;
pub mod payroll;
pub mod role;
