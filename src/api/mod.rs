pub mod attendance;
pub mod change_request;
pub mod client;
pub mod deduction;
pub mod employee;
pub mod invoice;
pub mod salary;
