pub mod employee;
pub mod location;
pub mod payroll;
pub mod value_matrix;
