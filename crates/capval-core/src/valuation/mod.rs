pub mod capm;
pub mod dcf;
pub mod sensitivity;
pub mod wacc;
