/// Vector function traits and numerical differentiation
pub mod calculus;
/// Newton's method with convergence criteria and line search strategies
pub mod newton;
