mod dual;
mod jacobian;
