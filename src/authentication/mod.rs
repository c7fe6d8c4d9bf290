mod password;

pub use password::compute_password_hash;
