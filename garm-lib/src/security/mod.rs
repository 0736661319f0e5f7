pub mod cidr;
pub mod rate_limit;
pub mod ssrf;
