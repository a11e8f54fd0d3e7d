pub mod redirect;
pub mod responses;
