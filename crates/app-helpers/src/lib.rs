pub mod domain;
pub mod futures;
pub mod results;
