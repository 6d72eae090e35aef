pub mod db;
pub mod descriptor;

pub use db::*;
pub use descriptor::*;
