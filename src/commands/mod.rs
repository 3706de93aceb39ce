pub mod db;
pub mod option;
