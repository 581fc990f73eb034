pub mod db;
pub mod token;
pub mod workspace;
