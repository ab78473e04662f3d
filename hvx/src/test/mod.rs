pub mod helpers;

mod tables;
