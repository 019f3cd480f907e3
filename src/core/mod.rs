pub mod controller;
pub mod export;
pub mod fields;
pub mod generate;
pub mod lint;
pub mod locks;
pub mod persistence;
pub mod tables;
pub mod tarot;
