//! Plain data shared by the generators, the controller and the bindings.

pub mod category;
pub mod entries;
pub mod record;
pub mod tarot;
