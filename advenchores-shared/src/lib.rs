//! Wire types shared between the AdvenChores server and its clients.

pub mod api;
pub mod jwt;
