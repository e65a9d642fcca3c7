//! Authentication primitives.
//!
//! - [`jwt`] -- validation of access tokens issued by the auth service.
//!
//! This service never issues tokens or handles credentials.

pub mod jwt;
