//! Media store clients.
//!
//! - [`cloudinary`] -- the production [`MediaStore`](vyom_core::media::MediaStore).

pub mod cloudinary;
