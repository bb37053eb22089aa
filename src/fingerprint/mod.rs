//! JA3 TLS fingerprint model.

pub mod ja3;
pub mod profiles;
pub mod tables;

pub use ja3::{Ja3Fingerprint, TlsVersion};
pub use profiles::Profile;
