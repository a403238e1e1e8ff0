//! # wirecheck-client
//!
//! Client for the Telephony Control API: the external REST service that
//! creates and manages calls on behalf of the harness. Only call creation
//! is consumed here; everything else the vendor offers is out of scope.

mod telephony;

pub use telephony::{CreateCall, StatusCallback, TelephonyClient, TelephonyError};
