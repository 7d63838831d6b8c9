//! Document types carried through the relay

pub mod alert;
pub mod reading;

pub use alert::{Alert, DELAYED_ALERT_ID, DELAY_WARNING};
pub use reading::Reading;
