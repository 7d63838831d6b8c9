//! Alert to push-notification formatting

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::messaging::{Notification, PushMessage};
use crate::model::Alert;

/// Render a timestamp in `tz` as `M/D/YYYY, h:mm:ss AM`
pub fn format_start(start: DateTime<Utc>, tz: Tz) -> String {
    start
        .with_timezone(&tz)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

/// Build the push message announcing `alert` on `topic`
pub fn format_alert(alert: &Alert, tz: Tz, topic: &str) -> PushMessage {
    PushMessage {
        notification: Notification {
            title: alert.message.clone(),
            body: format!("Alert started at {}", format_start(alert.start, tz)),
        },
        topic: topic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Vancouver;

    #[test]
    fn test_format_start_standard_time() {
        let start = Utc.with_ymd_and_hms(2024, 1, 5, 20, 25, 0).unwrap();
        assert_eq!(format_start(start, Vancouver), "1/5/2024, 12:25:00 PM");
    }

    #[test]
    fn test_format_start_daylight_time() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 19, 0, 0).unwrap();
        assert_eq!(format_start(start, Vancouver), "7/1/2024, 12:00:00 PM");
    }

    #[test]
    fn test_format_start_after_midnight() {
        let start = Utc.with_ymd_and_hms(2024, 1, 6, 8, 5, 9).unwrap();
        assert_eq!(format_start(start, Vancouver), "1/6/2024, 12:05:09 AM");
    }

    #[test]
    fn test_format_alert() {
        let start = Utc.with_ymd_and_hms(2024, 11, 20, 17, 30, 45).unwrap();
        let alert = Alert::active("Freezer above -15C", start);

        let message = format_alert(&alert, Vancouver, "alerts");

        assert_eq!(message.topic, "alerts");
        assert_eq!(message.notification.title, "Freezer above -15C");
        assert_eq!(
            message.notification.body,
            "Alert started at 11/20/2024, 9:30:45 AM"
        );
    }
}
