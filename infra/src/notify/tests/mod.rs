mod factory_tests;
mod failover_tests;
mod router_tests;

use chrono::{TimeZone, Utc};
use uuid::Uuid;
use vt_core::{Delivery, Purpose};

pub(crate) fn delivery(purpose: Purpose, destination: &str) -> Delivery {
    Delivery {
        request_id: Uuid::new_v4(),
        subject_id: "user-1".to_string(),
        purpose,
        token: "eyJhbGciOiJIUzI1NiJ9.payload.signature".to_string(),
        expires_at: Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap(),
        destination: destination.to_string(),
    }
}
