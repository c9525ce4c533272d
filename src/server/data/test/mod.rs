use serde_json::json;
use test_utils::{builder::TestBuilder, fixture};

use crate::server::{
    data::{
        entitlement::{EntitlementMap, EntitlementStore},
        json_file::{read_json, write_json_atomic, JsonRead},
        update_event::{UpdateEntry, UpdateEventStore},
    },
    model::entitlement::{EntitlementRecord, Tier, UpdateEvent},
};

mod entitlement;
mod update_event;
