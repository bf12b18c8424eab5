//! Event System Operations - Pure DOP Functions
//!
//! Functions that edit and read EventBusData.

use crate::event_system_data::{EventBusData, EventKey, HandlerKind, Subscription};

/// Subscribe `handler` to `key`
///
/// Equal priorities keep subscription order. Returns false if the handler
/// was already subscribed to this event.
pub fn subscribe(bus: &mut EventBusData, key: EventKey, priority: i32, handler: HandlerKind) -> bool {
    let list = bus.subscriptions.entry(key).or_default();
    if list.iter().any(|s| s.handler == handler) {
        return false;
    }

    let at = list
        .iter()
        .position(|s| s.priority < priority)
        .unwrap_or(list.len());
    list.insert(at, Subscription { priority, handler });
    true
}

/// Remove `handler` from `key`, returning whether it was subscribed
pub fn unsubscribe(bus: &mut EventBusData, key: &EventKey, handler: &HandlerKind) -> bool {
    let Some(list) = bus.subscriptions.get_mut(key) else {
        return false;
    };
    let before = list.len();
    list.retain(|s| &s.handler != handler);
    let removed = list.len() != before;
    if list.is_empty() {
        bus.subscriptions.remove(key);
    }
    removed
}

/// Snapshot of the handlers for `key` in run order
pub fn subscriptions_for(bus: &EventBusData, key: &EventKey) -> Vec<Subscription> {
    bus.subscriptions.get(key).cloned().unwrap_or_default()
}

pub fn is_subscribed(bus: &EventBusData, key: &EventKey) -> bool {
    bus.subscriptions.get(key).is_some_and(|list| !list.is_empty())
}

pub fn subscription_count(bus: &EventBusData) -> usize {
    bus.subscriptions.values().map(Vec::len).sum()
}
