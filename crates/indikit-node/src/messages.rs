//! One-shot protocol messages: free-text `message` notices and
//! `delProperty` withdrawals.

use chrono::Local;
use indikit_object::Dict;

/// Local wall-clock time in the `YYYY-MM-DDThh:mm:ss` form carried by
/// every outbound `@timestamp` attribute.
pub(crate) fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Builds a `message` dict carrying free text for a device.
pub fn message_new(device: &str, message: &str) -> Dict {
    let dict = Dict::new();
    dict.set_quiet("<>", "message");
    dict.set_quiet("@device", device);
    dict.set_quiet("@message", message);
    dict.set_quiet("@timestamp", local_timestamp().as_str());
    dict
}

/// Builds a `delProperty` dict withdrawing one property of a device,
/// or every property when `name` is absent.
pub fn del_property_new(device: &str, name: Option<&str>, message: Option<&str>) -> Dict {
    let dict = Dict::new();
    dict.set_quiet("<>", "delProperty");
    dict.set_quiet("@device", device);
    dict.set_quiet("@timestamp", local_timestamp().as_str());
    if let Some(name) = name {
        dict.set_quiet("@name", name);
    }
    if let Some(message) = message {
        dict.set_quiet("@message", message);
    }
    dict
}
