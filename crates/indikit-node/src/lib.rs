//! INDI protocol node: property vectors, wire transforms, and message
//! routing for embedded telemetry/control endpoints.
//!
//! A node registers a set of property vectors (switches, numbers,
//! texts, lights, BLOBs, streams) built as [`Dict`] trees, then routes
//! inbound protocol traffic from raw INDI/XML connections and broker
//! topics to those vectors and publishes definition/set/del/message
//! frames back out. Number formatting, BLOB codecs, and the
//! streaming-telemetry publisher live alongside.

mod codec;
mod format;
mod messages;
mod node;
mod transform;
mod transport;
pub mod vectors;
mod vocabulary;

pub use indikit_object::{Dict, List, Object};
pub use indikit_xml::{XmlElement, XmlNode};

pub use codec::{
    base64_decode, base64_encode, zlib_base64_deflate, zlib_base64_inflate, zlib_deflate,
    zlib_inflate,
};
pub use format::{format_f64, format_i64, parse_f64, parse_i64};
pub use messages::{del_property_new, message_new};
pub use node::{MqttHandler, Node, NodeEvent, NodeOptions};
pub use transform::{object_to_xml, xml_to_object};
pub use transport::{encode_auth, encode_xadd, ConnId, StreamSink, Transport};
pub use vocabulary::{
    BlobPolicy, OnOff, Perm, Rule, State, StreamPolicy, VocabularyError, INDI_VERSION,
};
