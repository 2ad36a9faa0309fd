//! The node: registered vector state plus inbound routing and outbound
//! announcement.
//!
//! A node owns the def vectors an embedding registers, consumes
//! protocol messages arriving on raw client connections and broker
//! topics, applies client writes to the tree, and publishes
//! definition, set, delProperty and message frames back through the
//! [`Transport`] the embedding supplied. All processing is synchronous
//! and single-threaded; the surrounding event loop drains sockets and
//! hands complete buffers in.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indikit_object::{parse_json_bytes, Dict, Object};
use indikit_xml::framing::{Detection, MessageScanner};
use indikit_xml::parse_xml_bytes;

use crate::codec::{base64_encode, zlib_base64_deflate};
use crate::messages::{del_property_new, message_new};
use crate::transform::{object_to_xml, xml_to_object};
use crate::transport::{encode_xadd, ConnId, StreamSink, Transport};
use crate::vectors::{
    blob_set_vector, copy_entry, light_set_vector, number_set_vector, switch_set_vector,
    text_set_vector,
};
use crate::vocabulary::{BlobPolicy, OnOff};

/// Broker command topics every node listens on. Each is also
/// subscribed with a `/<node_id>` suffix so a client can address one
/// node instead of all of them.
const TRIGGER_PING_TOPIC: &str = "indikit/cmd/trigger_ping";
const SET_MASTER_CLIENT_TOPIC: &str = "indikit/cmd/set_master_client";
const JSON_COMMAND_TOPIC: &str = "indikit/cmd/json";
const XML_COMMAND_TOPIC: &str = "indikit/cmd/xml";

const COMMAND_TOPICS: [&str; 4] = [
    TRIGGER_PING_TOPIC,
    SET_MASTER_CLIENT_TOPIC,
    JSON_COMMAND_TOPIC,
    XML_COMMAND_TOPIC,
];

const JSON_PUBLISH_TOPIC: &str = "indikit/json";
const XML_PUBLISH_TOPIC: &str = "indikit/xml";
const PING_PUBLISH_TOPIC: &str = "indikit/ping/node";

/// Master-client value that lets every client write.
const MASTER_CLIENT_WILDCARD: &str = "@ALL";

/// Broker events surfaced to the embedding's handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    /// Broker session established; the node has subscribed its topics.
    Open,
    /// Message on a topic the node does not consume itself.
    Message,
}

/// Callback for broker events the node does not consume itself.
pub type MqttHandler = Box<dyn Fn(&Node, NodeEvent, &str, &[u8])>;

/// Construction options for [`Node::new`].
#[derive(Default)]
pub struct NodeOptions {
    /// Mirror announcements as INDI XML, on the broker and to raw
    /// protocol clients. JSON announcements always go to the broker.
    pub enable_xml: bool,
    /// Destination for streaming-telemetry commands.
    pub stream_sink: Option<Rc<dyn StreamSink>>,
    /// Handler for broker events not consumed by the node.
    pub mqtt_handler: Option<MqttHandler>,
}

/// One protocol node and the vectors registered with it.
pub struct Node {
    node_id: String,
    def_vectors: Vec<Dict>,
    transport: Rc<dyn Transport>,
    stream_sink: Option<Rc<dyn StreamSink>>,
    mqtt_handler: Option<MqttHandler>,
    master_client: RefCell<String>,
    master_client_topic: String,
    current_sender: Cell<Option<ConnId>>,
    enable_xml: bool,
}

impl Node {
    /// Registers `def_vectors` with a new node. Registration installs
    /// the announcement hook on every vector, replacing the
    /// constructors' placeholder, so any later `notify` on a vector
    /// publishes its set projection. The hooks hold the node weakly;
    /// dropping the returned handle disarms them.
    pub fn new(
        node_id: impl Into<String>,
        def_vectors: Vec<Dict>,
        transport: Rc<dyn Transport>,
        options: NodeOptions,
    ) -> Rc<Node> {
        let node_id = node_id.into();
        let node = Rc::new(Node {
            master_client: RefCell::new(MASTER_CLIENT_WILDCARD.to_owned()),
            master_client_topic: format!("indikit/master_client/{node_id}"),
            node_id,
            def_vectors,
            transport,
            stream_sink: options.stream_sink,
            mqtt_handler: options.mqtt_handler,
            current_sender: Cell::new(None),
            enable_xml: options.enable_xml,
        });
        for def_vector in &node.def_vectors {
            let weak = Rc::downgrade(&node);
            def_vector
                .as_object()
                .set_output_hook(move |vector, _modified| {
                    if let Some(node) = weak.upgrade() {
                        node.announce(vector);
                    }
                });
        }
        node
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Feeds bytes received on a raw protocol connection. Returns how
    /// many leading bytes were consumed, zero when no complete message
    /// is buffered yet. Call again with the remainder until it returns
    /// zero, then retain whatever is left for the next read.
    pub fn handle_tcp(&self, sender: ConnId, buffer: &[u8]) -> usize {
        let mut scanner = MessageScanner::new();
        if let Detection::Message { start, end } = scanner.scan(buffer) {
            self.current_sender.set(Some(sender));
            match parse_xml_bytes(&buffer[start..end]) {
                Ok(element) => self.process(xml_to_object(&element).as_object()),
                Err(error) => log::debug!("Dropping unparsable XML message: {error}"),
            }
            self.current_sender.set(None);
            return end;
        }
        0
    }

    /// Reacts to the broker session opening: subscribes the command
    /// topics (global and node-addressed), notifies the embedding's
    /// handler, then announces every enabled vector.
    pub fn handle_mqtt_open(&self) {
        for topic in COMMAND_TOPICS {
            let node_topic = format!("{}/{}", topic, self.node_id);
            log::info!("Subscribing to `{topic}` and `{node_topic}` topics");
            self.transport.subscribe(topic);
            self.transport.subscribe(&node_topic);
        }
        if let Some(handler) = &self.mqtt_handler {
            handler(self, NodeEvent::Open, "", &[]);
        }
        self.get_properties(None);
    }

    /// Routes one broker message. Command topics are matched by
    /// prefix, so both `indikit/cmd/json` and
    /// `indikit/cmd/json/<node_id>` land here; anything else goes to
    /// the embedding's handler.
    pub fn handle_mqtt_message(&self, topic: &str, payload: &[u8]) {
        if topic.is_empty() {
            return;
        }
        if topic.starts_with(TRIGGER_PING_TOPIC) {
            self.ping();
            return;
        }
        if payload.is_empty() {
            return;
        }
        if topic.starts_with(SET_MASTER_CLIENT_TOPIC) {
            *self.master_client.borrow_mut() = String::from_utf8_lossy(payload).into_owned();
        } else if topic.starts_with(JSON_COMMAND_TOPIC) {
            match parse_json_bytes(payload) {
                Ok(message) => self.process(&message),
                Err(error) => log::debug!("Dropping unparsable JSON message: {error}"),
            }
        } else if topic.starts_with(XML_COMMAND_TOPIC) {
            match parse_xml_bytes(payload) {
                Ok(element) => self.process(xml_to_object(&element).as_object()),
                Err(error) => log::debug!("Dropping unparsable XML message: {error}"),
            }
        } else if let Some(handler) = &self.mqtt_handler {
            handler(self, NodeEvent::Message, topic, payload);
        }
    }

    /// Publishes the node id and the current master client, so
    /// monitors can inventory live nodes.
    pub fn ping(&self) {
        self.transport
            .publish(PING_PUBLISH_TOPIC, self.node_id.as_bytes());
        self.transport.publish(
            &self.master_client_topic,
            self.master_client.borrow().as_bytes(),
        );
    }

    /// Re-enables matching vectors and re-announces their definitions.
    pub fn enable(&self, device: &str, name: Option<&str>, message: Option<&str>) {
        self.device_onoff(device, name, message, OnOff::On);
    }

    /// Disables matching vectors and publishes one delProperty frame.
    pub fn disable(&self, device: &str, name: Option<&str>, message: Option<&str>) {
        self.device_onoff(device, name, message, OnOff::Off);
    }

    /// Publishes a free-text message frame for a device.
    pub fn send_message(&self, device: &str, message: &str) {
        self.publish(message_new(device, message).as_object());
    }

    pub fn mqtt_sub(&self, topic: &str) {
        self.transport.subscribe(topic);
    }

    pub fn mqtt_pub(&self, topic: &str, payload: &[u8]) {
        self.transport.publish(topic, payload);
    }

    /// Appends one entry to a telemetry stream, trimming it to about
    /// `max_len` entries. No-op without a stream sink or fields.
    pub fn redis_pub(&self, stream: &str, max_len: usize, fields: &[(&str, &[u8])]) {
        let Some(sink) = &self.stream_sink else {
            return;
        };
        let frame = encode_xadd(stream, max_len, fields);
        if !frame.is_empty() {
            sink.send(&frame);
        }
    }

    /// Publishes one entry on the `<device>/<stream>` telemetry
    /// stream. Field values are encoded per the field name's suffix:
    /// `.b` means base64, `.z` means zlib then base64, anything else
    /// is passed through raw.
    ///
    /// With `check` set the stream must be registered with this node
    /// as a stream vector for `device`/`stream`, must be enabled, and
    /// `fields` must carry the declared field names in declaration
    /// order. Returns whether an entry was published.
    pub fn stream_pub(
        &self,
        device: &str,
        stream: &str,
        check: bool,
        max_len: usize,
        fields: &[(&str, &[u8])],
    ) -> bool {
        if check && !self.stream_is_enabled(device, stream, fields) {
            return false;
        }
        let Some(sink) = &self.stream_sink else {
            return false;
        };
        let mut encoded: Vec<(&str, Vec<u8>)> = Vec::with_capacity(fields.len());
        for &(name, value) in fields {
            let value = if name.ends_with(".z") {
                zlib_base64_deflate(value).into_bytes()
            } else if name.ends_with(".b") {
                base64_encode(value).into_bytes()
            } else {
                value.to_vec()
            };
            encoded.push((name, value));
        }
        let fields: Vec<(&str, &[u8])> = encoded
            .iter()
            .map(|(name, value)| (*name, value.as_slice()))
            .collect();
        let frame = encode_xadd(&format!("{device}/{stream}"), max_len, &fields);
        if frame.is_empty() {
            return false;
        }
        sink.send(&frame);
        true
    }

    fn stream_is_enabled(&self, device: &str, stream: &str, fields: &[(&str, &[u8])]) -> bool {
        for def_vector in &self.def_vectors {
            if def_vector.get_str("<>").as_deref() != Some("defStreamVector") {
                continue;
            }
            if def_vector.get_str("@device").as_deref() != Some(device)
                || def_vector.get_str("@name").as_deref() != Some(stream)
            {
                continue;
            }
            if def_vector.as_object().is_disabled() {
                log::error!("Stream `{device}::{stream}` is disabled");
                return false;
            }
            let declared: Vec<String> = def_vector
                .get_list("children")
                .map(|children| {
                    children
                        .iter()
                        .filter_map(|child| Dict::from_object(&child))
                        .filter_map(|child| child.get_str("@name"))
                        .collect()
                })
                .unwrap_or_default();
            if declared.len() != fields.len()
                || !declared
                    .iter()
                    .zip(fields)
                    .all(|(name, &(field, _))| name == field)
            {
                log::error!("Stream `{device}::{stream}` field list does not match its definition");
                return false;
            }
            return true;
        }
        log::error!("Stream `{device}::{stream}` is not registered");
        false
    }

    /// Announcement hook body. Builds the set projection for the
    /// vector's family and publishes it, unless either disabled bit
    /// gates the vector off.
    fn announce(&self, vector: &Object) {
        if vector.is_disabled() || vector.is_blob_disabled() {
            return;
        }
        let Some(def_vector) = Dict::from_object(vector) else {
            return;
        };
        let Some(tag) = def_vector.get_str("<>") else {
            return;
        };
        let set_vector = match tag.as_str() {
            "defNumberVector" => number_set_vector(&def_vector),
            "defTextVector" => text_set_vector(&def_vector),
            "defLightVector" => light_set_vector(&def_vector),
            "defSwitchVector" => switch_set_vector(&def_vector),
            "defBLOBVector" => blob_set_vector(&def_vector),
            _ => return,
        };
        self.publish(set_vector.as_object());
    }

    /// Publishes one outbound frame: JSON on the broker always, XML on
    /// the broker and to raw clients when enabled. The connection the
    /// triggering message came in on, if any, is excluded from the raw
    /// broadcast.
    fn publish(&self, object: &Object) {
        if self.enable_xml {
            if let Some(element) = object_to_xml(object) {
                let xml = element.to_xml_string();
                self.transport.publish(XML_PUBLISH_TOPIC, xml.as_bytes());
                self.transport
                    .broadcast(xml.as_bytes(), self.current_sender.get());
            }
        }
        let json = object.to_json_string();
        self.transport.publish(JSON_PUBLISH_TOPIC, json.as_bytes());
    }

    fn process(&self, message: &Object) {
        let Some(dict) = Dict::from_object(message) else {
            return;
        };
        let Some(tag) = dict.get_str("<>") else {
            return;
        };
        match tag.as_str() {
            "getProperties" => self.get_properties(Some(&dict)),
            "enableBLOB" => self.enable_blob(&dict),
            "newNumberVector" | "newTextVector" | "newLightVector" | "newSwitchVector"
            | "newBLOBVector" => self.set_properties(&dict),
            _ => {}
        }
    }

    /// Announces the definition of every enabled vector matching the
    /// request's `@device`/`@name` filters. A missing filter matches
    /// everything; the name filter only applies alongside a device
    /// filter.
    fn get_properties(&self, filter: Option<&Dict>) {
        let device1 = filter.and_then(|dict| dict.get_str("@device"));
        let name1 = filter.and_then(|dict| dict.get_str("@name"));
        for def_vector in &self.def_vectors {
            if def_vector.as_object().is_disabled() {
                continue;
            }
            let (Some(device2), Some(name2)) =
                (def_vector.get_str("@device"), def_vector.get_str("@name"))
            else {
                continue;
            };
            if let Some(device1) = &device1 {
                if *device1 != device2 {
                    continue;
                }
                if let Some(name1) = &name1 {
                    if *name1 != name2 {
                        continue;
                    }
                }
            }
            self.publish(def_vector.as_object());
        }
    }

    /// Applies a BLOB routing policy to every vector matching
    /// `@device` and the optional `@name`: `Also` clears the
    /// BLOB-disabled bit, `Never` sets it on BLOB vectors and clears
    /// it elsewhere, `Only` sets it on everything but BLOB vectors.
    fn enable_blob(&self, dict: &Dict) {
        let Some(device1) = dict.get_str("@device") else {
            return;
        };
        let Some(policy) = dict.get_str("$") else {
            return;
        };
        let policy = match policy.parse::<BlobPolicy>() {
            Ok(policy) => policy,
            Err(error) => {
                log::error!("{error}");
                return;
            }
        };
        let name1 = dict.get_str("@name");
        for def_vector in &self.def_vectors {
            let Some(device2) = def_vector.get_str("@device") else {
                continue;
            };
            if device1 != device2 {
                continue;
            }
            if let Some(name1) = &name1 {
                match def_vector.get_str("@name") {
                    Some(name2) if *name1 == name2 => {}
                    _ => continue,
                }
            }
            let is_blob = def_vector.get_str("<>").as_deref() == Some("defBLOBVector");
            let disabled = match policy {
                BlobPolicy::Also => false,
                BlobPolicy::Never => is_blob,
                BlobPolicy::Only => !is_blob,
            };
            def_vector.as_object().set_blob_disabled(disabled);
        }
    }

    fn is_allowed(&self, dict: &Dict) -> bool {
        let master_client = self.master_client.borrow();
        if *master_client == MASTER_CLIENT_WILDCARD {
            return true;
        }
        match dict.get_str("@client") {
            Some(client) => client == *master_client,
            None => false,
        }
    }

    /// Applies a client write to the first vector matching the
    /// proposal's `@device` and `@name` exactly. Matching children get
    /// the proposed `$` copied in; under a `OneOfMany` rule every
    /// other child is forced to `"Off"`. Leaf input hooks fire per
    /// modified child with the new and previous value, the vector
    /// input hook fires once with the aggregate modified flag, and one
    /// notify walk publishes the acknowledging set projection whether
    /// or not anything changed.
    fn set_properties(&self, dict: &Dict) {
        if !self.is_allowed(dict) {
            return;
        }
        let (Some(device1), Some(name1), Some(children1)) = (
            dict.get_str("@device"),
            dict.get_str("@name"),
            dict.get_list("children"),
        ) else {
            log::debug!("Rejecting write without device, name and children");
            return;
        };
        for def_vector in &self.def_vectors {
            let (Some(device2), Some(name2), Some(children2)) = (
                def_vector.get_str("@device"),
                def_vector.get_str("@name"),
                def_vector.get_list("children"),
            ) else {
                continue;
            };
            if device1 != device2 || name1 != name2 {
                continue;
            }
            let is_one_of_many = def_vector.get_str("@rule").as_deref() == Some("OneOfMany");
            let mut vector_modified = false;
            for proposal in children1.iter() {
                let Some(proposal) = Dict::from_object(&proposal) else {
                    continue;
                };
                let Some(proposal_name) = proposal.get_str("@name") else {
                    continue;
                };
                for target in children2.iter() {
                    let Some(target) = Dict::from_object(&target) else {
                        continue;
                    };
                    let Some(target_name) = target.get_str("@name") else {
                        continue;
                    };
                    let is_current = proposal_name == target_name;
                    if !is_current && !is_one_of_many {
                        continue;
                    }
                    let previous = target.get("$").unwrap_or_else(Object::null);
                    let modified = if is_current {
                        copy_entry(&target, &proposal, "$", false)
                    } else {
                        target.set_quiet("$", "Off")
                    };
                    vector_modified = vector_modified || modified;
                    log::debug!(
                        "Updating (modified: {modified}) `{device1}::{name1}` with {}",
                        target.to_json_string()
                    );
                    if modified {
                        if let Some(hook) = target.as_object().leaf_hook() {
                            let current = target.get("$").unwrap_or_else(Object::null);
                            hook(&current, &previous);
                        }
                    }
                }
            }
            if let Some(hook) = def_vector.as_object().vector_hook() {
                hook(def_vector.as_object(), vector_modified);
            }
            def_vector.as_object().notify(vector_modified);
            break;
        }
    }

    fn device_onoff(
        &self,
        device: &str,
        name: Option<&str>,
        message: Option<&str>,
        onoff: OnOff,
    ) {
        for def_vector in &self.def_vectors {
            match def_vector.get_str("@device") {
                Some(device2) if device2 == device => {}
                _ => continue,
            }
            if let Some(name) = name {
                match def_vector.get_str("@name") {
                    Some(name2) if name2 == name => {}
                    _ => continue,
                }
            }
            match onoff {
                OnOff::On => {
                    def_vector.as_object().set_disabled(false);
                    self.publish(def_vector.as_object());
                }
                OnOff::Off => {
                    def_vector.as_object().set_disabled(true);
                }
            }
        }
        if onoff == OnOff::Off {
            self.publish(del_property_new(device, name, message).as_object());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use indikit_object::Dict;

    use super::*;
    use crate::vectors::{stream_def, stream_def_vector, switch_def, switch_def_vector};
    use crate::vocabulary::{Perm, Rule, State};

    #[derive(Default)]
    struct NullTransport;

    impl Transport for NullTransport {
        fn broadcast(&self, _frame: &[u8], _exclude: Option<ConnId>) {}
        fn publish(&self, _topic: &str, _frame: &[u8]) {}
        fn subscribe(&self, _topic: &str) {}
    }

    #[derive(Default)]
    struct RecordingSink {
        frames: RefCell<Vec<Vec<u8>>>,
    }

    impl StreamSink for RecordingSink {
        fn send(&self, frame: &[u8]) {
            self.frames.borrow_mut().push(frame.to_vec());
        }
    }

    fn switch_vector() -> Dict {
        switch_def_vector(
            "scope",
            "power",
            State::Idle,
            Perm::ReadWrite,
            Rule::OneOfMany,
            &[switch_def("on", None, crate::vocabulary::OnOff::Off)],
            None,
        )
    }

    #[test]
    fn master_client_gates_writes() {
        let node = Node::new(
            "node-1",
            vec![switch_vector()],
            Rc::new(NullTransport),
            NodeOptions::default(),
        );

        let proposal = Dict::new();
        assert!(node.is_allowed(&proposal));

        node.handle_mqtt_message("indikit/cmd/set_master_client", b"ctl-1");
        assert!(!node.is_allowed(&proposal));

        proposal.set("@client", "ctl-1");
        assert!(node.is_allowed(&proposal));

        proposal.set("@client", "ctl-2");
        assert!(!node.is_allowed(&proposal));
    }

    #[test]
    fn checked_stream_publish_validates_the_declaration() {
        let sink = Rc::new(RecordingSink::default());
        let vectors = vec![stream_def_vector(
            "ccd",
            "video",
            State::Ok,
            &[stream_def("exposure", None), stream_def("data.b", None)],
            None,
        )];
        let node = Node::new(
            "node-1",
            vectors,
            Rc::new(NullTransport),
            NodeOptions {
                stream_sink: Some(sink.clone()),
                ..NodeOptions::default()
            },
        );

        assert!(!node.stream_pub("ccd", "missing", true, 10, &[("exposure", b"1".as_slice())]));
        assert!(!node.stream_pub("ccd", "video", true, 10, &[("exposure", b"1".as_slice())]));
        assert!(!node.stream_pub(
            "ccd",
            "video",
            true,
            10,
            &[("exposure", b"1".as_slice()), ("other", b"x")],
        ));
        assert!(sink.frames.borrow().is_empty());

        assert!(node.stream_pub(
            "ccd",
            "video",
            true,
            10,
            &[("exposure", b"1".as_slice()), ("data.b", b"hi")],
        ));
        let frames = sink.frames.borrow();
        assert_eq!(frames.len(), 1);
        let frame = String::from_utf8(frames[0].clone()).unwrap();
        assert!(frame.contains("ccd/video"));
        assert!(frame.contains("aGk="));
    }

    #[test]
    fn disabled_stream_refuses_checked_publish() {
        let sink = Rc::new(RecordingSink::default());
        let vector = stream_def_vector("ccd", "video", State::Ok, &[stream_def("f", None)], None);
        vector.as_object().set_disabled(true);
        let node = Node::new(
            "node-1",
            vec![vector],
            Rc::new(NullTransport),
            NodeOptions {
                stream_sink: Some(sink.clone()),
                ..NodeOptions::default()
            },
        );
        assert!(!node.stream_pub("ccd", "video", true, 10, &[("f", b"1".as_slice())]));
        assert!(node.stream_pub("ccd", "video", false, 10, &[("f", b"1".as_slice())]));
        assert_eq!(sink.frames.borrow().len(), 1);
    }
}
