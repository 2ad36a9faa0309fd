//! Vector construction and projection, checked through the public
//! constructors and the XML transform.

use indikit_node::vectors::{
    blob_def, blob_def_vector, blob_set_vector, number_def, number_def_vector, number_set_vector,
    stream_def, stream_def_vector, switch_def, switch_def_vector, switch_set_vector, text_def,
    text_def_vector, VectorOptions,
};
use indikit_node::{object_to_xml, xml_to_object, OnOff, Perm, Rule, State};

#[test]
fn switch_vector_renders_the_documented_xml() {
    let vector = switch_def_vector(
        "my_device",
        "my_device_onoff",
        State::Ok,
        Perm::ReadWrite,
        Rule::AtMostOne,
        &[
            switch_def("turn_on", None, OnOff::On),
            switch_def("turn_off", None, OnOff::Off),
        ],
        None,
    );
    vector.set_quiet("@timestamp", "2026-01-01T00:00:00");

    let element = object_to_xml(vector.as_object()).unwrap();
    assert_eq!(
        element.to_xml_string(),
        "<defSwitchVector device=\"my_device\" name=\"my_device_onoff\" state=\"Ok\" \
         perm=\"rw\" rule=\"AtMostOne\" timestamp=\"2026-01-01T00:00:00\" group=\"Main\">\
         <defSwitch name=\"turn_on\" label=\"turn_on\">On</defSwitch>\
         <defSwitch name=\"turn_off\" label=\"turn_off\">Off</defSwitch>\
         </defSwitchVector>",
    );
}

#[test]
fn set_projection_round_trips_through_xml() {
    let vector = switch_def_vector(
        "scope",
        "mode",
        State::Busy,
        Perm::ReadWrite,
        Rule::OneOfMany,
        &[
            switch_def("track", None, OnOff::On),
            switch_def("park", None, OnOff::Off),
        ],
        None,
    );
    let set_vector = switch_set_vector(&vector);

    let element = object_to_xml(set_vector.as_object()).unwrap();
    let read_back = xml_to_object(&element);
    assert_eq!(read_back.to_json_string(), set_vector.to_json_string());
}

#[test]
fn presentation_options_surface_in_canonical_order() {
    let opts = VectorOptions {
        label: Some("Position".to_owned()),
        group: Some("Motion".to_owned()),
        hints: Some("slider".to_owned()),
        timeout: 30.0,
        message: Some("homing".to_owned()),
    };
    let vector = text_def_vector(
        "focuser",
        "position",
        State::Idle,
        Perm::ReadWrite,
        &[text_def("target", None, "0")],
        Some(&opts),
    );

    let keys: Vec<String> = vector.iter().map(|(key, _)| key).collect();
    assert_eq!(
        keys,
        [
            "<>",
            "children",
            "@device",
            "@name",
            "@state",
            "@perm",
            "@timestamp",
            "@label",
            "@hints",
            "@timeout",
            "@message",
            "@group",
        ],
    );
    assert_eq!(vector.get_str("@group").as_deref(), Some("Motion"));
}

#[test]
fn number_set_projection_drops_definition_attributes() {
    let vector = number_def_vector(
        "focuser",
        "position",
        State::Idle,
        Perm::ReadWrite,
        &[number_def("steps", None, "%d", 0i64, 50000, 10, 2500)],
        None,
    );
    let set_vector = number_set_vector(&vector);
    let json = set_vector.to_json_string();

    assert!(json.contains(r#""<>":"setNumberVector""#));
    assert!(json.contains(r#""<>":"oneNumber""#));
    assert!(json.contains(r#""$":"2500""#));
    assert!(!json.contains("@min"));
    assert!(!json.contains("@max"));
    assert!(!json.contains("@step"));
    assert!(!json.contains("@perm"));
    assert!(!json.contains("@group"));
}

#[test]
fn blob_set_projection_carries_format_and_decoded_size() {
    let def = blob_def("frame", None, Some("fits"), Some(&b"hello"[..]));
    let vector = blob_def_vector("ccd", "frames", State::Ok, Perm::ReadOnly, &[def], None);
    let set_vector = blob_set_vector(&vector);
    let json = set_vector.to_json_string();

    assert!(json.contains(r#""<>":"oneBLOB""#));
    assert!(json.contains(r#""$":"aGVsbG8=""#));
    assert!(json.contains(r#""@format":"fits""#));
    assert!(json.contains(r#""@size":5"#));
}

#[test]
fn stream_vector_declares_fields_without_values() {
    let vector = stream_def_vector(
        "ccd",
        "video",
        State::Ok,
        &[stream_def("exposure", None), stream_def("data.z", None)],
        None,
    );
    let json = vector.to_json_string();

    assert!(json.contains(r#""<>":"defStreamVector""#));
    assert!(json.contains(r#""@name":"data.z""#));
    assert!(!json.contains(r#""@perm""#));
    assert!(!json.contains(r#""$""#));
}
