//! BLOB vectors: binary payloads carried as base64 text. A `@format`
//! ending in `.z` asks for zlib compression in front of the base64
//! layer; the decoded size always reports the original payload.

use indikit_object::{Dict, List, Object};

use crate::codec::{base64_decode, base64_encode, zlib_base64_deflate, zlib_base64_inflate};
use crate::vectors::common::{def_to_set, install_unregistered_hook, set_opts, VectorOptions};
use crate::vocabulary::{Perm, State};

/// Builds one `defBLOB` leaf. An absent or empty format falls back to
/// `"raw"`.
pub fn blob_def(
    name: &str,
    label: Option<&str>,
    format: Option<&str>,
    payload: Option<&[u8]>,
) -> Dict {
    let label = match label {
        Some(label) if !label.is_empty() => label,
        _ => name,
    };
    let format = match format {
        Some(format) if !format.is_empty() => format,
        _ => "raw",
    };

    let result = Dict::new();
    result.set_quiet("<>", "defBLOB");
    result.set_quiet("@name", name);
    result.set_quiet("@label", label);
    result.set_quiet("@format", format);
    blob_def_set(&result, payload);
    result
}

/// Builds a `defBLOBVector` holding the provided defs.
pub fn blob_def_vector(
    device: &str,
    name: &str,
    state: State,
    perm: Perm,
    defs: &[Dict],
    opts: Option<&VectorOptions>,
) -> Dict {
    let result = Dict::new();
    let children = List::new();

    result.set_quiet("<>", "defBLOBVector");
    result.set_quiet("children", children.as_object().clone());

    result.set_quiet("@device", device);
    result.set_quiet("@name", name);
    result.set_quiet("@state", state.as_str());
    result.set_quiet("@perm", perm.as_str());

    set_opts(&result, opts);

    for def in defs {
        children.push_quiet(def.as_object().clone());
    }

    install_unregistered_hook(&result, "setBLOBVector", "oneBLOB");
    result
}

/// Projects a BLOB def vector onto its `setBLOBVector` form.
pub fn blob_set_vector(vector: &Dict) -> Dict {
    def_to_set(vector, "setBLOBVector", "oneBLOB")
}

/// Encodes a payload into a BLOB leaf, notifying the tree. An absent
/// or empty payload stores an empty value. Returns whether the encoded
/// value changed.
pub fn blob_def_set(def: &Dict, payload: Option<&[u8]>) -> bool {
    let payload = payload.unwrap_or(&[]);
    if payload.is_empty() {
        return def.set("$", Object::string_with_size("", 0));
    }
    let encoded = if blob_is_compressed(def) {
        zlib_base64_deflate(payload)
    } else {
        base64_encode(payload)
    };
    def.set("$", Object::string_with_size(encoded, payload.len()))
}

/// Decodes a BLOB leaf back into its payload, `None` when the value is
/// missing or does not decode.
pub fn blob_def_get(def: &Dict) -> Option<Vec<u8>> {
    let text = def.get_str("$")?;
    if blob_is_compressed(def) {
        zlib_base64_inflate(&text)
    } else {
        base64_decode(&text)
    }
}

/// Whether the def's `@format` asks for zlib compression, signalled by
/// a `.z` suffix.
pub fn blob_is_compressed(def: &Dict) -> bool {
    match def.get_str("@format") {
        Some(format) => format.len() > 2 && format.ends_with(".z"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_are_stored_as_base64_with_their_raw_size() {
        let def = blob_def("frame", None, Some("fits"), Some(&b"hello"[..]));
        assert_eq!(def.get_str("$").as_deref(), Some("aGVsbG8="));
        assert_eq!(def.get("$").unwrap().raw_size(), Some(5));
        assert_eq!(blob_def_get(&def).as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn an_absent_payload_stores_an_empty_value() {
        let def = blob_def("frame", None, None, None);
        assert_eq!(def.get_str("@format").as_deref(), Some("raw"));
        assert_eq!(def.get_str("$").as_deref(), Some(""));
        assert_eq!(def.get("$").unwrap().raw_size(), Some(0));
    }

    #[test]
    fn compressed_formats_round_trip_through_zlib() {
        let payload = vec![42u8; 2048];
        let def = blob_def("frame", None, Some("fits.z"), Some(payload.as_slice()));
        assert!(blob_is_compressed(&def));
        let stored = def.get_str("$").unwrap();
        assert!(stored.len() < payload.len());
        assert_eq!(def.get("$").unwrap().raw_size(), Some(2048));
        assert_eq!(blob_def_get(&def).as_deref(), Some(&payload[..]));
    }

    #[test]
    fn the_set_projection_reports_format_and_size() {
        let def = blob_def("frame", None, Some("fits"), Some(&b"hello"[..]));
        let vector = blob_def_vector(
            "cam",
            "capture",
            State::Ok,
            Perm::ReadOnly,
            &[def],
            None,
        );

        let set = blob_set_vector(&vector);
        let children = set.get_list("children").unwrap();
        let one = Dict::from_object(&children.get(0).unwrap()).unwrap();
        assert_eq!(one.get_str("<>").as_deref(), Some("oneBLOB"));
        assert_eq!(one.get_str("@format").as_deref(), Some("fits"));
        assert_eq!(one.get_f64("@size"), Some(5.0));
        assert_eq!(one.get_str("$").as_deref(), Some("aGVsbG8="));
    }
}
