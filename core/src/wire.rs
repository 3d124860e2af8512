//! Decoder for the upstream's wire schema.
//!
//! # Design
//! The upstream wraps every scalar as `{"$t": value}` and serializes a result
//! set as a bare object when it holds exactly one item, or as an array
//! otherwise. Both conventions are handled here so the mapper only ever sees
//! plain strings:
//!
//! - `scalar` is the single `deserialize_with` helper that unwraps `$t` for any
//!   field type; an absent, `null` or empty wrapper becomes the type's default.
//! - `one_or_many` tries the single-object shape first and, when that fails,
//!   decodes the same node as an array of objects. If both fail the array
//!   error is returned.
//!
//! Loosely shaped sub-records (breeds, options, photos) are kept as raw
//! `serde_json::Value` nodes and normalized by the mapper.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::de::value::MapAccessDeserializer;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{DecodeError, UpstreamStatus};

/// One-field container the upstream uses for every leaf value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct WireValue<T> {
    #[serde(rename = "$t", default, deserialize_with = "or_default")]
    pub t: T,
}

/// `null` reads as the type's default.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Unwrap a `{"$t": value}` field into `T`, defaulting when absent.
pub fn scalar<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let wrapped = Option::<WireValue<T>>::deserialize(deserializer)?;
    Ok(wrapped.map(|w| w.t).unwrap_or_default())
}

/// Contact block attached to a pet record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WireContact {
    #[serde(default, deserialize_with = "scalar")]
    pub address1: String,
    #[serde(default, deserialize_with = "scalar")]
    pub address2: String,
    #[serde(default, deserialize_with = "scalar")]
    pub city: String,
    #[serde(default, deserialize_with = "scalar")]
    pub state: String,
    #[serde(default, deserialize_with = "scalar")]
    pub zip: String,
    #[serde(default, deserialize_with = "scalar")]
    pub country: String,
    #[serde(default, deserialize_with = "scalar")]
    pub phone: String,
    #[serde(default, deserialize_with = "scalar")]
    pub email: String,
    #[serde(default, deserialize_with = "scalar")]
    pub fax: String,
}

/// A pet record as the upstream sends it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePet {
    #[serde(default, deserialize_with = "scalar")]
    pub id: String,
    #[serde(default, deserialize_with = "scalar")]
    pub shelter_id: String,
    #[serde(default, deserialize_with = "scalar")]
    pub shelter_pet_id: String,
    #[serde(default, deserialize_with = "scalar")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar")]
    pub animal: String,
    #[serde(default, deserialize_with = "scalar")]
    pub sex: String,
    #[serde(default, deserialize_with = "scalar")]
    pub size: String,
    #[serde(default, deserialize_with = "scalar")]
    pub age: String,
    #[serde(default, deserialize_with = "scalar")]
    pub mix: String,
    #[serde(default, deserialize_with = "scalar")]
    pub description: String,
    #[serde(default, deserialize_with = "scalar")]
    pub status: String,
    #[serde(default, deserialize_with = "scalar")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contact: WireContact,
    /// `{"breed": item | [item, ...]}`
    #[serde(default)]
    pub breeds: Value,
    /// `{"option": item | [item, ...]}`
    #[serde(default)]
    pub options: Value,
    /// `{"photos": {"photo": item | [item, ...]}}`
    #[serde(default)]
    pub media: Value,
}

/// A shelter record as the upstream sends it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WireShelter {
    #[serde(default, deserialize_with = "scalar")]
    pub id: String,
    #[serde(default, deserialize_with = "scalar")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar")]
    pub latitude: String,
    #[serde(default, deserialize_with = "scalar")]
    pub longitude: String,
    #[serde(flatten)]
    pub contact: WireContact,
}

/// Accepts only a JSON object, then hands it to `T`.
///
/// Derived struct impls also accept a positional array; without this guard a
/// multi-item array would decode as one garbled record.
struct Object<T>(T);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Object<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ObjectVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for ObjectVisitor<T> {
            type Value = Object<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                T::deserialize(MapAccessDeserializer::new(map)).map(Object)
            }
        }

        deserializer.deserialize_map(ObjectVisitor(PhantomData))
    }
}

fn single<T: DeserializeOwned>(node: &Value) -> Result<T, serde_json::Error> {
    Object::<T>::deserialize(node).map(|o| o.0)
}

/// Decode a node that is either one object or an array of objects.
pub fn one_or_many<T: DeserializeOwned>(node: &Value) -> Result<Vec<T>, serde_json::Error> {
    match single::<T>(node) {
        Ok(item) => Ok(vec![item]),
        Err(err) => {
            debug!(error = %err, "single-object shape rejected, retrying as array");
            let items = Vec::<Object<T>>::deserialize(node)?;
            Ok(items.into_iter().map(|o| o.0).collect())
        }
    }
}

/// Parse the body, run `f` against the root, and attach any upstream status
/// block to a failure.
fn decode_with<R>(
    body: &[u8],
    f: impl FnOnce(&Value) -> Result<R, DecodeError>,
) -> Result<R, DecodeError> {
    let root: Value = serde_json::from_slice(body)?;
    f(&root).map_err(|err| err.with_upstream(upstream_status(&root)))
}

fn upstream_status(root: &Value) -> Option<UpstreamStatus> {
    let status = root.pointer("/petfinder/header/status")?;
    let text = |key: &str| {
        status
            .pointer(&format!("/{key}/$t"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let code = text("code");
    if code.is_empty() {
        return None;
    }
    Some(UpstreamStatus {
        code,
        message: text("message"),
    })
}

fn locate<'a>(root: &'a Value, path: &[&str]) -> Result<&'a Value, DecodeError> {
    let mut node = root;
    for (depth, key) in path.iter().enumerate() {
        node = match node.get(key) {
            Some(Value::Null) | None => {
                return Err(DecodeError::new(format!(
                    "missing field `{}`",
                    path[..=depth].join(".")
                )))
            }
            Some(child) => child,
        };
    }
    Ok(node)
}

/// Locate `container` and decode its `item` field as a result set. A
/// container with no item field is an empty result.
fn collection<T: DeserializeOwned>(
    root: &Value,
    container: &str,
    item: &str,
) -> Result<Vec<T>, DecodeError> {
    let node = locate(root, &["petfinder", container])?;
    if !node.is_object() {
        return Err(DecodeError::new(format!(
            "`petfinder.{container}` is not an object"
        )));
    }
    match node.get(item) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(items) => Ok(one_or_many(items)?),
    }
}

/// Breed names from a `breed.list` response. The list is always an array.
pub fn decode_breeds(body: &[u8]) -> Result<Vec<String>, DecodeError> {
    decode_with(body, |root| {
        let node = locate(root, &["petfinder", "breeds", "breed"])?;
        let breeds = Vec::<WireValue<String>>::deserialize(node)?;
        Ok(breeds.into_iter().map(|b| b.t).collect())
    })
}

/// Identifier from a `pet.getRandom` response requested with `output=id`.
pub fn decode_pet_id(body: &[u8]) -> Result<String, DecodeError> {
    decode_with(body, |root| {
        let node = locate(root, &["petfinder", "petIds", "id"])?;
        Ok(WireValue::<String>::deserialize(node)?.t)
    })
}

/// A single pet from `pet.get` or a full/basic `pet.getRandom`.
pub fn decode_pet(body: &[u8]) -> Result<WirePet, DecodeError> {
    decode_with(body, |root| {
        let node = locate(root, &["petfinder", "pet"])?;
        Ok(single(node)?)
    })
}

/// Pets from `pet.find` or `shelter.getPets`.
pub fn decode_pets(body: &[u8]) -> Result<Vec<WirePet>, DecodeError> {
    decode_with(body, |root| collection(root, "pets", "pet"))
}

/// A single shelter from `shelter.get`.
pub fn decode_shelter(body: &[u8]) -> Result<WireShelter, DecodeError> {
    decode_with(body, |root| {
        let node = locate(root, &["petfinder", "shelter"])?;
        Ok(single(node)?)
    })
}

/// Shelters from `shelter.find`.
pub fn decode_shelters(body: &[u8]) -> Result<Vec<WireShelter>, DecodeError> {
    decode_with(body, |root| collection(root, "shelters", "shelter"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn pet_node(id: &str, name: &str) -> Value {
        json!({
            "id": {"$t": id},
            "name": {"$t": name},
            "animal": {"$t": "Dog"},
            "lastUpdate": {"$t": "2017-01-05T18:35:46Z"},
            "contact": {"city": {"$t": "Plano"}, "fax": {}}
        })
    }

    #[test]
    fn scalar_unwraps_and_defaults() {
        let body = bytes(json!({"petfinder": {"pet": {
            "id": {"$t": "42"},
            "name": {},
            "sex": null
        }}}));
        let pet = decode_pet(&body).unwrap();
        assert_eq!(pet.id, "42");
        assert_eq!(pet.name, "");
        assert_eq!(pet.sex, "");
        assert_eq!(pet.last_update, None);
    }

    #[test]
    fn last_update_parses_rfc3339() {
        let pet = decode_pet(&bytes(json!({"petfinder": {"pet": pet_node("1", "Rex")}}))).unwrap();
        let ts = pet.last_update.unwrap();
        assert_eq!(ts.to_rfc3339(), "2017-01-05T18:35:46+00:00");
    }

    #[test]
    fn malformed_last_update_is_a_decode_error() {
        let body = bytes(json!({"petfinder": {"pet": {
            "id": {"$t": "1"},
            "lastUpdate": {"$t": "yesterday"}
        }}}));
        assert!(decode_pet(&body).is_err());
    }

    #[test]
    fn single_object_collection_decodes_to_one_item() {
        let body = bytes(json!({"petfinder": {"pets": {"pet": pet_node("1", "Rex")}}}));
        let pets = decode_pets(&body).unwrap();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].name, "Rex");
        assert_eq!(pets[0].contact.city, "Plano");
    }

    #[test]
    fn array_collection_preserves_order() {
        let body = bytes(json!({"petfinder": {"pets": {"pet": [
            pet_node("1", "Rex"),
            pet_node("2", "Fido"),
            pet_node("3", "Tom")
        ]}}}));
        let names: Vec<String> = decode_pets(&body).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Rex", "Fido", "Tom"]);
    }

    #[test]
    fn object_and_one_element_array_decode_identically() {
        let one = decode_pets(&bytes(json!({"petfinder": {"pets": {"pet": pet_node("7", "Bo")}}}))).unwrap();
        let arr = decode_pets(&bytes(json!({"petfinder": {"pets": {"pet": [pet_node("7", "Bo")]}}}))).unwrap();
        assert_eq!(one, arr);
    }

    #[test]
    fn empty_array_and_missing_item_are_empty_results() {
        let empty = decode_pets(&bytes(json!({"petfinder": {"pets": {"pet": []}}}))).unwrap();
        assert!(empty.is_empty());
        let bare = decode_shelters(&bytes(json!({"petfinder": {"shelters": {}}}))).unwrap();
        assert!(bare.is_empty());
    }

    #[test]
    fn array_of_scalars_reports_the_array_error() {
        let body = bytes(json!({"petfinder": {"pets": {"pet": ["a", "b"]}}}));
        let err = decode_pets(&body).unwrap_err();
        assert!(err.reason().contains(r#"string "a""#), "{}", err.reason());
        assert!(!err.reason().contains("sequence"), "{}", err.reason());
    }

    #[test]
    fn scalar_node_reports_the_array_error() {
        let err = one_or_many::<WirePet>(&json!("Rex")).unwrap_err().to_string();
        assert!(err.contains("expected a sequence"), "{err}");
    }

    #[test]
    fn null_wrapper_reads_as_default() {
        let pet = decode_pet(br#"{"petfinder":{"pet":{"id":{"$t":"1"},"description":{"$t":null},"lastUpdate":{"$t":null}}}}"#)
            .unwrap();
        assert_eq!(pet.id, "1");
        assert_eq!(pet.description, "");
        assert_eq!(pet.last_update, None);

        let body = bytes(json!({"petfinder": {"pets": {"pet": [
            pet_node("1", "Rex"),
            {"id": {"$t": "2"}, "name": {"$t": null}}
        ]}}}));
        let pets = decode_pets(&body).unwrap();
        assert_eq!(pets.len(), 2);
        assert_eq!(pets[1].name, "");
    }

    #[test]
    fn null_wrapper_in_flattened_contact_reads_as_default() {
        let body = bytes(json!({"petfinder": {"shelter": {
            "id": {"$t": "TX1"},
            "city": {"$t": null}
        }}}));
        let shelter = decode_shelter(&body).unwrap();
        assert_eq!(shelter.contact.city, "");
    }

    #[test]
    fn missing_entity_is_a_decode_error_with_upstream_status() {
        let body = bytes(json!({"petfinder": {"header": {
            "status": {"code": {"$t": "201"}, "message": {"$t": "shelter opt-out"}}
        }}}));
        let err = decode_shelter(&body).unwrap_err();
        assert_eq!(err.reason(), "missing field `petfinder.shelter`");
        let upstream = err.upstream().unwrap();
        assert_eq!(upstream.code, "201");
        assert_eq!(upstream.message, "shelter opt-out");
    }

    #[test]
    fn shelter_contact_fields_are_flattened() {
        let body = bytes(json!({"petfinder": {"shelter": {
            "id": {"$t": "TX1203"},
            "name": {"$t": "Happy Tails"},
            "latitude": {"$t": "33.0198"},
            "longitude": {"$t": "-96.6989"},
            "country": {"$t": "US"},
            "zip": {"$t": "75093"}
        }}}));
        let shelter = decode_shelter(&body).unwrap();
        assert_eq!(shelter.id, "TX1203");
        assert_eq!(shelter.latitude, "33.0198");
        assert_eq!(shelter.contact.country, "US");
        assert_eq!(shelter.contact.zip, "75093");
    }

    #[test]
    fn breeds_decode_in_order() {
        let body = bytes(json!({"petfinder": {"breeds": {
            "@animal": "dog",
            "breed": [{"$t": "Akita"}, {"$t": "Beagle"}]
        }}}));
        assert_eq!(decode_breeds(&body).unwrap(), vec!["Akita", "Beagle"]);
    }

    #[test]
    fn pet_id_is_unwrapped() {
        let body = bytes(json!({"petfinder": {"petIds": {"id": {"$t": "38765132"}}}}));
        assert_eq!(decode_pet_id(&body).unwrap(), "38765132");
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = decode_pets(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(err.upstream().is_none());
    }
}
