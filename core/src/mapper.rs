//! Conversion from decoded wire records to domain entities.
//!
//! Mapping is total: a malformed optional sub-record degrades to an empty
//! value instead of failing the whole response. Sub-records that the upstream
//! sends as either one object or an array are normalized to a list here,
//! keeping source order.

use serde_json::Value;

use crate::types::{Contact, Pet, Photo, Shelter};
use crate::wire::{WireContact, WirePet, WireShelter};

impl From<WireContact> for Contact {
    fn from(w: WireContact) -> Self {
        Contact {
            address1: w.address1,
            address2: w.address2,
            city: w.city,
            state: w.state,
            zip: w.zip,
            country: w.country,
            phone: w.phone,
            email: w.email,
            fax: w.fax,
        }
    }
}

impl From<WirePet> for Pet {
    fn from(w: WirePet) -> Self {
        Pet {
            breeds: texts(w.breeds.get("breed")),
            options: texts(w.options.get("option")),
            photos: photos(w.media.pointer("/photos/photo")),
            mix: w.mix.eq_ignore_ascii_case("yes"),
            id: w.id,
            shelter_id: w.shelter_id,
            shelter_pet_id: w.shelter_pet_id,
            name: w.name,
            animal: w.animal,
            sex: w.sex,
            size: w.size,
            age: w.age,
            description: w.description,
            status: w.status,
            contact: w.contact.into(),
            last_update: w.last_update,
        }
    }
}

impl From<WireShelter> for Shelter {
    fn from(w: WireShelter) -> Self {
        Shelter {
            id: w.id,
            name: w.name,
            latitude: w.latitude,
            longitude: w.longitude,
            contact: w.contact.into(),
        }
    }
}

/// View a one-or-many node as a slice of items.
fn items(node: Option<&Value>) -> &[Value] {
    match node {
        Some(Value::Array(list)) => list,
        Some(obj @ Value::Object(_)) => std::slice::from_ref(obj),
        _ => &[],
    }
}

fn unwrap_text(node: &Value) -> Option<String> {
    match node.get("$t")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn attribute(node: &Value, name: &str) -> String {
    node.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn texts(node: Option<&Value>) -> Vec<String> {
    items(node).iter().filter_map(unwrap_text).collect()
}

fn photos(node: Option<&Value>) -> Vec<Photo> {
    items(node)
        .iter()
        .filter(|item| item.is_object())
        .map(|item| Photo {
            size: attribute(item, "@size"),
            url: unwrap_text(item).unwrap_or_default(),
            id: attribute(item, "@id"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire_pet(extra: Value) -> WirePet {
        let mut node = json!({"id": {"$t": "99"}, "mix": {"$t": "yes"}});
        if let (Some(base), Value::Object(more)) = (node.as_object_mut(), extra) {
            base.extend(more);
        }
        serde_json::from_value(node).unwrap()
    }

    #[test]
    fn single_option_becomes_one_element_list() {
        let pet: Pet = wire_pet(json!({"options": {"option": {"$t": "altered"}}})).into();
        assert_eq!(pet.options, vec!["altered"]);
    }

    #[test]
    fn option_array_keeps_order() {
        let pet: Pet = wire_pet(json!({"options": {"option": [
            {"$t": "hasShots"}, {"$t": "altered"}, {"$t": "housetrained"}
        ]}}))
        .into();
        assert_eq!(pet.options, vec!["hasShots", "altered", "housetrained"]);
    }

    #[test]
    fn breeds_accept_object_or_array() {
        let one: Pet = wire_pet(json!({"breeds": {"breed": {"$t": "Beagle"}}})).into();
        let many: Pet = wire_pet(json!({"breeds": {"breed": [{"$t": "Beagle"}, {"$t": "Pug"}]}})).into();
        assert_eq!(one.breeds, vec!["Beagle"]);
        assert_eq!(many.breeds, vec!["Beagle", "Pug"]);
    }

    #[test]
    fn photos_keep_size_class_and_id_opaque() {
        let pet: Pet = wire_pet(json!({"media": {"photos": {"photo": [
            {"@size": "pnt", "@id": "1", "$t": "http://photos/1-pnt.jpg"},
            {"@size": "fpm", "@id": "1", "$t": "http://photos/1-fpm.jpg"}
        ]}}}))
        .into();
        assert_eq!(
            pet.photos,
            vec![
                Photo { size: "pnt".into(), url: "http://photos/1-pnt.jpg".into(), id: "1".into() },
                Photo { size: "fpm".into(), url: "http://photos/1-fpm.jpg".into(), id: "1".into() },
            ]
        );
    }

    #[test]
    fn single_photo_object_is_normalized() {
        let pet: Pet = wire_pet(json!({"media": {"photos": {"photo":
            {"@size": "x", "@id": "2", "$t": "http://photos/2-x.jpg"}
        }}}))
        .into();
        assert_eq!(pet.photos.len(), 1);
        assert_eq!(pet.photos[0].size, "x");
    }

    #[test]
    fn malformed_sub_records_degrade_to_empty() {
        let pet: Pet = wire_pet(json!({
            "options": "not-an-object",
            "breeds": {"breed": [42, {"no": "text"}, {"$t": "Lab"}]},
            "media": {"photos": []}
        }))
        .into();
        assert!(pet.options.is_empty());
        assert_eq!(pet.breeds, vec!["Lab"]);
        assert!(pet.photos.is_empty());
    }

    #[test]
    fn mix_flag_reads_yes() {
        let yes: Pet = wire_pet(json!({})).into();
        let no: Pet = wire_pet(json!({"mix": {"$t": "no"}})).into();
        assert!(yes.mix);
        assert!(!no.mix);
    }

    #[test]
    fn shelter_maps_every_field() {
        let wire: WireShelter = serde_json::from_value(json!({
            "id": {"$t": "CA123"},
            "name": {"$t": "Bay Rescue"},
            "latitude": {"$t": "37.39"},
            "longitude": {"$t": "-122.08"},
            "address1": {"$t": "1 Main St"},
            "city": {"$t": "Mountain View"},
            "state": {"$t": "CA"},
            "email": {"$t": "info@example.org"}
        }))
        .unwrap();
        let shelter: Shelter = wire.into();
        assert_eq!(shelter.name, "Bay Rescue");
        assert_eq!(shelter.longitude, "-122.08");
        assert_eq!(shelter.contact.address1, "1 Main St");
        assert_eq!(shelter.contact.email, "info@example.org");
        assert_eq!(shelter.contact.fax, "");
    }
}
