//! Stub of the Petfinder upstream for tests and local development.
//!
//! Serves the seven read operations from a fixed in-memory catalog and answers
//! in the upstream's wire dialect: scalars wrapped as `{"$t": value}`, a result
//! set rendered as a bare object when it has exactly one item and as an array
//! otherwise, and failures reported as a header-only body with HTTP 200.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::debug;

pub const CODE_OK: &str = "100";
pub const CODE_INVALID_REQUEST: &str = "200";
pub const CODE_NOT_FOUND: &str = "201";
pub const CODE_INVALID_LOCATION: &str = "203";
pub const CODE_UNAUTHORIZED: &str = "300";

const DEFAULT_COUNT: usize = 25;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShelterRecord {
    pub id: String,
    pub name: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub latitude: String,
    pub longitude: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PetRecord {
    pub id: String,
    pub shelter_id: String,
    pub shelter_pet_id: String,
    pub name: String,
    pub animal: String,
    pub breeds: Vec<String>,
    pub mix: bool,
    pub sex: String,
    pub size: String,
    pub age: String,
    pub status: String,
    pub description: String,
    pub options: Vec<String>,
    pub photo_count: usize,
    pub last_update: String,
}

/// Read-only data the stub answers from.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub shelters: Vec<ShelterRecord>,
    pub pets: Vec<PetRecord>,
    pub breeds: HashMap<String, Vec<String>>,
}

pub type Db = Arc<Catalog>;

impl Catalog {
    /// Three shelters: `TX1203` (12 pets) and `TX514` (1 pet) in 75093,
    /// `CA1337` (no pets) in 94041.
    pub fn seeded() -> Self {
        let shelters = vec![
            shelter("TX1203", "Plano Animal Services", "4028 W Plano Pkwy", "Plano", "TX", "75093", "33.0198", "-96.6989"),
            shelter("TX514", "North Texas Rescue", "12 Elm St", "Plano", "TX", "75093", "33.0310", "-96.7801"),
            shelter("CA1337", "Peninsula Humane Society", "1 Moffett Blvd", "Mountain View", "CA", "94041", "37.3894", "-122.0819"),
        ];

        const NAMES: [&str; 12] = [
            "Rex", "Luna", "Max", "Bella", "Milo", "Daisy", "Oscar", "Coco", "Toby", "Nala", "Buddy", "Ziggy",
        ];
        let mut pets: Vec<PetRecord> = NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let dog = i % 3 != 2;
                let breeds = match (dog, i % 2) {
                    (true, 0) => vec!["Labrador Retriever".to_string()],
                    (true, _) => vec!["Beagle".to_string(), "Basset Hound".to_string()],
                    (false, _) => vec!["Domestic Short Hair".to_string()],
                };
                let options = ["hasShots", "altered", "housetrained"]
                    .iter()
                    .take(i % 4)
                    .map(|o| o.to_string())
                    .collect();
                PetRecord {
                    id: format!("3876{:04}", i + 1),
                    shelter_id: "TX1203".to_string(),
                    shelter_pet_id: format!("A{}", 100 + i),
                    name: name.to_string(),
                    animal: if dog { "Dog" } else { "Cat" }.to_string(),
                    mix: breeds.len() > 1,
                    breeds,
                    sex: if i % 2 == 0 { "M" } else { "F" }.to_string(),
                    size: ["S", "M", "L", "XL"][i % 4].to_string(),
                    age: ["Baby", "Young", "Adult", "Senior"][i % 4].to_string(),
                    status: "A".to_string(),
                    description: format!("{name} is looking for a home."),
                    options,
                    photo_count: 1 + i % 3,
                    last_update: format!("2017-01-{:02}T18:35:46Z", i + 1),
                }
            })
            .collect();
        pets.push(PetRecord {
            id: "38769999".to_string(),
            shelter_id: "TX514".to_string(),
            shelter_pet_id: String::new(),
            name: "Pepper".to_string(),
            animal: "Rabbit".to_string(),
            breeds: vec!["Lop Eared".to_string()],
            mix: false,
            sex: "F".to_string(),
            size: "S".to_string(),
            age: "Young".to_string(),
            status: "A".to_string(),
            description: String::new(),
            options: Vec::new(),
            photo_count: 0,
            last_update: "2017-02-14T09:00:00Z".to_string(),
        });

        let mut breeds = HashMap::new();
        breeds.insert(
            "dog".to_string(),
            vec!["Basset Hound", "Beagle", "Labrador Retriever"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        breeds.insert("cat".to_string(), vec!["Domestic Short Hair".to_string()]);
        breeds.insert("smallfurry".to_string(), vec!["Lop Eared".to_string(), "Rex".to_string()]);

        Self {
            shelters,
            pets,
            breeds,
        }
    }

    fn shelter(&self, id: &str) -> Option<&ShelterRecord> {
        self.shelters.iter().find(|s| s.id == id)
    }

    fn shelters_near(&self, location: &str) -> Vec<&ShelterRecord> {
        let wanted = location.trim().to_ascii_lowercase();
        self.shelters
            .iter()
            .filter(|s| {
                s.zip == wanted || format!("{}, {}", s.city, s.state).to_ascii_lowercase() == wanted
            })
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn shelter(
    id: &str,
    name: &str,
    address1: &str,
    city: &str,
    state: &str,
    zip: &str,
    latitude: &str,
    longitude: &str,
) -> ShelterRecord {
    ShelterRecord {
        id: id.to_string(),
        name: name.to_string(),
        address1: address1.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        zip: zip.to_string(),
        country: "US".to_string(),
        phone: "555-0100".to_string(),
        email: format!("adopt@{}.example.org", id.to_ascii_lowercase()),
        latitude: latitude.to_string(),
        longitude: longitude.to_string(),
    }
}

pub fn app() -> Router {
    app_with(Arc::new(Catalog::seeded()))
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/breed.list", get(list_breeds))
        .route("/pet.getRandom", get(random_pet))
        .route("/pet.get", get(get_pet))
        .route("/pet.find", get(find_pets))
        .route("/shelter.find", get(find_shelters))
        .route("/shelter.get", get(get_shelter))
        .route("/shelter.getPets", get(shelter_pets))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type Params = Query<HashMap<String, String>>;

fn t(value: &str) -> Value {
    if value.is_empty() {
        json!({})
    } else {
        json!({ "$t": value })
    }
}

fn header(code: &str, message: &str) -> Value {
    json!({
        "version": t("0.1"),
        "timestamp": t("2017-03-01T12:00:00Z"),
        "status": { "code": t(code), "message": t(message) }
    })
}

/// Header-only body the upstream sends for any failure.
fn failure(code: &str, message: &str) -> Json<Value> {
    Json(json!({ "petfinder": { "header": header(code, message) } }))
}

fn success(key: &str, payload: Value) -> Json<Value> {
    let mut body = Map::new();
    body.insert("header".to_string(), header(CODE_OK, ""));
    body.insert(key.to_string(), payload);
    Json(json!({ "petfinder": body }))
}

/// One item renders as a bare object, anything else as an array.
fn one_or_many(mut items: Vec<Value>) -> Value {
    if items.len() == 1 {
        items.remove(0)
    } else {
        Value::Array(items)
    }
}

/// Results container; an empty set is rendered without its item field.
fn results(item: &str, items: Vec<Value>) -> Value {
    if items.is_empty() {
        json!({})
    } else {
        json!({ item: one_or_many(items) })
    }
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> &'a str {
    params.get(name).map(String::as_str).unwrap_or_default()
}

fn authorize(params: &HashMap<String, String>) -> Result<(), Json<Value>> {
    if param(params, "key").is_empty() {
        return Err(failure(CODE_UNAUTHORIZED, "Invalid key"));
    }
    if param(params, "format") != "json" {
        return Err(failure(CODE_INVALID_REQUEST, "Unsupported format"));
    }
    Ok(())
}

fn page<T>(items: Vec<T>, params: &HashMap<String, String>) -> Vec<T> {
    let offset = param(params, "offset").parse().unwrap_or(0);
    let count = param(params, "count").parse().unwrap_or(DEFAULT_COUNT);
    items.into_iter().skip(offset).take(count).collect()
}

fn pet_matches(pet: &PetRecord, params: &HashMap<String, String>) -> bool {
    let filters = [
        ("animal", pet.animal.as_str()),
        ("breed", ""),
        ("sex", pet.sex.as_str()),
        ("size", pet.size.as_str()),
        ("age", pet.age.as_str()),
        ("status", pet.status.as_str()),
        ("shelterid", pet.shelter_id.as_str()),
    ];
    filters.iter().all(|(name, value)| {
        let wanted = param(params, name);
        match *name {
            _ if wanted.is_empty() => true,
            "breed" => pet.breeds.iter().any(|b| b.eq_ignore_ascii_case(wanted)),
            _ => value.eq_ignore_ascii_case(wanted),
        }
    })
}

fn pet_wire(pet: &PetRecord, shelter: Option<&ShelterRecord>, full: bool) -> Value {
    let breeds: Vec<Value> = pet.breeds.iter().map(|b| t(b)).collect();
    let options: Vec<Value> = pet.options.iter().map(|o| t(o)).collect();
    let photos: Vec<Value> = (1..=pet.photo_count)
        .flat_map(|n| {
            ["pnt", "fpm", "x"].into_iter().map(move |size| (n, size))
        })
        .map(|(n, size)| {
            json!({
                "@size": size,
                "@id": n.to_string(),
                "$t": format!("http://photos.example.org/{}/{n}/?width=95&size={size}", pet.id)
            })
        })
        .collect();

    let contact = shelter.map_or_else(
        || json!({}),
        |s| {
            json!({
                "address1": t(&s.address1),
                "address2": t(""),
                "city": t(&s.city),
                "state": t(&s.state),
                "zip": t(&s.zip),
                "phone": t(&s.phone),
                "email": t(&s.email),
                "fax": t("")
            })
        },
    );

    let mut node = json!({
        "id": t(&pet.id),
        "shelterId": t(&pet.shelter_id),
        "shelterPetId": t(&pet.shelter_pet_id),
        "name": t(&pet.name),
        "animal": t(&pet.animal),
        "breeds": results("breed", breeds),
        "mix": t(if pet.mix { "yes" } else { "no" }),
        "sex": t(&pet.sex),
        "size": t(&pet.size),
        "age": t(&pet.age),
        "status": t(&pet.status),
        "options": results("option", options),
        "lastUpdate": t(&pet.last_update),
        "contact": contact
    });
    if full {
        node["description"] = t(&pet.description);
        node["media"] = json!({ "photos": results("photo", photos) });
    }
    node
}

fn shelter_wire(s: &ShelterRecord) -> Value {
    json!({
        "id": t(&s.id),
        "name": t(&s.name),
        "address1": t(&s.address1),
        "address2": t(""),
        "city": t(&s.city),
        "state": t(&s.state),
        "zip": t(&s.zip),
        "country": t(&s.country),
        "phone": t(&s.phone),
        "fax": t(""),
        "email": t(&s.email),
        "latitude": t(&s.latitude),
        "longitude": t(&s.longitude)
    })
}

fn render_pets<'a>(db: &Catalog, pets: impl Iterator<Item = &'a PetRecord>, full: bool) -> Vec<Value> {
    pets.map(|p| pet_wire(p, db.shelter(&p.shelter_id), full))
        .collect()
}

async fn list_breeds(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    if let Err(body) = authorize(&params) {
        return body;
    }
    let animal = param(&params, "animal");
    match db.breeds.get(animal) {
        Some(breeds) => {
            let items: Vec<Value> = breeds.iter().map(|b| t(b)).collect();
            success("breeds", json!({ "@animal": animal, "breed": items }))
        }
        None => failure(CODE_INVALID_REQUEST, "Invalid animal"),
    }
}

async fn random_pet(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    if let Err(body) = authorize(&params) {
        return body;
    }
    let Some(pet) = db.pets.iter().find(|p| pet_matches(p, &params)) else {
        return failure(CODE_NOT_FOUND, "No pets match");
    };
    debug!(id = %pet.id, "random pet");
    match param(&params, "output") {
        "id" | "" => success("petIds", json!({ "id": t(&pet.id) })),
        output => success("pet", pet_wire(pet, db.shelter(&pet.shelter_id), output == "full")),
    }
}

async fn get_pet(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    if let Err(body) = authorize(&params) {
        return body;
    }
    match db.pets.iter().find(|p| p.id == param(&params, "id")) {
        Some(pet) => success("pet", pet_wire(pet, db.shelter(&pet.shelter_id), true)),
        None => failure(CODE_NOT_FOUND, "Record does not exist"),
    }
}

async fn find_pets(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    if let Err(body) = authorize(&params) {
        return body;
    }
    let near = db.shelters_near(param(&params, "location"));
    if near.is_empty() {
        return failure(CODE_INVALID_LOCATION, "Invalid geographical location");
    }
    let matching = db
        .pets
        .iter()
        .filter(|p| near.iter().any(|s| s.id == p.shelter_id) && pet_matches(p, &params));
    let full = param(&params, "output") == "full";
    let items = page(render_pets(&db, matching, full), &params);
    success("pets", results("pet", items))
}

async fn find_shelters(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    if let Err(body) = authorize(&params) {
        return body;
    }
    let near = db.shelters_near(param(&params, "location"));
    if near.is_empty() {
        return failure(CODE_INVALID_LOCATION, "Invalid geographical location");
    }
    let name = param(&params, "name");
    let items: Vec<Value> = near
        .into_iter()
        .filter(|s| name.is_empty() || s.name.to_ascii_lowercase().contains(&name.to_ascii_lowercase()))
        .map(shelter_wire)
        .collect();
    success("shelters", results("shelter", page(items, &params)))
}

async fn get_shelter(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    if let Err(body) = authorize(&params) {
        return body;
    }
    match db.shelter(param(&params, "id")) {
        Some(s) => success("shelter", shelter_wire(s)),
        None => failure(CODE_NOT_FOUND, "shelter opt-out"),
    }
}

async fn shelter_pets(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    if let Err(body) = authorize(&params) {
        return body;
    }
    let id = param(&params, "id");
    if db.shelter(id).is_none() {
        return failure(CODE_NOT_FOUND, "shelter opt-out");
    }
    let matching = db.pets.iter().filter(|p| p.shelter_id == id);
    let full = param(&params, "output") == "full";
    let items = page(render_pets(&db, matching, full), &params);
    success("pets", results("pet", items))
}
