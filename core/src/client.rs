//! Stateless request builder and response parser for the Petfinder API.
//!
//! # Design
//! `PetfinderClient` holds only the immutable connection settings. Each
//! operation is split into a `build_*` method that checks the operation's
//! precondition, validates the enumerated options and produces an
//! `HttpRequest`, and a `parse_*` method that decodes and maps an
//! `HttpResponse`. The caller (or `Petfinder`) executes the round-trip in
//! between, so nothing here touches the network.

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::PetfinderError;
use crate::http::{HttpRequest, HttpResponse};
use crate::options::{OutputLevel, RequestOptions};
use crate::types::{Pet, Shelter};
use crate::wire;

/// Upstream operation paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListBreeds,
    GetRandomPet,
    GetPet,
    FindPets,
    FindShelters,
    GetShelter,
    GetShelterPets,
}

impl Operation {
    pub fn path(self) -> &'static str {
        match self {
            Operation::ListBreeds => "breed.list",
            Operation::GetRandomPet => "pet.getRandom",
            Operation::GetPet => "pet.get",
            Operation::FindPets => "pet.find",
            Operation::FindShelters => "shelter.find",
            Operation::GetShelter => "shelter.get",
            Operation::GetShelterPets => "shelter.getPets",
        }
    }
}

/// Synchronous, stateless client for the Petfinder API.
#[derive(Debug, Clone)]
pub struct PetfinderClient {
    config: ClientConfig,
    base_url: String,
}

impl PetfinderClient {
    pub fn new(config: ClientConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self { config, base_url }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Validate `opts` and encode them with the key and format selector.
    fn build(&self, operation: Operation, opts: &RequestOptions) -> Result<HttpRequest, PetfinderError> {
        opts.validate()?;

        let mut query = opts.to_query();
        query.push(("key".to_string(), self.config.api_key.clone()));
        query.push(("format".to_string(), self.config.format.clone()));

        debug!(
            operation = operation.path(),
            params = query.len() - 2,
            "built request"
        );

        Ok(HttpRequest {
            operation: operation.path().to_string(),
            path: format!("{}/{}", self.base_url, operation.path()),
            query,
        })
    }

    /// Requires `animal`.
    pub fn build_list_breeds(&self, opts: &RequestOptions) -> Result<HttpRequest, PetfinderError> {
        require("animal", &opts.animal)?;
        self.build(Operation::ListBreeds, opts)
    }

    /// Forces `output=id` on a local copy; nothing is required.
    pub fn build_random_pet_id(&self, opts: &RequestOptions) -> Result<HttpRequest, PetfinderError> {
        let mut local = opts.clone();
        local.output = OutputLevel::Id.as_str().to_string();
        self.build(Operation::GetRandomPet, &local)
    }

    /// Requires `output` to be `basic` or `full`.
    pub fn build_random_pet(&self, opts: &RequestOptions) -> Result<HttpRequest, PetfinderError> {
        if opts.output.is_empty() || opts.output == OutputLevel::Id.as_str() {
            return Err(PetfinderError::MissingParameter { field: "output" });
        }
        self.build(Operation::GetRandomPet, opts)
    }

    /// Requires `id`.
    pub fn build_get_pet(&self, opts: &RequestOptions) -> Result<HttpRequest, PetfinderError> {
        require("id", &opts.id)?;
        self.build(Operation::GetPet, opts)
    }

    /// Requires `location`.
    pub fn build_find_pets(&self, opts: &RequestOptions) -> Result<HttpRequest, PetfinderError> {
        require("location", &opts.location)?;
        self.build(Operation::FindPets, opts)
    }

    /// Requires `location`.
    pub fn build_find_shelters(&self, opts: &RequestOptions) -> Result<HttpRequest, PetfinderError> {
        require("location", &opts.location)?;
        self.build(Operation::FindShelters, opts)
    }

    /// Requires `id` (the shelter id).
    pub fn build_get_shelter(&self, opts: &RequestOptions) -> Result<HttpRequest, PetfinderError> {
        require("id", &opts.id)?;
        self.build(Operation::GetShelter, opts)
    }

    /// Requires `id` (the shelter id).
    pub fn build_get_shelter_pets(&self, opts: &RequestOptions) -> Result<HttpRequest, PetfinderError> {
        require("id", &opts.id)?;
        self.build(Operation::GetShelterPets, opts)
    }

    pub fn parse_list_breeds(&self, response: HttpResponse) -> Result<Vec<String>, PetfinderError> {
        trace_status(&response);
        Ok(wire::decode_breeds(&response.body)?)
    }

    pub fn parse_random_pet_id(&self, response: HttpResponse) -> Result<String, PetfinderError> {
        trace_status(&response);
        Ok(wire::decode_pet_id(&response.body)?)
    }

    pub fn parse_random_pet(&self, response: HttpResponse) -> Result<Pet, PetfinderError> {
        self.parse_get_pet(response)
    }

    pub fn parse_get_pet(&self, response: HttpResponse) -> Result<Pet, PetfinderError> {
        trace_status(&response);
        Ok(wire::decode_pet(&response.body)?.into())
    }

    pub fn parse_find_pets(&self, response: HttpResponse) -> Result<Vec<Pet>, PetfinderError> {
        trace_status(&response);
        let pets = wire::decode_pets(&response.body)?;
        Ok(pets.into_iter().map(Pet::from).collect())
    }

    pub fn parse_find_shelters(&self, response: HttpResponse) -> Result<Vec<Shelter>, PetfinderError> {
        trace_status(&response);
        let shelters = wire::decode_shelters(&response.body)?;
        Ok(shelters.into_iter().map(Shelter::from).collect())
    }

    pub fn parse_get_shelter(&self, response: HttpResponse) -> Result<Shelter, PetfinderError> {
        trace_status(&response);
        Ok(wire::decode_shelter(&response.body)?.into())
    }

    pub fn parse_get_shelter_pets(&self, response: HttpResponse) -> Result<Vec<Pet>, PetfinderError> {
        self.parse_find_pets(response)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), PetfinderError> {
    if value.is_empty() {
        return Err(PetfinderError::MissingParameter { field });
    }
    Ok(())
}

fn trace_status(response: &HttpResponse) {
    debug!(status = response.status, len = response.body.len(), "parsing response");
}
