//! One-call operations: build, send with retry, decode, map.

use crate::client::PetfinderClient;
use crate::config::ClientConfig;
use crate::error::PetfinderError;
use crate::options::RequestOptions;
use crate::retry::{Retrying, Sleep, ThreadSleep};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Pet, Shelter};

/// Petfinder client that performs the HTTP round-trip itself.
///
/// Holds no per-call state, so a single value can be shared across threads
/// when the transport and sleeper allow it.
#[derive(Debug, Clone)]
pub struct Petfinder<T = UreqTransport, S = ThreadSleep> {
    client: PetfinderClient,
    transport: Retrying<T, S>,
}

impl Petfinder {
    /// Client with default settings and the default `ureq` transport.
    pub fn new(api_key: impl Into<String>) -> Result<Self, PetfinderError> {
        Ok(Self::from_config(ClientConfig::new(api_key)?))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> Petfinder<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self::with_parts(config, transport, ThreadSleep)
    }
}

impl<T: Transport, S: Sleep> Petfinder<T, S> {
    pub fn with_parts(config: ClientConfig, transport: T, sleeper: S) -> Self {
        let transport = Retrying::with_sleeper(transport, config.retry, sleeper);
        Self {
            client: PetfinderClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &PetfinderClient {
        &self.client
    }

    /// Breed names for `opts.animal`.
    pub fn list_breeds(&self, opts: &RequestOptions) -> Result<Vec<String>, PetfinderError> {
        let request = self.client.build_list_breeds(opts)?;
        let response = self.transport.send(&request)?;
        self.client.parse_list_breeds(response)
    }

    /// Identifier of a random pet matching `opts`.
    pub fn random_pet_id(&self, opts: &RequestOptions) -> Result<String, PetfinderError> {
        let request = self.client.build_random_pet_id(opts)?;
        let response = self.transport.send(&request)?;
        self.client.parse_random_pet_id(response)
    }

    /// A random pet; `opts.output` must be `basic` or `full`.
    pub fn random_pet(&self, opts: &RequestOptions) -> Result<Pet, PetfinderError> {
        let request = self.client.build_random_pet(opts)?;
        let response = self.transport.send(&request)?;
        self.client.parse_random_pet(response)
    }

    pub fn get_pet(&self, opts: &RequestOptions) -> Result<Pet, PetfinderError> {
        let request = self.client.build_get_pet(opts)?;
        let response = self.transport.send(&request)?;
        self.client.parse_get_pet(response)
    }

    /// Pets near `opts.location`. May be empty.
    pub fn find_pets(&self, opts: &RequestOptions) -> Result<Vec<Pet>, PetfinderError> {
        let request = self.client.build_find_pets(opts)?;
        let response = self.transport.send(&request)?;
        self.client.parse_find_pets(response)
    }

    pub fn find_shelters(&self, opts: &RequestOptions) -> Result<Vec<Shelter>, PetfinderError> {
        let request = self.client.build_find_shelters(opts)?;
        let response = self.transport.send(&request)?;
        self.client.parse_find_shelters(response)
    }

    pub fn get_shelter(&self, opts: &RequestOptions) -> Result<Shelter, PetfinderError> {
        let request = self.client.build_get_shelter(opts)?;
        let response = self.transport.send(&request)?;
        self.client.parse_get_shelter(response)
    }

    /// Pets listed by the shelter in `opts.id`.
    pub fn get_shelter_pets(&self, opts: &RequestOptions) -> Result<Vec<Pet>, PetfinderError> {
        let request = self.client.build_get_shelter_pets(opts)?;
        let response = self.transport.send(&request)?;
        self.client.parse_get_shelter_pets(response)
    }
}
