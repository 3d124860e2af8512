//! Caller-supplied search and lookup options.
//!
//! # Design
//! `RequestOptions` keeps every parameter as plain text so it mirrors the
//! upstream query one-to-one; the empty string means "unspecified". Fields with
//! a closed set of values also have a typed enum, used both by the validator and
//! by the `with_*` setters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PetfinderError;

macro_rules! closed_set {
    ($(#[$meta:meta])* $name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = PetfinderError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(PetfinderError::Validation {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_set!(
    /// Species tag accepted by the `animal` parameter.
    Animal, "animal", {
        Barnyard => "barnyard",
        Bird => "bird",
        Cat => "cat",
        Dog => "dog",
        Horse => "horse",
        Reptile => "reptile",
        SmallFurry => "smallfurry",
    }
);

closed_set!(Size, "size", {
    Small => "S",
    Medium => "M",
    Large => "L",
    ExtraLarge => "XL",
});

closed_set!(Sex, "sex", {
    Male => "M",
    Female => "F",
});

closed_set!(Age, "age", {
    Baby => "Baby",
    Young => "Young",
    Adult => "Adult",
    Senior => "Senior",
});

closed_set!(
    /// How much of each pet record the upstream returns.
    OutputLevel, "output", {
        Id => "id",
        Basic => "basic",
        Full => "full",
    }
);

closed_set!(
    /// Adoption status: adoptable, hold, pending, adopted/removed.
    PetStatus, "status", {
        Adoptable => "A",
        Hold => "H",
        Pending => "P",
        Removed => "X",
    }
);

/// Filter and pagination parameters for every operation.
///
/// Empty strings and zero `offset`/`count` are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    pub id: String,
    pub animal: String,
    pub breed: String,
    pub size: String,
    pub sex: String,
    pub location: String,
    pub age: String,
    pub offset: u32,
    pub count: u32,
    pub output: String,
    pub shelter_id: String,
    pub shelter_name: String,
    pub status: String,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_animal(mut self, animal: Animal) -> Self {
        self.animal = animal.as_str().to_string();
        self
    }

    pub fn with_breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = breed.into();
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size.as_str().to_string();
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = sex.as_str().to_string();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_age(mut self, age: Age) -> Self {
        self.age = age.as_str().to_string();
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_output(mut self, output: OutputLevel) -> Self {
        self.output = output.as_str().to_string();
        self
    }

    pub fn with_shelter_id(mut self, shelter_id: impl Into<String>) -> Self {
        self.shelter_id = shelter_id.into();
        self
    }

    pub fn with_shelter_name(mut self, name: impl Into<String>) -> Self {
        self.shelter_name = name.into();
        self
    }

    pub fn with_status(mut self, status: PetStatus) -> Self {
        self.status = status.as_str().to_string();
        self
    }

    /// Check every enumerated field against its closed set.
    pub fn validate(&self) -> Result<(), PetfinderError> {
        check::<Animal>(&self.animal)?;
        check::<Size>(&self.size)?;
        check::<Sex>(&self.sex)?;
        check::<Age>(&self.age)?;
        check::<OutputLevel>(&self.output)?;
        check::<PetStatus>(&self.status)?;
        Ok(())
    }

    /// Query pairs under their upstream names, in declaration order.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let offset = nonzero(self.offset);
        let count = nonzero(self.count);
        let fields: [(&str, &str); 13] = [
            ("id", self.id.as_str()),
            ("animal", self.animal.as_str()),
            ("breed", self.breed.as_str()),
            ("size", self.size.as_str()),
            ("sex", self.sex.as_str()),
            ("location", self.location.as_str()),
            ("age", self.age.as_str()),
            ("offset", offset.as_str()),
            ("count", count.as_str()),
            ("output", self.output.as_str()),
            ("shelterid", self.shelter_id.as_str()),
            ("name", self.shelter_name.as_str()),
            ("status", self.status.as_str()),
        ];
        fields
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

fn check<E: FromStr<Err = PetfinderError>>(value: &str) -> Result<(), PetfinderError> {
    if value.is_empty() {
        return Ok(());
    }
    value.parse::<E>().map(|_| ())
}

fn nonzero(n: u32) -> String {
    if n == 0 {
        String::new()
    } else {
        n.to_string()
    }
}
