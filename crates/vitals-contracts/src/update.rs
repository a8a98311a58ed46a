//! Partial-update payload types.
//!
//! A JSON update body distinguishes three states per field: the key is
//! missing, the key is present with `null`, or the key carries a value.
//! `Patch<T>` keeps all three apart so the merge only touches fields that
//! were structurally present.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::patient::Gender;

/// One field of a partial update.
///
/// Use with `#[serde(default)]` so a missing key deserializes to `Absent`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    /// The key was not in the payload. Leave the field untouched.
    #[default]
    Absent,
    /// The key was present with JSON `null`.
    Null,
    /// The key carried a value.
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Value(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Value(value) => serializer.serialize_some(value),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}

/// Gender values accepted in an update payload.
///
/// Narrower than [`Gender`]: `others` is not accepted here, only at create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateGender {
    Male,
    Female,
}

impl From<UpdateGender> for Gender {
    fn from(g: UpdateGender) -> Self {
        match g {
            UpdateGender::Male => Gender::Male,
            UpdateGender::Female => Gender::Female,
        }
    }
}

/// A sparse partial patient record.
///
/// Unknown keys, including `bmi` and `verdict`, are ignored: derived values
/// are never taken from a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientUpdate {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub city: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub age: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub gender: Patch<UpdateGender>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub height: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub weight: Patch<f64>,
}

impl PatientUpdate {
    /// True when no field is present at all.
    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// Names of the fields present in the payload (value or null).
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if !self.name.is_absent() {
            fields.push("name");
        }
        if !self.city.is_absent() {
            fields.push("city");
        }
        if !self.age.is_absent() {
            fields.push("age");
        }
        if !self.gender.is_absent() {
            fields.push("gender");
        }
        if !self.height.is_absent() {
            fields.push("height");
        }
        if !self.weight.is_absent() {
            fields.push("weight");
        }
        fields
    }
}
