use std::{convert::Infallible, fmt, str::FromStr};

use derive_builder::Builder;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identifier assigned by the service. The client never inspects it, it only
/// echoes it back into request paths.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressId {
    Number(i64),
    Text(String),
}

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressId::Number(n) => write!(f, "{n}"),
            AddressId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for AddressId {
    type Err = Infallible;

    /// Only text that prints back unchanged becomes a number, so `007` or
    /// `+5` keep their exact spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => AddressId::Number(n),
            _ => AddressId::Text(s.to_owned()),
        })
    }
}

impl From<i64> for AddressId {
    fn from(id: i64) -> Self {
        AddressId::Number(id)
    }
}

/// An entry in the address book.
///
/// All text fields are free-form. `id` is `None` on drafts and is left out of
/// the serialized body in that case.
#[derive(Builder, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[builder(default, setter(into))]
pub struct AddressRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(into, strip_option))]
    pub id: Option<AddressId>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub firstname: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lastname: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub street: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub number: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub place: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub birthday: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
}

impl AddressRecord {
    pub fn field(&self, field: AddressField) -> &str {
        match field {
            AddressField::Firstname => &self.firstname,
            AddressField::Lastname => &self.lastname,
            AddressField::Street => &self.street,
            AddressField::Number => &self.number,
            AddressField::PostalCode => &self.postal_code,
            AddressField::Place => &self.place,
            AddressField::Birthday => &self.birthday,
            AddressField::Phone => &self.phone,
            AddressField::Email => &self.email,
        }
    }

    pub fn set_field(&mut self, field: AddressField, value: impl Into<String>) {
        let slot = match field {
            AddressField::Firstname => &mut self.firstname,
            AddressField::Lastname => &mut self.lastname,
            AddressField::Street => &mut self.street,
            AddressField::Number => &mut self.number,
            AddressField::PostalCode => &mut self.postal_code,
            AddressField::Place => &mut self.place,
            AddressField::Birthday => &mut self.birthday,
            AddressField::Phone => &mut self.phone,
            AddressField::Email => &mut self.email,
        };
        *slot = value.into();
    }

    /// True when every text field matches `other`, ignoring ids.
    pub fn same_fields(&self, other: &AddressRecord) -> bool {
        AddressField::ALL
            .iter()
            .all(|field| self.field(*field) == other.field(*field))
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.id {
            writeln!(f, "ID: {id}")?;
        }
        writeln!(
            f,
            "Name: {} {} {}",
            self.firstname, self.lastname, self.birthday
        )?;
        writeln!(
            f,
            "Address: {} {}, {} {}",
            self.street, self.number, self.postal_code, self.place
        )?;
        write!(f, "Contact: {} {}", self.phone, self.email)
    }
}

/// Field-wise changes for an update. Only the fields that are set end up in
/// the request body; the service keeps its value for the rest.
#[derive(Builder, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[builder(default, setter(into, strip_option))]
pub struct AddressChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AddressChanges {
    pub fn is_empty(&self) -> bool {
        self == &AddressChanges::default()
    }

    pub fn set_field(&mut self, field: AddressField, value: impl Into<String>) {
        let slot = match field {
            AddressField::Firstname => &mut self.firstname,
            AddressField::Lastname => &mut self.lastname,
            AddressField::Street => &mut self.street,
            AddressField::Number => &mut self.number,
            AddressField::PostalCode => &mut self.postal_code,
            AddressField::Place => &mut self.place,
            AddressField::Birthday => &mut self.birthday,
            AddressField::Phone => &mut self.phone,
            AddressField::Email => &mut self.email,
        };
        *slot = Some(value.into());
    }
}

/// The editable fields of an [`AddressRecord`], named as on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressField {
    Firstname,
    Lastname,
    Street,
    Number,
    PostalCode,
    Place,
    Birthday,
    Phone,
    Email,
}

impl AddressField {
    pub const ALL: [AddressField; 9] = [
        AddressField::Firstname,
        AddressField::Lastname,
        AddressField::Street,
        AddressField::Number,
        AddressField::PostalCode,
        AddressField::Place,
        AddressField::Birthday,
        AddressField::Phone,
        AddressField::Email,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AddressField::Firstname => "firstname",
            AddressField::Lastname => "lastname",
            AddressField::Street => "street",
            AddressField::Number => "number",
            AddressField::PostalCode => "postal_code",
            AddressField::Place => "place",
            AddressField::Birthday => "birthday",
            AddressField::Phone => "phone",
            AddressField::Email => "email",
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown address field `{0}`")]
pub struct UnknownFieldError(pub String);

impl FromStr for AddressField {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AddressField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownFieldError(s.to_owned()))
    }
}

/// Read any JSON scalar as text; `null` becomes the empty string.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_serializes_without_id() {
        let draft = AddressRecordBuilder::default()
            .firstname("Ada")
            .lastname("Lovelace")
            .build()
            .unwrap();

        let body = serde_json::to_value(&draft).unwrap();

        assert!(body.get("id").is_none());
        assert_eq!(body["firstname"], "Ada");
        assert_eq!(body["postal_code"], "");
    }

    #[test]
    fn record_accepts_nulls_and_numbers() {
        let record: AddressRecord = serde_json::from_value(json!({
            "id": 7,
            "firstname": "Grace",
            "lastname": null,
            "postal_code": 12345
        }))
        .unwrap();

        assert_eq!(record.id, Some(AddressId::Number(7)));
        assert_eq!(record.lastname, "");
        assert_eq!(record.postal_code, "12345");
        assert_eq!(record.email, "");
    }

    #[test]
    fn text_ids_are_kept_verbatim() {
        let record: AddressRecord = serde_json::from_value(json!({"id": "a-1"})).unwrap();
        assert_eq!(record.id.unwrap().to_string(), "a-1");
        assert_eq!("42".parse::<AddressId>().unwrap(), AddressId::Number(42));
        assert_eq!(
            "abc".parse::<AddressId>().unwrap(),
            AddressId::Text("abc".to_string())
        );
    }

    #[test]
    fn parsed_ids_keep_their_spelling() {
        for raw in ["007", "+5", "-0", "1e3"] {
            let id = raw.parse::<AddressId>().unwrap();
            assert_eq!(id, AddressId::Text(raw.to_string()));
            assert_eq!(id.to_string(), raw);
        }
        assert_eq!("-12".parse::<AddressId>().unwrap(), AddressId::Number(-12));
    }

    #[test]
    fn changes_only_carry_set_fields() {
        let changes = AddressChangesBuilder::default()
            .phone("555-0100")
            .build()
            .unwrap();

        let body = serde_json::to_value(&changes).unwrap();

        assert_eq!(body, json!({"phone": "555-0100"}));
        assert!(!changes.is_empty());
        assert!(AddressChanges::default().is_empty());
    }

    #[test]
    fn field_names_round_trip_through_from_str() {
        for field in AddressField::ALL {
            assert_eq!(field.name().parse::<AddressField>(), Ok(field));
        }
        assert_eq!(
            "zip".parse::<AddressField>(),
            Err(UnknownFieldError("zip".to_string()))
        );
    }

    #[test]
    fn same_fields_ignores_id() {
        let mut stored = AddressRecord {
            id: Some(AddressId::Number(3)),
            ..Default::default()
        };
        stored.set_field(AddressField::Email, "a@example.com");
        let mut draft = AddressRecord::default();
        draft.set_field(AddressField::Email, "a@example.com");

        assert!(stored.same_fields(&draft));
        draft.set_field(AddressField::Place, "Berlin");
        assert!(!stored.same_fields(&draft));
    }
}
