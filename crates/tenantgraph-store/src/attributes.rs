//! Serde serializer from an entity straight into node attributes.
//!
//! Going through `serde_json::Value` loses information: non-finite floats
//! become `null` and integers above `i64::MAX` become floats, and neither
//! reads back into the field it came from. This serializer refuses both
//! before anything reaches the store.

use std::fmt;

use serde::ser::{self, Impossible, Serialize};

use tenantgraph_core::{AttributeValue, Attributes, TenancyError};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct EncodeError(String);

impl ser::Error for EncodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

impl From<EncodeError> for TenancyError {
    fn from(e: EncodeError) -> Self {
        TenancyError::Serialization(e.0)
    }
}

/// Serialize a struct or map into attributes, one scalar per field.
pub fn to_attributes<T: Serialize + ?Sized>(value: &T) -> Result<Attributes, EncodeError> {
    value.serialize(FieldsSerializer)
}

fn not_a_map() -> EncodeError {
    EncodeError("entity must serialize to a map of fields".to_string())
}

// ── Fields ────────────────────────────────────────────────────────

struct FieldsSerializer;

#[derive(Default)]
struct FieldCollector {
    attributes: Attributes,
    pending_key: Option<String>,
}

impl ser::Serializer for FieldsSerializer {
    type Ok = Attributes;
    type Error = EncodeError;
    type SerializeSeq = Impossible<Attributes, EncodeError>;
    type SerializeTuple = Impossible<Attributes, EncodeError>;
    type SerializeTupleStruct = Impossible<Attributes, EncodeError>;
    type SerializeTupleVariant = Impossible<Attributes, EncodeError>;
    type SerializeMap = FieldCollector;
    type SerializeStruct = FieldCollector;
    type SerializeStructVariant = Impossible<Attributes, EncodeError>;

    fn serialize_bool(self, _: bool) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_i8(self, _: i8) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_i16(self, _: i16) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_i32(self, _: i32) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_i64(self, _: i64) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_u8(self, _: u8) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_u16(self, _: u16) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_u32(self, _: u32) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_u64(self, _: u64) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_f32(self, _: f32) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_f64(self, _: f64) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_char(self, _: char) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_str(self, _: &str) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_none(self) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Attributes, EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Attributes, EncodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<Attributes, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, EncodeError> {
        Err(not_a_map())
    }

    fn serialize_map(self, _: Option<usize>) -> Result<FieldCollector, EncodeError> {
        Ok(FieldCollector::default())
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<FieldCollector, EncodeError> {
        Ok(FieldCollector::default())
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, EncodeError> {
        Err(not_a_map())
    }
}

impl ser::SerializeStruct for FieldCollector {
    type Ok = Attributes;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        let value = value.serialize(ScalarSerializer { key })?;
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    fn end(self) -> Result<Attributes, EncodeError> {
        Ok(self.attributes)
    }
}

impl ser::SerializeMap for FieldCollector {
    type Ok = Attributes;
    type Error = EncodeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), EncodeError> {
        match key.serialize(ScalarSerializer { key: "<key>" })? {
            AttributeValue::String(key) => {
                self.pending_key = Some(key);
                Ok(())
            }
            other => Err(EncodeError(format!(
                "attribute names must be strings, got {other:?}"
            ))),
        }
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| EncodeError("map value without a key".to_string()))?;
        let value = value.serialize(ScalarSerializer { key: &key })?;
        self.attributes.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Attributes, EncodeError> {
        Ok(self.attributes)
    }
}

// ── Scalars ───────────────────────────────────────────────────────

#[derive(Clone, Copy)]
struct ScalarSerializer<'a> {
    key: &'a str,
}

impl ScalarSerializer<'_> {
    fn not_scalar(self) -> EncodeError {
        EncodeError(format!("attribute `{}` is not a scalar", self.key))
    }

    fn integer<I>(self, value: I) -> Result<AttributeValue, EncodeError>
    where
        I: Copy + fmt::Display + TryInto<i64>,
    {
        value.try_into().map(AttributeValue::Integer).map_err(|_| {
            EncodeError(format!(
                "attribute `{}` is out of range: {value} does not fit in i64",
                self.key
            ))
        })
    }

    fn float(self, value: f64) -> Result<AttributeValue, EncodeError> {
        if value.is_finite() {
            Ok(AttributeValue::Float(value))
        } else {
            Err(EncodeError(format!(
                "attribute `{}` is not a finite number: {value}",
                self.key
            )))
        }
    }
}

impl<'a> ser::Serializer for ScalarSerializer<'a> {
    type Ok = AttributeValue;
    type Error = EncodeError;
    type SerializeSeq = Impossible<AttributeValue, EncodeError>;
    type SerializeTuple = Impossible<AttributeValue, EncodeError>;
    type SerializeTupleStruct = Impossible<AttributeValue, EncodeError>;
    type SerializeTupleVariant = Impossible<AttributeValue, EncodeError>;
    type SerializeMap = Impossible<AttributeValue, EncodeError>;
    type SerializeStruct = Impossible<AttributeValue, EncodeError>;
    type SerializeStructVariant = Impossible<AttributeValue, EncodeError>;

    fn serialize_bool(self, v: bool) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Integer(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Integer(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Integer(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Integer(v))
    }

    fn serialize_i128(self, v: i128) -> Result<AttributeValue, EncodeError> {
        self.integer(v)
    }

    fn serialize_u8(self, v: u8) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Integer(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Integer(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Integer(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<AttributeValue, EncodeError> {
        self.integer(v)
    }

    fn serialize_u128(self, v: u128) -> Result<AttributeValue, EncodeError> {
        self.integer(v)
    }

    fn serialize_f32(self, v: f32) -> Result<AttributeValue, EncodeError> {
        self.float(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<AttributeValue, EncodeError> {
        self.float(v)
    }

    fn serialize_char(self, v: char) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::String(v.to_string()))
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<AttributeValue, EncodeError> {
        Err(self.not_scalar())
    }

    fn serialize_none(self) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(
        self,
        value: &T,
    ) -> Result<AttributeValue, EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Null)
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
    ) -> Result<AttributeValue, EncodeError> {
        Ok(AttributeValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<AttributeValue, EncodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<AttributeValue, EncodeError> {
        Err(self.not_scalar())
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, EncodeError> {
        Err(self.not_scalar())
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, EncodeError> {
        Err(self.not_scalar())
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, EncodeError> {
        Err(self.not_scalar())
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, EncodeError> {
        Err(self.not_scalar())
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, EncodeError> {
        Err(self.not_scalar())
    }

    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, EncodeError> {
        Err(self.not_scalar())
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, EncodeError> {
        Err(self.not_scalar())
    }
}
