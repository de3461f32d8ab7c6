//! Response classification and decoding.
//!
//! [`decode`] turns a buffered [`Response`] into either a [`Normalized`]
//! result or a classified [`Error`]:
//!
//! | status    | content type              | outcome                              |
//! |-----------|---------------------------|--------------------------------------|
//! | not 2xx   | any                       | [`Error::Http`], body as JSON or text |
//! | 2xx       | `application/json`        | [`ResponseData::Json`]               |
//! | 2xx       | `text/*` or none          | [`ResponseData::Text`]               |
//! | 2xx       | anything else             | [`Error::UnsupportedContentType`]    |

use serde::de::{DeserializeOwned, IntoDeserializer, value::Error as ValueError};

use crate::{Error, ErrorBody, HttpFailure, Response, Result};

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    /// `application/json` body.
    Json(serde_json::Value),
    /// Text body.
    Text(String),
}

impl ResponseData {
    /// The JSON value, if the body was JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// The text, if the body was text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// Result of a successful call: status code and decoded data.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    /// HTTP status code, always in `200..=299`.
    pub status_code: u16,
    /// Decoded data.
    pub data: T,
}

impl<T> Normalized<T> {
    /// Transform the data, keeping the status code.
    pub fn map<U, F>(self, f: F) -> Normalized<U>
    where
        F: FnOnce(T) -> U,
    {
        Normalized {
            status_code: self.status_code,
            data: f(self.data),
        }
    }
}

impl Normalized<ResponseData> {
    /// Deserialize the data into `T`.
    ///
    /// JSON data is deserialized directly; text data deserializes as a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonDeserialization`] if the data does not fit `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.data {
            ResponseData::Json(value) => serde_path_to_error::deserialize(value)
                .map_err(|e| Error::json_deserialization(e.path().to_string(), e.inner().to_string())),
            ResponseData::Text(text) => {
                let deserializer: serde::de::value::StrDeserializer<'_, ValueError> =
                    text.as_str().into_deserializer();
                T::deserialize(deserializer).map_err(|e| Error::json_deserialization(".", e.to_string()))
            }
        }
    }

    /// Convert into typed data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonDeserialization`] if the data does not fit `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<Normalized<T>> {
        let data = self.json()?;
        Ok(Normalized {
            status_code: self.status_code,
            data,
        })
    }
}

/// Classify and decode a response.
///
/// # Errors
///
/// - [`Error::Http`] for a status outside `200..=299`;
/// - [`Error::JsonDeserialization`] for a malformed JSON success body;
/// - [`Error::UnsupportedContentType`] for a success body that is neither JSON nor text.
pub fn decode(response: &Response) -> Result<Normalized<ResponseData>> {
    let status_code = response.status();
    let body = response.body();

    if !response.is_success() {
        let body = serde_json::from_slice(body).map_or_else(
            |_| ErrorBody::Text(response.text()),
            ErrorBody::Json,
        );
        return Err(Error::Http(HttpFailure::new(status_code, body)));
    }

    let content_type = response.content_type().to_ascii_lowercase();
    let data = if content_type.contains("application/json") {
        if body.is_empty() {
            ResponseData::Json(serde_json::Value::Null)
        } else {
            ResponseData::Json(crate::from_json(body)?)
        }
    } else if content_type.is_empty() || content_type.contains("text/") {
        ResponseData::Text(response.text())
    } else {
        return Err(Error::unsupported_content_type(response.content_type()));
    };

    Ok(Normalized { status_code, data })
}
