use log::{error, info};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::error::{TransportError, UploadError};
use crate::reading::Reading;

/// Status and body of an answered request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking HTTP client used for the upload.
///
/// Any answer from the server, whatever its status, is an `Ok`. Errors are reserved for requests
/// that never got an answer.
pub trait HttpTransport {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, TransportError>;
}

/// JSON document appended to the spreadsheet.
#[derive(Debug, Serialize)]
pub struct Payload<'a> {
    method: &'static str,
    timestamp: &'a str,
    #[serde(serialize_with = "two_decimals")]
    temperature: f32,
    vibration: &'static str,
}

impl<'a> From<&'a Reading> for Payload<'a> {
    fn from(reading: &'a Reading) -> Self {
        Self {
            method: "append",
            timestamp: reading.timestamp(),
            temperature: reading.temperature(),
            vibration: reading.vibration_label(),
        }
    }
}

impl Payload<'_> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Keeps the fixed two decimals the spreadsheet has always received.
fn two_decimals<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    let raw = RawValue::from_string(format!("{:.2}", value)).map_err(S::Error::custom)?;
    raw.serialize(serializer)
}

pub struct Uploader<H> {
    transport: H,
    endpoint: String,
}

impl<H: HttpTransport> Uploader<H> {
    pub const HEADERS: [(&'static str, &'static str); 1] = [("Content-Type", "application/json")];

    pub fn new(transport: H, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts `reading` once. No retry.
    pub fn send(&mut self, reading: &Reading) -> Result<HttpResponse, UploadError> {
        let body = Payload::from(reading).to_json().map_err(|e| {
            error!("Cannot encode payload: {}", e);
            e
        })?;

        match self
            .transport
            .post(&self.endpoint, &Self::HEADERS, body.as_bytes())
        {
            Ok(response) => {
                info!("<- {}", response.status);
                info!("{}", response.body);
                Ok(response)
            }
            Err(e) => {
                error!("Error sending information: {}", e);
                Err(e.into())
            }
        }
    }
}
