use embedded_svc::http::client::Client as HttpClient;
use embedded_svc::io::Write;
use embedded_svc::utils::io;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::info;
use part_monitor_common::{HttpResponse, HttpTransport, TransportError};

/// Blocking HTTPS client, certificates checked against the built-in bundle.
pub struct EspHttpTransport {
    client: HttpClient<EspHttpConnection>,
}

impl EspHttpTransport {
    pub fn new() -> anyhow::Result<Self> {
        let connection = EspHttpConnection::new(&Configuration {
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })?;
        Ok(Self {
            client: HttpClient::wrap(connection),
        })
    }

    /// Send an HTTP POST request and read back at most 1 KiB of the answer.
    fn exchange(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> anyhow::Result<HttpResponse> {
        let content_length = body.len().to_string();
        let mut request_headers: Vec<(&str, &str)> = headers.to_vec();
        request_headers.push(("Content-Length", &content_length));

        let mut request = self.client.post(url, &request_headers)?;
        request.write_all(body)?;
        request.flush()?;
        info!("-> POST {}", url);
        let mut response = request.submit()?;

        let status = response.status();
        let mut buf = [0u8; 1024];
        let bytes_read = io::try_read_full(&mut response, &mut buf).map_err(|e| e.0)?;

        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&buf[..bytes_read]).into_owned(),
        })
    }
}

impl HttpTransport for EspHttpTransport {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        self.exchange(url, headers, body)
            .map_err(|e| TransportError(e.to_string()))
    }
}
