use log::info;
use part_monitor_common::{HttpResponse, HttpTransport, TransportError};

/// Blocking HTTP transport on top of a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Uses the agent's default timeouts.
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new(),
        }
    }
}

impl HttpTransport for UreqTransport {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        let request = headers
            .iter()
            .fold(self.agent.post(url), |request, (name, value)| {
                request.set(name, value)
            });

        info!("-> POST {}", url);
        let response = match request.send_bytes(body) {
            Ok(response) => response,
            // the server answered, even if with an error status
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(TransportError(transport.to_string()))
            }
        };

        let status = response.status();
        let body = response
            .into_string()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
