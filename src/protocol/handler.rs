//! Synchronous request dispatch and the JSON-lines stdio loop.

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::policy::Policy;
use crate::resolver::{HostMatcher, PersonaEngine};

use super::messages::{Request, Response};

/// Dispatches protocol requests against one engine.
pub struct MessageHandler<'a, M: HostMatcher> {
    engine: &'a PersonaEngine<M>,
}

impl<'a, M: HostMatcher> MessageHandler<'a, M> {
    pub fn new(engine: &'a PersonaEngine<M>) -> Self {
        Self { engine }
    }

    pub fn handle(&self, request: Request) -> Response {
        debug!(request = request.type_name(), "Handling request");
        match request {
            Request::ResolvePersona { host } => Response::PersonaResolved {
                persona: self.engine.resolve(&host).map(|p| (*p).clone()),
            },
            Request::GetConfig => Response::ConfigRetrieved {
                config: self.engine.get_policy().to_document(),
            },
            Request::SetConfig { config } => {
                let strict = self.engine.options().strict_references;
                let outcome = Policy::from_document(config, strict)
                    .and_then(|policy| self.engine.set_policy(policy));
                match outcome {
                    Ok(()) => Response::ConfigSet {
                        success: true,
                        error: None,
                    },
                    Err(e) => {
                        warn!(error = %e, "Rejected policy update");
                        Response::ConfigSet {
                            success: false,
                            error: Some(e.to_string()),
                        }
                    }
                }
            }
        }
    }

    /// Decode one JSON request and encode its response.
    pub fn handle_line(&self, line: &str) -> Result<String> {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                let err = Error::protocol_malformed(e.to_string());
                warn!(error = %err.format_for_log(), "Bad request");
                Response::Error {
                    error: err.to_string(),
                }
            }
        };
        Ok(serde_json::to_string(&response)?)
    }

    /// Serve JSON-lines requests until `reader` is exhausted. Blank lines are
    /// skipped. Returns the number of requests answered.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<usize> {
        let mut handled = 0;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let reply = self.handle_line(&line)?;
            writeln!(writer, "{}", reply)?;
            writer.flush()?;
            handled += 1;
        }
        info!(handled, "Input closed");
        Ok(handled)
    }
}
