use serde_json::{Value, json};

use crate::fetcher::{FetchedResponse, RequestError};
use crate::pipeline::ProbeReport;

const WITHOUT_TOKEN_HEADING: &str = "Calling API without token..";
const WITH_TOKEN_HEADING: &str = "Calling API with token..";

impl ProbeReport {
    /// Both response bodies under their headings, separated by an empty line.
    /// The authenticated section is left out when no token was obtained.
    pub fn to_plain(&self) -> String {
        let mut output = format!(
            "{WITHOUT_TOKEN_HEADING}\n{}\n",
            plain_outcome(&self.unauthenticated)
        );
        if let Some(authenticated) = &self.authenticated {
            output.push_str(&format!(
                "\n{WITH_TOKEN_HEADING}\n{}\n",
                plain_outcome(authenticated)
            ));
        }
        output
    }

    /// Statuses, bodies and errors of the whole run. The token itself is never included.
    pub fn to_json(&self) -> Value {
        let authentication = match &self.authentication {
            Ok(token) => json!({
                "token_type": token.token_type(),
                "expires_at": token.expires_at(),
            }),
            Err(e) => json!({ "error": e.to_string() }),
        };

        json!({
            "unauthenticated": json_outcome(&self.unauthenticated),
            "authentication": authentication,
            "authenticated": self.authenticated.as_ref().map(json_outcome),
        })
    }
}

fn plain_outcome(outcome: &Result<FetchedResponse, RequestError>) -> String {
    match outcome {
        Ok(response) => response.body.clone(),
        Err(e) => match e.response_body() {
            Some(body) => body.to_string(),
            None => format!("request failed: {e}"),
        },
    }
}

fn json_outcome(outcome: &Result<FetchedResponse, RequestError>) -> Value {
    match outcome {
        Ok(response) => json!({ "status": response.status, "body": response.body }),
        Err(e) => match e {
            RequestError::UnsuccessfulResponse(status, body) => json!({
                "status": status,
                "body": body,
                "error": e.to_string(),
            }),
            _ => json!({ "error": e.to_string() }),
        },
    }
}
