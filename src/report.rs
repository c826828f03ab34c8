//! User reports about a place: compose the message and POST it to the form endpoint.

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ReportError;

/// Sender address used when the user gives none.
pub const ANONYMOUS_EMAIL: &str = "usuario@example.com";
pub const ANONYMOUS_USER: &str = "anonimo";

/// The place a report is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSubject {
    pub title: String,
    /// Pin label on the stadium map ("1", "A", ...).
    pub number: String,
    pub kind: String,
}

/// The JSON body accepted by the form endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub email: String,
    pub message: String,
}

impl Report {
    /// Build a report; blank comments are rejected before any I/O.
    pub fn new(
        email: Option<&str>,
        subject: &ReportSubject,
        user: Option<&str>,
        comment: &str,
        at: DateTime<Utc>,
        tz: Option<Tz>,
    ) -> Result<Self, ReportError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ReportError::EmptyComment);
        }
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(ANONYMOUS_EMAIL);
        let user = user
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(ANONYMOUS_USER);
        Ok(Self {
            email: email.to_string(),
            message: compose_message(subject, user, comment, at, tz),
        })
    }
}

/// Plain-text report body. The timestamp is local to `tz` when given.
pub fn compose_message(
    subject: &ReportSubject,
    user: &str,
    comment: &str,
    at: DateTime<Utc>,
    tz: Option<Tz>,
) -> String {
    let stamp = match tz {
        Some(tz) => at.with_timezone(&tz).to_rfc3339_opts(SecondsFormat::Secs, true),
        None => at.to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    format!(
        "NUEVO REPORTE DEL USUARIO\n\n\
         Ubicación: {}\n\
         Número: {}\n\
         Tipo: {}\n\
         Usuario: {}\n\
         Fecha: {}\n\n\
         COMENTARIO:\n{}",
        subject.title, subject.number, subject.kind, user, stamp, comment
    )
}

/// Client for the report form endpoint. One POST per report, no retry.
#[derive(Clone)]
pub struct ReportClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl ReportClient {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.http_timeout)
            .user_agent(&config.user_agent)
            .build();
        Self {
            agent,
            endpoint: config.report_endpoint.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit `report`; any 2xx status is success.
    pub async fn submit(&self, report: &Report) -> Result<(), ReportError> {
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        let body = report.clone();

        let status = tokio::task::spawn_blocking(move || {
            agent
                .post(&endpoint)
                .set("Accept", "application/json")
                .send_json(&body)
                .map(|resp| resp.status())
        })
        .await
        .map_err(|e| ReportError::Network(format!("report task failed: {}", e)))?;

        match status {
            Ok(code) if (200..300).contains(&code) => {
                info!(status = code, "report delivered");
                Ok(())
            }
            Ok(code) | Err(ureq::Error::Status(code, _)) => {
                warn!(status = code, "report rejected");
                Err(ReportError::Rejected(code))
            }
            Err(ureq::Error::Transport(t)) => {
                warn!(error = %t, "report not delivered");
                Err(ReportError::Network(t.to_string()))
            }
        }
    }
}
