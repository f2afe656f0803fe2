//! Replay script parsing.
//!
//! A script is a JSON-lines file. Each non-empty line that does not start
//! with `#` is either a client envelope passed to the router verbatim, or a
//! `!` directive:
//!
//! - `!refresh` - refresh and re-send the session status
//! - `!close` - close the route
//! - `!status <text>` - change the application status the receiver reports
//! - `!receive <namespace> <message>` - inject a receiver message

use anyhow::{bail, Context, Result};

/// One action of a replay script.
#[derive(Debug, PartialEq, Eq)]
pub enum ScriptStep {
    /// Client envelope text.
    Envelope(String),
    Refresh,
    Close,
    /// New application status text for the simulated receiver.
    Status(String),
    /// Message arriving from the receiver application.
    Receive { namespace: String, message: String },
}

impl ScriptStep {
    /// Parses one script line. Comments and blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let Some(directive) = line.strip_prefix('!') else {
            return Ok(Some(Self::Envelope(line.to_string())));
        };

        let (command, rest) = directive
            .split_once(char::is_whitespace)
            .map_or((directive, ""), |(command, rest)| (command, rest.trim()));

        match command {
            "refresh" => Ok(Some(Self::Refresh)),
            "close" => Ok(Some(Self::Close)),
            "status" if !rest.is_empty() => Ok(Some(Self::Status(rest.to_string()))),
            "status" => bail!("!status needs a status text"),
            "receive" => {
                let (namespace, message) = rest
                    .split_once(char::is_whitespace)
                    .context("!receive needs a namespace and a message")?;
                Ok(Some(Self::Receive {
                    namespace: namespace.to_string(),
                    message: message.trim().to_string(),
                }))
            }
            other => bail!("unknown directive: !{other}"),
        }
    }
}

/// Parses a whole script, reporting the line number of the first bad line.
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(step) =
            ScriptStep::parse(line).with_context(|| format!("script line {}", index + 1))?
        {
            steps.push(step);
        }
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        assert_eq!(ScriptStep::parse("").unwrap(), None);
        assert_eq!(ScriptStep::parse("   ").unwrap(), None);
        assert_eq!(ScriptStep::parse("# connect first").unwrap(), None);
    }

    #[test]
    fn passes_envelopes_through() {
        let line = r#"{"type":"client_connect","clientId":"c1"}"#;
        assert_eq!(
            ScriptStep::parse(line).unwrap(),
            Some(ScriptStep::Envelope(line.to_string()))
        );
    }

    #[test]
    fn parses_directives() {
        assert_eq!(ScriptStep::parse("!refresh").unwrap(), Some(ScriptStep::Refresh));
        assert_eq!(ScriptStep::parse("!close").unwrap(), Some(ScriptStep::Close));
        assert_eq!(
            ScriptStep::parse("!status Now Playing").unwrap(),
            Some(ScriptStep::Status("Now Playing".to_string()))
        );
        assert_eq!(
            ScriptStep::parse(r#"!receive urn:x-cast:com.google.cast.media {"type":"MEDIA_STATUS"}"#)
                .unwrap(),
            Some(ScriptStep::Receive {
                namespace: "urn:x-cast:com.google.cast.media".to_string(),
                message: r#"{"type":"MEDIA_STATUS"}"#.to_string(),
            })
        );
    }

    #[test]
    fn receive_keeps_spaces_inside_message() {
        let step = ScriptStep::parse("!receive urn:x-cast:chat hello there").unwrap();
        assert_eq!(
            step,
            Some(ScriptStep::Receive {
                namespace: "urn:x-cast:chat".to_string(),
                message: "hello there".to_string(),
            })
        );
    }

    #[test]
    fn rejects_bad_directives() {
        assert!(ScriptStep::parse("!receive urn:x-cast:chat").is_err());
        assert!(ScriptStep::parse("!launch").is_err());
        assert!(ScriptStep::parse("!status").is_err());
    }

    #[test]
    fn parse_script_reports_line_number() {
        let err = parse_script("!refresh\n\n!bogus").unwrap_err();
        assert_eq!(err.to_string(), "script line 3");

        let steps = parse_script("# demo\n!refresh\n!close\n").unwrap();
        assert_eq!(steps, vec![ScriptStep::Refresh, ScriptStep::Close]);
    }
}
