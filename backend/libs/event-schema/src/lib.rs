/// Domain event schema for the account broker topic
///
/// Events travel as a single delimited string: `<EVENT_KIND>|<value>[|<value>...]`,
/// for example `USER_REGISTRATION|alice@example.com`. The format carries no
/// persistence guarantee beyond being handed to the broker, and consumers must
/// tolerate additional trailing fields.
use std::fmt;
use std::str::FromStr;

/// Field separator on the wire
pub const FIELD_DELIMITER: char = '|';

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EventSchemaError {
    #[error("event payload is empty")]
    Empty,
    #[error("unknown event kind: {0}")]
    UnknownKind(String),
    #[error("event {kind} requires at least {expected} field(s), got {actual}")]
    MissingFields {
        kind: EventKind,
        expected: usize,
        actual: usize,
    },
    #[error("field contains the '|' delimiter")]
    DelimiterInField,
}

/// Kinds of domain events emitted by the account directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new account was persisted; first field is the registered email address
    UserRegistration,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UserRegistration => "USER_REGISTRATION",
        }
    }

    /// Minimum number of fields following the kind
    pub fn required_fields(&self) -> usize {
        match self {
            EventKind::UserRegistration => 1,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = EventSchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER_REGISTRATION" => Ok(EventKind::UserRegistration),
            other => Err(EventSchemaError::UnknownKind(other.to_string())),
        }
    }
}

/// A typed domain event: a kind plus its ordered fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEvent {
    kind: EventKind,
    fields: Vec<String>,
}

impl DomainEvent {
    /// Build an event, rejecting fields that would break the delimited framing
    pub fn new(kind: EventKind, fields: Vec<String>) -> Result<Self, EventSchemaError> {
        if fields.iter().any(|f| f.contains(FIELD_DELIMITER)) {
            return Err(EventSchemaError::DelimiterInField);
        }
        if fields.len() < kind.required_fields() {
            return Err(EventSchemaError::MissingFields {
                kind,
                expected: kind.required_fields(),
                actual: fields.len(),
            });
        }
        Ok(Self { kind, fields })
    }

    /// `USER_REGISTRATION|<email>`
    pub fn user_registration(email: &str) -> Result<Self, EventSchemaError> {
        Self::new(EventKind::UserRegistration, vec![email.to_string()])
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The subject of the event (first field), e.g. the registered email address
    pub fn subject(&self) -> Option<&str> {
        self.fields.first().map(String::as_str)
    }

    /// Wire encoding
    pub fn encode(&self) -> String {
        let mut out = String::from(self.kind.as_str());
        for field in &self.fields {
            out.push(FIELD_DELIMITER);
            out.push_str(field);
        }
        out
    }

    /// Parse a wire payload back into an event
    pub fn parse(payload: &str) -> Result<Self, EventSchemaError> {
        if payload.is_empty() {
            return Err(EventSchemaError::Empty);
        }
        let mut parts = payload.split(FIELD_DELIMITER);
        let kind: EventKind = parts.next().unwrap_or_default().parse()?;
        let fields = parts.map(str::to_string).collect();
        Self::new(kind, fields)
    }
}

impl fmt::Display for DomainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for DomainEvent {
    type Err = EventSchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_registration_wire_format() {
        let event = DomainEvent::user_registration("alice@example.com").unwrap();
        assert_eq!(event.encode(), "USER_REGISTRATION|alice@example.com");
        assert_eq!(event.subject(), Some("alice@example.com"));
    }

    #[test]
    fn test_parse_tolerates_extra_fields() {
        let event = DomainEvent::parse("USER_REGISTRATION|a@x.com|org1").unwrap();
        assert_eq!(event.kind(), EventKind::UserRegistration);
        assert_eq!(event.fields(), &["a@x.com".to_string(), "org1".to_string()]);
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let err = DomainEvent::parse("PASSWORD_RESET|a@x.com").unwrap_err();
        assert_eq!(err, EventSchemaError::UnknownKind("PASSWORD_RESET".to_string()));
    }

    #[test]
    fn test_parse_rejects_missing_subject() {
        assert!(matches!(
            DomainEvent::parse("USER_REGISTRATION"),
            Err(EventSchemaError::MissingFields { expected: 1, actual: 0, .. })
        ));
        assert_eq!(DomainEvent::parse(""), Err(EventSchemaError::Empty));
    }

    #[test]
    fn test_delimiter_in_field_is_rejected() {
        assert_eq!(
            DomainEvent::user_registration("a|b@x.com"),
            Err(EventSchemaError::DelimiterInField)
        );
    }
}
