use quick_xml::events::Event;

use std::fmt;

/// Name of an xml element, kept as raw bytes when it is not valid UTF-8
#[derive(Debug)]
enum ElementName {
    Text(String),
    Raw(Vec<u8>),
}

impl ElementName {
    fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::Text(text.to_owned()),
            Err(_) => Self::Raw(bytes.to_vec()),
        }
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "<{text}>"),
            Self::Raw(bytes) => write!(f, "<{bytes:?}> (not UTF-8)"),
        }
    }
}

/// Owned description of an xml event, for error messages once the reader's
/// buffer has moved on
#[derive(Debug)]
pub(crate) struct EventSummary {
    name: Option<ElementName>,
    kind: &'static str,
}

impl fmt::Display for EventSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} event {name}", self.kind),
            None => write!(f, "{} event", self.kind),
        }
    }
}

impl EventSummary {
    pub(crate) fn new(event: &Event) -> Self {
        let name = match event {
            Event::Start(start) | Event::Empty(start) => {
                Some(ElementName::from_bytes(start.name().as_ref()))
            }
            Event::End(end) => Some(ElementName::from_bytes(end.name().as_ref())),
            _ => None,
        };

        let kind = match event {
            Event::Start(_) => "start",
            Event::End(_) => "end",
            Event::Empty(_) => "empty",
            Event::Text(_) => "text",
            Event::Comment(_) => "comment",
            Event::CData(_) => "cdata",
            Event::Decl(_) => "declaration",
            Event::PI(_) => "processing instruction",
            Event::DocType(_) => "doctype",
            Event::Eof => "end of file",
        };

        Self { name, kind }
    }

    /// summary of an event that has already been classified
    pub(crate) fn named(name: &str, kind: &'static str) -> Self {
        Self {
            name: Some(ElementName::Text(name.to_owned())),
            kind,
        }
    }

    pub(crate) fn eof() -> Self {
        Self {
            name: None,
            kind: "end of file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_events() {
        let summary = EventSummary::named("ParameterList", "end");
        assert_eq!(summary.to_string(), "end event <ParameterList>");
        assert_eq!(EventSummary::eof().to_string(), "end of file event");
    }
}
