use derive_more::{Constructor, Display, From};

use super::event_summary::EventSummary;

/// Failures while reading an ATS parameter list file
#[derive(Debug, thiserror::Error, From)]
pub enum ParseError {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    MissingAttribute(MissingAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
    #[error("{0}")]
    MissingList(MissingList),
    #[error("{0}")]
    MissingParameter(MissingParameter),
    #[error("{0}")]
    InvalidArray(InvalidArray),
    #[error("{0}")]
    TabularLength(TabularLength),
}

#[derive(From, Display, Debug)]
#[display(fmt = "malformed xml in parameter list: {source}")]
pub struct MalformedXml {
    source: quick_xml::Error,
}

#[derive(From, Display, Debug)]
#[display(fmt = "malformed attribute in parameter list: {source}")]
pub struct MalformedAttribute {
    source: quick_xml::events::attributes::AttrError,
}

#[derive(Display, Debug)]
#[display(fmt = "expected `{expected}` but found {found}")]
pub struct UnexpectedElement {
    expected: String,
    found: EventSummary,
}

impl UnexpectedElement {
    pub(crate) fn new(expected: impl Into<String>, found: EventSummary) -> Self {
        Self {
            expected: expected.into(),
            found,
        }
    }
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "<{element}> is missing its `{attribute}` attribute")]
pub struct MissingAttribute {
    element: String,
    attribute: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "no ParameterList named `{list_name}` below `{parent}`")]
pub struct MissingList {
    pub(crate) parent: String,
    pub(crate) list_name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "ParameterList `{list_name}` has no Parameter named `{parameter_name}`")]
pub struct MissingParameter {
    pub(crate) list_name: String,
    pub(crate) parameter_name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "could not parse `{value}` of parameter `{parameter_name}` as an array of numbers")]
pub struct InvalidArray {
    pub(crate) parameter_name: String,
    pub(crate) value: String,
}

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "tabular function in `{list_name}` has {x_len} x values but only {y_len} y values"
)]
pub struct TabularLength {
    pub(crate) list_name: String,
    pub(crate) x_len: usize,
    pub(crate) y_len: usize,
}
