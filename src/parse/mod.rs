//! reading ATS xml input files
//!
//! ATS input decks are nested `ParameterList` elements holding `Parameter`
//! elements:
//!
//! ```text
//! <ParameterList name="main">
//!   <ParameterList name="surface-water_source">
//!     <ParameterList name="function-tabular">
//!       <Parameter name="x values" type="Array(double)" value="{0, 3600, 7200}"/>
//!       <Parameter name="y values" type="Array(double)" value="{1e-5, 0, 0}"/>
//!     </ParameterList>
//!   </ParameterList>
//! </ParameterList>
//! ```
//!
//! The whole tree is read into a [`ParameterList`], which can then be searched
//! for the tabular source functions used to overlay rainfall and tracer input
//! on observation time series.

mod error;
mod event_summary;

pub use error::ParseError;
use event_summary::EventSummary;

use ndarray::Array1;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use std::io::BufRead;
use std::path::Path;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// list holding the surface rainfall source in ATS input decks
pub const RAINFALL_LIST: &str = "surface-water_source";

/// list holding tracer source terms in ATS input decks
pub const TRACER_SOURCE_LIST: &str = "source terms";

#[derive(Debug, Clone, PartialEq, Default)]
/// A single `<Parameter name=".." type=".." value=".."/>` element
pub struct Parameter {
    pub name: String,
    /// contents of the `type` attribute, empty if absent
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// A `<ParameterList>` element and everything nested inside of it
pub struct ParameterList {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub lists: Vec<ParameterList>,
}

impl ParameterList {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// depth first search (in document order) of every list nested below this one
    pub fn find_list(&self, name: &str) -> Option<&ParameterList> {
        self.lists.iter().find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                child.find_list(name)
            }
        })
    }

    /// a parameter that is a direct child of this list
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    fn require_list(&self, name: &str) -> Result<&ParameterList, error::MissingList> {
        self.find_list(name)
            .ok_or_else(|| error::MissingList::new(self.name.clone(), name.into()))
    }

    fn require_parameter(&self, name: &str) -> Result<&Parameter, error::MissingParameter> {
        self.parameter(name)
            .ok_or_else(|| error::MissingParameter::new(self.name.clone(), name.into()))
    }
}

/// read in and parse an entire parameter list file for a given path
pub fn read_parameter_file(path: &Path) -> Result<ParameterList, crate::Error> {
    let file = std::fs::File::open(path)?;
    let buf_reader = std::io::BufReader::new(file);
    let reader = Reader::from_reader(buf_reader);

    Ok(parse_parameter_list(reader)?)
}

/// parse the root `ParameterList` of an xml document
pub fn parse_parameter_list<R: BufRead>(mut reader: Reader<R>) -> Result<ParameterList, ParseError> {
    let mut buffer = Vec::new();

    // ignore whitespace in the reader
    reader.trim_text(true);

    loop {
        buffer.clear();
        let node = {
            let event = reader
                .read_event_into(&mut buffer)
                .map_err(error::MalformedXml::from)?;
            Node::classify(&event)?
        };

        match node {
            Node::OpenList(name) => return read_list_body(&mut reader, &mut buffer, name),
            Node::EmptyList(name) => return Ok(ParameterList::new(name)),
            Node::Skip => continue,
            Node::Eof => {
                return Err(error::UnexpectedElement::new("ParameterList", EventSummary::eof()).into())
            }
            Node::Parameter(parameter) => {
                let actual = EventSummary::named(&parameter.name, "parameter");
                return Err(error::UnexpectedElement::new("ParameterList", actual).into());
            }
            Node::CloseList => {
                let actual = EventSummary::named("ParameterList", "end");
                return Err(error::UnexpectedElement::new("ParameterList", actual).into());
            }
        }
    }
}

/// read everything up to and including the `</ParameterList>` that closes `name`
fn read_list_body<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    name: String,
) -> Result<ParameterList, ParseError> {
    let mut list = ParameterList::new(name);

    loop {
        buffer.clear();
        let node = {
            let event = reader
                .read_event_into(buffer)
                .map_err(error::MalformedXml::from)?;
            Node::classify(&event)?
        };

        match node {
            Node::OpenList(child) => {
                let child = read_list_body(reader, buffer, child)?;
                list.lists.push(child);
            }
            Node::EmptyList(child) => list.lists.push(ParameterList::new(child)),
            Node::Parameter(parameter) => list.parameters.push(parameter),
            Node::CloseList => return Ok(list),
            Node::Skip => continue,
            Node::Eof => {
                return Err(
                    error::UnexpectedElement::new("/ParameterList", EventSummary::eof()).into(),
                )
            }
        }
    }
}

/// owned summary of a single xml event, so the reader's buffer can be reused
enum Node {
    OpenList(String),
    EmptyList(String),
    Parameter(Parameter),
    CloseList,
    Skip,
    Eof,
}

impl Node {
    fn classify(event: &Event) -> Result<Self, ParseError> {
        let node = match event {
            Event::Start(start) if start.name().as_ref() == b"ParameterList" => {
                Node::OpenList(attribute_value(start, "name", "ParameterList")?)
            }
            Event::Empty(start) if start.name().as_ref() == b"ParameterList" => {
                Node::EmptyList(attribute_value(start, "name", "ParameterList")?)
            }
            Event::Start(start) | Event::Empty(start) if start.name().as_ref() == b"Parameter" => {
                Node::Parameter(read_parameter(start)?)
            }
            Event::End(end) if end.name().as_ref() == b"ParameterList" => Node::CloseList,
            // closing tag of a non-empty <Parameter ...></Parameter>
            Event::End(end) if end.name().as_ref() == b"Parameter" => Node::Skip,
            Event::Decl(_)
            | Event::Comment(_)
            | Event::DocType(_)
            | Event::PI(_)
            | Event::Text(_)
            | Event::CData(_) => Node::Skip,
            Event::Eof => Node::Eof,
            _ => {
                let actual = EventSummary::new(event);
                return Err(
                    error::UnexpectedElement::new("ParameterList,Parameter", actual).into(),
                );
            }
        };

        Ok(node)
    }
}

fn read_parameter(start: &BytesStart<'_>) -> Result<Parameter, ParseError> {
    let name = attribute_value(start, "name", "Parameter")?;
    let value = attribute_value(start, "value", "Parameter")?;
    let kind = match attribute_value(start, "type", "Parameter") {
        Ok(kind) => kind,
        Err(ParseError::MissingAttribute(_)) => String::new(),
        Err(e) => return Err(e),
    };

    Ok(Parameter { name, kind, value })
}

/// find the `attribute_key` attribute on the `element_name` element
fn attribute_value(
    bytes_start: &BytesStart<'_>,
    attribute_key: &str,
    element_name: &str,
) -> Result<String, ParseError> {
    for attribute in bytes_start.attributes() {
        let attribute = attribute.map_err(error::MalformedAttribute::from)?;

        if attribute.key.as_ref() == attribute_key.as_bytes() {
            let value = attribute
                .unescape_value()
                .map_err(error::MalformedXml::from)?;
            return Ok(value.into_owned());
        }
    }

    let err = error::MissingAttribute::new(element_name.into(), attribute_key.into());
    Err(err.into())
}

/// parse an ATS array literal such as `{0, 3600, 7200}`
pub fn parse_array_value(parameter: &Parameter) -> Result<Vec<f64>, ParseError> {
    let inner = parameter
        .value
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim();

    if inner.is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|x| x.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| {
            error::InvalidArray::new(parameter.name.clone(), parameter.value.clone()).into()
        })
}

#[derive(Debug, Clone, PartialEq)]
/// A piecewise constant function of time read from a `function-tabular` list.
///
/// `x` holds times in seconds, `y` the value that holds from `x[i]` until `x[i + 1]`.
pub struct TabularFunction {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl TabularFunction {
    /// find the list `list_name` anywhere below `root` and read the
    /// `function-tabular` list nested inside of it
    pub fn from_source(root: &ParameterList, list_name: &str) -> Result<Self, ParseError> {
        let source = root.require_list(list_name)?;
        let function = source.require_list("function-tabular")?;

        let x = parse_array_value(function.require_parameter("x values")?)?;
        let y = parse_array_value(function.require_parameter("y values")?)?;

        if y.len() + 1 < x.len() {
            return Err(error::TabularLength::new(list_name.into(), x.len(), y.len()).into());
        }

        Ok(Self { x, y })
    }

    /// Evaluate the function at observation times given in hours.
    ///
    /// Every time inside `[x[i], x[i + 1]]` takes `y[i] * sfactor`. A time on the
    /// boundary of two intervals takes the later interval's value, times outside
    /// of every interval are zero.
    pub fn sample(&self, times: &[f64], sfactor: f64) -> Array1<f64> {
        let mut out = Array1::zeros(times.len());

        for (i, window) in self.x.windows(2).enumerate() {
            let start = window[0] / SECONDS_PER_HOUR;
            let end = window[1] / SECONDS_PER_HOUR;
            let value = self.y[i] * sfactor;

            for (t, o) in times.iter().zip(out.iter_mut()) {
                if *t >= start && *t <= end {
                    *o = value;
                }
            }
        }

        out
    }
}

/// rainfall of the `surface-water_source` list at the observation times (hours)
pub fn rainfall(root: &ParameterList, times: &[f64], sfactor: f64) -> Result<Array1<f64>, ParseError> {
    let function = TabularFunction::from_source(root, RAINFALL_LIST)?;
    Ok(function.sample(times, sfactor))
}

/// tracer injection of the `source terms` list at the observation times (hours)
pub fn tracer_source(
    root: &ParameterList,
    times: &[f64],
    sfactor: f64,
) -> Result<Array1<f64>, ParseError> {
    let function = TabularFunction::from_source(root, TRACER_SOURCE_LIST)?;
    Ok(function.sample(times, sfactor))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <ParameterList name="main" type="ParameterList">
          <Parameter name="verbosity" type="string" value="high"/>
          <ParameterList name="state">
            <ParameterList name="evaluators">
              <ParameterList name="surface-water_source">
                <Parameter name="field evaluator type" type="string" value="independent variable"/>
                <ParameterList name="function">
                  <ParameterList name="domain">
                    <ParameterList name="function-tabular">
                      <Parameter name="x values" type="Array(double)" value="{0, 3600, 7200, 10800}"/>
                      <Parameter name="y values" type="Array(double)" value="{1e-5, 2e-5, 0}"/>
                      <Parameter name="forms" type="Array(string)" value="{constant, constant}"/>
                    </ParameterList>
                  </ParameterList>
                </ParameterList>
              </ParameterList>
            </ParameterList>
          </ParameterList>
          <ParameterList name="empty"/>
        </ParameterList>
    "#;

    fn deck() -> ParameterList {
        let reader = Reader::from_str(DECK);
        parse_parameter_list(reader).unwrap()
    }

    #[test]
    fn parse_tree() {
        let root = deck();
        assert_eq!(root.name, "main");
        assert_eq!(root.parameter("verbosity").unwrap().value, "high");
        assert_eq!(root.lists.len(), 2);
        assert!(root.find_list("empty").unwrap().lists.is_empty());
    }

    #[test]
    fn nested_search() {
        let root = deck();
        let function = root.find_list("function-tabular").unwrap();
        assert_eq!(function.parameters.len(), 3);
        assert_eq!(function.parameter("x values").unwrap().kind, "Array(double)");
        // direct children only
        assert!(root.parameter("x values").is_none());
    }

    #[test]
    fn array_literal() {
        let parameter = Parameter {
            name: "x".into(),
            kind: String::new(),
            value: "{ 0, 1.5 ,3e2}".into(),
        };
        assert_eq!(parse_array_value(&parameter).unwrap(), vec![0.0, 1.5, 300.0]);

        let bad = Parameter {
            value: "{1, two}".into(),
            ..parameter
        };
        assert!(matches!(
            parse_array_value(&bad),
            Err(ParseError::InvalidArray(_))
        ));
    }

    #[test]
    fn tabular_rainfall() {
        let root = deck();
        let times = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 4.0];
        let rain = rainfall(&root, &times, 1000.0).unwrap();

        let expected = [0.01, 0.01, 0.02, 0.02, 0.0, 0.0, 0.0, 0.0];
        for (r, e) in rain.iter().zip(expected) {
            assert!((r - e).abs() < 1e-12, "{r} != {e}");
        }
    }

    #[test]
    fn missing_source() {
        let root = deck();
        let err = tracer_source(&root, &[0.0], 1.0).unwrap_err();
        assert!(matches!(err, ParseError::MissingList(_)));
        assert!(err.to_string().contains("source terms"));
    }

    #[test]
    fn missing_name_attribute() {
        let reader = Reader::from_str(r#"<ParameterList><Parameter name="a" value="1"/></ParameterList>"#);
        let err = parse_parameter_list(reader).unwrap_err();
        assert!(matches!(err, ParseError::MissingAttribute(_)));
    }

    #[test]
    fn unexpected_element() {
        let reader = Reader::from_str(r#"<ParameterList name="a"><Other/></ParameterList>"#);
        let err = parse_parameter_list(reader).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedElement(_)));
    }

    #[test]
    fn unterminated_document() {
        let reader = Reader::from_str(r#"<ParameterList name="a"><Parameter name="b" value="1"/>"#);
        assert!(parse_parameter_list(reader).is_err());
    }
}
