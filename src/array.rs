//! typed arrays written as inline VTK `DataArray` elements

use crate::write_vtk::{close_inline_array_header, write_inline_array_header, Encoding};

use quick_xml::events::{BytesText, Event};
use quick_xml::writer::Writer;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// VTK name of the element type of a `DataArray`
pub enum Precision {
    Float64,
    Int64,
    UInt8,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float64 => "Float64",
            Self::Int64 => "Int64",
            Self::UInt8 => "UInt8",
        }
    }
}

/// Scalar types that can be stored in a `DataArray`
pub trait Numeric: Copy {
    /// size in bytes
    const SIZE: usize;

    fn as_precision() -> Precision;

    fn extend_le_bytes(&self, bytes: &mut Vec<u8>);

    /// append the ascii form of the number to `out`
    fn push_ascii(&self, out: &mut String);
}

impl Numeric for f64 {
    const SIZE: usize = 8;

    fn as_precision() -> Precision {
        Precision::Float64
    }

    fn extend_le_bytes(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.to_le_bytes())
    }

    fn push_ascii(&self, out: &mut String) {
        let mut buffer = ryu::Buffer::new();
        out.push_str(buffer.format(*self))
    }
}

impl Numeric for i64 {
    const SIZE: usize = 8;

    fn as_precision() -> Precision {
        Precision::Int64
    }

    fn extend_le_bytes(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.to_le_bytes())
    }

    fn push_ascii(&self, out: &mut String) {
        out.push_str(&self.to_string())
    }
}

impl Numeric for u8 {
    const SIZE: usize = 1;

    fn as_precision() -> Precision {
        Precision::UInt8
    }

    fn extend_le_bytes(&self, bytes: &mut Vec<u8>) {
        bytes.push(*self)
    }

    fn push_ascii(&self, out: &mut String) {
        out.push_str(&self.to_string())
    }
}

/// Data that can be written as a single inline `DataArray`
pub trait Array {
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), crate::Error>;

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str)
        -> Result<(), crate::Error>;

    /// total number of scalars
    fn length(&self) -> usize;

    fn components(&self) -> usize {
        1
    }

    fn precision(&self) -> Precision;
}

impl<NUM> Array for Vec<NUM>
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), crate::Error> {
        self.as_slice().write_ascii(writer, name)
    }

    fn write_base64<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
    ) -> Result<(), crate::Error> {
        self.as_slice().write_base64(writer, name)
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }
}

impl<NUM> Array for &[NUM]
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), crate::Error> {
        write_ascii_values(writer, name, self.components(), self.precision(), self.iter())
    }

    fn write_base64<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
    ) -> Result<(), crate::Error> {
        write_base64_values(writer, name, self.components(), self.precision(), self.length(), self.iter())
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }
}

/// one tuple per row, `(tuples, components)`
impl Array for ndarray::Array2<f64> {
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), crate::Error> {
        write_ascii_values(writer, name, self.components(), self.precision(), self.iter())
    }

    fn write_base64<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
    ) -> Result<(), crate::Error> {
        write_base64_values(writer, name, self.components(), self.precision(), self.length(), self.iter())
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn components(&self) -> usize {
        self.ncols()
    }

    fn precision(&self) -> Precision {
        Precision::Float64
    }
}

fn write_ascii_values<'a, W, NUM, I>(
    writer: &mut Writer<W>,
    name: &str,
    components: usize,
    precision: Precision,
    values: I,
) -> Result<(), crate::Error>
where
    W: Write,
    NUM: Numeric + 'a,
    I: Iterator<Item = &'a NUM>,
{
    write_inline_array_header(writer, Encoding::Ascii, name, components, precision)?;

    let mut data = String::new();
    for value in values {
        value.push_ascii(&mut data);
        data.push(' ');
    }

    writer.write_event(Event::Text(BytesText::new(&data)))?;

    close_inline_array_header(writer)?;

    Ok(())
}

fn write_base64_values<'a, W, NUM, I>(
    writer: &mut Writer<W>,
    name: &str,
    components: usize,
    precision: Precision,
    length: usize,
    values: I,
) -> Result<(), crate::Error>
where
    W: Write,
    NUM: Numeric + 'a,
    I: Iterator<Item = &'a NUM>,
{
    write_inline_array_header(writer, Encoding::Base64, name, components, precision)?;

    let num_bytes = length * NUM::SIZE;
    let mut byte_data: Vec<u8> = Vec::with_capacity(num_bytes + 8);

    // UInt64 header holding the number of data bytes that follow
    byte_data.extend_from_slice(&(num_bytes as u64).to_le_bytes());

    for value in values {
        value.extend_le_bytes(&mut byte_data);
    }

    let data = base64::encode(byte_data.as_slice());
    writer.write_event(Event::Text(BytesText::new(&data)))?;

    close_inline_array_header(writer)?;

    Ok(())
}
