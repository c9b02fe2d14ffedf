pub mod assemble;
pub mod mapping;
pub mod stream;
pub mod time;
pub mod types;
pub mod units;
pub mod xml;

use fitparser::from_bytes;

pub use assemble::assemble_document;
pub use stream::{FieldValue, Message, MessageStream, TimeValue};
pub use types::{
    Activity, Author, ConvertError, Creator, Lap, Position, Trackpoint, TrainingCenterDatabase,
};
pub use xml::serialize_document;

/// Finished conversion: the assembled tree plus its rendered XML. The tree
/// stays available so callers can summarize the result without re-parsing
/// the output.
#[derive(Debug, Clone)]
pub struct ConvertedTcx {
    pub document: TrainingCenterDatabase,
    pub xml: String,
}

/// Decode a FIT payload and convert it into a TCX document.
///
/// Three stages:
/// 1. [`from_bytes`] validates FIT framing and decodes `fitparser` records;
///    its errors surface verbatim as [`ConvertError::ParseError`].
/// 2. [`assemble::assemble_document`] maps the buffered message stream into
///    the output tree.
/// 3. [`xml::serialize_document`] renders the tree.
pub fn convert_fit_bytes(bytes: &[u8]) -> Result<ConvertedTcx, ConvertError> {
    let records = from_bytes(bytes).map_err(|err| ConvertError::ParseError(err.to_string()))?;
    let stream = MessageStream::from_records(&records);
    convert_stream(&stream)
}

/// Convert an already-decoded message stream. Split out from
/// [`convert_fit_bytes`] so the assembly and serialization semantics can be
/// exercised without FIT fixtures.
pub fn convert_stream(stream: &MessageStream) -> Result<ConvertedTcx, ConvertError> {
    let document = assemble_document(stream)?;
    let xml = serialize_document(&document)?;
    Ok(ConvertedTcx { document, xml })
}
