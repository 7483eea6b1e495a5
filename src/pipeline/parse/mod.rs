mod tcx;

use crate::error::ParseError;
use crate::types::activity::Document;

pub use tcx::TcxParser;

pub trait Parser {
    fn parse(&self, bytes: &[u8]) -> Result<Document, ParseError>;
}

pub fn parse(bytes: &[u8]) -> Result<Document, ParseError> {
    TcxParser.parse(bytes)
}
