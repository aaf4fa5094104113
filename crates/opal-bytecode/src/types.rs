//! Type descriptors and call signatures
//!
//! The descriptor grammar is compact and unambiguous:
//!
//! ```text
//! I int      J long     F float    D double
//! Z bool     C char     T str      V void
//! L<name>;   object of class <name>
//! [<elem>    array of <elem>
//! ```
//!
//! A call signature is `(<params>)<ret>`, e.g. `(ILfoo.Bar;)V`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Descriptor parsing failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("invalid type descriptor: {0:?}")]
    InvalidType(String),

    #[error("invalid call signature: {0:?}")]
    InvalidSignature(String),
}

/// A value type of the Opal machine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int,
    Long,
    Float,
    Double,
    Bool,
    Char,
    Str,
    Void,
    /// Object of a named class
    Object(String),
    /// Array with the given element type
    Array(Box<DataType>),
}

impl DataType {
    /// Parse a descriptor that denotes exactly one type
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let (ty, rest) = Self::parse_prefix(descriptor)
            .ok_or_else(|| DescriptorError::InvalidType(descriptor.to_string()))?;
        if rest.is_empty() {
            Ok(ty)
        } else {
            Err(DescriptorError::InvalidType(descriptor.to_string()))
        }
    }

    /// Parse one type from the front of `text`, returning the remainder
    fn parse_prefix(text: &str) -> Option<(Self, &str)> {
        let mut chars = text.chars();
        let first = chars.next()?;
        let rest = chars.as_str();
        match first {
            'I' => Some((DataType::Int, rest)),
            'J' => Some((DataType::Long, rest)),
            'F' => Some((DataType::Float, rest)),
            'D' => Some((DataType::Double, rest)),
            'Z' => Some((DataType::Bool, rest)),
            'C' => Some((DataType::Char, rest)),
            'T' => Some((DataType::Str, rest)),
            'V' => Some((DataType::Void, rest)),
            'L' => {
                let end = rest.find(';')?;
                let name = &rest[..end];
                if name.is_empty() {
                    return None;
                }
                Some((DataType::Object(name.to_string()), &rest[end + 1..]))
            }
            '[' => {
                let (elem, tail) = Self::parse_prefix(rest)?;
                Some((DataType::Array(Box::new(elem)), tail))
            }
            _ => None,
        }
    }

    /// Render the descriptor form
    pub fn descriptor(&self) -> String {
        match self {
            DataType::Int => "I".to_string(),
            DataType::Long => "J".to_string(),
            DataType::Float => "F".to_string(),
            DataType::Double => "D".to_string(),
            DataType::Bool => "Z".to_string(),
            DataType::Char => "C".to_string(),
            DataType::Str => "T".to_string(),
            DataType::Void => "V".to_string(),
            DataType::Object(name) => format!("L{};", name),
            DataType::Array(elem) => format!("[{}", elem.descriptor()),
        }
    }

    /// Rank inside the numeric widening chain, if numeric
    fn numeric_rank(&self) -> Option<u8> {
        match self {
            DataType::Int => Some(0),
            DataType::Long => Some(1),
            DataType::Float => Some(2),
            DataType::Double => Some(3),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// The wider of two operand types
    ///
    /// Numeric pairs widen along Int < Long < Float < Double; any other pair
    /// keeps the left type.
    pub fn wider(&self, other: &DataType) -> DataType {
        match (self.numeric_rank(), other.numeric_rank()) {
            (Some(left), Some(right)) if right > left => other.clone(),
            _ => self.clone(),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Int => f.write_str("int"),
            DataType::Long => f.write_str("long"),
            DataType::Float => f.write_str("float"),
            DataType::Double => f.write_str("double"),
            DataType::Bool => f.write_str("bool"),
            DataType::Char => f.write_str("char"),
            DataType::Str => f.write_str("str"),
            DataType::Void => f.write_str("void"),
            DataType::Object(name) => f.write_str(name),
            DataType::Array(elem) => write!(f, "{}[]", elem),
        }
    }
}

/// A call signature: parameter types plus return type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    params: Vec<DataType>,
    ret: DataType,
}

impl Signature {
    pub fn new(params: Vec<DataType>, ret: DataType) -> Self {
        Self { params, ret }
    }

    /// Parse a `(<params>)<ret>` signature descriptor
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let invalid = || DescriptorError::InvalidSignature(descriptor.to_string());
        let inner = descriptor.strip_prefix('(').ok_or_else(invalid)?;
        let close = inner.find(')').ok_or_else(invalid)?;
        let mut remaining = &inner[..close];
        let mut params = Vec::new();
        while !remaining.is_empty() {
            let (param, rest) = DataType::parse_prefix(remaining).ok_or_else(invalid)?;
            params.push(param);
            remaining = rest;
        }
        let ret = DataType::parse(&inner[close + 1..]).map_err(|_| invalid())?;
        Ok(Self { params, ret })
    }

    pub fn descriptor(&self) -> String {
        let params: String = self.params.iter().map(DataType::descriptor).collect();
        format!("({}){}", params, self.ret.descriptor())
    }

    pub fn params(&self) -> &[DataType] {
        &self.params
    }

    /// Number of declared arguments
    pub fn argument_count(&self) -> usize {
        self.params.len()
    }

    pub fn ret(&self) -> &DataType {
        &self.ret
    }

    pub fn returns_value(&self) -> bool {
        self.ret != DataType::Void
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitive_descriptors() {
        assert_eq!(DataType::parse("I"), Ok(DataType::Int));
        assert_eq!(DataType::parse("D"), Ok(DataType::Double));
        assert_eq!(DataType::parse("T"), Ok(DataType::Str));
        assert_eq!(DataType::parse("V"), Ok(DataType::Void));
    }

    #[test]
    fn parses_object_and_array_descriptors() {
        assert_eq!(
            DataType::parse("Lfoo.Bar;"),
            Ok(DataType::Object("foo.Bar".into()))
        );
        assert_eq!(
            DataType::parse("[[I"),
            Ok(DataType::Array(Box::new(DataType::Array(Box::new(
                DataType::Int
            )))))
        );
    }

    #[test]
    fn rejects_malformed_descriptors() {
        assert!(DataType::parse("").is_err());
        assert!(DataType::parse("X").is_err());
        assert!(DataType::parse("Lfoo.Bar").is_err());
        assert!(DataType::parse("II").is_err());
        assert!(DataType::parse("L;").is_err());
    }

    #[test]
    fn descriptor_roundtrip() {
        for text in ["I", "J", "[D", "Lutil.List;", "[[Lfoo.Bar;"] {
            assert_eq!(DataType::parse(text).unwrap().descriptor(), text);
        }
    }

    #[test]
    fn widening_follows_numeric_chain() {
        assert_eq!(DataType::Int.wider(&DataType::Long), DataType::Long);
        assert_eq!(DataType::Long.wider(&DataType::Int), DataType::Long);
        assert_eq!(DataType::Int.wider(&DataType::Double), DataType::Double);
        assert_eq!(DataType::Float.wider(&DataType::Float), DataType::Float);
    }

    #[test]
    fn widening_keeps_left_for_non_numeric() {
        let object = DataType::Object("foo.Bar".into());
        assert_eq!(object.wider(&DataType::Int), object);
        assert_eq!(DataType::Str.wider(&DataType::Str), DataType::Str);
    }

    #[test]
    fn parses_signatures() {
        let sig = Signature::parse("(ILfoo.Bar;[D)V").unwrap();
        assert_eq!(sig.argument_count(), 3);
        assert_eq!(sig.params()[0], DataType::Int);
        assert_eq!(sig.ret(), &DataType::Void);
        assert!(!sig.returns_value());
        assert_eq!(sig.descriptor(), "(ILfoo.Bar;[D)V");
    }

    #[test]
    fn parses_empty_signature() {
        let sig = Signature::parse("()I").unwrap();
        assert_eq!(sig.argument_count(), 0);
        assert!(sig.returns_value());
    }

    #[test]
    fn rejects_malformed_signatures() {
        assert!(Signature::parse("I)V").is_err());
        assert!(Signature::parse("(I").is_err());
        assert!(Signature::parse("(X)V").is_err());
        assert!(Signature::parse("(I)").is_err());
    }
}
