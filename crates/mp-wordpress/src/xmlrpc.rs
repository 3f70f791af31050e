//! XML-RPC value model, request encoding and response parsing.
//!
//! Only the subset of XML-RPC that WordPress speaks is supported: scalar
//! types, arrays, structs, `base64` and `dateTime.iso8601`.

use std::collections::BTreeMap;
use std::fmt::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::ApiError;

/// XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(String),
    Double(f64),
    /// `dateTime.iso8601` text, e.g. `20240301T10:30:00`.
    DateTime(String),
    Base64(Vec<u8>),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    /// Build a struct value from `(name, value)` pairs.
    pub fn structure<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Struct(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::DateTime(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(n) => Some(*n != 0),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Struct member lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(members) => members.get(name),
            _ => None,
        }
    }

    /// Identifier text. WordPress returns ids as strings or ints depending on
    /// the method.
    #[must_use]
    pub fn as_id(&self) -> Option<String> {
        match self {
            Self::Int(n) => Some(n.to_string()),
            Self::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            _ => None,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Self::Int(n) => {
                let _ = write!(out, "<int>{n}</int>");
            }
            Self::Bool(b) => {
                let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
            }
            Self::String(s) => {
                let _ = write!(out, "<string>{}</string>", escape_xml(s));
            }
            Self::Double(d) => {
                let _ = write!(out, "<double>{d}</double>");
            }
            Self::DateTime(s) => {
                let _ = write!(out, "<dateTime.iso8601>{}</dateTime.iso8601>", escape_xml(s));
            }
            Self::Base64(bytes) => {
                let _ = write!(out, "<base64>{}</base64>", BASE64.encode(bytes));
            }
            Self::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    item.write_xml(out);
                }
                out.push_str("</data></array>");
            }
            Self::Struct(members) => {
                out.push_str("<struct>");
                for (name, value) in members {
                    let _ = write!(out, "<member><name>{}</name>", escape_xml(name));
                    value.write_xml(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
            Self::Nil => out.push_str("<nil/>"),
        }
        out.push_str("</value>");
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Encode a `methodCall` document.
#[must_use]
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(256);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<methodCall><methodName>");
    out.push_str(&escape_xml(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        param.write_xml(&mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>\n");
    out
}

/// Parse a `methodResponse` document into its single return value.
///
/// A `<fault>` response becomes [`ApiError::Fault`].
pub fn parse_response(xml: &str) -> Result<Value, ApiError> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(ApiError::Malformed(format!(
            "expected methodResponse, found <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| ApiError::Malformed("fault without value".to_owned()))
            .and_then(to_value)?;
        return Err(ApiError::Fault {
            code: value.get("faultCode").and_then(Value::as_i64).unwrap_or(0),
            message: value
                .get("faultString")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        });
    }

    root.child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .ok_or_else(|| ApiError::Malformed("response without params".to_owned()))
        .and_then(to_value)
}

/// Minimal element tree produced by the reader.
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }
}

fn parse_tree(xml: &str) -> Result<Node, ApiError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Node> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = reader.decoder().decode(e.local_name().as_ref())?.into_owned();
                stack.push(Node {
                    name,
                    ..Node::default()
                });
            }
            Event::Empty(e) => {
                let name = reader.decoder().decode(e.local_name().as_ref())?.into_owned();
                let node = Node {
                    name,
                    ..Node::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Event::Text(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&reader.decoder().decode(&e)?);
                }
            }
            Event::GeneralRef(e) => {
                if let Some(node) = stack.last_mut() {
                    let entity = reader.decoder().decode(&e)?;
                    node.text.push_str(&decode_entity(&entity));
                }
            }
            Event::CData(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| ApiError::Malformed("unbalanced end tag".to_owned()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Event::Eof => return Err(ApiError::Malformed("unexpected end of document".to_owned())),
            _ => {}
        }
        buf.clear();
    }
}

fn to_value(node: &Node) -> Result<Value, ApiError> {
    // <value>text</value> without a type element is a string.
    let Some(typed) = node.children.first() else {
        return Ok(Value::String(node.text.clone()));
    };
    let text = typed.text.as_str();
    let value = match typed.name.as_str() {
        "int" | "i4" | "i8" => Value::Int(
            text.trim()
                .parse()
                .map_err(|_| ApiError::Malformed(format!("invalid int: {text}")))?,
        ),
        "boolean" => Value::Bool(text.trim() == "1"),
        "string" => Value::String(text.to_owned()),
        "double" => Value::Double(
            text.trim()
                .parse()
                .map_err(|_| ApiError::Malformed(format!("invalid double: {text}")))?,
        ),
        "dateTime.iso8601" => Value::DateTime(text.trim().to_owned()),
        "base64" => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            Value::Base64(
                BASE64
                    .decode(compact)
                    .map_err(|e| ApiError::Malformed(format!("invalid base64: {e}")))?,
            )
        }
        "array" => {
            let items = typed
                .child("data")
                .map(|data| {
                    data.children
                        .iter()
                        .filter(|c| c.name == "value")
                        .map(to_value)
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?
                .unwrap_or_default();
            Value::Array(items)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member
                    .child("name")
                    .map(|n| n.text.clone())
                    .ok_or_else(|| ApiError::Malformed("struct member without name".to_owned()))?;
                let value = member
                    .child("value")
                    .map_or(Ok(Value::Nil), to_value)?;
                members.insert(name, value);
            }
            Value::Struct(members)
        }
        "nil" => Value::Nil,
        other => return Err(ApiError::Malformed(format!("unknown value type <{other}>"))),
    };
    Ok(value)
}

/// Decode XML entity references to their character values.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

fn escape_xml(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}
