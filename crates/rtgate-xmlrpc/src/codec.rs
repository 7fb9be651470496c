//! XML-RPC document encoding and decoding.
//!
//! Responses are parsed into a small element tree first and then interpreted;
//! XML-RPC bodies are short enough that streaming interpretation buys nothing.

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use rtgate_multicall::RpcValue;

use crate::error::{XmlRpcError, XmlRpcResult};

/// Encode a `methodCall` document.
#[must_use]
pub fn encode_call(method: &str, params: &[RpcValue]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?><methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn write_value(out: &mut String, value: &RpcValue) {
    out.push_str("<value>");
    match value {
        RpcValue::Nil => out.push_str("<nil/>"),
        RpcValue::Int(number) => {
            let tag = if i32::try_from(*number).is_ok() { "i4" } else { "i8" };
            write_scalar(out, tag, &number.to_string());
        }
        RpcValue::Bool(flag) => write_scalar(out, "boolean", if *flag { "1" } else { "0" }),
        RpcValue::Double(number) => write_scalar(out, "double", &number.to_string()),
        RpcValue::String(text) => write_scalar(out, "string", &escape(text.as_str())),
        RpcValue::Base64(bytes) => {
            write_scalar(out, "base64", &general_purpose::STANDARD.encode(bytes));
        }
        RpcValue::DateTime(text) => {
            write_scalar(out, "dateTime.iso8601", &escape(text.as_str()));
        }
        RpcValue::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        RpcValue::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

fn write_scalar(out: &mut String, tag: &str, body: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(body);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Decode a `methodResponse` document.
///
/// An empty `<params/>` decodes to [`RpcValue::Nil`].
///
/// # Errors
///
/// Returns [`XmlRpcError::Fault`] for a fault response and a parse error for
/// anything that is not a well-formed XML-RPC response.
pub fn decode_response(body: &str) -> XmlRpcResult<RpcValue> {
    let root = parse_document(body)?;
    expect_name(&root, "methodResponse")?;
    let outcome = root.first_child("methodResponse")?;
    match outcome.name.as_str() {
        "params" => match outcome.children.first() {
            None => Ok(RpcValue::Nil),
            Some(param) => {
                expect_name(param, "param")?;
                decode_value(param.first_child("param")?)
            }
        },
        "fault" => Err(fault_from(&decode_value(outcome.first_child("fault")?)?)),
        _ => Err(XmlRpcError::UnexpectedElement {
            expected: "params",
            found: outcome.name.clone(),
        }),
    }
}

fn fault_from(value: &RpcValue) -> XmlRpcError {
    let members = value.as_struct();
    let code = members
        .and_then(|members| members.get("faultCode"))
        .and_then(RpcValue::as_i64)
        .unwrap_or_default();
    let message = members
        .and_then(|members| members.get("faultString"))
        .and_then(RpcValue::as_str)
        .unwrap_or_default()
        .to_string();
    XmlRpcError::Fault { code, message }
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    fn first_child(&self, context: &'static str) -> XmlRpcResult<&Self> {
        self.children
            .first()
            .ok_or(XmlRpcError::Incomplete { context })
    }

    fn child(&self, name: &'static str) -> XmlRpcResult<&Self> {
        self.children
            .iter()
            .find(|child| child.name == name)
            .ok_or(XmlRpcError::Incomplete { context: name })
    }
}

fn parse_document(body: &str) -> XmlRpcResult<Element> {
    let mut reader = Reader::from_str(body);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::open(&start)),
            Event::Empty(start) => attach(&mut stack, &mut root, Element::open(&start)),
            Event::End(_) => {
                let element = stack.pop().ok_or(XmlRpcError::Incomplete {
                    context: "element",
                })?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let decoded = text.unescape().map_err(quick_xml::Error::from)?;
                    current.text.push_str(&decoded);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlRpcError::Incomplete { context: "element" });
    }
    root.ok_or(XmlRpcError::Incomplete {
        context: "document",
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn expect_name(element: &Element, expected: &'static str) -> XmlRpcResult<()> {
    if element.name == expected {
        Ok(())
    } else {
        Err(XmlRpcError::UnexpectedElement {
            expected,
            found: element.name.clone(),
        })
    }
}

fn decode_value(element: &Element) -> XmlRpcResult<RpcValue> {
    expect_name(element, "value")?;
    match element.children.first() {
        None => Ok(RpcValue::String(element.text.clone())),
        Some(typed) => decode_typed(typed),
    }
}

fn decode_typed(element: &Element) -> XmlRpcResult<RpcValue> {
    let text = element.text.as_str();
    match element.name.as_str() {
        "string" => Ok(RpcValue::String(text.to_string())),
        "i4" | "int" | "i8" => text
            .trim()
            .parse()
            .map(RpcValue::Int)
            .map_err(|_| invalid_scalar("int", text)),
        "boolean" => match text.trim() {
            "1" | "true" => Ok(RpcValue::Bool(true)),
            "0" | "false" => Ok(RpcValue::Bool(false)),
            _ => Err(invalid_scalar("boolean", text)),
        },
        "double" => text
            .trim()
            .parse()
            .map(RpcValue::Double)
            .map_err(|_| invalid_scalar("double", text)),
        "base64" => {
            let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            Ok(RpcValue::Base64(general_purpose::STANDARD.decode(compact)?))
        }
        "dateTime.iso8601" => Ok(RpcValue::DateTime(text.trim().to_string())),
        "nil" => Ok(RpcValue::Nil),
        "array" => element
            .child("data")?
            .children
            .iter()
            .map(decode_value)
            .collect::<XmlRpcResult<Vec<_>>>()
            .map(RpcValue::Array),
        "struct" => {
            let mut members = BTreeMap::new();
            for member in &element.children {
                expect_name(member, "member")?;
                let name = member.child("name")?.text.clone();
                let value = decode_value(member.child("value")?)?;
                members.insert(name, value);
            }
            Ok(RpcValue::Struct(members))
        }
        _ => Err(XmlRpcError::UnexpectedElement {
            expected: "value type",
            found: element.name.clone(),
        }),
    }
}

fn invalid_scalar(kind: &'static str, text: &str) -> XmlRpcError {
    XmlRpcError::InvalidScalar {
        kind,
        value: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<methodResponse>\n<params>\n<param><value>{value}</value></param>\n</params>\n</methodResponse>"
        )
    }

    #[test]
    fn encodes_call_with_typed_params() {
        let body = encode_call(
            "d.multicall2",
            &[
                RpcValue::from(""),
                RpcValue::from("main"),
                RpcValue::from("d.name="),
            ],
        );
        assert_eq!(
            body,
            "<?xml version=\"1.0\"?><methodCall><methodName>d.multicall2</methodName><params>\
             <param><value><string></string></value></param>\
             <param><value><string>main</string></value></param>\
             <param><value><string>d.name=</string></value></param>\
             </params></methodCall>"
        );
    }

    #[test]
    fn encoding_escapes_text_and_widens_large_ints() {
        let body = encode_call(
            "d.custom.set",
            &[RpcValue::from("a<b&c"), RpcValue::from(5_000_000_000_i64)],
        );
        assert!(body.contains("<string>a&lt;b&amp;c</string>"));
        assert!(body.contains("<i8>5000000000</i8>"));
        assert!(encode_call("d.priority.set", &[RpcValue::from(2_i64)]).contains("<i4>2</i4>"));
    }

    #[test]
    fn encodes_base64_and_structs() {
        let body = encode_call(
            "system.multicall",
            &[
                RpcValue::Base64(b"d4:infoe".to_vec()),
                RpcValue::structure([("methodName", RpcValue::from("system.pid"))]),
            ],
        );
        assert!(body.contains("<base64>ZDQ6aW5mb2U=</base64>"));
        assert!(body.contains(
            "<struct><member><name>methodName</name><value><string>system.pid</string></value></member></struct>"
        ));
    }

    #[test]
    fn decodes_nested_multicall_rows() -> XmlRpcResult<()> {
        let body = response(
            "<array><data>\
             <value><array><data><value><string>ABC</string></value><value><i8>4096</i8></value></data></array></value>\
             <value><array><data><value>untyped</value><value><nil/></value></data></array></value>\
             </data></array>",
        );
        let value = decode_response(&body)?;
        assert_eq!(
            value,
            RpcValue::Array(vec![
                RpcValue::Array(vec![RpcValue::from("ABC"), RpcValue::Int(4096)]),
                RpcValue::Array(vec![RpcValue::from("untyped"), RpcValue::Nil]),
            ])
        );
        Ok(())
    }

    #[test]
    fn decodes_scalars() -> XmlRpcResult<()> {
        assert_eq!(decode_response(&response("<i4>-7</i4>"))?, RpcValue::Int(-7));
        assert_eq!(decode_response(&response("<int>12</int>"))?, RpcValue::Int(12));
        assert_eq!(decode_response(&response("<boolean>1</boolean>"))?, RpcValue::Bool(true));
        assert_eq!(decode_response(&response("<double>0.5</double>"))?, RpcValue::Double(0.5));
        assert_eq!(
            decode_response(&response("<string>Tom &amp; Jerry</string>"))?,
            RpcValue::from("Tom & Jerry")
        );
        assert_eq!(
            decode_response(&response("<base64>ZDQ6aW5mb2U=</base64>"))?,
            RpcValue::Base64(b"d4:infoe".to_vec())
        );
        assert_eq!(
            decode_response(&response("<dateTime.iso8601>20240101T00:00:00</dateTime.iso8601>"))?,
            RpcValue::DateTime("20240101T00:00:00".to_string())
        );
        assert_eq!(decode_response(&response(""))?, RpcValue::from(""));
        Ok(())
    }

    #[test]
    fn empty_params_decode_to_nil() -> XmlRpcResult<()> {
        let value = decode_response("<methodResponse><params/></methodResponse>")?;
        assert_eq!(value, RpcValue::Nil);
        Ok(())
    }

    #[test]
    fn decodes_struct_members() -> XmlRpcResult<()> {
        let body = response(
            "<struct>\
             <member><name>hostname</name><value><string>seedbox</string></value></member>\
             <member><name>pid</name><value><i4>42</i4></value></member>\
             </struct>",
        );
        let value = decode_response(&body)?;
        let members = value.as_struct().expect("struct");
        assert_eq!(members.get("hostname"), Some(&RpcValue::from("seedbox")));
        assert_eq!(members.get("pid"), Some(&RpcValue::Int(42)));
        Ok(())
    }

    #[test]
    fn fault_response_is_an_error() {
        let body = "<?xml version=\"1.0\"?><methodResponse><fault><value><struct>\
                    <member><name>faultCode</name><value><i4>-501</i4></value></member>\
                    <member><name>faultString</name><value><string>Could not find info-hash.</string></value></member>\
                    </struct></value></fault></methodResponse>";
        let err = decode_response(body).expect_err("fault");
        assert!(matches!(
            err,
            XmlRpcError::Fault { code: -501, ref message } if message == "Could not find info-hash."
        ));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(
            decode_response(&response("<i4>seven</i4>")),
            Err(XmlRpcError::InvalidScalar { kind: "int", .. })
        ));
        assert!(matches!(
            decode_response(&response("<color>red</color>")),
            Err(XmlRpcError::UnexpectedElement { expected: "value type", .. })
        ));
        assert!(matches!(
            decode_response("<methodCall><params/></methodCall>"),
            Err(XmlRpcError::UnexpectedElement { expected: "methodResponse", .. })
        ));
        assert!(matches!(
            decode_response(""),
            Err(XmlRpcError::Incomplete { context: "document" })
        ));
        assert!(decode_response("<methodResponse><params>").is_err());
    }
}
