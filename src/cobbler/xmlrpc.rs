// XML-RPC request encoding and response decoding.
// Responses are decoded straight into serde_json values.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesText, Event};
use serde_json::{Map, Number, Value};

use crate::error::{InventoryError, Result};

/// Encode a method call whose parameters are all strings.
pub fn encode_call(method: &str, params: &[&str]) -> String {
    let mut body = String::from("<?xml version=\"1.0\"?>\n<methodCall>\n");
    body.push_str(&format!("<methodName>{}</methodName>\n", escape(method)));
    body.push_str("<params>\n");
    for param in params {
        body.push_str(&format!(
            "<param><value><string>{}</string></value></param>\n",
            escape(*param)
        ));
    }
    body.push_str("</params>\n</methodCall>\n");
    body
}

/// Decode a `methodResponse` body.
///
/// A `fault` response becomes [`InventoryError::Fault`].
pub fn decode_response(body: &str) -> Result<Value> {
    let mut decoder = Decoder::new(body);
    decoder.expect_start(b"methodResponse")?;

    match decoder.next()? {
        Event::Start(e) if e.name().as_ref() == b"params" => {
            decoder.expect_start(b"param")?;
            decoder.value()
        }
        Event::Start(e) if e.name().as_ref() == b"fault" => {
            let fault = decoder.value()?;
            Err(fault_error(&fault))
        }
        other => Err(unexpected(&other)),
    }
}

fn fault_error(fault: &Value) -> InventoryError {
    let code = fault.get("faultCode").and_then(Value::as_i64).unwrap_or(0);
    let message = fault
        .get("faultString")
        .and_then(Value::as_str)
        .unwrap_or("unknown fault")
        .to_string();
    InventoryError::Fault { code, message }
}

fn unexpected(event: &Event<'_>) -> InventoryError {
    InventoryError::Protocol(format!("unexpected {:?}", event))
}

struct Decoder<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Decoder<'a> {
    fn new(body: &'a str) -> Self {
        Self {
            reader: Reader::from_str(body),
        }
    }

    /// Next structural event; whitespace between tags is skipped.
    fn next(&mut self) -> Result<Event<'a>> {
        loop {
            match self.next_raw()? {
                Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {}
                event => return Ok(event),
            }
        }
    }

    /// Next event including text, skipping the prolog and comments.
    fn next_raw(&mut self) -> Result<Event<'a>> {
        loop {
            match self.reader.read_event() {
                Ok(Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {}
                Ok(Event::Eof) => {
                    return Err(InventoryError::Protocol(
                        "unexpected end of document".to_string(),
                    ));
                }
                Ok(event) => return Ok(event),
                Err(e) => return Err(InventoryError::Protocol(e.to_string())),
            }
        }
    }

    fn expect_start(&mut self, tag: &[u8]) -> Result<()> {
        match self.next()? {
            Event::Start(e) if e.name().as_ref() == tag => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    fn expect_end(&mut self, tag: &[u8]) -> Result<()> {
        match self.next()? {
            Event::End(e) if e.name().as_ref() == tag => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    /// Text content up to and including the closing tag, kept verbatim.
    fn text(&mut self) -> Result<String> {
        let text = match self.next_raw()? {
            Event::End(_) => return Ok(String::new()),
            Event::Text(t) => unescape(&t)?,
            Event::CData(c) => String::from_utf8_lossy(&c.into_inner()).into_owned(),
            other => return Err(unexpected(&other)),
        };
        match self.next_raw()? {
            Event::End(_) => Ok(text),
            other => Err(unexpected(&other)),
        }
    }

    /// A complete `<value>` element.
    fn value(&mut self) -> Result<Value> {
        match self.next()? {
            Event::Start(e) if e.name().as_ref() == b"value" => self.value_body(),
            Event::Empty(e) if e.name().as_ref() == b"value" => Ok(Value::String(String::new())),
            other => Err(unexpected(&other)),
        }
    }

    /// Contents of a `<value>` element, consuming its closing tag.
    fn value_body(&mut self) -> Result<Value> {
        let mut event = self.next_raw()?;
        if let Event::Text(t) = &event {
            // untyped values are strings; whitespace before a type tag is layout
            let text = unescape(t)?;
            event = self.next_raw()?;
            if matches!(event, Event::End(_)) {
                return Ok(Value::String(text));
            }
            if !text.trim().is_empty() {
                return Err(unexpected(&event));
            }
        }

        let value = match event {
            // <value></value>
            Event::End(_) => return Ok(Value::String(String::new())),
            Event::Empty(e) => {
                let tag = e.name().as_ref().to_vec();
                match tag.as_slice() {
                    b"nil" => Value::Null,
                    b"string" | b"base64" | b"dateTime.iso8601" => Value::String(String::new()),
                    b"struct" => Value::Object(Map::new()),
                    b"array" => Value::Array(Vec::new()),
                    other => {
                        return Err(InventoryError::Protocol(format!(
                            "unexpected empty <{}>",
                            String::from_utf8_lossy(other)
                        )));
                    }
                }
            }
            Event::Start(e) => {
                let tag = e.name().as_ref().to_vec();
                match tag.as_slice() {
                    b"struct" => self.struct_body()?,
                    b"array" => self.array_body()?,
                    b"nil" => {
                        self.expect_end(b"nil")?;
                        Value::Null
                    }
                    scalar => {
                        let text = self.text()?;
                        scalar_value(scalar, &text)?
                    }
                }
            }
            other => return Err(unexpected(&other)),
        };
        self.expect_end(b"value")?;
        Ok(value)
    }

    fn struct_body(&mut self) -> Result<Value> {
        let mut members = Map::new();
        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"member" => {
                    self.expect_start(b"name")?;
                    let name = self.text()?;
                    let value = self.value()?;
                    self.expect_end(b"member")?;
                    members.insert(name, value);
                }
                Event::End(e) if e.name().as_ref() == b"struct" => break,
                other => return Err(unexpected(&other)),
            }
        }
        Ok(Value::Object(members))
    }

    fn array_body(&mut self) -> Result<Value> {
        let mut items = Vec::new();
        match self.next()? {
            Event::Empty(e) if e.name().as_ref() == b"data" => {}
            Event::Start(e) if e.name().as_ref() == b"data" => loop {
                match self.next()? {
                    Event::Start(e) if e.name().as_ref() == b"value" => {
                        items.push(self.value_body()?)
                    }
                    Event::Empty(e) if e.name().as_ref() == b"value" => {
                        items.push(Value::String(String::new()))
                    }
                    Event::End(e) if e.name().as_ref() == b"data" => break,
                    other => return Err(unexpected(&other)),
                }
            },
            other => return Err(unexpected(&other)),
        }
        self.expect_end(b"array")?;
        Ok(Value::Array(items))
    }
}

fn unescape(text: &BytesText<'_>) -> Result<String> {
    text.unescape()
        .map(|s| s.into_owned())
        .map_err(|e| InventoryError::Protocol(e.to_string()))
}

fn scalar_value(tag: &[u8], text: &str) -> Result<Value> {
    let invalid = || {
        InventoryError::Protocol(format!(
            "invalid <{}> value {:?}",
            String::from_utf8_lossy(tag),
            text
        ))
    };

    match tag {
        b"string" | b"base64" | b"dateTime.iso8601" => Ok(Value::String(text.to_string())),
        b"int" | b"i4" | b"i8" => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        b"boolean" => match text.trim() {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        b"double" => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: &str) -> String {
        format!(
            "<?xml version='1.0'?>\n<methodResponse>\n<params>\n<param>\n{}\n</param>\n</params>\n</methodResponse>\n",
            value
        )
    }

    #[test]
    fn test_encode_call() {
        let body = encode_call("get_systems", &["tok<en>"]);
        assert!(body.contains("<methodName>get_systems</methodName>"));
        assert!(body.contains("<string>tok&lt;en&gt;</string>"));

        let bare = encode_call("get_systems", &[]);
        assert!(bare.contains("<params>\n</params>"));
    }

    #[test]
    fn test_decode_scalars() {
        let body = response(
            "<value><array><data>\
             <value><string>a &amp; b</string></value>\
             <value>untyped</value>\
             <value><int>42</int></value>\
             <value><i4>-7</i4></value>\
             <value><boolean>1</boolean></value>\
             <value><double>1.5</double></value>\
             <value><nil/></value>\
             <value><string/></value>\
             <value></value>\
             </data></array></value>",
        );

        let decoded = decode_response(&body).unwrap();
        assert_eq!(
            decoded,
            json!(["a & b", "untyped", 42, -7, true, 1.5, null, "", ""])
        );
    }

    #[test]
    fn test_decode_keeps_string_whitespace() {
        let body = response(
            "<value>\n  <array>\n    <data>\n\
             <value><string>  padded  </string></value>\n\
             <value><string>   </string></value>\n\
             <value>  untyped </value>\n\
             <value>\n  <int> 3 </int>\n</value>\n\
             <value><struct>\n<member>\n<name>kernel_options</name>\n\
             <value><string> quiet  splash </string></value>\n</member>\n</struct></value>\n\
             </data>\n  </array>\n</value>",
        );

        let decoded = decode_response(&body).unwrap();
        assert_eq!(
            decoded,
            json!(["  padded  ", "   ", "  untyped ", 3, { "kernel_options": " quiet  splash " }])
        );
    }

    #[test]
    fn test_decode_system_list() {
        let body = response(
            "<value><array><data><value><struct>\
             <member><name>hostname</name><value><string></string></value></member>\
             <member><name>status</name><value><string>production</string></value></member>\
             <member><name>owners</name><value><array><data>\
               <value><string>admin</string></value>\
             </data></array></value></member>\
             <member><name>interfaces</name><value><struct>\
               <member><name>eth0</name><value><struct>\
                 <member><name>management</name><value><boolean>0</boolean></value></member>\
                 <member><name>static</name><value><boolean>0</boolean></value></member>\
                 <member><name>dns_name</name><value><string>web01.example.com</string></value></member>\
               </struct></value></member>\
             </struct></value></member>\
             <member><name>ks_meta</name><value><struct/></value></member>\
             </struct></value></data></array></value>",
        );

        let decoded = decode_response(&body).unwrap();
        assert_eq!(
            decoded,
            json!([{
                "hostname": "",
                "status": "production",
                "owners": ["admin"],
                "interfaces": {
                    "eth0": {
                        "management": false,
                        "static": false,
                        "dns_name": "web01.example.com"
                    }
                },
                "ks_meta": {}
            }])
        );
    }

    #[test]
    fn test_decode_empty_array() {
        let decoded = decode_response(&response("<value><array><data/></array></value>")).unwrap();
        assert_eq!(decoded, json!([]));
    }

    #[test]
    fn test_decode_fault() {
        let body = "<?xml version='1.0'?>\n<methodResponse><fault><value><struct>\
                    <member><name>faultCode</name><value><int>1</int></value></member>\
                    <member><name>faultString</name><value><string>invalid token</string></value></member>\
                    </struct></value></fault></methodResponse>";

        match decode_response(body) {
            Err(InventoryError::Fault { code, message }) => {
                assert_eq!(code, 1);
                assert_eq!(message, "invalid token");
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_response("<html><body>502 Bad Gateway</body></html>"),
            Err(InventoryError::Protocol(_))
        ));
        assert!(matches!(
            decode_response(&response("<value><int>forty</int></value>")),
            Err(InventoryError::Protocol(_))
        ));
        assert!(matches!(
            decode_response("<methodResponse><params><param>"),
            Err(InventoryError::Protocol(_))
        ));
    }
}
