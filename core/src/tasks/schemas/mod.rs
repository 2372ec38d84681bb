/**
 * One module per schema section. Each owns the decode routine that lifts its
 * section out of the parsed tree and the write routine that emits it back.
 */
use common::tasks::OneOrMany;
use quick_xml::Writer;
use quick_xml::events::{BytesText, Event};
use serde_json::Value;
use std::io;

pub(crate) mod actions;
pub(crate) mod principals;
pub(crate) mod registration;
pub(crate) mod settings;
pub(crate) mod triggers;

pub(crate) fn write_text(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> io::Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(value))?;
    Ok(())
}

pub(crate) fn write_opt_text(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(value) = value {
        write_text(writer, name, value)?;
    }
    Ok(())
}

pub(crate) fn write_opt_bool(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: Option<bool>,
) -> io::Result<()> {
    if let Some(value) = value {
        write_text(writer, name, if value { "true" } else { "false" })?;
    }
    Ok(())
}

/// One element per entry, singular or not.
pub(crate) fn write_one_or_many(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    values: &OneOrMany<String>,
) -> io::Result<()> {
    for value in values.iter() {
        write_text(writer, name, value)?;
    }
    Ok(())
}

pub(crate) fn write_opt_one_or_many(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    values: Option<&OneOrMany<String>>,
) -> io::Result<()> {
    if let Some(values) = values {
        write_one_or_many(writer, name, values)?;
    }
    Ok(())
}

/// Re-emit an opaque parsed subtree. Attributes live under `$`, text under `_`.
pub(crate) fn write_value(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &Value,
) -> io::Result<()> {
    match value {
        Value::Object(map) => {
            let mut element = writer.create_element(name);
            if let Some(Value::Object(attributes)) = map.get("$") {
                for (key, attribute) in attributes {
                    if let Some(text) = attribute.as_str() {
                        element = element.with_attribute((key.as_str(), text));
                    }
                }
            }
            element.write_inner_content(|writer| {
                for (key, child) in map {
                    if key == "$" {
                        continue;
                    }
                    if key == "_" {
                        if let Some(text) = child.as_str() {
                            writer.write_event(Event::Text(BytesText::new(text)))?;
                        }
                        continue;
                    }
                    write_value(writer, key, child)?;
                }
                Ok(())
            })?;
        }
        Value::Array(entries) => {
            for entry in entries {
                write_value(writer, name, entry)?;
            }
        }
        Value::Null => {}
        Value::String(text) => write_text(writer, name, text)?,
        scalar => write_text(writer, name, &scalar.to_string())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{write_one_or_many, write_opt_bool, write_text, write_value};
    use common::tasks::OneOrMany;
    use quick_xml::Writer;
    use serde_json::json;

    fn render<F: FnOnce(&mut Writer<Vec<u8>>)>(build: F) -> String {
        let mut writer = Writer::new(Vec::new());
        build(&mut writer);
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_write_text() {
        let xml = render(|writer| write_text(writer, "Command", "calc.exe").unwrap());
        assert_eq!(xml, "<Command>calc.exe</Command>");
    }

    #[test]
    fn test_write_opt_bool() {
        let xml = render(|writer| {
            write_opt_bool(writer, "Enabled", Some(false)).unwrap();
            write_opt_bool(writer, "Hidden", None).unwrap();
        });
        assert_eq!(xml, "<Enabled>false</Enabled>");
    }

    #[test]
    fn test_write_one_or_many() {
        let values = OneOrMany::Many(vec![String::from("/c"), String::from("dir")]);
        let xml = render(|writer| write_one_or_many(writer, "Arguments", &values).unwrap());
        assert_eq!(xml, "<Arguments>/c</Arguments><Arguments>dir</Arguments>");
    }

    #[test]
    fn test_write_value_tree() {
        let value = json!({"Custom": {"$": {"id": "1"}, "_": "payload"}, "Flag": "true"});
        let xml = render(|writer| write_value(writer, "Data", &value).unwrap());
        assert_eq!(
            xml,
            "<Data><Custom id=\"1\">payload</Custom><Flag>true</Flag></Data>"
        );
    }
}
