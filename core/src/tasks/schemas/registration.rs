use crate::tasks::decode::DecodeContext;
use crate::tasks::error::TaskError;
use crate::tasks::schemas::write_opt_text;
use common::tasks::RegistrationInfo;
use quick_xml::Writer;
use serde_json::Value;
use std::io;

/// Decode the RegistrationInfo metadata section. All fields optional.
pub(crate) fn decode_registration_info(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<RegistrationInfo>, TaskError> {
    let Some(map) = ctx.object(node, "RegistrationInfo")? else {
        return Ok(None);
    };

    let info = RegistrationInfo {
        uri: ctx.string(map.get("URI"), "RegistrationInfo.URI")?,
        security_descriptor: ctx.string(
            map.get("SecurityDescriptor"),
            "RegistrationInfo.SecurityDescriptor",
        )?,
        source: ctx.string(map.get("Source"), "RegistrationInfo.Source")?,
        date: ctx.string(map.get("Date"), "RegistrationInfo.Date")?,
        author: ctx.string(map.get("Author"), "RegistrationInfo.Author")?,
        version: ctx.string(map.get("Version"), "RegistrationInfo.Version")?,
        description: ctx.string(map.get("Description"), "RegistrationInfo.Description")?,
        documentation: ctx.string(map.get("Documentation"), "RegistrationInfo.Documentation")?,
    };

    Ok((info != RegistrationInfo::default()).then_some(info))
}

pub(crate) fn write_registration_info(
    writer: &mut Writer<Vec<u8>>,
    info: &RegistrationInfo,
) -> io::Result<()> {
    writer
        .create_element("RegistrationInfo")
        .write_inner_content(|writer| {
            write_opt_text(writer, "URI", info.uri.as_deref())?;
            write_opt_text(
                writer,
                "SecurityDescriptor",
                info.security_descriptor.as_deref(),
            )?;
            write_opt_text(writer, "Source", info.source.as_deref())?;
            write_opt_text(writer, "Date", info.date.as_deref())?;
            write_opt_text(writer, "Author", info.author.as_deref())?;
            write_opt_text(writer, "Version", info.version.as_deref())?;
            write_opt_text(writer, "Description", info.description.as_deref())?;
            write_opt_text(writer, "Documentation", info.documentation.as_deref())
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_registration_info, write_registration_info};
    use crate::tasks::decode::DecodeContext;
    use common::tasks::RegistrationInfo;
    use quick_xml::Writer;
    use serde_json::json;

    #[test]
    fn test_decode_registration_info() {
        let ctx = DecodeContext { strict: false };
        let node = json!({"URI": "\\Backup\\Nightly", "Author": "IT", "Version": "1.0.0"});
        let info = decode_registration_info(&ctx, Some(&node)).unwrap().unwrap();
        assert_eq!(info.uri.as_deref(), Some("\\Backup\\Nightly"));
        assert_eq!(info.author.as_deref(), Some("IT"));
        assert_eq!(info.version.as_deref(), Some("1.0.0"));
        assert_eq!(info.description, None);
    }

    #[test]
    fn test_decode_registration_info_empty_section() {
        let ctx = DecodeContext { strict: false };
        let node = json!({});
        assert!(decode_registration_info(&ctx, Some(&node)).unwrap().is_none());
        assert!(decode_registration_info(&ctx, None).unwrap().is_none());
    }

    #[test]
    fn test_write_registration_info_omits_unset() {
        let info = RegistrationInfo {
            uri: Some(String::from("\\A\\B")),
            description: Some(String::from("demo")),
            ..Default::default()
        };
        let mut writer = Writer::new(Vec::new());
        write_registration_info(&mut writer, &info).unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            xml,
            "<RegistrationInfo><URI>\\A\\B</URI><Description>demo</Description></RegistrationInfo>"
        );
    }
}
